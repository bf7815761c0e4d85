use metareport_core::error::codes;
use metareport_core::MetaApiError;

/// Caller-facing text for an upstream error. The pipeline itself only
/// classifies and propagates; presentation layers call this.
pub fn user_message(error: &MetaApiError) -> String {
    match error {
        MetaApiError::Api { code, message, .. } => match *code {
            codes::INVALID_TOKEN => "Invalid token. Please reconnect your Meta account.".to_string(),
            codes::RATE_LIMIT => "Request limit reached. Try again in a few minutes.".to_string(),
            codes::INVALID_PARAMETER => "Invalid parameter in request.".to_string(),
            codes::PERMISSION_DENIED => {
                "Permission denied. Please reconnect with the required permissions.".to_string()
            }
            _ if !message.is_empty() => message.clone(),
            _ => "Error communicating with the Meta API.".to_string(),
        },
        _ => "Error communicating with the Meta API.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes() {
        assert!(user_message(&MetaApiError::api(190, "x")).contains("reconnect"));
        assert!(user_message(&MetaApiError::api(4, "x")).contains("limit"));
        assert!(user_message(&MetaApiError::api(100, "x")).contains("parameter"));
        assert!(user_message(&MetaApiError::api(200, "x")).contains("Permission"));
    }

    #[test]
    fn test_unknown_code_falls_back_to_provider_message() {
        assert_eq!(user_message(&MetaApiError::api(1, "Unknown error")), "Unknown error");
        assert_eq!(
            user_message(&MetaApiError::api(1, "")),
            "Error communicating with the Meta API."
        );
        assert_eq!(
            user_message(&MetaApiError::Transport("reset".into())),
            "Error communicating with the Meta API."
        );
    }
}
