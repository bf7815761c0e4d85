//! MetaReport — campaign performance reports from the Meta Ads Graph API.
//!
//! `generate` pulls insights for one or two periods and writes the stored
//! report as JSON; `export` renders a saved report as CSV or PDF.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use metareport_cache::TtlCache;
use metareport_core::config::AppConfig;
use metareport_core::types::Report;
use metareport_core::ReportError;
use metareport_meta::{user_message, CachedInsightsSource, GraphApiClient, RetryPolicy};
use metareport_reporting::{
    export_report, ExportFormat, GenerateReportRequest, InMemoryReportStore, ReportGenerator,
};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "metareport")]
#[command(about = "Campaign performance reports for Meta ad accounts")]
#[command(version)]
struct Cli {
    /// Graph API access token (overrides config)
    #[arg(long, global = true, env = "METAREPORT__META__ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,

    /// Graph API version (overrides config)
    #[arg(long, global = true, env = "METAREPORT__META__API_VERSION")]
    api_version: Option<String>,

    /// Maximum retries on rate-limited calls (overrides config)
    #[arg(long, global = true, env = "METAREPORT__RETRY__MAX_RETRIES")]
    max_retries: Option<u32>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a report and write it as JSON
    Generate {
        /// Ad account id, with or without the `act_` prefix
        #[arg(long)]
        account: String,
        /// First day, YYYY-MM-DD
        #[arg(long)]
        start: String,
        /// Last day, YYYY-MM-DD
        #[arg(long)]
        end: String,
        /// First day of the comparison period
        #[arg(long, requires = "compare_end")]
        compare_start: Option<String>,
        /// Last day of the comparison period
        #[arg(long, requires = "compare_start")]
        compare_end: Option<String>,
        /// Report owner (random when omitted)
        #[arg(long)]
        owner: Option<Uuid>,
        /// Output file (stdout when omitted)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Render a saved JSON report as CSV or PDF
    Export {
        /// Report JSON produced by `generate`
        #[arg(long)]
        input: PathBuf,
        /// csv or pdf
        #[arg(long, default_value = "csv")]
        format: ExportFormat,
        /// Output file (defaults to report-<id>.<ext>)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// List the ad accounts the token can read
    Accounts,
    /// List the campaigns of an ad account
    Campaigns {
        #[arg(long)]
        account: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "metareport=info".into()),
        )
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });
    if let Some(token) = cli.access_token {
        config.meta.access_token = Some(token);
    }
    if let Some(version) = cli.api_version {
        config.meta.api_version = version;
    }
    if let Some(max_retries) = cli.max_retries {
        config.retry.max_retries = max_retries;
    }

    info!(
        api_version = %config.meta.api_version,
        max_retries = config.retry.max_retries,
        cache_ttl_secs = config.cache.insights_ttl_secs,
        "Configuration loaded"
    );

    match cli.command {
        Command::Generate {
            account,
            start,
            end,
            compare_start,
            compare_end,
            owner,
            out,
        } => {
            let client = graph_client(&config)?;
            let cache = Arc::new(TtlCache::new(config.cache.max_entries));
            let source = CachedInsightsSource::new(
                client,
                cache,
                Duration::from_secs(config.cache.insights_ttl_secs),
            );
            let generator = ReportGenerator::new(Arc::new(source), Arc::new(InMemoryReportStore::new()))
                .with_retry_policy(RetryPolicy::from_config(&config.retry));

            let request = GenerateReportRequest {
                owner_id: owner.unwrap_or_else(Uuid::new_v4),
                meta_account_id: account.clone(),
                account_id: account,
                start_date: start,
                end_date: end,
                compare_start_date: compare_start,
                compare_end_date: compare_end,
            };

            let report = match generator.generate(request).await {
                Ok(report) => report,
                Err(ReportError::Upstream(e)) => {
                    error!(error = %e, code = ?e.code(), "Report generation failed upstream");
                    bail!(user_message(&e));
                }
                Err(e) => return Err(e.into()),
            };

            let json = serde_json::to_vec_pretty(&report)?;
            write_output(out.as_deref(), &json)?;
            info!(report_id = %report.id, "Report written");
        }
        Command::Export { input, format, out } => {
            let raw = std::fs::read(&input).with_context(|| format!("reading {}", input.display()))?;
            let report: Report = serde_json::from_slice(&raw)
                .with_context(|| format!("{} is not a report", input.display()))?;

            let artifact = export_report(&report, format)?;
            let path = out.unwrap_or_else(|| PathBuf::from(&artifact.file_name));
            write_output(Some(&path), &artifact.bytes)?;
            info!(
                report_id = %report.id,
                file = %path.display(),
                content_type = artifact.content_type,
                "Report exported"
            );
        }
        Command::Accounts => {
            let client = graph_client(&config)?;
            let accounts = client.fetch_ad_accounts().await.map_err(|e| anyhow::anyhow!(user_message(&e)))?;
            write_output(None, &serde_json::to_vec_pretty(&accounts)?)?;
        }
        Command::Campaigns { account } => {
            let client = graph_client(&config)?;
            let campaigns = client
                .fetch_campaigns(&account)
                .await
                .map_err(|e| anyhow::anyhow!(user_message(&e)))?;
            write_output(None, &serde_json::to_vec_pretty(&campaigns)?)?;
        }
    }

    Ok(())
}

fn graph_client(config: &AppConfig) -> anyhow::Result<GraphApiClient> {
    let Some(token) = config.meta.access_token.as_deref().filter(|t| !t.is_empty()) else {
        bail!("No access token: pass --access-token or set METAREPORT__META__ACCESS_TOKEN");
    };
    Ok(GraphApiClient::new(&config.meta, token)?)
}

fn write_output(path: Option<&Path>, bytes: &[u8]) -> anyhow::Result<()> {
    match path {
        Some(path) => std::fs::write(path, bytes).with_context(|| format!("writing {}", path.display())),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(bytes)?;
            stdout.write_all(b"\n")?;
            Ok(())
        }
    }
}
