//! Campaign grouping by identity, preserving first-seen order.

use metareport_core::types::CampaignInsight;
use std::collections::HashMap;

/// Insertion-ordered map from campaign id to its insight.
#[derive(Debug, Default)]
pub struct CampaignIndex {
    positions: HashMap<String, usize>,
    entries: Vec<CampaignInsight>,
}

impl CampaignIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// The entry for `campaign_id`, created by `make` on first sight.
    pub fn get_or_insert_with(
        &mut self,
        campaign_id: &str,
        make: impl FnOnce() -> CampaignInsight,
    ) -> &mut CampaignInsight {
        let idx = match self.positions.get(campaign_id) {
            Some(&idx) => idx,
            None => {
                let idx = self.entries.len();
                self.entries.push(make());
                self.positions.insert(campaign_id.to_string(), idx);
                idx
            }
        };
        &mut self.entries[idx]
    }

    /// Keeps `insight` only if its campaign has not been seen yet.
    pub fn insert_if_absent(&mut self, insight: CampaignInsight) -> bool {
        if self.positions.contains_key(&insight.campaign_id) {
            return false;
        }
        self.positions
            .insert(insight.campaign_id.clone(), self.entries.len());
        self.entries.push(insight);
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_vec(self) -> Vec<CampaignInsight> {
        self.entries
    }
}

/// One entry per distinct campaign id, first occurrence wins unchanged.
/// A dedup pass only; summing happens during normalization.
pub fn consolidate_by_campaign(insights: Vec<CampaignInsight>) -> Vec<CampaignInsight> {
    let mut index = CampaignIndex::new();
    for insight in insights {
        index.insert_if_absent(insight);
    }
    index.into_vec()
}
