//! Support ledger
//!
//! Records every support relationship formed during the run. Support is a
//! directed gift: the giver pays the action cost and the recipient gains
//! both energy and influence, amplified if the giver is an elder. The
//! ledger itself only tracks who supported whom and what was granted;
//! applying the gift is the engine's job.
//!
//! # Critical Invariants
//!
//! 1. The ledger is append-only within a run
//! 2. Relationship queries are deterministic: ties between top supporters
//!    break by count descending, then id ascending

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::systems::influence::InfluenceTier;

/// Base energy transferred by one support action, before tier amplification
pub const SUPPORT_BASE_GIFT: i64 = 2;

/// Base influence granted by one support action
pub const SUPPORT_BASE_INFLUENCE: i64 = 1;

/// One support event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportRecord {
    pub epoch: usize,
    pub giver: String,
    pub recipient: String,
    /// Energy the recipient was credited (post-amplification)
    pub energy_given: i64,
    /// Influence the recipient was credited (post-amplification)
    pub influence_given: i64,
}

/// Append-only record of support relationships
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SupportLedger {
    records: Vec<SupportRecord>,
}

impl SupportLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute the gift for a giver of the given tier and append the record.
    /// Returns the record so the engine can apply its effects.
    pub fn record_support(
        &mut self,
        epoch: usize,
        giver: &str,
        recipient: &str,
        giver_tier: InfluenceTier,
    ) -> SupportRecord {
        let energy_given = (SUPPORT_BASE_GIFT as f64 * giver_tier.support_multiplier()) as i64;
        let record = SupportRecord {
            epoch,
            giver: giver.to_string(),
            recipient: recipient.to_string(),
            energy_given,
            influence_given: SUPPORT_BASE_INFLUENCE + giver_tier.support_influence_bonus(),
        };
        self.records.push(record.clone());
        record
    }

    pub fn records(&self) -> &[SupportRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Support count received per agent
    pub fn received_counts(&self) -> HashMap<String, usize> {
        let mut counts = HashMap::new();
        for record in &self.records {
            *counts.entry(record.recipient.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// Who an agent has supported, in first-support order, deduplicated
    pub fn supported_by(&self, giver: &str) -> Vec<String> {
        let mut seen = Vec::new();
        for record in &self.records {
            if record.giver == giver && !seen.contains(&record.recipient) {
                seen.push(record.recipient.clone());
            }
        }
        seen
    }

    /// Agents who supported this agent and were supported back, in the
    /// order the agent first supported them
    pub fn mutual_supporters(&self, agent_id: &str) -> Vec<String> {
        self.supported_by(agent_id)
            .into_iter()
            .filter(|other| self.supported_by(other).iter().any(|id| id == agent_id))
            .collect()
    }

    /// The agent's most frequent supporter, ties broken by count descending
    /// then id ascending.
    pub fn top_supporter(&self, recipient: &str) -> Option<(String, usize)> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for record in &self.records {
            if record.recipient == recipient {
                *counts.entry(record.giver.as_str()).or_insert(0) += 1;
            }
        }
        let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked.first().map(|(id, count)| (id.to_string(), *count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commoner_gift_is_base() {
        let mut ledger = SupportLedger::new();
        let record = ledger.record_support(0, "a", "b", InfluenceTier::Commoner);
        assert_eq!(record.energy_given, SUPPORT_BASE_GIFT);
        assert_eq!(record.influence_given, SUPPORT_BASE_INFLUENCE);
    }

    #[test]
    fn test_elder_gift_amplified() {
        let mut ledger = SupportLedger::new();
        let record = ledger.record_support(3, "elder", "b", InfluenceTier::Elder);
        // 2 * 1.5 = 3
        assert_eq!(record.energy_given, 3);
        assert_eq!(record.influence_given, 2);
    }

    #[test]
    fn test_top_supporter_tie_breaks_by_id() {
        let mut ledger = SupportLedger::new();
        ledger.record_support(0, "zed", "b", InfluenceTier::Commoner);
        ledger.record_support(1, "amy", "b", InfluenceTier::Commoner);
        assert_eq!(ledger.top_supporter("b"), Some(("amy".to_string(), 1)));

        ledger.record_support(2, "zed", "b", InfluenceTier::Commoner);
        assert_eq!(ledger.top_supporter("b"), Some(("zed".to_string(), 2)));
    }

    #[test]
    fn test_mutual_supporters_require_both_directions() {
        let mut ledger = SupportLedger::new();
        ledger.record_support(0, "a", "b", InfluenceTier::Commoner);
        ledger.record_support(1, "a", "c", InfluenceTier::Commoner);
        ledger.record_support(2, "b", "a", InfluenceTier::Commoner);
        assert_eq!(ledger.mutual_supporters("a"), vec!["b"]);
        assert_eq!(ledger.mutual_supporters("b"), vec!["a"]);
        assert!(ledger.mutual_supporters("c").is_empty());
    }

    #[test]
    fn test_supported_by_deduplicates() {
        let mut ledger = SupportLedger::new();
        ledger.record_support(0, "a", "b", InfluenceTier::Commoner);
        ledger.record_support(1, "a", "c", InfluenceTier::Commoner);
        ledger.record_support(2, "a", "b", InfluenceTier::Commoner);
        assert_eq!(ledger.supported_by("a"), vec!["b", "c"]);
    }
}
