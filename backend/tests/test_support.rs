//! Tests for the support ledger

use agora_simulator_core_rs::{InfluenceTier, SupportLedger};

#[test]
fn test_ledger_starts_empty() {
    let ledger = SupportLedger::new();
    assert!(ledger.is_empty());
    assert!(ledger.top_supporter("anyone").is_none());
}

#[test]
fn test_record_carries_gift_and_epoch() {
    let mut ledger = SupportLedger::new();
    let record = ledger.record_support(7, "giver", "taker", InfluenceTier::Commoner);
    assert_eq!(record.epoch, 7);
    assert_eq!(record.giver, "giver");
    assert_eq!(record.recipient, "taker");
    assert_eq!(record.energy_given, 2);
    assert_eq!(record.influence_given, 1);
    assert_eq!(ledger.len(), 1);
}

#[test]
fn test_elder_support_amplified() {
    let mut ledger = SupportLedger::new();
    let record = ledger.record_support(0, "elder", "taker", InfluenceTier::Elder);
    assert_eq!(record.energy_given, 3);
    assert_eq!(record.influence_given, 2);
}

#[test]
fn test_received_counts() {
    let mut ledger = SupportLedger::new();
    ledger.record_support(0, "a", "b", InfluenceTier::Commoner);
    ledger.record_support(1, "c", "b", InfluenceTier::Commoner);
    ledger.record_support(2, "a", "c", InfluenceTier::Commoner);

    let counts = ledger.received_counts();
    assert_eq!(counts["b"], 2);
    assert_eq!(counts["c"], 1);
    assert!(!counts.contains_key("a"));
}

#[test]
fn test_top_supporter_count_then_id() {
    let mut ledger = SupportLedger::new();
    ledger.record_support(0, "zeta", "b", InfluenceTier::Commoner);
    ledger.record_support(1, "alpha", "b", InfluenceTier::Commoner);

    // Tied counts break toward the lexicographically smaller id
    assert_eq!(ledger.top_supporter("b"), Some(("alpha".to_string(), 1)));

    ledger.record_support(2, "zeta", "b", InfluenceTier::Commoner);
    ledger.record_support(3, "zeta", "b", InfluenceTier::Commoner);
    assert_eq!(ledger.top_supporter("b"), Some(("zeta".to_string(), 3)));
}

#[test]
fn test_supported_by_first_contact_order() {
    let mut ledger = SupportLedger::new();
    ledger.record_support(0, "a", "c", InfluenceTier::Commoner);
    ledger.record_support(1, "a", "b", InfluenceTier::Commoner);
    ledger.record_support(2, "a", "c", InfluenceTier::Commoner);
    assert_eq!(ledger.supported_by("a"), vec!["c", "b"]);
    assert!(ledger.supported_by("b").is_empty());
}
