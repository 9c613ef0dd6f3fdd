//! Tests for whisper leak probabilities and resolution

use agora_simulator_core_rs::{RngManager, WhisperModel};

// ============================================================================
// Helper Functions
// ============================================================================

fn model() -> WhisperModel {
    WhisperModel::new(0.15, 0.35)
}

fn bystanders(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|s| s.to_string()).collect()
}

// ============================================================================
// Probability
// ============================================================================

#[test]
fn test_base_probability_without_observer() {
    assert!((model().leak_probability(false) - 0.15).abs() < 1e-12);
}

#[test]
fn test_observer_adds_fixed_bonus() {
    let m = model();
    assert!((m.leak_probability(true) - 0.5).abs() < 1e-12);
}

#[test]
fn test_probability_capped_at_certainty() {
    let hot = WhisperModel::new(0.8, 0.8);
    assert_eq!(hot.leak_probability(true), 1.0);
}

// ============================================================================
// Leak Resolution
// ============================================================================

#[test]
fn test_exactly_one_draw_per_whisper() {
    let m = model();
    let crowd = bystanders(&["c", "d", "e", "f"]);

    let mut rolled = RngManager::new(2024);
    m.resolve_leak(0, "a", "b", &crowd, false, &mut rolled);

    let mut reference = RngManager::new(2024);
    reference.next_f64();
    assert_eq!(rolled.get_state(), reference.get_state());
}

#[test]
fn test_empty_room_consumes_the_same_single_draw() {
    // A whisper must shift the RNG stream identically whether or not
    // anyone is around to overhear it
    let m = model();

    let mut alone = RngManager::new(2024);
    let outcome = m.resolve_leak(0, "a", "b", &[], false, &mut alone);
    assert!(outcome.leaks.is_empty());

    let mut crowded = RngManager::new(2024);
    m.resolve_leak(0, "a", "b", &bystanders(&["c", "d"]), false, &mut crowded);

    assert_eq!(alone.get_state(), crowded.get_state());
}

#[test]
fn test_leak_reproducible_under_seed() {
    let m = model();
    let crowd = bystanders(&["c", "d", "e"]);

    let mut rng1 = RngManager::new(5);
    let mut rng2 = RngManager::new(5);
    let first = m.resolve_leak(2, "a", "b", &crowd, true, &mut rng1);
    let second = m.resolve_leak(2, "a", "b", &crowd, true, &mut rng2);
    assert_eq!(first, second);
}

#[test]
fn test_certain_leak_reaches_every_bystander() {
    let m = WhisperModel::new(1.0, 0.0);
    let crowd = bystanders(&["c", "d"]);
    let mut rng = RngManager::new(9);

    let outcome = m.resolve_leak(4, "sender", "subject", &crowd, false, &mut rng);
    assert!(outcome.leaked);
    assert_eq!(outcome.leaks.len(), 2);
    for (bystander, suspicion) in &outcome.leaks {
        assert!(crowd.contains(bystander));
        assert_eq!(suspicion.epoch, 4);
        assert_eq!(suspicion.informant, "sender");
        assert_eq!(suspicion.subject, "subject");
    }
}

#[test]
fn test_impossible_leak_never_fires() {
    let m = WhisperModel::new(0.0, 0.0);
    let crowd = bystanders(&["c", "d", "e"]);
    let mut rng = RngManager::new(9);

    for epoch in 0..20 {
        let outcome = m.resolve_leak(epoch, "a", "b", &crowd, false, &mut rng);
        assert!(!outcome.leaked);
        assert!(outcome.leaks.is_empty());
    }
}

#[test]
fn test_outcome_reports_observer_presence() {
    let m = model();
    let crowd = bystanders(&["c"]);
    let mut rng = RngManager::new(1);

    let outcome = m.resolve_leak(0, "a", "b", &crowd, true, &mut rng);
    assert!(outcome.observer_present);
    assert!((outcome.leak_probability - 0.5).abs() < 1e-12);
}
