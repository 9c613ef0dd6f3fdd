//! Tests for agent state and the roster registry

use agora_simulator_core_rs::{Agent, AgentRegistry};

// ============================================================================
// Helper Functions
// ============================================================================

fn agent(id: &str) -> Agent {
    Agent::new(id, "a townsperson", "plaza", 100, 200)
}

// ============================================================================
// Agent State
// ============================================================================

#[test]
fn test_new_agent_clamps_energy_into_bounds() {
    let over = Agent::new("a", "", "plaza", 500, 200);
    assert_eq!(over.energy(), 200);

    let under = Agent::new("b", "", "plaza", -5, 200);
    assert_eq!(under.energy(), 0);
}

#[test]
fn test_spend_energy_live() {
    let mut a = agent("a");
    assert!(a.spend_energy(30, false));
    assert_eq!(a.energy(), 70);
}

#[test]
fn test_spend_energy_insufficient_leaves_state() {
    let mut a = agent("a");
    assert!(!a.spend_energy(150, false));
    assert_eq!(a.energy(), 100);
}

#[test]
fn test_spend_energy_frozen_is_noop() {
    let mut a = agent("a");
    assert!(a.spend_energy(150, true));
    assert_eq!(a.energy(), 100);
}

#[test]
fn test_gain_energy_clamped_at_max() {
    let mut a = agent("a");
    a.gain_energy(500, false);
    assert_eq!(a.energy(), 200);
}

#[test]
fn test_gain_energy_frozen_is_noop() {
    let mut a = agent("a");
    a.gain_energy(50, true);
    assert_eq!(a.energy(), 100);
}

#[test]
fn test_influence_frozen_is_noop() {
    let mut a = agent("a");
    a.gain_influence(3, false);
    a.gain_influence(3, true);
    assert_eq!(a.influence(), 3);
}

#[test]
fn test_suspicions_accumulate() {
    let mut a = agent("a");
    a.add_suspicion(2, "b", "c");
    a.add_suspicion(3, "d", "e");
    assert_eq!(a.suspicions().len(), 2);
    assert_eq!(a.suspicions()[0].informant, "b");
    assert_eq!(a.suspicions()[1].epoch, 3);
}

// ============================================================================
// Registry
// ============================================================================

#[test]
fn test_registry_preserves_roster_order() {
    let mut registry = AgentRegistry::new();
    for id in ["zed", "amy", "bob"] {
        registry.insert(agent(id));
    }
    assert_eq!(registry.ids(), &["zed", "amy", "bob"]);

    let iterated: Vec<&str> = registry.iter().map(|a| a.id()).collect();
    assert_eq!(iterated, vec!["zed", "amy", "bob"]);
}

#[test]
fn test_registry_lookup_and_mutation() {
    let mut registry = AgentRegistry::new();
    registry.insert(agent("a"));

    registry.get_mut("a").unwrap().gain_influence(5, false);
    assert_eq!(registry.get("a").unwrap().influence(), 5);
    assert!(registry.get("missing").is_none());
}

#[test]
fn test_registry_energy_values_in_roster_order() {
    let mut registry = AgentRegistry::new();
    let mut first = agent("first");
    first.spend_energy(40, false);
    registry.insert(first);
    registry.insert(agent("second"));

    assert_eq!(registry.energy_values(), vec![60, 100]);
}
