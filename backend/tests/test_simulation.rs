//! End-to-end simulation tests
//!
//! Full runs over the mock provider: determinism, record shape, provider
//! failure handling, settlement accounting, and the file logger.

use std::collections::HashMap;

use agora_simulator_core_rs::{
    Decision, ProviderError, ProviderFailure, ProviderRegistry, RunConfig, RunLogger,
    ScriptedProvider, Simulation, TurnStatus,
};

// ============================================================================
// Helper Functions
// ============================================================================

fn mock_config(agent_count: usize, epochs: usize, seed: u64) -> RunConfig {
    let agents: Vec<serde_json::Value> = (0..agent_count)
        .map(|i| serde_json::json!({ "id": format!("agent_{i:02}") }))
        .collect();
    serde_json::from_value(serde_json::json!({
        "simulation": { "name": "e2e", "total_epochs": epochs, "random_seed": seed },
        "agents": agents,
    }))
    .unwrap()
}

// ============================================================================
// Determinism
// ============================================================================

#[test]
fn test_same_seed_identical_runs() {
    let summary_a = Simulation::new(mock_config(6, 5, 42)).unwrap().run().unwrap();
    let summary_b = Simulation::new(mock_config(6, 5, 42)).unwrap().run().unwrap();

    assert_eq!(summary_a.stats, summary_b.stats);
    assert_eq!(summary_a.standings, summary_b.standings);
}

#[test]
fn test_same_seed_identical_logs() {
    let mut sim_a = Simulation::new(mock_config(5, 4, 7)).unwrap();
    let mut sim_b = Simulation::new(mock_config(5, 4, 7)).unwrap();
    sim_a.run().unwrap();
    sim_b.run().unwrap();

    assert_eq!(sim_a.action_log(), sim_b.action_log());
    assert_eq!(sim_a.epoch_log(), sim_b.epoch_log());
}

// ============================================================================
// Record Shape
// ============================================================================

#[test]
fn test_exactly_one_record_per_agent_per_epoch() {
    let mut sim = Simulation::new(mock_config(4, 6, 99)).unwrap();
    sim.run().unwrap();

    assert_eq!(sim.action_log().len(), 4 * 6);

    let mut per_epoch: HashMap<(usize, &str), usize> = HashMap::new();
    for record in sim.action_log() {
        *per_epoch
            .entry((record.epoch, record.agent_id.as_str()))
            .or_insert(0) += 1;
    }
    assert!(per_epoch.values().all(|count| *count == 1));
}

#[test]
fn test_epoch_records_carry_settlement_state() {
    let mut sim = Simulation::new(mock_config(4, 3, 123)).unwrap();
    sim.run().unwrap();

    assert_eq!(sim.epoch_log().len(), 3);
    for (i, record) in sim.epoch_log().iter().enumerate() {
        assert_eq!(record.epoch, i);
        assert_eq!(record.agent_count, 4);
        assert_eq!(record.agents.len(), 4);
        assert_eq!(
            record.total_energy,
            record.agents.iter().map(|a| a.energy).sum::<i64>()
        );
        assert!((0.0..=1.0).contains(&record.gini_energy));
        assert!(record.treasury_balance >= 0);
        assert!(record.overflow_burned >= 0);
    }
}

#[test]
fn test_initial_influence_applies_to_roster() {
    let mut config = mock_config(2, 1, 5);
    config.resources.initial_influence = 4;
    let sim = Simulation::new(config).unwrap();
    assert_eq!(sim.agent("agent_00").unwrap().influence(), 4);
    assert_eq!(sim.agent("agent_01").unwrap().influence(), 4);
}

#[test]
fn test_summary_reflects_run() {
    let summary = Simulation::new(mock_config(5, 4, 3)).unwrap().run().unwrap();
    assert_eq!(summary.epochs_completed, 4);
    assert_eq!(summary.standings.len(), 5);
    assert_eq!(summary.seed, 3);
    assert!((0.0..=1.0).contains(&summary.stats.gini_energy));
    // 5 agents over 4 epochs is 20 turns, however each one ended
    assert_eq!(summary.stats.total_turns, 20);
    assert!(summary.stats.rejected_turns + summary.stats.fallback_turns <= 20);
}

// ============================================================================
// Provider Failures
// ============================================================================

fn failing_then(script: Vec<Result<Decision, ProviderError>>) -> ProviderRegistry {
    let mut registry = ProviderRegistry::new();
    let script = std::cell::RefCell::new(Some(script));
    registry.register("flaky", move |_spec| {
        let script = script.borrow_mut().take().unwrap_or_default();
        Box::new(ScriptedProvider::new(script))
    });
    registry
}

fn one_flaky_agent(epochs: usize) -> RunConfig {
    serde_json::from_value(serde_json::json!({
        "simulation": { "name": "flaky", "total_epochs": epochs, "random_seed": 1 },
        "agents": [{ "id": "a", "provider": "flaky" }],
    }))
    .unwrap()
}

#[test]
fn test_single_failure_retried_to_success() {
    let registry = failing_then(vec![
        Err(ProviderError::Timeout),
        Ok(Decision {
            reasoning: String::new(),
            action: "speak".to_string(),
            target: None,
            content: Some("recovered".to_string()),
        }),
    ]);
    let mut sim = Simulation::with_registry(one_flaky_agent(1), &registry).unwrap();
    sim.run_epoch().unwrap();

    assert_eq!(sim.action_log().len(), 1);
    assert_eq!(sim.action_log()[0].status, TurnStatus::Resolved);
    // The record remembers the retry even though the turn resolved
    assert!(sim.action_log()[0].retried);
    // The speak cost was paid, so the second attempt went through
    assert_eq!(sim.agent("a").unwrap().energy(), 98);
}

#[test]
fn test_clean_turns_are_not_marked_retried() {
    let mut sim = Simulation::new(mock_config(3, 2, 42)).unwrap();
    sim.run().unwrap();
    assert!(sim.action_log().iter().all(|r| !r.retried));
}

#[test]
fn test_double_failure_falls_back_to_idle() {
    let registry = failing_then(vec![
        Err(ProviderError::Timeout),
        Err(ProviderError::Timeout),
    ]);
    let mut sim = Simulation::with_registry(one_flaky_agent(1), &registry).unwrap();
    sim.run_epoch().unwrap();

    let record = &sim.action_log()[0];
    assert_eq!(
        record.status,
        TurnStatus::Fallback {
            failure: ProviderFailure::Timeout
        }
    );
    assert_eq!(record.action, "idle");
    assert_eq!(sim.agent("a").unwrap().energy(), 100);
}

#[test]
fn test_malformed_output_classified_distinctly() {
    let registry = failing_then(vec![
        Err(ProviderError::Malformed("not json".to_string())),
        Err(ProviderError::Malformed("still not json".to_string())),
    ]);
    let mut sim = Simulation::with_registry(one_flaky_agent(1), &registry).unwrap();
    sim.run_epoch().unwrap();

    assert_eq!(
        sim.action_log()[0].status,
        TurnStatus::Fallback {
            failure: ProviderFailure::Malformed
        }
    );
}

#[test]
fn test_unparseable_decision_counts_as_malformed() {
    // The provider answers, but with an action outside the vocabulary
    let registry = failing_then(vec![
        Ok(Decision {
            reasoning: String::new(),
            action: "levitate".to_string(),
            target: None,
            content: None,
        }),
        Ok(Decision {
            reasoning: String::new(),
            action: "levitate".to_string(),
            target: None,
            content: None,
        }),
    ]);
    let mut sim = Simulation::with_registry(one_flaky_agent(1), &registry).unwrap();
    sim.run_epoch().unwrap();

    assert_eq!(
        sim.action_log()[0].status,
        TurnStatus::Fallback {
            failure: ProviderFailure::Malformed
        }
    );
}

// ============================================================================
// File Logger
// ============================================================================

#[test]
fn test_run_logger_writes_all_artifacts() {
    let output_root = std::env::temp_dir().join(format!("agora_test_{}", uuid::Uuid::new_v4()));
    let config = mock_config(3, 2, 55);

    let logger = RunLogger::create(&output_root, &config).unwrap();
    let run_dir = logger.run_dir().to_path_buf();

    let mut sim = Simulation::new(config).unwrap();
    sim.attach_logger(logger);
    sim.run().unwrap();

    let actions = std::fs::read_to_string(run_dir.join("simulation_log.jsonl")).unwrap();
    assert_eq!(actions.lines().count(), 3 * 2);

    let epochs = std::fs::read_to_string(run_dir.join("epoch_summary.jsonl")).unwrap();
    assert_eq!(epochs.lines().count(), 2);

    let meta: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(run_dir.join("run_meta.json")).unwrap())
            .unwrap();
    assert_eq!(meta["seed"], 55);
    assert!(meta["end_time"].is_u64(), "end_time not patched in");
    assert!(!meta["config_hash"].as_str().unwrap().is_empty());
    // The roster names every agent with its persona and provider binding
    let roster = meta["roster"].as_array().unwrap();
    assert_eq!(roster.len(), 3);
    assert_eq!(roster[0]["persona"], "citizen");
    assert_eq!(roster[0]["provider"], "mock");

    assert!(run_dir.join("config_snapshot.json").exists());

    std::fs::remove_dir_all(&output_root).ok();
}
