//! Run configuration
//!
//! Complete parameters for one simulation run, deserialized from JSON.
//! Every section has serde defaults so a minimal config (a name, a roster)
//! produces the standard world: plaza/market at capacity 12, three
//! restricted alleys at capacity 4, 100 starting energy, 10% tax.
//!
//! # Critical Invariants
//!
//! 1. `validate()` rejects configs the engine cannot run (empty roster,
//!    duplicate agent ids, homes that name unknown locations, rosters that
//!    exceed total capacity)
//! 2. Defaults are applied at deserialization, never inside the engine

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::world::Visibility;

/// Seed used when `random_seed` is absent from the config
pub const DEFAULT_SEED: u64 = 0xA60A;

/// Validation errors for [`RunConfig`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("agent roster is empty")]
    EmptyRoster,

    #[error("duplicate agent id: {0}")]
    DuplicateAgent(String),

    #[error("agent {agent} homes at unknown location {home}")]
    UnknownHome { agent: String, home: String },

    #[error("roster size {agents} exceeds total location capacity {capacity}")]
    RosterOverCapacity { agents: usize, capacity: usize },

    #[error("location {0} has zero capacity")]
    ZeroCapacity(String),

    #[error("total_epochs must be at least 1")]
    ZeroEpochs,
}

/// Language used when rendering turn context for providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Ko,
    En,
}

impl Default for Language {
    fn default() -> Self {
        Language::Ko
    }
}

/// Top-level run identity and duration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationSection {
    pub name: String,
    #[serde(default)]
    pub run_id: Option<String>,
    #[serde(default = "default_total_epochs")]
    pub total_epochs: usize,
    #[serde(default)]
    pub language: Language,
    #[serde(default)]
    pub random_seed: Option<u64>,
}

fn default_total_epochs() -> usize {
    10
}

impl SimulationSection {
    /// The seed the engine actually uses
    pub fn seed(&self) -> u64 {
        self.random_seed.unwrap_or(DEFAULT_SEED)
    }
}

/// Experiment mode switches
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModeFlags {
    /// Shadow mode: energy mutations become no-ops, recorded as
    /// `would_have_changed` in effect records
    #[serde(default)]
    pub energy_frozen: bool,
    /// Whether whispers can probabilistically leak to bystanders
    #[serde(default = "default_true")]
    pub whisper_leak: bool,
    /// Whether privileged actions (announcements, tax, subsidies) resolve
    #[serde(default)]
    pub architect_enabled: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ModeFlags {
    fn default() -> Self {
        Self {
            energy_frozen: false,
            whisper_leak: true,
            architect_enabled: false,
        }
    }
}

/// One location entry in the world table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    pub capacity: usize,
    #[serde(default = "default_visibility")]
    pub visibility: Visibility,
}

fn default_visibility() -> Visibility {
    Visibility::Public
}

/// Per-agent starting resources
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceSection {
    #[serde(default = "default_initial_energy")]
    pub initial_energy: i64,
    #[serde(default = "default_max_energy")]
    pub max_energy: i64,
    #[serde(default)]
    pub initial_influence: i64,
}

fn default_initial_energy() -> i64 {
    100
}

fn default_max_energy() -> i64 {
    200
}

impl Default for ResourceSection {
    fn default() -> Self {
        Self {
            initial_energy: default_initial_energy(),
            max_energy: default_max_energy(),
            initial_influence: 0,
        }
    }
}

/// Market pool parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketSection {
    #[serde(default = "default_spawn_per_epoch")]
    pub spawn_per_epoch: i64,
    #[serde(default = "default_min_presence_reward")]
    pub min_presence_reward: i64,
    #[serde(default = "default_tax_rate")]
    pub default_tax_rate: f64,
}

fn default_spawn_per_epoch() -> i64 {
    25
}

fn default_min_presence_reward() -> i64 {
    2
}

fn default_tax_rate() -> f64 {
    0.1
}

impl Default for MarketSection {
    fn default() -> Self {
        Self {
            spawn_per_epoch: default_spawn_per_epoch(),
            min_presence_reward: default_min_presence_reward(),
            default_tax_rate: default_tax_rate(),
        }
    }
}

/// Treasury parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreasurySection {
    #[serde(default)]
    pub initial: i64,
    #[serde(default = "default_overflow_threshold")]
    pub overflow_threshold: i64,
}

fn default_overflow_threshold() -> i64 {
    100
}

impl Default for TreasurySection {
    fn default() -> Self {
        Self {
            initial: 0,
            overflow_threshold: default_overflow_threshold(),
        }
    }
}

/// Whisper leak parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhisperSection {
    #[serde(default = "default_base_leak")]
    pub base_leak_probability: f64,
    #[serde(default = "default_observer_bonus")]
    pub observer_bonus: f64,
}

fn default_base_leak() -> f64 {
    0.15
}

fn default_observer_bonus() -> f64 {
    0.35
}

impl Default for WhisperSection {
    fn default() -> Self {
        Self {
            base_leak_probability: default_base_leak(),
            observer_bonus: default_observer_bonus(),
        }
    }
}

/// One roster entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSpec {
    pub id: String,
    /// Role/persona tag; "observer" and "architect" carry rule weight
    #[serde(default = "default_persona")]
    pub persona: String,
    #[serde(default = "default_home")]
    pub home: String,
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub model: Option<String>,
}

fn default_persona() -> String {
    "citizen".to_string()
}

fn default_home() -> String {
    "plaza".to_string()
}

fn default_provider() -> String {
    "mock".to_string()
}

/// Complete run configuration
///
/// # Example
///
/// ```
/// use agora_simulator_core_rs::RunConfig;
///
/// let config: RunConfig = serde_json::from_str(r#"{
///     "simulation": { "name": "demo", "total_epochs": 3 },
///     "agents": [
///         { "id": "agent_a" },
///         { "id": "agent_b" }
///     ]
/// }"#).unwrap();
/// config.validate().unwrap();
/// assert_eq!(config.market.spawn_per_epoch, 25);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub simulation: SimulationSection,
    #[serde(default)]
    pub mode: ModeFlags,
    #[serde(default = "default_locations")]
    pub locations: HashMap<String, LocationConfig>,
    #[serde(default)]
    pub resources: ResourceSection,
    #[serde(default)]
    pub market: MarketSection,
    #[serde(default)]
    pub treasury: TreasurySection,
    #[serde(default)]
    pub whisper: WhisperSection,
    pub agents: Vec<AgentSpec>,
}

/// Standard world: two public squares and three alleys
pub fn default_locations() -> HashMap<String, LocationConfig> {
    let mut map = HashMap::new();
    for name in ["plaza", "market"] {
        map.insert(
            name.to_string(),
            LocationConfig {
                capacity: 12,
                visibility: Visibility::Public,
            },
        );
    }
    for name in ["alley_a", "alley_b", "alley_c"] {
        map.insert(
            name.to_string(),
            LocationConfig {
                capacity: 4,
                visibility: Visibility::Restricted,
            },
        );
    }
    map
}

impl RunConfig {
    /// Structural validation before the engine is built
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.simulation.total_epochs == 0 {
            return Err(ConfigError::ZeroEpochs);
        }
        if self.agents.is_empty() {
            return Err(ConfigError::EmptyRoster);
        }

        let mut seen = std::collections::HashSet::new();
        for spec in &self.agents {
            if !seen.insert(spec.id.as_str()) {
                return Err(ConfigError::DuplicateAgent(spec.id.clone()));
            }
            if !self.locations.contains_key(&spec.home) {
                return Err(ConfigError::UnknownHome {
                    agent: spec.id.clone(),
                    home: spec.home.clone(),
                });
            }
        }

        for (name, loc) in &self.locations {
            if loc.capacity == 0 {
                return Err(ConfigError::ZeroCapacity(name.clone()));
            }
        }

        let capacity: usize = self.locations.values().map(|l| l.capacity).sum();
        if self.agents.len() > capacity {
            return Err(ConfigError::RosterOverCapacity {
                agents: self.agents.len(),
                capacity,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal(agents: &[&str]) -> RunConfig {
        serde_json::from_value(serde_json::json!({
            "simulation": { "name": "t" },
            "agents": agents.iter().map(|id| serde_json::json!({ "id": id })).collect::<Vec<_>>(),
        }))
        .unwrap()
    }

    #[test]
    fn test_defaults_applied() {
        let cfg = minimal(&["a", "b"]);
        assert_eq!(cfg.simulation.total_epochs, 10);
        assert_eq!(cfg.simulation.seed(), DEFAULT_SEED);
        assert_eq!(cfg.resources.initial_energy, 100);
        assert_eq!(cfg.whisper.base_leak_probability, 0.15);
        assert!(cfg.mode.whisper_leak);
        assert!(!cfg.mode.architect_enabled);
        assert_eq!(cfg.locations.len(), 5);
        assert_eq!(cfg.locations["alley_b"].capacity, 4);
    }

    #[test]
    fn test_duplicate_agent_rejected() {
        let cfg = minimal(&["a", "a"]);
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::DuplicateAgent("a".to_string()))
        );
    }

    #[test]
    fn test_unknown_home_rejected() {
        let mut cfg = minimal(&["a"]);
        cfg.agents[0].home = "harbor".to_string();
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::UnknownHome { .. })
        ));
    }

    #[test]
    fn test_empty_roster_rejected() {
        let cfg = minimal(&[]);
        assert_eq!(cfg.validate(), Err(ConfigError::EmptyRoster));
    }

    #[test]
    fn test_zero_epochs_rejected() {
        let mut cfg = minimal(&["a"]);
        cfg.simulation.total_epochs = 0;
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroEpochs));
    }
}
