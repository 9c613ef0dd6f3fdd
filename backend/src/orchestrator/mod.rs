//! Simulation orchestrator
//!
//! The epoch loop and everything it needs: turn context assembly, provider
//! dispatch with one retry, action resolution, and end-of-epoch settlement.
//!
//! # Architecture
//!
//! ```text
//! For each epoch e:
//! 1. Shuffle the roster (one RNG draw sequence, seed-reproducible)
//! 2. For each agent, in shuffled order:
//!    a. Assemble TurnContext (world view + personal state + history digest)
//!    b. Ask the provider; retry once on failure; fall back to idle
//!    c. Parse and resolve the action (validation before execution)
//!    d. Emit exactly one action record
//! 3. Settle the market pool (payouts, tax, overflow burn)
//! 4. Tick the announcement board
//! 5. Check world invariants (capacity); violation aborts the run
//! 6. Emit the epoch record
//! ```

mod context;
mod engine;
mod resolver;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::actions::Action;
use crate::models::agent::ResourceSnapshot;
use crate::models::config::ConfigError;
use crate::models::world::MoveError;
use crate::provider::ProviderError;

pub use context::TurnContext;
pub use engine::Simulation;

/// Fatal engine errors. Anything here aborts the run.
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("world invariant violated: {0}")]
    InvariantViolation(String),

    #[error("unknown agent: {0}")]
    UnknownAgent(String),

    #[error("initial placement failed: {0}")]
    Placement(#[from] MoveError),

    #[error("log write failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("log serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Why a turn fell back to idle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderFailure {
    Timeout,
    Malformed,
    Network,
}

impl From<&ProviderError> for ProviderFailure {
    fn from(err: &ProviderError) -> Self {
        match err {
            ProviderError::Timeout => ProviderFailure::Timeout,
            ProviderError::Malformed(_) => ProviderFailure::Malformed,
            ProviderError::Network(_) => ProviderFailure::Network,
        }
    }
}

/// Why a well-formed action was refused
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum RejectReason {
    InsufficientEnergy { required: i64, available: i64 },
    InsufficientTreasury { required: i64, available: i64 },
    UnknownTarget { target: String },
    NotAtMarket,
    NotInRestrictedLocation,
    UnknownDestination { destination: String },
    DestinationFull { destination: String },
    NotPrivileged,
}

/// One applied (or frozen-suppressed) state change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectRecord {
    pub agent: String,
    /// "energy", "influence", or "location"
    pub field: String,
    pub delta: i64,
    /// True when frozen mode suppressed the mutation
    pub would_have_changed: bool,
}

impl EffectRecord {
    pub fn new(agent: &str, field: &str, delta: i64, frozen: bool) -> Self {
        Self {
            agent: agent.to_string(),
            field: field.to_string(),
            delta,
            would_have_changed: frozen,
        }
    }
}

/// Final disposition of one turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TurnStatus {
    Resolved,
    Rejected(RejectReason),
    Fallback { failure: ProviderFailure },
}

/// Everything that happened in one agent's turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnOutcome {
    pub epoch: usize,
    pub agent_id: String,
    pub action: Action,
    pub status: TurnStatus,
    pub effects: Vec<EffectRecord>,
}

/// Run-level aggregates for the summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    pub gini_energy: f64,
    pub total_trades: u64,
    pub total_tax_collected: i64,
    pub treasury_balance: i64,
    pub whisper_leaks: u64,
    pub support_count: usize,
    pub total_turns: u64,
    /// Turns refused by validation
    pub rejected_turns: u64,
    /// Turns that fell back to idle after provider failure
    pub fallback_turns: u64,
}

/// What `Simulation::run` returns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub name: String,
    pub run_id: String,
    pub seed: u64,
    pub epochs_completed: usize,
    pub stats: RunStats,
    /// Final per-agent standing, roster order
    pub standings: Vec<(String, ResourceSnapshot)>,
}
