//! Agora Simulator Core - Rust Engine
//!
//! Deterministic simulator for a small closed society of autonomous agents.
//! Agents take turns speaking, trading, whispering, supporting each other,
//! moving between capacity-bounded locations, and (for the privileged
//! architect role) adjusting shared policy. Decisions come from pluggable
//! decision providers; the engine produces structured behavioral logs for
//! research analysis.
//!
//! # Architecture
//!
//! - **core**: Leaf utilities (inequality statistics)
//! - **models**: Domain types (Agent, WorldState, RunConfig)
//! - **actions**: Closed action vocabulary and costs
//! - **systems**: Market, influence tiers, support ledger, whisper leaks, history
//! - **provider**: Decision-provider interface and registry
//! - **orchestrator**: Main epoch loop and action resolver
//! - **design**: Balanced experiment-design generation
//! - **logging**: Structured JSONL record sinks
//! - **rng**: Deterministic random number generation
//!
//! # Critical Invariants
//!
//! 1. All randomness is deterministic (seeded RNG)
//! 2. Location occupancy never exceeds capacity
//! 3. Treasury balance is never negative
//! 4. Exactly one action record per agent per epoch

// Module declarations
pub mod actions;
pub mod core;
pub mod design;
pub mod logging;
pub mod models;
pub mod orchestrator;
pub mod provider;
pub mod rng;
pub mod systems;

// Re-exports for convenience
pub use actions::{Action, ActionKind};
pub use crate::core::stats::gini;
pub use design::{
    cyclic_balance_runs, homogeneous_runs, latin_square_runs, verify_cyclic_balance,
    verify_latin_square, DesignError, ExperimentParams, RunAssignment,
};
pub use models::{
    agent::{Agent, AgentRegistry, ResourceSnapshot, SuspicionRecord},
    config::{AgentSpec, ConfigError, Language, ModeFlags, RunConfig},
    world::{Announcement, Location, MoveError, Visibility, WorldState},
};
pub use orchestrator::{
    EffectRecord, ProviderFailure, RejectReason, RunStats, RunSummary, Simulation,
    SimulationError, TurnContext, TurnOutcome, TurnStatus,
};
pub use logging::{ActionRecord, AgentSnapshot, EpochRecord, RosterEntry, RunLogger, RunMeta};
pub use provider::{
    Decision, DecisionProvider, MockProvider, ProviderError, ProviderRegistry, ScriptedProvider,
};
pub use rng::RngManager;
pub use systems::{
    history::{HistoryEngine, HistoryEvent, HistoryKind},
    influence::{InfluenceTable, InfluenceTier},
    market::{MarketPool, PoolDistribution, Treasury},
    support::{SupportLedger, SupportRecord},
    whisper::{WhisperModel, WhisperOutcome},
};
