//! Agent model
//!
//! Represents one member of the simulated society. Each agent has:
//! - Energy (bounded integer, capped; the survival resource)
//! - Influence (non-negative integer, unbounded growth; the social resource)
//! - A current location and a fixed home location
//! - An append-only suspicion log fed by leaked whispers
//!
//! Agents are owned exclusively by the [`AgentRegistry`]; only the turn
//! engine's action handlers and the market settlement step mutate them.
//!
//! # Frozen mode
//!
//! Every energy/influence mutator takes a `frozen` flag. When frozen, the
//! mutator reports success without changing state; callers compute and log
//! the would-have-changed delta instead. This supports the shadow operating
//! mode where behavior is observed without survival pressure.

use serde::{Deserialize, Serialize};

/// Default energy cap when a config does not override it
pub const DEFAULT_MAX_ENERGY: i64 = 200;

/// Persona tag whose presence as a bystander raises whisper leak odds
pub const OBSERVER_ROLE: &str = "observer";

/// Persona tag permitted to use the privileged governance actions
pub const ARCHITECT_ROLE: &str = "architect";

/// One leaked-whisper observation recorded against a bystander.
///
/// `informant` is the whisper's sender, `subject` its intended target;
/// the record lives on the bystander who learned of the exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuspicionRecord {
    pub epoch: usize,
    pub informant: String,
    pub subject: String,
}

/// Point-in-time resource view used in action log records
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSnapshot {
    pub energy: i64,
    pub influence: i64,
    pub location: String,
}

/// One member of the society
///
/// # Example
/// ```
/// use agora_simulator_core_rs::Agent;
///
/// let mut agent = Agent::new("merchant_01", "merchant", "market", 100, 200);
/// assert!(agent.spend_energy(2, false));
/// assert_eq!(agent.energy(), 98);
///
/// // Frozen: reported success, no mutation
/// assert!(agent.spend_energy(2, true));
/// assert_eq!(agent.energy(), 98);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    /// Unique agent identifier (e.g., "merchant_01")
    id: String,

    /// Role/persona tag (e.g., "merchant", "observer", "architect")
    persona: String,

    /// Current energy, always within [0, max_energy]
    energy: i64,

    /// Current influence, non-negative, no upper bound
    influence: i64,

    /// Current location name
    location: String,

    /// Home location, fixed at creation
    home: String,

    /// Energy cap applied on every credit
    max_energy: i64,

    /// Append-only log of leaked whispers this agent learned about
    suspicions: Vec<SuspicionRecord>,
}

impl Agent {
    /// Create a new agent placed at its home location
    pub fn new(id: &str, persona: &str, home: &str, energy: i64, max_energy: i64) -> Self {
        Self {
            id: id.to_string(),
            persona: persona.to_string(),
            energy: energy.min(max_energy).max(0),
            influence: 0,
            location: home.to_string(),
            home: home.to_string(),
            max_energy,
            suspicions: Vec::new(),
        }
    }

    /// Set the starting influence, floored at zero
    pub fn with_influence(mut self, influence: i64) -> Self {
        self.influence = influence.max(0);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn persona(&self) -> &str {
        &self.persona
    }

    pub fn is_observer(&self) -> bool {
        self.persona == OBSERVER_ROLE
    }

    pub fn is_architect(&self) -> bool {
        self.persona == ARCHITECT_ROLE
    }

    pub fn energy(&self) -> i64 {
        self.energy
    }

    pub fn influence(&self) -> i64 {
        self.influence
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn home(&self) -> &str {
        &self.home
    }

    pub fn max_energy(&self) -> i64 {
        self.max_energy
    }

    pub fn suspicions(&self) -> &[SuspicionRecord] {
        &self.suspicions
    }

    /// Check whether the agent could cover `cost` in live mode
    pub fn can_afford(&self, cost: i64) -> bool {
        self.energy >= cost
    }

    /// Debit energy; returns false (and mutates nothing) if insufficient.
    ///
    /// When `frozen`, returns true without mutating.
    pub fn spend_energy(&mut self, cost: i64, frozen: bool) -> bool {
        if frozen {
            return true;
        }
        if self.energy < cost {
            return false;
        }
        self.energy -= cost;
        true
    }

    /// Credit energy, clamped to the cap. No-op when `frozen`.
    pub fn gain_energy(&mut self, amount: i64, frozen: bool) {
        if frozen {
            return;
        }
        self.energy = (self.energy + amount).min(self.max_energy);
    }

    /// Credit influence. No-op when `frozen`.
    pub fn gain_influence(&mut self, amount: i64, frozen: bool) {
        if frozen {
            return;
        }
        self.influence += amount;
    }

    /// Set the agent's current location (occupancy is tracked by WorldState)
    pub fn move_to(&mut self, location: &str) {
        self.location = location.to_string();
    }

    /// Record a leaked whisper this agent observed
    pub fn add_suspicion(&mut self, epoch: usize, informant: &str, subject: &str) {
        self.suspicions.push(SuspicionRecord {
            epoch,
            informant: informant.to_string(),
            subject: subject.to_string(),
        });
    }

    /// Current resources, for log records
    pub fn resource_snapshot(&self) -> ResourceSnapshot {
        ResourceSnapshot {
            energy: self.energy,
            influence: self.influence,
            location: self.location.clone(),
        }
    }
}

/// Insertion-ordered roster of agents with id lookup
///
/// The registry preserves config order so that turn-order shuffles are a
/// deterministic function of the RNG stream alone.
#[derive(Debug, Clone, Default)]
pub struct AgentRegistry {
    agents: std::collections::HashMap<String, Agent>,
    order: Vec<String>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an agent, preserving insertion order. Replacing an existing
    /// id keeps its original roster position.
    pub fn insert(&mut self, agent: Agent) {
        let id = agent.id().to_string();
        if self.agents.insert(id.clone(), agent).is_none() {
            self.order.push(id);
        }
    }

    pub fn get(&self, id: &str) -> Option<&Agent> {
        self.agents.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Agent> {
        self.agents.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.agents.contains_key(id)
    }

    /// Roster ids in insertion order
    pub fn ids(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Iterate agents in roster order
    pub fn iter(&self) -> impl Iterator<Item = &Agent> {
        self.order.iter().filter_map(|id| self.agents.get(id))
    }

    /// Current energy holdings in roster order (for Gini/summary stats)
    pub fn energy_values(&self) -> Vec<i64> {
        self.iter().map(|a| a.energy()).collect()
    }
}
