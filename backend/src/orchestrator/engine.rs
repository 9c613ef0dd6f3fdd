//! Simulation engine
//!
//! Owns every piece of run state and drives the epoch loop. All
//! nondeterminism flows through one seeded [`RngManager`], so identical
//! configs replay identically; the provider boundary is the only place an
//! external source may differ between runs.
//!
//! # Example
//!
//! ```
//! use agora_simulator_core_rs::{RunConfig, Simulation};
//!
//! let config: RunConfig = serde_json::from_str(r#"{
//!     "simulation": { "name": "demo", "total_epochs": 2, "random_seed": 7 },
//!     "agents": [
//!         { "id": "agent_a" },
//!         { "id": "agent_b", "home": "market" }
//!     ]
//! }"#).unwrap();
//!
//! let mut sim = Simulation::new(config).unwrap();
//! let summary = sim.run().unwrap();
//! assert_eq!(summary.epochs_completed, 2);
//! ```

use std::collections::HashMap;

use uuid::Uuid;

use crate::actions::Action;
use crate::core::stats::gini;
use crate::logging::{ActionRecord, AgentSnapshot, EpochRecord, RunLogger};
use crate::models::agent::{Agent, AgentRegistry};
use crate::models::config::RunConfig;
use crate::models::world::WorldState;
use crate::orchestrator::context::TurnContext;
use crate::orchestrator::{
    ProviderFailure, RunStats, RunSummary, SimulationError, TurnOutcome, TurnStatus,
};
use crate::provider::{Decision, DecisionProvider, ProviderRegistry};
use crate::rng::RngManager;
use crate::systems::history::{HistoryEngine, HistoryKind, DEFAULT_DIGEST_SIZE};
use crate::systems::influence::InfluenceTier;
use crate::systems::market::{MarketPool, Treasury};
use crate::systems::support::SupportLedger;
use crate::systems::whisper::WhisperModel;

/// Location name where trades resolve and the pool settles
pub(crate) const MARKET_LOCATION: &str = "market";

/// One run's complete state
pub struct Simulation {
    pub(crate) config: RunConfig,
    pub(crate) world: WorldState,
    pub(crate) agents: AgentRegistry,
    pub(crate) rng: RngManager,

    pub(crate) market: MarketPool,
    pub(crate) treasury: Treasury,
    pub(crate) whisper: WhisperModel,
    pub(crate) support: SupportLedger,
    pub(crate) history: HistoryEngine,

    providers: HashMap<String, Box<dyn DecisionProvider>>,
    run_id: String,

    pub(crate) epoch: usize,
    pub(crate) trades_this_epoch: HashMap<String, u32>,
    pub(crate) whisper_leaks: u64,
    total_trades: u64,
    pub(crate) total_tax_collected: i64,
    total_turns: u64,
    rejected_turns: u64,
    fallback_turns: u64,

    action_log: Vec<ActionRecord>,
    epoch_log: Vec<EpochRecord>,
    logger: Option<RunLogger>,
}

impl Simulation {
    /// Build a run with the default provider registry
    pub fn new(config: RunConfig) -> Result<Self, SimulationError> {
        Self::with_registry(config, &ProviderRegistry::new())
    }

    /// Build a run, constructing each agent's provider from `registry`
    pub fn with_registry(
        config: RunConfig,
        registry: &ProviderRegistry,
    ) -> Result<Self, SimulationError> {
        config.validate()?;

        let mut world = WorldState::new(&config.locations, config.market.default_tax_rate);
        let mut agents = AgentRegistry::new();
        let mut providers = HashMap::new();

        for spec in &config.agents {
            let agent = Agent::new(
                &spec.id,
                &spec.persona,
                &spec.home,
                config.resources.initial_energy,
                config.resources.max_energy,
            )
            .with_influence(config.resources.initial_influence);
            world.place_agent(&spec.id, &spec.home)?;
            agents.insert(agent);
            providers.insert(spec.id.clone(), registry.build(spec));
        }

        let run_id = config
            .simulation
            .run_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        Ok(Self {
            rng: RngManager::new(config.simulation.seed()),
            market: MarketPool::new(
                config.market.spawn_per_epoch,
                config.market.min_presence_reward,
            ),
            treasury: Treasury::new(
                config.treasury.initial,
                config.treasury.overflow_threshold,
            ),
            whisper: WhisperModel::new(
                config.whisper.base_leak_probability,
                config.whisper.observer_bonus,
            ),
            support: SupportLedger::new(),
            history: HistoryEngine::new(),
            providers,
            run_id,
            epoch: 0,
            trades_this_epoch: HashMap::new(),
            whisper_leaks: 0,
            total_trades: 0,
            total_tax_collected: 0,
            total_turns: 0,
            rejected_turns: 0,
            fallback_turns: 0,
            action_log: Vec::new(),
            epoch_log: Vec::new(),
            logger: None,
            world,
            agents,
            config,
        })
    }

    /// Attach a file sink. Without one, records stay in memory only.
    pub fn attach_logger(&mut self, logger: RunLogger) {
        self.run_id = logger.run_id().to_string();
        self.logger = Some(logger);
    }

    // ========================================================================
    // Run loop
    // ========================================================================

    /// Run every configured epoch and return the summary
    pub fn run(&mut self) -> Result<RunSummary, SimulationError> {
        while self.epoch < self.config.simulation.total_epochs {
            self.run_epoch()?;
        }
        if let Some(logger) = self.logger.as_mut() {
            logger.finalize()?;
        }
        Ok(self.summary())
    }

    /// Run one epoch: shuffled agent turns, then settlement
    pub fn run_epoch(&mut self) -> Result<(), SimulationError> {
        self.trades_this_epoch.clear();

        // STEP 1: shuffle the roster
        let mut order: Vec<String> = self.agents.ids().to_vec();
        self.rng.shuffle(&mut order);

        // STEP 2: one turn per agent, in shuffled order
        for (turn_index, agent_id) in order.iter().enumerate() {
            self.execute_turn(agent_id, turn_index)?;
        }

        // STEP 3: settle the market pool
        let present = self.world.agents_at(MARKET_LOCATION).to_vec();
        let distribution =
            self.market
                .distribute_pool(&self.trades_this_epoch, &present, self.world.tax_rate());

        let frozen = self.config.mode.energy_frozen;
        let mut paid: Vec<(&String, &i64)> = distribution.payouts.iter().collect();
        paid.sort_by(|a, b| a.0.cmp(b.0));
        for (id, amount) in paid {
            if let Some(agent) = self.agents.get_mut(id) {
                agent.gain_energy(*amount, frozen);
            }
        }

        self.treasury.collect_tax(distribution.tax_collected);
        self.total_tax_collected += distribution.tax_collected;
        self.total_trades += u64::from(self.trades_this_epoch.values().sum::<u32>());

        // STEP 4: cap the treasury; the surplus is burned, not redistributed
        let burned = self.treasury.check_overflow();
        if burned > 0 {
            self.history.record(
                self.epoch,
                HistoryKind::TreasuryOverflow,
                3,
                &[],
                &burned.to_string(),
            );
        }

        // STEP 5: board and invariants
        let active_announcement = self.world.announcement().map(|a| a.message.clone());
        self.world.tick_announcement();
        if let Some(location) = self.world.capacity_violation() {
            return Err(SimulationError::InvariantViolation(format!(
                "location {location} holds more agents than its capacity"
            )));
        }

        // STEP 6: epoch record
        let energy = self.agents.energy_values();
        let record = EpochRecord {
            epoch: self.epoch,
            distribution,
            overflow_burned: burned,
            treasury_balance: self.treasury.balance(),
            announcement: active_announcement,
            agent_count: self.agents.len(),
            total_energy: energy.iter().sum(),
            gini_energy: gini(&energy),
            agents: self
                .agents
                .iter()
                .map(|a| AgentSnapshot {
                    id: a.id().to_string(),
                    energy: a.energy(),
                    influence: a.influence(),
                    tier: InfluenceTier::from_influence(a.influence()).as_str().to_string(),
                    location: a.location().to_string(),
                })
                .collect(),
        };
        if let Some(logger) = self.logger.as_mut() {
            logger.log_epoch(&record)?;
        }
        self.epoch_log.push(record);
        self.epoch += 1;

        Ok(())
    }

    /// One agent's turn: context, provider (retry once), resolution, record
    fn execute_turn(&mut self, agent_id: &str, turn_index: usize) -> Result<(), SimulationError> {
        let ctx = self.build_context(agent_id)?;

        let first = self.ask_provider(agent_id, &ctx);
        let retried = first.is_err();
        let attempt = match first {
            Ok(parsed) => Ok(parsed),
            // One retry, whatever the failure class
            Err(_) => self.ask_provider(agent_id, &ctx),
        };

        let (outcome, decision) = match attempt {
            Ok((action, decision)) => (self.resolve_action(agent_id, action), Some(decision)),
            Err(failure) => (
                TurnOutcome {
                    epoch: self.epoch,
                    agent_id: agent_id.to_string(),
                    action: Action::Idle,
                    status: TurnStatus::Fallback { failure },
                    effects: Vec::new(),
                },
                None,
            ),
        };

        self.total_turns += 1;
        match outcome.status {
            TurnStatus::Rejected(_) => self.rejected_turns += 1,
            TurnStatus::Fallback { .. } => self.fallback_turns += 1,
            TurnStatus::Resolved => {}
        }

        let provider_kind = self
            .providers
            .get(agent_id)
            .map(|p| p.kind().to_string())
            .unwrap_or_default();
        let (role, location) = self
            .agents
            .get(agent_id)
            .map(|a| (a.persona().to_string(), a.location().to_string()))
            .unwrap_or_default();
        let record = ActionRecord {
            epoch: self.epoch,
            turn_index,
            agent_id: agent_id.to_string(),
            role,
            location,
            provider: provider_kind,
            action: outcome.action.kind().as_str().to_string(),
            target: decision.as_ref().and_then(|d| d.target.clone()),
            content: decision.as_ref().and_then(|d| d.content.clone()),
            reasoning: decision.map(|d| d.reasoning).unwrap_or_default(),
            retried,
            status: outcome.status.clone(),
            effects: outcome.effects.clone(),
        };
        if let Some(logger) = self.logger.as_mut() {
            logger.log_action(&record)?;
        }
        self.action_log.push(record);
        Ok(())
    }

    /// One provider call plus action parsing, failures classified
    fn ask_provider(
        &mut self,
        agent_id: &str,
        ctx: &TurnContext,
    ) -> Result<(Action, Decision), ProviderFailure> {
        let provider = self
            .providers
            .get_mut(agent_id)
            .ok_or(ProviderFailure::Network)?;
        let decision = provider.decide(ctx).map_err(|e| ProviderFailure::from(&e))?;
        let action =
            Action::from_decision(&decision).map_err(|_| ProviderFailure::Malformed)?;
        Ok((action, decision))
    }

    /// Assemble the context snapshot an agent's provider sees
    pub fn build_context(&self, agent_id: &str) -> Result<TurnContext, SimulationError> {
        let agent = self
            .agents
            .get(agent_id)
            .ok_or_else(|| SimulationError::UnknownAgent(agent_id.to_string()))?;
        let location = self
            .world
            .location(agent.location())
            .ok_or_else(|| SimulationError::InvariantViolation(format!(
                "agent {agent_id} is at unknown location {}",
                agent.location()
            )))?;

        let reachable: Vec<String> = self
            .world
            .location_names()
            .into_iter()
            .filter(|name| name != location.name())
            .collect();

        Ok(TurnContext {
            epoch: self.epoch,
            agent_id: agent.id().to_string(),
            persona: agent.persona().to_string(),
            language: self.config.simulation.language,
            energy: agent.energy(),
            influence: agent.influence(),
            tier: InfluenceTier::from_influence(agent.influence()),
            location: location.name().to_string(),
            visibility: location.visibility(),
            occupants: location.occupants().to_vec(),
            reachable_locations: reachable,
            tax_rate: self.world.tax_rate(),
            treasury_balance: self.treasury.balance(),
            announcement: self.world.announcement().map(|a| a.message.clone()),
            history: self.history.digest(DEFAULT_DIGEST_SIZE),
            suspicions: agent.suspicions().to_vec(),
            supported: self.support.supported_by(agent_id),
        })
    }

    fn summary(&self) -> RunSummary {
        RunSummary {
            name: self.config.simulation.name.clone(),
            run_id: self.run_id.clone(),
            seed: self.config.simulation.seed(),
            epochs_completed: self.epoch,
            stats: RunStats {
                gini_energy: gini(&self.agents.energy_values()),
                total_trades: self.total_trades,
                total_tax_collected: self.total_tax_collected,
                treasury_balance: self.treasury.balance(),
                whisper_leaks: self.whisper_leaks,
                support_count: self.support.len(),
                total_turns: self.total_turns,
                rejected_turns: self.rejected_turns,
                fallback_turns: self.fallback_turns,
            },
            standings: self
                .agents
                .iter()
                .map(|a| (a.id().to_string(), a.resource_snapshot()))
                .collect(),
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn epoch(&self) -> usize {
        self.epoch
    }

    pub fn agent(&self, id: &str) -> Option<&Agent> {
        self.agents.get(id)
    }

    pub fn world(&self) -> &WorldState {
        &self.world
    }

    pub fn treasury(&self) -> &Treasury {
        &self.treasury
    }

    pub fn support_ledger(&self) -> &SupportLedger {
        &self.support
    }

    pub fn history(&self) -> &HistoryEngine {
        &self.history
    }

    pub fn action_log(&self) -> &[ActionRecord] {
        &self.action_log
    }

    pub fn epoch_log(&self) -> &[EpochRecord] {
        &self.epoch_log
    }
}
