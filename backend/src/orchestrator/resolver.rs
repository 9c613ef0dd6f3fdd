//! Action resolution
//!
//! Turns a parsed action into state changes. Validation runs before any
//! mutation, so a rejected action leaves the world untouched; a resolved
//! action applies its cost and effects atomically within the turn.
//!
//! Frozen mode (`energy_frozen`) suppresses every resource mutation while
//! still recording what the delta would have been, and still forming the
//! relationships (support records, suspicions) the experiment observes.

use crate::actions::{Action, ANNOUNCEMENT_LIFETIME, RESTRICTED_SPEAK_REWARD, TRADE_GROSS_REWARD};
use crate::models::world::Visibility;
use crate::orchestrator::engine::MARKET_LOCATION;
use crate::orchestrator::{EffectRecord, RejectReason, Simulation, TurnOutcome, TurnStatus};
use crate::systems::history::HistoryKind;
use crate::systems::influence::InfluenceTier;

// Resolution lives in its own impl block to keep the engine file to the
// run loop.
impl Simulation {
    /// Validate and apply one action. Never touches state on rejection.
    pub(crate) fn resolve_action(&mut self, agent_id: &str, action: Action) -> TurnOutcome {
        let status = match self.validate(agent_id, &action) {
            Some(reason) => TurnStatus::Rejected(reason),
            None => TurnStatus::Resolved,
        };

        let effects = if status == TurnStatus::Resolved {
            self.apply(agent_id, &action)
        } else {
            Vec::new()
        };

        TurnOutcome {
            epoch: self.epoch,
            agent_id: agent_id.to_string(),
            action,
            status,
            effects,
        }
    }

    /// All preconditions, checked before any mutation
    fn validate(&self, agent_id: &str, action: &Action) -> Option<RejectReason> {
        let agent = self.agents.get(agent_id)?;

        if action.is_privileged() && !(self.config.mode.architect_enabled && agent.is_architect()) {
            return Some(RejectReason::NotPrivileged);
        }

        match action {
            Action::Trade => {
                if agent.location() != MARKET_LOCATION {
                    return Some(RejectReason::NotAtMarket);
                }
            }
            Action::Support { target } | Action::Whisper { target, .. } => {
                if !self.agents.contains(target) {
                    return Some(RejectReason::UnknownTarget {
                        target: target.clone(),
                    });
                }
                // Whispering only happens in intimate rooms
                if matches!(action, Action::Whisper { .. })
                    && self.agent_visibility(agent_id) != Some(Visibility::Restricted)
                {
                    return Some(RejectReason::NotInRestrictedLocation);
                }
            }
            Action::Move { destination } => {
                let dest = match self.world.location(destination) {
                    Some(dest) => dest,
                    None => {
                        return Some(RejectReason::UnknownDestination {
                            destination: destination.clone(),
                        })
                    }
                };
                // Staying put is a no-op, not a capacity violation
                if dest.is_full() && destination != agent.location() {
                    return Some(RejectReason::DestinationFull {
                        destination: destination.clone(),
                    });
                }
            }
            Action::GrantSubsidy { target, amount } => {
                if !self.agents.contains(target) {
                    return Some(RejectReason::UnknownTarget {
                        target: target.clone(),
                    });
                }
                let required = *amount as i64;
                if self.treasury.balance() < required {
                    return Some(RejectReason::InsufficientTreasury {
                        required,
                        available: self.treasury.balance(),
                    });
                }
            }
            Action::Speak { .. }
            | Action::Idle
            | Action::PostAnnouncement { .. }
            | Action::AdjustTax { .. } => {}
        }

        // Affordability last. In frozen mode energy never moves, so cost
        // can never be the reason a turn fails.
        let cost = action.energy_cost();
        if !self.config.mode.energy_frozen && !agent.can_afford(cost) {
            return Some(RejectReason::InsufficientEnergy {
                required: cost,
                available: agent.energy(),
            });
        }

        None
    }

    /// Apply an already-validated action
    fn apply(&mut self, agent_id: &str, action: &Action) -> Vec<EffectRecord> {
        let frozen = self.config.mode.energy_frozen;
        let mut effects = Vec::new();

        let cost = action.energy_cost();
        if cost > 0 {
            if let Some(agent) = self.agents.get_mut(agent_id) {
                agent.spend_energy(cost, frozen);
            }
            effects.push(EffectRecord::new(agent_id, "energy", -cost, frozen));
        }

        match action {
            Action::Speak { content } => {
                // Speaking pays off only where words carry: intimate rooms
                // refund a little energy, the public squares nothing.
                if self.agent_visibility(agent_id) == Some(Visibility::Restricted) {
                    if let Some(agent) = self.agents.get_mut(agent_id) {
                        agent.gain_energy(RESTRICTED_SPEAK_REWARD, frozen);
                    }
                    effects.push(EffectRecord::new(
                        agent_id,
                        "energy",
                        RESTRICTED_SPEAK_REWARD,
                        frozen,
                    ));
                }
                if content.chars().count() > 40 {
                    self.history
                        .record(self.epoch, HistoryKind::Remark, 2, &[agent_id], content);
                }
            }

            Action::Trade => {
                *self
                    .trades_this_epoch
                    .entry(agent_id.to_string())
                    .or_insert(0) += 1;
                // Immediate gross reward, taxed at the current rate; the
                // trade also claims a share of the pool at settlement.
                let net = (TRADE_GROSS_REWARD as f64 * (1.0 - self.world.tax_rate())) as i64;
                let tax = TRADE_GROSS_REWARD - net;
                if let Some(agent) = self.agents.get_mut(agent_id) {
                    agent.gain_energy(net, frozen);
                }
                effects.push(EffectRecord::new(agent_id, "energy", net, frozen));
                self.treasury.collect_tax(tax);
                self.total_tax_collected += tax;
            }

            Action::Support { target } => {
                let giver_tier = self
                    .agents
                    .get(agent_id)
                    .map(|a| InfluenceTier::from_influence(a.influence()))
                    .unwrap_or(InfluenceTier::Commoner);
                // Relationships form even in frozen mode
                let record = self
                    .support
                    .record_support(self.epoch, agent_id, target, giver_tier);
                if let Some(recipient) = self.agents.get_mut(target) {
                    recipient.gain_energy(record.energy_given, frozen);
                    recipient.gain_influence(record.influence_given, frozen);
                    effects.push(EffectRecord::new(
                        target,
                        "energy",
                        record.energy_given,
                        frozen,
                    ));
                    effects.push(EffectRecord::new(
                        target,
                        "influence",
                        record.influence_given,
                        frozen,
                    ));
                }
                // Reciprocated support is a notable bond
                if self.support.supported_by(target).iter().any(|id| id == agent_id) {
                    self.history.record(
                        self.epoch,
                        HistoryKind::MutualSupport,
                        2,
                        &[agent_id, target],
                        "",
                    );
                }
            }

            Action::Whisper { target, .. } => {
                // Location was validated as restricted; with leaks disabled
                // the whisper always delivers quietly.
                if self.config.mode.whisper_leak {
                    let location = self
                        .agents
                        .get(agent_id)
                        .map(|a| a.location().to_string())
                        .unwrap_or_default();
                    let bystanders: Vec<String> = self
                        .world
                        .agents_at(&location)
                        .iter()
                        .filter(|id| *id != agent_id && *id != target)
                        .cloned()
                        .collect();
                    let observer_present = bystanders
                        .iter()
                        .any(|id| self.agents.get(id).is_some_and(|a| a.is_observer()));
                    let outcome = self.whisper.resolve_leak(
                        self.epoch,
                        agent_id,
                        target,
                        &bystanders,
                        observer_present,
                        &mut self.rng,
                    );
                    if outcome.leaked {
                        for (bystander, suspicion) in &outcome.leaks {
                            // Suspicions form even in frozen mode
                            if let Some(agent) = self.agents.get_mut(bystander) {
                                agent.add_suspicion(
                                    suspicion.epoch,
                                    &suspicion.informant,
                                    &suspicion.subject,
                                );
                            }
                        }
                        self.whisper_leaks += 1;
                        self.history.record(
                            self.epoch,
                            HistoryKind::LeakedWhisper,
                            4,
                            &[agent_id, target],
                            "",
                        );
                    }
                }
            }

            Action::Move { destination } => {
                let origin = self
                    .agents
                    .get(agent_id)
                    .map(|a| a.location().to_string())
                    .unwrap_or_default();
                // Moving to where one already stands succeeds as a no-op.
                // Otherwise the destination was validated; a full-by-now
                // failure cannot happen within a sequential turn order.
                if origin != *destination
                    && self.world.move_agent(agent_id, &origin, destination).is_ok()
                {
                    if let Some(agent) = self.agents.get_mut(agent_id) {
                        agent.move_to(destination);
                    }
                    effects.push(EffectRecord::new(agent_id, "location", 0, false));
                }
            }

            Action::Idle => {}

            Action::PostAnnouncement { content } => {
                self.world
                    .post_announcement(content, agent_id, ANNOUNCEMENT_LIFETIME);
                self.history.record(
                    self.epoch,
                    HistoryKind::Announcement,
                    4,
                    &[agent_id],
                    content,
                );
            }

            Action::AdjustTax { rate } => {
                let applied = self.world.set_tax_rate(*rate);
                self.history.record(
                    self.epoch,
                    HistoryKind::TaxChange,
                    4,
                    &[agent_id],
                    &format!("{:.0}%", applied * 100.0),
                );
            }

            Action::GrantSubsidy { target, amount } => {
                // Affordability was validated, so the full amount goes out
                let granted = self.treasury.spend(*amount as i64);
                if granted > 0 {
                    if let Some(recipient) = self.agents.get_mut(target) {
                        recipient.gain_energy(granted, frozen);
                    }
                    effects.push(EffectRecord::new(target, "energy", granted, frozen));
                    self.history.record(
                        self.epoch,
                        HistoryKind::Subsidy,
                        3,
                        &[agent_id, target],
                        &granted.to_string(),
                    );
                }
            }
        }

        effects
    }

    fn agent_visibility(&self, agent_id: &str) -> Option<Visibility> {
        let agent = self.agents.get(agent_id)?;
        self.world.location(agent.location()).map(|l| l.visibility())
    }
}
