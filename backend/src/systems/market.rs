//! Market pool and treasury
//!
//! Each epoch a fixed energy pool spawns at the market. At settlement the
//! agents present who recorded no trades each collect the fixed minimum
//! presence reward; whatever remains of the pool after those payouts is
//! split among the traders in proportion to their trade count (taxed,
//! floor-rounded). Collected tax accumulates in the treasury; past the
//! overflow threshold the surplus is burned out of circulation.
//!
//! # Critical Invariants
//!
//! 1. `distribute_pool` is pure: same inputs, same payouts, no mutation
//! 2. Total trader payout plus collected tax never exceeds the pool
//! 3. Non-traders present at settlement receive exactly
//!    `min_presence_reward`, never a trader share
//! 4. Tax is applied before integer truncation, per trader
//! 5. The trader pool floors at zero when presence payouts exhaust it
//! 6. Only traders in the presence list claim a share; a trader who left
//!    the market forfeits it

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Result of one epoch's pool settlement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolDistribution {
    /// Net energy credited per agent present at the market
    pub payouts: HashMap<String, i64>,
    /// Pool size the split was computed from
    pub total_pool: i64,
    /// Tax withheld across all trader shares
    pub tax_collected: i64,
    /// Trade count per trader this epoch
    pub trades: HashMap<String, u32>,
}

/// Market pool parameters, fixed for the run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketPool {
    spawn_per_epoch: i64,
    min_presence_reward: i64,
}

impl MarketPool {
    pub fn new(spawn_per_epoch: i64, min_presence_reward: i64) -> Self {
        Self {
            spawn_per_epoch,
            min_presence_reward,
        }
    }

    pub fn spawn_per_epoch(&self) -> i64 {
        self.spawn_per_epoch
    }

    /// Split this epoch's pool among the agents present.
    ///
    /// `trades` maps trader id to trade count; `present` is everyone at the
    /// market at settlement. Agents present with zero trades are paid the
    /// minimum presence reward first. The pool that remains (floored at
    /// zero) is split among traders: gross share is
    /// `remaining * own_trades / total_trades`, tax is withheld from the
    /// gross share, and the remainder floor-truncated to whole energy.
    pub fn distribute_pool(
        &self,
        trades: &HashMap<String, u32>,
        present: &[String],
        tax_rate: f64,
    ) -> PoolDistribution {
        let mut payouts: HashMap<String, i64> = HashMap::new();
        let mut tax_collected = 0;

        let traded = |id: &String| trades.get(id).is_some_and(|count| *count > 0);
        let bystanders = present.iter().filter(|id| !traded(id)).count() as i64;
        for agent in present.iter().filter(|id| !traded(id)) {
            payouts.insert(agent.clone(), self.min_presence_reward);
        }

        let trader_pool = (self.spawn_per_epoch - bystanders * self.min_presence_reward).max(0);
        // Only traders still at the market claim a share
        let active: Vec<(&String, u32)> = trades
            .iter()
            .filter(|&(id, count)| *count > 0 && present.contains(id))
            .map(|(id, count)| (id, *count))
            .collect();
        let total_trades: u32 = active.iter().map(|(_, count)| count).sum();
        if total_trades > 0 {
            for (trader, count) in active {
                let gross = trader_pool as f64 * f64::from(count) / f64::from(total_trades);
                let tax = gross * tax_rate;
                let net = (gross - tax) as i64;
                tax_collected += tax as i64;
                payouts.insert(trader.clone(), net);
            }
        }

        PoolDistribution {
            payouts,
            total_pool: self.spawn_per_epoch,
            tax_collected,
            trades: trades.clone(),
        }
    }
}

/// Accumulated tax revenue with an overflow cap
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Treasury {
    balance: i64,
    overflow_threshold: i64,
}

impl Treasury {
    pub fn new(initial: i64, overflow_threshold: i64) -> Self {
        Self {
            balance: initial,
            overflow_threshold,
        }
    }

    pub fn balance(&self) -> i64 {
        self.balance
    }

    pub fn collect_tax(&mut self, amount: i64) {
        self.balance += amount.max(0);
    }

    /// Draw down the balance for a subsidy. Returns the amount actually
    /// spent, capped by the available balance.
    pub fn spend(&mut self, amount: i64) -> i64 {
        let spent = amount.clamp(0, self.balance);
        self.balance -= spent;
        spent
    }

    /// If the balance exceeds the overflow threshold, cap it back to the
    /// threshold and return the amount burned. The surplus leaves the
    /// economy; it is not redistributed.
    pub fn check_overflow(&mut self) -> i64 {
        if self.balance > self.overflow_threshold {
            let burned = self.balance - self.overflow_threshold;
            self.balance = self.overflow_threshold;
            burned
        } else {
            0
        }
    }
}
