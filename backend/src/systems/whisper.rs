//! Whisper leaks
//!
//! Whispers are private messages between two agents in an intimate
//! location. They can still leak: one probability draw decides whether the
//! whisper's occurrence (never its content) becomes known, and the odds
//! rise when an observer-role bystander is in the room. On a leak, every
//! bystander forms a suspicion naming the sender and the target.
//!
//! # Critical Invariants
//!
//! 1. Exactly one RNG draw per whisper, even with no bystanders at all
//! 2. Leak probability is `base + bonus` when any bystander holds the
//!    observer role, `base` otherwise, capped at 1.0
//! 3. Content never leaks; only the {epoch, informant, subject} triple

use serde::{Deserialize, Serialize};

use crate::models::agent::SuspicionRecord;
use crate::rng::RngManager;

/// Outcome of the leak roll for one whisper
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhisperOutcome {
    /// Probability the single draw rolled against
    pub leak_probability: f64,
    /// Whether an observer-role bystander raised the odds
    pub observer_present: bool,
    pub leaked: bool,
    /// Bystanders who learned of the whisper, paired with the suspicion
    /// they formed; empty unless `leaked`
    pub leaks: Vec<(String, SuspicionRecord)>,
}

/// Leak parameters, fixed for the run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhisperModel {
    base_leak_probability: f64,
    observer_bonus: f64,
}

impl WhisperModel {
    pub fn new(base_leak_probability: f64, observer_bonus: f64) -> Self {
        Self {
            base_leak_probability,
            observer_bonus,
        }
    }

    /// Leak probability for this whisper
    pub fn leak_probability(&self, observer_present: bool) -> f64 {
        let p = if observer_present {
            self.base_leak_probability + self.observer_bonus
        } else {
            self.base_leak_probability
        };
        p.min(1.0)
    }

    /// Roll the leak: one draw, consumed unconditionally, so a whisper
    /// shifts the stream identically whether the room is crowded or empty
    /// and runs replay under the same seed. A leak in an empty room still
    /// becomes known, it just leaves nobody suspicious.
    pub fn resolve_leak(
        &self,
        epoch: usize,
        sender: &str,
        target: &str,
        bystanders: &[String],
        observer_present: bool,
        rng: &mut RngManager,
    ) -> WhisperOutcome {
        let probability = self.leak_probability(observer_present);
        let leaked = rng.chance(probability);
        let leaks = if leaked {
            bystanders
                .iter()
                .map(|bystander| {
                    (
                        bystander.clone(),
                        SuspicionRecord {
                            epoch,
                            informant: sender.to_string(),
                            subject: target.to_string(),
                        },
                    )
                })
                .collect()
        } else {
            Vec::new()
        };

        WhisperOutcome {
            leak_probability: probability,
            observer_present,
            leaked,
            leaks,
        }
    }
}
