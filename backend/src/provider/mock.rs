//! Deterministic mock provider
//!
//! Stands in for an external model during tests and dry runs. Each agent's
//! mock carries its own RNG seeded from a hash of the agent id, so the same
//! roster produces the same behavior run after run, independent of the
//! engine's world RNG.

use crate::orchestrator::TurnContext;
use crate::provider::{Decision, DecisionProvider, ProviderError};
use crate::rng::RngManager;

/// FNV-1a, used only to derive a per-agent seed from its id
fn fnv1a(input: &str) -> u64 {
    let mut hash: u64 = 0xcbf29ce484222325;
    for byte in input.bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

/// Weighted random walk over the everyday action set
pub struct MockProvider {
    rng: RngManager,
}

impl MockProvider {
    pub fn for_agent(agent_id: &str) -> Self {
        Self {
            rng: RngManager::new(fnv1a(agent_id)),
        }
    }
}

impl DecisionProvider for MockProvider {
    fn decide(&mut self, ctx: &TurnContext) -> Result<Decision, ProviderError> {
        let roll = self.rng.range(0, 100);
        let others = ctx.others_here();

        // Roughly: a third speak, a quarter trade, then support, whisper,
        // move, and the rest idle. Social actions need company.
        let (action, target, content) = match roll {
            0..=29 => (
                "speak",
                None,
                Some(format!("{} greets the square.", ctx.agent_id)),
            ),
            30..=54 => ("trade", None, None),
            55..=69 if !others.is_empty() => {
                let pick = self.rng.range(0, others.len() as i64) as usize;
                ("support", Some(others[pick].clone()), None)
            }
            70..=79 if !others.is_empty() => {
                let pick = self.rng.range(0, others.len() as i64) as usize;
                (
                    "whisper",
                    Some(others[pick].clone()),
                    Some("have you heard?".to_string()),
                )
            }
            80..=89 if !ctx.reachable_locations.is_empty() => {
                let pick = self.rng.range(0, ctx.reachable_locations.len() as i64) as usize;
                ("move", Some(ctx.reachable_locations[pick].clone()), None)
            }
            _ => ("idle", None, None),
        };

        Ok(Decision {
            reasoning: format!("mock roll {roll}"),
            action: action.to_string(),
            target,
            content,
        })
    }

    fn kind(&self) -> &str {
        "mock"
    }
}
