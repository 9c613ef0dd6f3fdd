//! Experiment design generation
//!
//! Builds balanced provider-to-seat assignments for multi-run experiments,
//! so model effects separate from seat and location effects:
//!
//! - **Latin square**: n providers, n runs, n slots of two seats each.
//!   Every provider fills exactly two seats per run and two seats per slot
//!   across the whole experiment.
//! - **Cyclic balance**: eight seats split across three locations (3/3/2),
//!   rotated each run so every provider visits every location.
//! - **Homogeneous**: one run per provider with the whole roster on that
//!   provider, as a within-model baseline.
//!
//! # Critical Invariants
//!
//! 1. Generation is a pure function of the parameters, no RNG involved
//! 2. Every design passes its own verifier

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::config::RunConfig;

/// Seats per run in the cyclic-balance design
pub const CYCLIC_SEATS: usize = 8;
/// Location group sizes in the cyclic-balance design
pub const CYCLIC_GROUPS: [usize; 3] = [3, 3, 2];

/// Errors from design generation and verification
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DesignError {
    #[error("provider list is empty")]
    NoProviders,

    #[error("latin square needs as many runs as providers, got {runs} runs for {providers} providers")]
    RunCountMismatch { runs: usize, providers: usize },

    #[error("cyclic balance needs exactly {expected} locations, got {got}")]
    LocationCountMismatch { expected: usize, got: usize },

    #[error("cyclic balance needs {seats} seats divisible by {providers} providers")]
    SeatsNotDivisible { seats: usize, providers: usize },

    #[error("design is unbalanced: {0}")]
    Unbalanced(String),
}

/// Inputs for a multi-run experiment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperimentParams {
    /// Provider tags, e.g. model identifiers
    pub providers: Vec<String>,
    /// Locations seats are grouped into (cyclic-balance designs)
    pub locations: Vec<String>,
}

/// Provider (and optionally location) per seat, for one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunAssignment {
    pub run_index: usize,
    /// Provider tag per seat; seat order matches the roster order
    pub seats: Vec<String>,
    /// Location per seat, when the design places agents
    #[serde(default)]
    pub locations: Option<Vec<String>>,
}

impl RunAssignment {
    /// Stamp this assignment onto a base config: seat i configures agent i.
    ///
    /// The run name gains an index suffix and the seed shifts by the run
    /// index so runs differ while staying reproducible.
    pub fn apply_to(&self, base: &RunConfig) -> RunConfig {
        let mut config = base.clone();
        config.simulation.name = format!("{}_run{:02}", base.simulation.name, self.run_index);
        config.simulation.random_seed =
            Some(base.simulation.seed().wrapping_add(self.run_index as u64));
        for (i, agent) in config.agents.iter_mut().enumerate() {
            if let Some(provider) = self.seats.get(i) {
                agent.provider = provider.clone();
            }
            if let Some(locations) = &self.locations {
                if let Some(home) = locations.get(i) {
                    agent.home = home.clone();
                }
            }
        }
        config
    }
}

/// Latin-square design: run r, slot s is the pair
/// (providers[(r+s) % n], providers[(r+s+1) % n]).
pub fn latin_square_runs(params: &ExperimentParams, runs: usize) -> Result<Vec<RunAssignment>, DesignError> {
    let n = params.providers.len();
    if n == 0 {
        return Err(DesignError::NoProviders);
    }
    if runs != n {
        return Err(DesignError::RunCountMismatch { runs, providers: n });
    }

    let assignments = (0..runs)
        .map(|r| {
            let mut seats = Vec::with_capacity(2 * n);
            for s in 0..n {
                seats.push(params.providers[(r + s) % n].clone());
                seats.push(params.providers[(r + s + 1) % n].clone());
            }
            RunAssignment {
                run_index: r,
                seats,
                locations: None,
            }
        })
        .collect();
    Ok(assignments)
}

/// Cyclic-balance design: eight seats, grouped 3/3/2 into the three given
/// locations, providers rotated one position per run.
pub fn cyclic_balance_runs(
    params: &ExperimentParams,
    runs: usize,
) -> Result<Vec<RunAssignment>, DesignError> {
    let n = params.providers.len();
    if n == 0 {
        return Err(DesignError::NoProviders);
    }
    if params.locations.len() != CYCLIC_GROUPS.len() {
        return Err(DesignError::LocationCountMismatch {
            expected: CYCLIC_GROUPS.len(),
            got: params.locations.len(),
        });
    }
    if CYCLIC_SEATS % n != 0 {
        return Err(DesignError::SeatsNotDivisible {
            seats: CYCLIC_SEATS,
            providers: n,
        });
    }

    let seat_locations: Vec<String> = CYCLIC_GROUPS
        .iter()
        .zip(&params.locations)
        .flat_map(|(size, loc)| std::iter::repeat(loc.clone()).take(*size))
        .collect();

    let assignments = (0..runs)
        .map(|r| RunAssignment {
            run_index: r,
            seats: (0..CYCLIC_SEATS)
                .map(|k| params.providers[(r + k) % n].clone())
                .collect(),
            locations: Some(seat_locations.clone()),
        })
        .collect();
    Ok(assignments)
}

/// Baseline design: one run per provider, every seat on that provider
pub fn homogeneous_runs(
    params: &ExperimentParams,
    seats_per_run: usize,
) -> Result<Vec<RunAssignment>, DesignError> {
    if params.providers.is_empty() {
        return Err(DesignError::NoProviders);
    }
    Ok(params
        .providers
        .iter()
        .enumerate()
        .map(|(r, provider)| RunAssignment {
            run_index: r,
            seats: vec![provider.clone(); seats_per_run],
            locations: None,
        })
        .collect())
}

/// Check Latin-square balance: per run and per slot, every provider fills
/// the same number of seats.
pub fn verify_latin_square(
    assignments: &[RunAssignment],
    providers: &[String],
) -> Result<(), DesignError> {
    let n = providers.len();
    if n == 0 {
        return Err(DesignError::NoProviders);
    }

    for assignment in assignments {
        let counts = seat_counts(&assignment.seats);
        let per_run = assignment.seats.len() / n;
        for provider in providers {
            if counts.get(provider).copied().unwrap_or(0) != per_run {
                return Err(DesignError::Unbalanced(format!(
                    "run {} gives {} an uneven seat count",
                    assignment.run_index, provider
                )));
            }
        }
    }

    // Slot s is the seat pair (2s, 2s+1); across runs each provider must
    // fill it equally often.
    let slots = assignments
        .first()
        .map(|a| a.seats.len() / 2)
        .unwrap_or(0);
    for s in 0..slots {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for assignment in assignments {
            for seat in [2 * s, 2 * s + 1] {
                if let Some(p) = assignment.seats.get(seat) {
                    *counts.entry(p.as_str()).or_insert(0) += 1;
                }
            }
        }
        let expected = assignments.len() * 2 / n;
        for provider in providers {
            if counts.get(provider.as_str()).copied().unwrap_or(0) != expected {
                return Err(DesignError::Unbalanced(format!(
                    "slot {s} gives {provider} an uneven seat count across runs"
                )));
            }
        }
    }
    Ok(())
}

/// Check cyclic balance: equal provider counts per run, and every provider
/// seated in every location at least once across the experiment.
pub fn verify_cyclic_balance(
    assignments: &[RunAssignment],
    providers: &[String],
) -> Result<(), DesignError> {
    let n = providers.len();
    if n == 0 {
        return Err(DesignError::NoProviders);
    }

    let mut coverage: HashSet<(String, String)> = HashSet::new();
    let mut all_locations: HashSet<String> = HashSet::new();

    for assignment in assignments {
        let counts = seat_counts(&assignment.seats);
        let per_run = assignment.seats.len() / n;
        for provider in providers {
            if counts.get(provider).copied().unwrap_or(0) != per_run {
                return Err(DesignError::Unbalanced(format!(
                    "run {} gives {} an uneven seat count",
                    assignment.run_index, provider
                )));
            }
        }
        if let Some(locations) = &assignment.locations {
            for (seat, location) in assignment.seats.iter().zip(locations) {
                coverage.insert((seat.clone(), location.clone()));
                all_locations.insert(location.clone());
            }
        }
    }

    for provider in providers {
        for location in &all_locations {
            if !coverage.contains(&(provider.clone(), location.clone())) {
                return Err(DesignError::Unbalanced(format!(
                    "{provider} never sits in {location}"
                )));
            }
        }
    }
    Ok(())
}

fn seat_counts(seats: &[String]) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for seat in seats {
        *counts.entry(seat.clone()).or_insert(0) += 1;
    }
    counts
}
