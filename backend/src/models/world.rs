//! World state
//!
//! The shared environment all agents act against:
//! - Named locations with hard occupancy capacities
//! - A single time-limited announcement slot (posted by the architect)
//! - The shared policy value: the market tax rate, clamped to [0.0, 0.3]
//!
//! # Critical Invariants
//!
//! 1. A location's occupant count never exceeds its capacity
//! 2. Moves are all-or-nothing: a rejected move leaves both locations intact
//! 3. The tax rate stays within [`MIN_TAX_RATE`], [`MAX_TAX_RATE`] no matter
//!    what value the architect proposes

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::config::LocationConfig;

/// Lower bound of the policy tax rate
pub const MIN_TAX_RATE: f64 = 0.0;
/// Upper bound of the policy tax rate
pub const MAX_TAX_RATE: f64 = 0.3;

/// Visibility class of a location (informational; not an access rule)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Public,
    Restricted,
}

/// Errors from all-or-nothing move attempts
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("unknown location: {0}")]
    UnknownLocation(String),

    #[error("location {0} is at capacity")]
    Full(String),
}

/// A named space with bounded concurrent occupancy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    name: String,
    capacity: usize,
    visibility: Visibility,
    occupants: Vec<String>,
}

impl Location {
    pub fn new(name: &str, capacity: usize, visibility: Visibility) -> Self {
        Self {
            name: name.to_string(),
            capacity,
            visibility,
            occupants: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn occupants(&self) -> &[String] {
        &self.occupants
    }

    pub fn is_full(&self) -> bool {
        self.occupants.len() >= self.capacity
    }
}

/// The active announcement, counted down at end of each epoch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Announcement {
    pub message: String,
    pub poster: String,
    pub remaining_epochs: usize,
}

/// Shared mutable world: locations, announcement slot, tax rate
///
/// # Example
/// ```
/// use agora_simulator_core_rs::{WorldState, Visibility};
///
/// let mut world = WorldState::from_specs(&[
///     ("plaza", 12, Visibility::Public),
///     ("market", 12, Visibility::Public),
/// ]);
/// world.place_agent("a1", "plaza").unwrap();
/// assert_eq!(world.agents_at("plaza"), &["a1".to_string()]);
/// ```
#[derive(Debug, Clone)]
pub struct WorldState {
    locations: HashMap<String, Location>,
    announcement: Option<Announcement>,
    tax_rate: f64,
}

impl WorldState {
    /// Build from config location table
    pub fn new(configs: &HashMap<String, LocationConfig>, default_tax_rate: f64) -> Self {
        let locations = configs
            .iter()
            .map(|(name, cfg)| {
                (
                    name.clone(),
                    Location::new(name, cfg.capacity, cfg.visibility),
                )
            })
            .collect();
        let mut world = Self {
            locations,
            announcement: None,
            tax_rate: MIN_TAX_RATE,
        };
        world.set_tax_rate(default_tax_rate);
        world
    }

    /// Convenience constructor for tests and doc examples
    pub fn from_specs(specs: &[(&str, usize, Visibility)]) -> Self {
        let locations = specs
            .iter()
            .map(|(name, cap, vis)| (name.to_string(), Location::new(name, *cap, *vis)))
            .collect();
        Self {
            locations,
            announcement: None,
            tax_rate: 0.1,
        }
    }

    pub fn location(&self, name: &str) -> Option<&Location> {
        self.locations.get(name)
    }

    pub fn has_location(&self, name: &str) -> bool {
        self.locations.contains_key(name)
    }

    pub fn location_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.locations.keys().cloned().collect();
        names.sort();
        names
    }

    /// Occupant ids at a location (empty for unknown locations)
    pub fn agents_at(&self, name: &str) -> &[String] {
        self.locations
            .get(name)
            .map(|l| l.occupants())
            .unwrap_or(&[])
    }

    /// Place an agent into a location (initial placement)
    pub fn place_agent(&mut self, agent_id: &str, location: &str) -> Result<(), MoveError> {
        let space = self
            .locations
            .get_mut(location)
            .ok_or_else(|| MoveError::UnknownLocation(location.to_string()))?;
        if space.is_full() {
            return Err(MoveError::Full(location.to_string()));
        }
        if !space.occupants.iter().any(|id| id == agent_id) {
            space.occupants.push(agent_id.to_string());
        }
        Ok(())
    }

    /// All-or-nothing move: validated against the destination before the
    /// origin is touched, so a rejection leaves the world unchanged.
    pub fn move_agent(&mut self, agent_id: &str, from: &str, to: &str) -> Result<(), MoveError> {
        {
            let dest = self
                .locations
                .get(to)
                .ok_or_else(|| MoveError::UnknownLocation(to.to_string()))?;
            if dest.is_full() {
                return Err(MoveError::Full(to.to_string()));
            }
        }

        if let Some(origin) = self.locations.get_mut(from) {
            origin.occupants.retain(|id| id != agent_id);
        }
        // Destination existence checked above
        if let Some(dest) = self.locations.get_mut(to) {
            dest.occupants.push(agent_id.to_string());
        }
        Ok(())
    }

    /// Post the announcement, replacing any active one
    pub fn post_announcement(&mut self, message: &str, poster: &str, lifetime_epochs: usize) {
        self.announcement = Some(Announcement {
            message: message.to_string(),
            poster: poster.to_string(),
            remaining_epochs: lifetime_epochs,
        });
    }

    /// Decrement the announcement's remaining lifetime at end of epoch
    pub fn tick_announcement(&mut self) {
        if let Some(ann) = self.announcement.as_mut() {
            if ann.remaining_epochs > 0 {
                ann.remaining_epochs -= 1;
            }
            if ann.remaining_epochs == 0 {
                self.announcement = None;
            }
        }
    }

    pub fn announcement(&self) -> Option<&Announcement> {
        self.announcement.as_ref()
    }

    pub fn tax_rate(&self) -> f64 {
        self.tax_rate
    }

    /// Set the tax rate, clamped to [0.0, 0.3]. Returns the applied value.
    pub fn set_tax_rate(&mut self, rate: f64) -> f64 {
        self.tax_rate = rate.clamp(MIN_TAX_RATE, MAX_TAX_RATE);
        self.tax_rate
    }

    /// Verify the capacity invariant over every location.
    ///
    /// Returns the name of the first violating location, if any. The engine
    /// treats a violation as a bug and aborts the run.
    pub fn capacity_violation(&self) -> Option<String> {
        self.locations
            .values()
            .find(|l| l.occupants.len() > l.capacity)
            .map(|l| l.name.clone())
    }
}
