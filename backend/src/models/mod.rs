//! Domain models
//!
//! Core domain types for the society simulation:
//! - `agent`: Agent resource state and the roster registry
//! - `world`: Locations, announcement slot, shared policy (tax rate)
//! - `config`: Declarative run configuration

pub mod agent;
pub mod config;
pub mod world;
