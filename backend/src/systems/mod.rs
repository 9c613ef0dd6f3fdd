//! Simulation subsystems
//!
//! Pure-ish mechanics the engine composes each epoch: the market pool and
//! treasury, influence tiers, the support ledger, whisper leaks, and the
//! shared history digest.

pub mod history;
pub mod influence;
pub mod market;
pub mod support;
pub mod whisper;
