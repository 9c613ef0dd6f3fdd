//! Leaf utilities shared across the engine

pub mod stats;
