//! Deterministic random number generation
//!
//! Uses xorshift64* algorithm for fast, deterministic random number generation.
//! CRITICAL: All randomness in the simulator MUST go through this module.
//! That includes the per-epoch turn-order shuffle, whisper leak draws, and
//! the rule-based mock decision provider.

mod xorshift;

pub use xorshift::RngManager;
