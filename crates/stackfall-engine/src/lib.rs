//! Rules engine for a single-player falling-block puzzle game.
//!
//! The crate has no I/O and no clock. A host feeds it ticks and input
//! commands and draws from [`GameSnapshot`]s.

pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

/// Error returned when parsing a [`QueueSeed`] from a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ParseSeedError {
    #[display("invalid seed: expected 32 hex digits, got {_0} characters")]
    InvalidLength(#[error(not(source))] usize),
    #[display("invalid seed: expected 32 hex digits")]
    InvalidDigit,
}
