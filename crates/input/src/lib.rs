//! Input tracking: movement intent and high-level game commands.
//!
//! # Invariants
//! - The session consumes intent and commands, never raw window events.
//! - Each movement axis is owned by the key that last set it, so opposite
//!   keys can never leave an axis stuck.

pub mod tracker;

pub use tracker::{Command, InputTracker, MoveKey};
