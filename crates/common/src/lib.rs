//! Shared types for the shooting gallery.
//!
//! # Invariants
//! - Ids are unique per target and stable for the life of a session.
//! - Geometry types never depend on renderer or window state.

pub mod types;

pub use types::{Aabb, TargetId};
