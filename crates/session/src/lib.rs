//! Game session core: the real-time gameplay engine behind the shooting
//! gallery screen.
//!
//! One `GameSession` owns all gameplay state: horizontal player velocity,
//! weapon ammo/reload/recoil, and the relocatable target pool. The shell
//! drives it with one `tick` per frame plus fire/reload commands, and
//! reads back a `HudSnapshot`.
//!
//! # Invariants
//! - All state mutations flow through explicit operations.
//! - Timers are deadline fields checked in `tick`, never callbacks, so
//!   dropping the session cancels everything.
//! - Invalid commands (fire while reloading, reload at full ammo) are
//!   rejected by state checks, never errors.

pub mod hitscan;
pub mod movement;
pub mod rng;
pub mod session;
pub mod targets;
pub mod weapon;

pub use hitscan::{FireResult, HitScanHit};
pub use session::{GameSession, HudSnapshot};
pub use targets::{Target, TargetPool};
pub use weapon::WeaponState;

/// Magazine capacity.
pub const MAX_AMMO: u32 = 10;
/// Reload duration in milliseconds.
pub const RELOAD_TIME_MS: u64 = 1500;
/// Muzzle-flash visibility window in milliseconds.
pub const MUZZLE_FLASH_MS: u64 = 60;
/// Exponential velocity damping, per second.
pub const MOVE_DAMPING: f32 = 10.0;
/// Movement acceleration, units per second squared.
pub const MOVE_ACCEL: f32 = 40.0;
/// Rearward push applied to the view model per shot.
pub const RECOIL_IMPULSE: f32 = 0.2;
/// Per-frame lerp factor pulling recoil back to zero.
pub const RECOIL_DECAY: f32 = 0.2;
/// Per-frame lerp factor easing the view model back to its base offset.
pub const GUN_EASE: f32 = 0.1;
/// Number of targets in the pool.
pub const TARGET_COUNT: usize = 10;
/// Targets spawn and relocate with |x|, |z| below this bound.
pub const SPAWN_HALF_EXTENT: f32 = 25.0;
/// Targets are scaled so the model stands this many units tall.
pub const TARGET_HEIGHT: f32 = 1.7;
/// Passive target spin in radians per second (time-scaled, see DESIGN.md).
pub const IDLE_SPIN_RATE: f32 = 0.3;
/// Points awarded per hit.
pub const HIT_SCORE: u32 = 10;
