//! Weapon state machine: ammo, reload timing, recoil, muzzle flash.
//!
//! Two states, Ready and Reloading, encoded by whether a reload deadline
//! is pending. The deadline is a single slot: starting a reload while one
//! is pending is rejected, so timers never stack. All timing flows
//! through the `now` passed in by the frame loop, which keeps the machine
//! testable without a real clock.

use crate::{GUN_EASE, MAX_AMMO, MUZZLE_FLASH_MS, RECOIL_DECAY, RECOIL_IMPULSE, RELOAD_TIME_MS};
use glam::Vec3;
use std::time::{Duration, Instant};

/// Resting offset of the view model relative to the camera.
pub const GUN_BASE_OFFSET: Vec3 = Vec3::new(0.4, -0.3, -0.8);
/// Slight inward yaw of the view model, radians.
pub const GUN_BASE_YAW: f32 = -0.1;

/// Ammo count, reload deadline, and view-model animation state.
#[derive(Debug, Clone)]
pub struct WeaponState {
    ammo: u32,
    reload_deadline: Option<Instant>,
    muzzle_flash_until: Option<Instant>,
    recoil: f32,
    gun_offset: Vec3,
}

impl Default for WeaponState {
    fn default() -> Self {
        Self {
            ammo: MAX_AMMO,
            reload_deadline: None,
            muzzle_flash_until: None,
            recoil: 0.0,
            gun_offset: GUN_BASE_OFFSET,
        }
    }
}

impl WeaponState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ammo(&self) -> u32 {
        self.ammo
    }

    pub fn reloading(&self) -> bool {
        self.reload_deadline.is_some()
    }

    /// Current view-model offset including recoil push-back.
    pub fn gun_offset(&self) -> Vec3 {
        self.gun_offset
    }

    pub fn muzzle_flash_active(&self, now: Instant) -> bool {
        self.muzzle_flash_until.is_some_and(|until| now < until)
    }

    /// Attempt to fire one round. Rejected while reloading or empty;
    /// rejected shots change nothing.
    pub fn try_fire(&mut self, now: Instant) -> bool {
        if self.reloading() || self.ammo == 0 {
            return false;
        }
        self.ammo -= 1;
        self.recoil += RECOIL_IMPULSE;
        self.muzzle_flash_until = Some(now + Duration::from_millis(MUZZLE_FLASH_MS));
        true
    }

    /// Attempt to start a reload. Rejected at full ammo or while a reload
    /// deadline is already pending.
    pub fn try_reload(&mut self, now: Instant) -> bool {
        if self.reloading() || self.ammo == MAX_AMMO {
            return false;
        }
        self.reload_deadline = Some(now + Duration::from_millis(RELOAD_TIME_MS));
        tracing::debug!(ammo = self.ammo, "reload started");
        true
    }

    /// Advance one frame: complete an elapsed reload and ease the view
    /// model back toward rest.
    pub fn tick(&mut self, now: Instant) {
        if let Some(deadline) = self.reload_deadline
            && now >= deadline
        {
            self.ammo = MAX_AMMO;
            self.reload_deadline = None;
            tracing::debug!("reload complete");
        }
        if let Some(until) = self.muzzle_flash_until
            && now >= until
        {
            self.muzzle_flash_until = None;
        }

        // View-model animation: the recoil impulse pushes the gun back
        // along +Z, decays toward zero, and the offset eases back to rest.
        self.gun_offset.z += self.recoil;
        self.recoil += (0.0 - self.recoil) * RECOIL_DECAY;
        self.gun_offset = self.gun_offset.lerp(GUN_BASE_OFFSET, GUN_EASE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_full_and_ready() {
        let w = WeaponState::new();
        assert_eq!(w.ammo(), MAX_AMMO);
        assert!(!w.reloading());
    }

    #[test]
    fn firing_decrements_until_empty() {
        let mut w = WeaponState::new();
        let now = Instant::now();
        for _ in 0..MAX_AMMO {
            assert!(w.try_fire(now));
        }
        assert_eq!(w.ammo(), 0);
        assert!(!w.try_fire(now));
        assert_eq!(w.ammo(), 0);
    }

    #[test]
    fn fire_rejected_while_reloading() {
        let mut w = WeaponState::new();
        let now = Instant::now();
        assert!(w.try_fire(now));
        assert!(w.try_reload(now));
        assert!(!w.try_fire(now));
        assert_eq!(w.ammo(), MAX_AMMO - 1);
    }

    #[test]
    fn reload_rejected_at_full_ammo() {
        let mut w = WeaponState::new();
        assert!(!w.try_reload(Instant::now()));
    }

    #[test]
    fn reload_deadline_is_single_slot() {
        let mut w = WeaponState::new();
        let now = Instant::now();
        w.try_fire(now);
        assert!(w.try_reload(now));
        assert!(!w.try_reload(now));
        assert!(w.reloading());
    }

    #[test]
    fn reload_completes_at_deadline() {
        let mut w = WeaponState::new();
        let now = Instant::now();
        for _ in 0..7 {
            w.try_fire(now);
        }
        assert_eq!(w.ammo(), 3);
        assert!(w.try_reload(now));

        // One millisecond short: still reloading.
        w.tick(now + Duration::from_millis(RELOAD_TIME_MS - 1));
        assert!(w.reloading());
        assert_eq!(w.ammo(), 3);

        w.tick(now + Duration::from_millis(RELOAD_TIME_MS));
        assert!(!w.reloading());
        assert_eq!(w.ammo(), MAX_AMMO);
    }

    #[test]
    fn ammo_never_leaves_bounds() {
        let mut w = WeaponState::new();
        let mut now = Instant::now();
        // Arbitrary interleaving of fire/reload/tick.
        for i in 0..200u32 {
            match i % 5 {
                0 | 1 | 2 => {
                    w.try_fire(now);
                }
                3 => {
                    w.try_reload(now);
                }
                _ => {
                    now += Duration::from_millis(400);
                    w.tick(now);
                }
            }
            assert!(w.ammo() <= MAX_AMMO);
        }
    }

    #[test]
    fn muzzle_flash_expires() {
        let mut w = WeaponState::new();
        let now = Instant::now();
        w.try_fire(now);
        assert!(w.muzzle_flash_active(now));
        assert!(w.muzzle_flash_active(now + Duration::from_millis(MUZZLE_FLASH_MS - 1)));
        assert!(!w.muzzle_flash_active(now + Duration::from_millis(MUZZLE_FLASH_MS)));
    }

    #[test]
    fn recoil_pushes_gun_back_then_settles() {
        let mut w = WeaponState::new();
        let now = Instant::now();
        w.try_fire(now);
        w.tick(now);
        assert!(w.gun_offset().z > GUN_BASE_OFFSET.z);

        for i in 1..600u64 {
            w.tick(now + Duration::from_millis(i * 16));
        }
        assert!((w.gun_offset() - GUN_BASE_OFFSET).length() < 1e-3);
    }
}
