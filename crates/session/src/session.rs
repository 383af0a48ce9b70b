//! The game session: owner of all gameplay state and the per-frame tick.

use crate::hitscan::{self, FireResult};
use crate::movement::Mover;
use crate::rng::SessionRng;
use crate::targets::TargetPool;
use crate::weapon::WeaponState;
use crate::HIT_SCORE;
use gallery_common::Aabb;
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Read-side projection of session state for the HUD layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HudSnapshot {
    pub score: u32,
    pub ammo: u32,
    pub reloading: bool,
    pub paused: bool,
}

/// One gameplay session. Created when the gameplay screen mounts and
/// dropped when it unmounts; dropping releases everything, and because
/// timers are deadline fields there is nothing left to fire afterwards.
#[derive(Debug)]
pub struct GameSession {
    score: u32,
    paused: bool,
    exit_requested: bool,
    mover: Mover,
    weapon: WeaponState,
    pool: TargetPool,
    rng: SessionRng,
}

impl GameSession {
    /// New paused session with an empty target pool. The pool fills when
    /// the asynchronous model load completes.
    pub fn new(seed: u64) -> Self {
        Self {
            score: 0,
            paused: true,
            exit_requested: false,
            mover: Mover::new(),
            weapon: WeaponState::new(),
            pool: TargetPool::new(),
            rng: SessionRng::new(seed),
        }
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn paused(&self) -> bool {
        self.paused
    }

    pub fn weapon(&self) -> &WeaponState {
        &self.weapon
    }

    pub fn pool(&self) -> &TargetPool {
        &self.pool
    }

    #[cfg(test)]
    pub(crate) fn pool_mut(&mut self) -> &mut TargetPool {
        &mut self.pool
    }

    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }

    /// Snapshot for the HUD layer. Pure read, recomputed on demand.
    pub fn hud(&self) -> HudSnapshot {
        HudSnapshot {
            score: self.score,
            ammo: self.weapon.ammo(),
            reloading: self.weapon.reloading(),
            paused: self.paused,
        }
    }

    /// Install the loaded model's part boxes and spawn the target pool.
    pub fn install_model(&mut self, parts: &[Aabb]) {
        self.pool.install_model(parts, &mut self.rng);
    }

    /// Mirror a pointer-lock change into the pause flag. Redundant calls
    /// (lock granted while already locked) change nothing.
    pub fn set_lock_state(&mut self, locked: bool) {
        let paused = !locked;
        if self.paused != paused {
            self.paused = paused;
            tracing::info!(paused, "pause state changed");
        }
    }

    /// Mark the session for teardown; the shell polls this each frame.
    pub fn request_exit(&mut self) {
        self.exit_requested = true;
    }

    /// Advance one frame.
    ///
    /// Order is fixed: movement first (intent only applies while
    /// unpaused, damping always runs), then weapon easing and the reload
    /// deadline, then passive target spin. Returns the camera-local
    /// (right, forward) displacement for this frame.
    pub fn tick(&mut self, now: Instant, dt: f32, intent: Vec2) -> Vec2 {
        let displacement = if self.paused {
            self.mover.damp_only(dt);
            Vec2::ZERO
        } else {
            self.mover.integrate(intent, dt)
        };

        self.weapon.tick(now);
        self.pool.spin(dt);

        displacement
    }

    /// Fire command: spend a round and hit-scan along the camera ray.
    ///
    /// Rejected without side effects while paused, reloading, or empty.
    /// A hit awards score and relocates the struck target; everything
    /// else in the pool is untouched.
    pub fn fire(&mut self, now: Instant, origin: Vec3, dir: Vec3) -> FireResult {
        if self.paused || !self.weapon.try_fire(now) {
            return FireResult::Rejected;
        }

        match hitscan::resolve(origin, dir, &self.pool) {
            Some(hit) => {
                self.score += HIT_SCORE;
                self.pool.relocate(hit.target, &mut self.rng);
                tracing::debug!(distance = hit.distance, score = self.score, "target hit");
                FireResult::Hit(hit)
            }
            None => FireResult::Miss,
        }
    }

    /// Reload command. Rejected at full ammo or while already reloading.
    pub fn reload(&mut self, now: Instant) -> bool {
        self.weapon.try_reload(now)
    }
}
