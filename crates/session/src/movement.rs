//! Player movement integration.
//!
//! Velocity lives on the horizontal plane only; vertical position is fixed
//! by the camera's eye height. Integration is frame-rate independent to
//! first order: damping and acceleration both scale with the frame delta.

use crate::{MOVE_ACCEL, MOVE_DAMPING};
use glam::Vec2;

/// Damped horizontal velocity, (right, forward) in camera-local axes.
#[derive(Debug, Default, Clone)]
pub struct Mover {
    velocity: Vec2,
}

impl Mover {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Advance one frame with live input. Returns the camera-local
    /// displacement (right, forward) to apply this frame.
    pub fn integrate(&mut self, intent: Vec2, dt: f32) -> Vec2 {
        self.damp(dt);
        if intent != Vec2::ZERO {
            self.velocity += intent.normalize() * MOVE_ACCEL * dt;
        }
        self.velocity * dt
    }

    /// Advance one frame without input (pointer lock not held). Velocity
    /// still bleeds off, but no displacement is produced.
    pub fn damp_only(&mut self, dt: f32) {
        self.damp(dt);
    }

    fn damp(&mut self, dt: f32) {
        self.velocity -= self.velocity * (MOVE_DAMPING * dt).min(1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_intent_moves_forward() {
        let mut m = Mover::new();
        let disp = m.integrate(Vec2::new(0.0, 1.0), 1.0 / 60.0);
        assert!(disp.y > 0.0);
        assert_eq!(disp.x, 0.0);
    }

    #[test]
    fn diagonal_intent_is_normalized() {
        let mut a = Mover::new();
        let mut b = Mover::new();
        let dt = 1.0 / 60.0;
        let straight = a.integrate(Vec2::new(0.0, 1.0), dt);
        let diagonal = b.integrate(Vec2::new(1.0, 1.0), dt);
        assert!((diagonal.length() - straight.length()).abs() < 1e-6);
    }

    #[test]
    fn velocity_decays_without_input() {
        let mut m = Mover::new();
        m.integrate(Vec2::new(0.0, 1.0), 1.0 / 60.0);
        let v0 = m.velocity().length();
        for _ in 0..120 {
            m.damp_only(1.0 / 60.0);
        }
        assert!(m.velocity().length() < v0 * 0.01);
    }

    #[test]
    fn damp_only_produces_no_displacement_input() {
        let mut m = Mover::new();
        m.integrate(Vec2::new(1.0, 0.0), 1.0 / 60.0);
        let before = m.velocity();
        m.damp_only(1.0 / 60.0);
        assert!(m.velocity().length() < before.length());
    }

    #[test]
    fn huge_delta_does_not_reverse_velocity() {
        let mut m = Mover::new();
        m.integrate(Vec2::new(0.0, 1.0), 1.0 / 60.0);
        // A one-second stall must clamp damping rather than overshoot
        // into the opposite direction.
        m.damp_only(1.0);
        assert!(m.velocity().y >= 0.0);
    }
}
