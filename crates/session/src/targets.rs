//! The target pool: a fixed set of relocatable hit targets.
//!
//! Every target shares one model, described by its local-space part
//! bounding boxes. The pool stays empty until a model is installed
//! (asset load is asynchronous and may fail), and hit-testing an empty
//! pool simply finds nothing. Targets are never destroyed; a hit
//! relocates the target to a fresh random spot.

use crate::rng::SessionRng;
use crate::{IDLE_SPIN_RATE, SPAWN_HALF_EXTENT, TARGET_COUNT, TARGET_HEIGHT};
use gallery_common::{Aabb, TargetId};
use glam::Vec3;

/// One spawned target. Geometry is shared pool-wide; only the placement
/// is per target.
#[derive(Debug, Clone)]
pub struct Target {
    pub id: TargetId,
    pub position: Vec3,
    pub yaw: f32,
}

/// Fixed-size pool of targets plus the shared model geometry.
#[derive(Debug, Default)]
pub struct TargetPool {
    targets: Vec<Target>,
    /// Local-space part boxes of the shared model, pre-scaled.
    parts: Vec<Aabb>,
    /// Overall pre-scaled local bounds (None until a model is installed).
    bounds: Option<Aabb>,
}

impl TargetPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    /// Overall local-space bounds of the scaled model, if installed.
    pub fn model_bounds(&self) -> Option<Aabb> {
        self.bounds
    }

    /// Install the shared model geometry and spawn the pool.
    ///
    /// Part boxes come in model-local units; they are scaled so the model
    /// stands `TARGET_HEIGHT` units tall, and targets are placed so the
    /// model rests on the floor. Installing over an existing pool
    /// replaces it.
    pub fn install_model(&mut self, parts: &[Aabb], rng: &mut SessionRng) {
        let Some(raw_bounds) = parts
            .iter()
            .copied()
            .reduce(|a, b| a.union(&b))
        else {
            tracing::warn!("model has no geometry, pool left empty");
            return;
        };

        let raw_height = raw_bounds.size().y;
        let scale = if raw_height > f32::EPSILON {
            TARGET_HEIGHT / raw_height
        } else {
            1.0
        };

        self.parts = parts
            .iter()
            .map(|p| p.transformed(Vec3::ZERO, scale))
            .collect();
        let bounds = raw_bounds.transformed(Vec3::ZERO, scale);
        self.bounds = Some(bounds);

        // Rest height: chosen so the model's lowest point sits on y = 0.
        let rest_y = -bounds.min.y;

        self.targets = (0..TARGET_COUNT)
            .map(|_| Target {
                id: TargetId::new(),
                position: Vec3::new(
                    rng.range(-SPAWN_HALF_EXTENT, SPAWN_HALF_EXTENT),
                    rest_y,
                    rng.range(-SPAWN_HALF_EXTENT, SPAWN_HALF_EXTENT),
                ),
                yaw: rng.range(0.0, std::f32::consts::TAU),
            })
            .collect();
        tracing::info!(count = self.targets.len(), scale, "target pool spawned");
    }

    /// Move a hit target to a fresh random (x, z), keeping its height.
    /// Unknown ids are ignored.
    pub fn relocate(&mut self, id: TargetId, rng: &mut SessionRng) {
        if let Some(target) = self.targets.iter_mut().find(|t| t.id == id) {
            target.position.x = rng.range(-SPAWN_HALF_EXTENT, SPAWN_HALF_EXTENT);
            target.position.z = rng.range(-SPAWN_HALF_EXTENT, SPAWN_HALF_EXTENT);
            target.yaw = rng.range(0.0, std::f32::consts::TAU);
        }
    }

    /// Test-only mutable access for deterministic layouts.
    #[cfg(test)]
    pub(crate) fn targets_mut(&mut self) -> impl Iterator<Item = &mut Target> {
        self.targets.iter_mut()
    }

    /// Advance the passive idle spin.
    pub fn spin(&mut self, dt: f32) {
        for target in &mut self.targets {
            target.yaw = (target.yaw + IDLE_SPIN_RATE * dt) % std::f32::consts::TAU;
        }
    }

    /// World-space part boxes of one target, each still owned by that
    /// target's id. Used by the hit-scan resolver.
    pub fn world_parts<'a>(&'a self, target: &'a Target) -> impl Iterator<Item = Aabb> + 'a {
        self.parts
            .iter()
            .map(|p| p.rotated_y(target.yaw).transformed(target.position, 1.0))
    }
}
