//! Instant ray-based hit resolution.
//!
//! A shot casts one ray from the camera along its forward axis and tests
//! every part box of every target. Each part box carries its owning
//! target's id, so resolving a hit is a tag lookup, not a scene-graph
//! walk. The nearest intersection wins.

use crate::targets::TargetPool;
use gallery_common::TargetId;
use glam::Vec3;

/// A resolved hit: which target, and how far along the ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitScanHit {
    pub target: TargetId,
    pub distance: f32,
}

/// Outcome of a fire command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FireResult {
    /// The shot was rejected (reloading, empty, or paused); nothing
    /// changed and no ray was cast.
    Rejected,
    /// A round was spent but the ray found no target.
    Miss,
    /// A round was spent and a target was hit.
    Hit(HitScanHit),
}

impl FireResult {
    pub fn is_hit(&self) -> bool {
        matches!(self, FireResult::Hit(_))
    }
}

/// Find the nearest target intersected by the ray, if any.
///
/// An empty pool (model still loading, or load failed) yields no hit.
pub fn resolve(origin: Vec3, dir: Vec3, pool: &TargetPool) -> Option<HitScanHit> {
    let dir = dir.normalize_or_zero();
    if dir == Vec3::ZERO {
        return None;
    }

    let mut nearest: Option<HitScanHit> = None;
    for target in pool.targets() {
        for part in pool.world_parts(target) {
            if let Some(distance) = part.intersect_ray(origin, dir)
                && nearest.is_none_or(|best| distance < best.distance)
            {
                nearest = Some(HitScanHit {
                    target: target.id,
                    distance,
                });
            }
        }
    }
    nearest
}
