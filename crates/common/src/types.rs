use glam::Vec3;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a hit target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TargetId(pub Uuid);

impl TargetId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TargetId {
    fn default() -> Self {
        Self::new()
    }
}

/// Axis-aligned bounding box in the owning model's local space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Smallest box enclosing both `self` and `other`.
    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Translate and uniformly scale the box (scale about the origin).
    pub fn transformed(&self, offset: Vec3, scale: f32) -> Aabb {
        Aabb {
            min: self.min * scale + offset,
            max: self.max * scale + offset,
        }
    }

    /// Enclosing box after rotating this box about the +Y axis.
    ///
    /// Rotation is about the local origin. The result is conservative:
    /// it encloses the rotated volume, it is not the rotated volume.
    pub fn rotated_y(&self, yaw: f32) -> Aabb {
        let (sin, cos) = yaw.sin_cos();
        let corners = [
            (self.min.x, self.min.z),
            (self.min.x, self.max.z),
            (self.max.x, self.min.z),
            (self.max.x, self.max.z),
        ];
        let mut min_x = f32::INFINITY;
        let mut max_x = f32::NEG_INFINITY;
        let mut min_z = f32::INFINITY;
        let mut max_z = f32::NEG_INFINITY;
        for (x, z) in corners {
            let rx = x * cos + z * sin;
            let rz = -x * sin + z * cos;
            min_x = min_x.min(rx);
            max_x = max_x.max(rx);
            min_z = min_z.min(rz);
            max_z = max_z.max(rz);
        }
        Aabb {
            min: Vec3::new(min_x, self.min.y, min_z),
            max: Vec3::new(max_x, self.max.y, max_z),
        }
    }

    /// Slab-method ray intersection.
    ///
    /// Returns the distance along `dir` to the entry point, or `None` if
    /// the ray misses or the box lies entirely behind the origin. `dir`
    /// must be normalized for the returned distance to be metric.
    pub fn intersect_ray(&self, origin: Vec3, dir: Vec3) -> Option<f32> {
        let inv = dir.recip();
        let t0 = (self.min - origin) * inv;
        let t1 = (self.max - origin) * inv;
        let t_near = t0.min(t1);
        let t_far = t0.max(t1);
        let t_enter = t_near.max_element();
        let t_exit = t_far.min_element();
        if t_enter <= t_exit && t_exit >= 0.0 {
            // Origin inside the box counts as a hit at distance zero.
            Some(t_enter.max(0.0))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_id_uniqueness() {
        let a = TargetId::new();
        let b = TargetId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn aabb_union_encloses_both() {
        let a = Aabb::new(Vec3::new(-1.0, 0.0, -1.0), Vec3::new(1.0, 2.0, 1.0));
        let b = Aabb::new(Vec3::new(0.0, -3.0, 0.0), Vec3::new(4.0, 1.0, 1.0));
        let u = a.union(&b);
        assert_eq!(u.min, Vec3::new(-1.0, -3.0, -1.0));
        assert_eq!(u.max, Vec3::new(4.0, 2.0, 1.0));
    }

    #[test]
    fn ray_hits_box_straight_on() {
        let b = Aabb::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::ONE);
        let d = b
            .intersect_ray(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0))
            .expect("should hit");
        assert!((d - 4.0).abs() < 1e-5);
    }

    #[test]
    fn ray_misses_box_aimed_away() {
        let b = Aabb::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::ONE);
        assert!(
            b.intersect_ray(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, 1.0))
                .is_none()
        );
    }

    #[test]
    fn ray_behind_box_misses() {
        let b = Aabb::new(Vec3::new(10.0, -1.0, -1.0), Vec3::new(12.0, 1.0, 1.0));
        assert!(
            b.intersect_ray(Vec3::ZERO, Vec3::new(-1.0, 0.0, 0.0))
                .is_none()
        );
    }

    #[test]
    fn ray_origin_inside_box_hits_at_zero() {
        let b = Aabb::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::ONE);
        let d = b
            .intersect_ray(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0))
            .expect("inside should hit");
        assert_eq!(d, 0.0);
    }

    #[test]
    fn quarter_turn_swaps_horizontal_extents() {
        let b = Aabb::new(Vec3::new(-1.0, 0.0, -2.0), Vec3::new(1.0, 3.0, 2.0));
        let r = b.rotated_y(std::f32::consts::FRAC_PI_2);
        assert!((r.size().x - 4.0).abs() < 1e-4);
        assert!((r.size().z - 2.0).abs() < 1e-4);
        assert_eq!(r.min.y, 0.0);
        assert_eq!(r.max.y, 3.0);
    }

    #[test]
    fn rotation_never_shrinks_the_box() {
        let b = Aabb::new(Vec3::new(-1.0, 0.0, -1.0), Vec3::new(1.0, 1.0, 1.0));
        let r = b.rotated_y(0.7);
        assert!(r.size().x >= b.size().x - 1e-5);
        assert!(r.size().z >= b.size().z - 1e-5);
    }

    #[test]
    fn transformed_box_moves_and_scales() {
        let b = Aabb::new(Vec3::new(-1.0, 0.0, -1.0), Vec3::new(1.0, 2.0, 1.0));
        let t = b.transformed(Vec3::new(5.0, 0.0, 0.0), 2.0);
        assert_eq!(t.min, Vec3::new(3.0, 0.0, -2.0));
        assert_eq!(t.max, Vec3::new(7.0, 4.0, 2.0));
    }
}
