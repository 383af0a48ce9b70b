use glam::{Mat4, Vec2, Vec3};

/// First-person camera: fixed eye height, yaw/pitch look, planar movement.
///
/// Mouse look rotates freely, but movement is applied on the horizontal
/// plane only (pointer-lock style), so looking down never slows walking.
pub struct FpsCamera {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub sensitivity: f32,
}

impl Default for FpsCamera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 1.0, 0.0),
            yaw: -90.0_f32.to_radians(),
            pitch: 0.0,
            fov: 75.0_f32.to_radians(),
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
            sensitivity: 0.003,
        }
    }
}

impl FpsCamera {
    /// Full look direction, used for the hit-scan ray.
    pub fn forward(&self) -> Vec3 {
        Vec3::new(
            self.yaw.cos() * self.pitch.cos(),
            self.pitch.sin(),
            self.yaw.sin() * self.pitch.cos(),
        )
        .normalize()
    }

    /// Horizontal walk direction (pitch ignored).
    pub fn forward_planar(&self) -> Vec3 {
        Vec3::new(self.yaw.cos(), 0.0, self.yaw.sin()).normalize()
    }

    pub fn right(&self) -> Vec3 {
        self.forward_planar().cross(Vec3::Y).normalize()
    }

    /// Apply a camera-local (right, forward) displacement from the
    /// movement integrator. Eye height is untouched.
    pub fn apply_displacement(&mut self, displacement: Vec2) {
        self.position += self.right() * displacement.x + self.forward_planar() * displacement.y;
    }

    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.yaw += dx * self.sensitivity;
        self.pitch -= dy * self.sensitivity;
        self.pitch = self
            .pitch
            .clamp(-89.0_f32.to_radians(), 89.0_f32.to_radians());
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.forward(), Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Camera-to-world transform, used to place the view-model gun.
    pub fn world_transform(&self) -> Mat4 {
        self.view_matrix().inverse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_camera_is_valid() {
        let cam = FpsCamera::default();
        assert_eq!(cam.position.y, 1.0);
        let vp = cam.view_projection();
        assert!(!vp.col(0).x.is_nan());
    }

    #[test]
    fn displacement_moves_planar_only() {
        let mut cam = FpsCamera::default();
        cam.pitch = -0.8; // looking well down
        let y_before = cam.position.y;
        cam.apply_displacement(Vec2::new(0.0, 1.0));
        assert_eq!(cam.position.y, y_before);
        assert!((cam.position - Vec3::new(0.0, 1.0, 0.0)).length() > 0.9);
    }

    #[test]
    fn planar_speed_independent_of_pitch() {
        let mut level = FpsCamera::default();
        let mut tilted = FpsCamera::default();
        tilted.pitch = -1.2;
        level.apply_displacement(Vec2::new(0.0, 1.0));
        tilted.apply_displacement(Vec2::new(0.0, 1.0));
        let a = (level.position - Vec3::new(0.0, 1.0, 0.0)).length();
        let b = (tilted.position - Vec3::new(0.0, 1.0, 0.0)).length();
        assert!((a - b).abs() < 1e-5);
    }

    #[test]
    fn pitch_is_clamped() {
        let mut cam = FpsCamera::default();
        cam.rotate(0.0, -100_000.0);
        assert!(cam.pitch <= 89.0_f32.to_radians() + 1e-6);
        cam.rotate(0.0, 100_000.0);
        assert!(cam.pitch >= -89.0_f32.to_radians() - 1e-6);
    }

    #[test]
    fn forward_matches_look_direction() {
        let mut cam = FpsCamera::default();
        cam.yaw = -std::f32::consts::FRAC_PI_2; // looking along -Z
        cam.pitch = 0.0;
        let f = cam.forward();
        assert!((f - Vec3::NEG_Z).length() < 1e-5);
    }
}
