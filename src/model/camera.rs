use glam::{Mat4, Vec3};

pub struct Camera {
    pub eye: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub up: Vec3,
    pub fov_y: f32,
    pub aspect: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            eye: Vec3::ZERO,
            yaw: -std::f32::consts::FRAC_PI_2,
            pitch: 0.0,
            up: Vec3::Y,
            fov_y: 75f32.to_radians(),
            aspect: width as f32 / height.max(1) as f32,
            z_near: 0.1,
            z_far: 1000.0,
        }
    }

    pub fn forward(&self) -> Vec3 {
        let cy = self.yaw;
        let cp = self.pitch.clamp(-1.5533, 1.5533); // Slightly less than π/2 to avoid gimbal lock
        Vec3::new(cy.cos() * cp.cos(), cp.sin(), cy.sin() * cp.cos()).normalize()
    }

    /// Horizontal right vector; independent of pitch.
    pub fn right(&self) -> Vec3 {
        Vec3::new(-self.yaw.sin(), 0.0, self.yaw.cos())
    }

    /// Horizontal forward vector (`up × right`); walking never changes height.
    pub fn forward_flat(&self) -> Vec3 {
        self.up.cross(self.right())
    }

    pub fn move_right(&mut self, distance: f32) {
        self.eye += self.right() * distance;
    }

    pub fn move_forward(&mut self, distance: f32) {
        self.eye += self.forward_flat() * distance;
    }

    pub fn target(&self) -> Vec3 { self.eye + self.forward() }

    pub fn set_aspect(&mut self, width: u32, height: u32) { self.aspect = width as f32 / height.max(1) as f32; }

    pub fn view_proj(&self) -> Mat4 {
        let view = Mat4::look_at_rh(self.eye, self.target(), self.up);
        let proj = Mat4::perspective_rh(self.fov_y, self.aspect, self.z_near, self.z_far);
        proj * view
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn default_yaw_faces_negative_z() {
        let cam = Camera::new(800, 600);
        assert!(close(cam.forward(), Vec3::NEG_Z));
        assert!(close(cam.right(), Vec3::X));
        assert!(close(cam.forward_flat(), Vec3::NEG_Z));
    }

    #[test]
    fn walking_ignores_pitch() {
        let mut cam = Camera::new(800, 600);
        cam.eye = Vec3::new(0.0, 9.0, 0.0);
        cam.pitch = 1.0;
        cam.move_forward(2.0);
        cam.move_right(1.0);
        assert!(close(cam.eye, Vec3::new(1.0, 9.0, -2.0)));
    }
}
