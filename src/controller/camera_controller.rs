use crate::model::Camera;

/// Pointer-lock style mouse look: turns mouse deltas into yaw and pitch.
pub struct LookController {
    pub mouse_sensitivity: f32,
}

impl LookController {
    pub fn new(mouse_sensitivity: f32) -> Self {
        Self { mouse_sensitivity }
    }

    /// Apply mouse look delta to camera
    pub fn apply_look(&self, camera: &mut Camera, dx: f32, dy: f32) {
        camera.yaw += dx * self.mouse_sensitivity;
        let pi_half = std::f32::consts::PI / 2.0;
        camera.pitch = (camera.pitch - dy * self.mouse_sensitivity).clamp(-pi_half, pi_half);
    }
}

impl Default for LookController {
    fn default() -> Self {
        Self::new(0.002)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pitch_is_clamped_to_straight_up_and_down() {
        let look = LookController::default();
        let mut cam = Camera::new(800, 600);
        look.apply_look(&mut cam, 0.0, -100_000.0);
        assert_eq!(cam.pitch, std::f32::consts::FRAC_PI_2);
        look.apply_look(&mut cam, 0.0, 100_000.0);
        assert_eq!(cam.pitch, -std::f32::consts::FRAC_PI_2);
    }

    #[test]
    fn moving_right_turns_right() {
        let look = LookController::default();
        let mut cam = Camera::new(800, 600);
        let before = cam.yaw;
        look.apply_look(&mut cam, 50.0, 0.0);
        assert!((cam.yaw - before - 0.1).abs() < 1e-6);
    }
}
