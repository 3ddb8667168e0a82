use glam::Vec3;
use tracing::trace;

use crate::config::{BodySettings, MovementSettings};
use crate::model::{Aabb, Camera, ColliderRegistry};
use super::input::MovementKeys;

/// What happened to this frame's proposed displacement.
#[derive(Debug, Clone, PartialEq)]
pub enum MoveOutcome {
    /// Pointer not locked; nothing moved and the player box kept its old value.
    Idle,
    Committed,
    /// The whole displacement was undone because the body hit this collider.
    Blocked { collider: String },
}

/// Walks the camera on the horizontal plane and rejects moves that would
/// put the player's body inside a collider.
///
/// A blocked move is cancelled on every axis, there is no sliding along walls.
pub struct MovementController {
    pub speed: f32,
    pub body: BodySettings,
}

impl MovementController {
    pub fn new(movement: MovementSettings, body: BodySettings) -> Self {
        Self { speed: movement.speed, body }
    }

    /// Local displacement: `x` strafes right, `z` walks forward.
    ///
    /// Axes are independent and not normalized, so a diagonal covers
    /// `speed * sqrt(2)` per frame. Back beats forward and right beats left
    /// when both keys of a pair are held.
    pub fn displacement(&self, keys: MovementKeys) -> Vec3 {
        let mut dir = Vec3::ZERO;
        if keys.forward { dir.z = self.speed; }
        if keys.backward { dir.z = -self.speed; }
        if keys.left { dir.x = -self.speed; }
        if keys.right { dir.x = self.speed; }
        dir
    }

    /// Body box for a camera position: eye x/z, fixed center height.
    pub fn player_box(&self, eye: Vec3) -> Aabb {
        let center = Vec3::new(eye.x, self.body.center_height, eye.z);
        Aabb::from_center_and_size(center, self.body.size)
    }

    /// Run one frame of movement. `player_box` is rewritten whenever the
    /// pointer is locked, even if the move is rejected afterwards.
    pub fn step(
        &self,
        camera: &mut Camera,
        colliders: &ColliderRegistry,
        keys: MovementKeys,
        pointer_locked: bool,
        player_box: &mut Aabb,
    ) -> MoveOutcome {
        if !pointer_locked {
            return MoveOutcome::Idle;
        }

        let dir = self.displacement(keys);
        let prev = camera.eye;

        camera.move_right(dir.x);
        camera.move_forward(dir.z);

        *player_box = self.player_box(camera.eye);

        match colliders.first_hit(player_box) {
            Some(hit) => {
                camera.eye = prev;
                trace!(collider = %hit.name, "movement blocked");
                MoveOutcome::Blocked { collider: hit.name.clone() }
            }
            None => MoveOutcome::Committed,
        }
    }
}

impl Default for MovementController {
    fn default() -> Self {
        Self::new(MovementSettings::default(), BodySettings::default())
    }
}
