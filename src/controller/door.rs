use crate::config::DoorSettings;
use crate::model::{ColliderRegistry, NodeId, SceneGraph};

/// Swings the classroom door between closed (0) and `open_angle`.
pub struct DoorAnimator {
    pub settings: DoorSettings,
}

impl DoorAnimator {
    pub fn new(settings: DoorSettings) -> Self {
        Self { settings }
    }

    /// Next Y rotation: one step towards the target, never past it.
    /// The open angle is negative, so opening decreases the rotation.
    pub fn next_angle(&self, current: f32, open: bool) -> f32 {
        let step = self.settings.step;
        if open {
            (current - step).max(self.settings.open_angle)
        } else {
            (current + step).min(0.0)
        }
    }

    /// Advance the door by one frame. Returns true when the door moved, in
    /// which case the door collider has already been refreshed.
    pub fn update(&self, graph: &mut SceneGraph, door: NodeId, colliders: &mut ColliderRegistry, open: bool) -> bool {
        let current = graph.node(door).rotation.y;
        let moving = if open { current > self.settings.open_angle } else { current < 0.0 };
        if !moving {
            return false;
        }

        graph.node_mut(door).rotation.y = self.next_angle(current, open);
        colliders.refresh_door(graph, door);
        true
    }
}

impl Default for DoorAnimator {
    fn default() -> Self {
        Self::new(DoorSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opening_decreases_monotonically_and_clamps() {
        let door = DoorAnimator::default();
        let mut angle = 0.0;
        let mut frames = 0;
        loop {
            let next = door.next_angle(angle, true);
            if next == angle {
                break;
            }
            assert!(next < angle);
            assert!(next >= -2.36);
            angle = next;
            frames += 1;
        }
        assert_eq!(angle, -2.36);
        // 2.36 / 0.02 = 118 steps, the last one may be a partial step
        assert!((118..=119).contains(&frames));
    }

    #[test]
    fn closing_returns_to_exactly_zero() {
        let door = DoorAnimator::default();
        let mut angle = -2.36;
        for _ in 0..200 {
            let next = door.next_angle(angle, false);
            assert!(next >= angle);
            assert!(next <= 0.0);
            angle = next;
        }
        assert_eq!(angle, 0.0);
    }

    #[test]
    fn reversing_mid_swing() {
        let door = DoorAnimator::default();
        let a = door.next_angle(-1.0, true);
        assert!((a + 1.02).abs() < 1e-6);
        let b = door.next_angle(a, false);
        assert!((b + 1.0).abs() < 1e-6);
    }
}
