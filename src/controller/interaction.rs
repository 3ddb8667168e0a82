use tracing::info;

use crate::config::LightLevels;
use crate::model::{Aabb, InteractionKind, InteractionRegistry, SceneAnchors, SceneGraph};

/// The three scripted toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InteractionState {
    pub monitor_on: bool,
    pub door_open: bool,
    pub light_on: bool,
}

impl Default for InteractionState {
    fn default() -> Self {
        Self { monitor_on: false, door_open: false, light_on: true }
    }
}

/// Applies the interaction key to every trigger the player stands in.
pub struct InteractionDispatcher {
    pub levels: LightLevels,
}

impl InteractionDispatcher {
    pub fn new(levels: LightLevels) -> Self {
        Self { levels }
    }

    /// Toggle every overlapping trigger in registration order; returns the
    /// kinds that fired. Overlapping triggers all fire, there is no early exit.
    pub fn dispatch(
        &self,
        state: &mut InteractionState,
        triggers: &InteractionRegistry,
        player_box: &Aabb,
        graph: &mut SceneGraph,
        anchors: &SceneAnchors,
    ) -> Vec<InteractionKind> {
        let mut fired = Vec::new();

        for trigger in triggers.overlapping(player_box) {
            match trigger.kind {
                InteractionKind::Monitor => {
                    state.monitor_on = !state.monitor_on;
                    for screen in anchors.screens() {
                        graph.node_mut(screen).visible = state.monitor_on;
                    }
                }
                InteractionKind::Door => {
                    // the frame loop animates towards the new state
                    state.door_open = !state.door_open;
                }
                InteractionKind::Light => {
                    state.light_on = !state.light_on;
                    let intensity = if state.light_on { self.levels.on } else { self.levels.dimmed };
                    for light in anchors.classroom_lights() {
                        if let Some(l) = graph.node_mut(light).light.as_mut() {
                            l.intensity = intensity;
                        }
                    }
                }
            }
            info!(interaction = %trigger.kind, ?state, "interaction toggled");
            fired.push(trigger.kind);
        }

        fired
    }
}

impl Default for InteractionDispatcher {
    fn default() -> Self {
        Self::new(LightLevels::default())
    }
}
