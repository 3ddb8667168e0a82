use tracing::{debug, info};

use crate::config::WalkthroughConfig;
use crate::model::{
    Aabb, Camera, ColliderRegistry, InteractionKind, InteractionRegistry, SceneAnchors, SceneGraph,
};
use super::{
    DoorAnimator, InputProcessor, InputState, InteractionDispatcher, InteractionState, LookController,
    MoveOutcome, MovementController,
};

/// Everything one call to [`Walkthrough::update`] did.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    pub door_moved: bool,
    pub movement: MoveOutcome,
    pub fired: Vec<InteractionKind>,
    pub hint_visible: bool,
}

/// Scene, registries, player and toggles, advanced one frame at a time.
///
/// Until [`Walkthrough::install_scene`] runs the graph and both registries
/// are empty: the player walks freely and the interaction key does nothing.
pub struct Walkthrough {
    pub config: WalkthroughConfig,
    pub camera: Camera,
    pub graph: SceneGraph,
    pub anchors: SceneAnchors,
    pub colliders: ColliderRegistry,
    pub triggers: InteractionRegistry,
    pub state: InteractionState,
    pub player_box: Aabb,
    pub hint_visible: bool,
    pub scene_loaded: bool,
    pub input_processor: InputProcessor,
    look: LookController,
    movement: MovementController,
    dispatcher: InteractionDispatcher,
    door: DoorAnimator,
}

impl Walkthrough {
    pub fn new(config: WalkthroughConfig, width: u32, height: u32) -> Self {
        let mut camera = Camera::new(width, height);
        camera.eye = config.spawn.eye;
        camera.yaw = config.spawn.yaw;
        camera.fov_y = config.spawn.fov_y_degrees.to_radians();

        Self {
            camera,
            graph: SceneGraph::new(),
            anchors: SceneAnchors::default(),
            colliders: ColliderRegistry::new(),
            triggers: InteractionRegistry::new(),
            state: InteractionState::default(),
            player_box: Aabb::EMPTY,
            hint_visible: false,
            scene_loaded: false,
            input_processor: InputProcessor::new(config.bindings.clone()),
            look: LookController::new(config.movement.mouse_sensitivity),
            movement: MovementController::new(config.movement, config.body),
            dispatcher: InteractionDispatcher::new(config.lights),
            door: DoorAnimator::new(config.door),
            config,
        }
    }

    /// Resolve anchors and build both registries for a freshly loaded graph.
    pub fn install_scene(&mut self, mut graph: SceneGraph) {
        let layout = &self.config.layout;
        self.anchors = SceneAnchors::resolve(&mut graph, layout, &self.config.lights);
        self.colliders = ColliderRegistry::build(&graph, layout);
        self.triggers = InteractionRegistry::build(&graph, layout);
        self.graph = graph;
        self.scene_loaded = true;

        info!(
            colliders = self.colliders.len(),
            triggers = self.triggers.len(),
            "scene installed"
        );
    }

    /// One frame: door, look and movement, interaction, hint.
    /// The host renders afterwards.
    pub fn update(&mut self, input: &mut InputState) -> FrameReport {
        let door_moved = self.animate_door();

        let (dx, dy) = input.consume_look();
        if input.pointer_locked {
            self.look.apply_look(&mut self.camera, dx, dy);
        }

        let keys = self.input_processor.movement_keys(input);
        let movement = self.movement.step(
            &mut self.camera,
            &self.colliders,
            keys,
            input.pointer_locked,
            &mut self.player_box,
        );

        let mut fired = Vec::new();
        for _ in 0..input.consume_interactions() {
            fired.extend(self.interact());
        }

        self.hint_visible = self.triggers.any_overlapping(&self.player_box);

        FrameReport { door_moved, movement, fired, hint_visible: self.hint_visible }
    }

    /// Apply the interaction key against the current player box.
    pub fn interact(&mut self) -> Vec<InteractionKind> {
        let fired = self.dispatcher.dispatch(
            &mut self.state,
            &self.triggers,
            &self.player_box,
            &mut self.graph,
            &self.anchors,
        );
        if fired.is_empty() {
            debug!("interaction key pressed outside every trigger");
        }
        fired
    }

    fn animate_door(&mut self) -> bool {
        match self.anchors.door {
            Some(door) if self.colliders.has_door_collider() => {
                self.door.update(&mut self.graph, door, &mut self.colliders, self.state.door_open)
            }
            _ => false,
        }
    }

    pub fn door_angle(&self) -> Option<f32> {
        self.anchors.door.map(|d| self.graph.node(d).rotation.y)
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.set_aspect(width, height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::InputEvent;
    use glam::Vec3;

    fn locked_input() -> InputState {
        let mut input = InputState::new();
        input.pointer_locked = true;
        input
    }

    #[test]
    fn empty_scene_is_inert() {
        let mut walk = Walkthrough::new(WalkthroughConfig::default(), 800, 600);
        let mut input = locked_input();
        let processor = walk.input_processor.clone();
        input.process_event(&InputEvent::KeyDown { key: "w".into(), repeat: false }, &processor);
        input.process_event(&InputEvent::KeyDown { key: "e".into(), repeat: false }, &processor);

        let start = walk.camera.eye;
        let report = walk.update(&mut input);
        assert_eq!(report.movement, MoveOutcome::Committed);
        assert!(report.fired.is_empty());
        assert!(!report.hint_visible);
        assert!(!report.door_moved);
        assert!((walk.camera.eye - (start + Vec3::new(0.0, 0.0, -0.2))).length() < 1e-5);
        assert_eq!(walk.state, InteractionState::default());
    }

    #[test]
    fn mouse_look_waits_for_pointer_lock() {
        let mut walk = Walkthrough::new(WalkthroughConfig::default(), 800, 600);
        let mut input = InputState::new();
        input.look_delta = (100.0, 0.0);
        let yaw = walk.camera.yaw;
        walk.update(&mut input);
        assert_eq!(walk.camera.yaw, yaw);
    }
}
