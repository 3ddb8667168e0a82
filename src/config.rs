use glam::Vec3;

use crate::controller::KeyBindings;

/// Default location of the classroom asset, relative to the page (WASM) or
/// the working directory (native).
pub const DEFAULT_SCENE_PATH: &str = "scene/project.glb";

/// Environment variable overriding the scene path on native builds.
pub const SCENE_PATH_ENV: &str = "WALKTHROUGH_SCENE";

/// Every tunable of the walkthrough in one place.
#[derive(Debug, Clone)]
pub struct WalkthroughConfig {
    pub scene_path: String,
    pub spawn: SpawnSettings,
    pub movement: MovementSettings,
    pub body: BodySettings,
    pub door: DoorSettings,
    pub lights: LightLevels,
    pub layout: SceneLayout,
    pub bindings: KeyBindings,
}

impl Default for WalkthroughConfig {
    fn default() -> Self {
        Self {
            scene_path: DEFAULT_SCENE_PATH.to_string(),
            spawn: SpawnSettings::default(),
            movement: MovementSettings::default(),
            body: BodySettings::default(),
            door: DoorSettings::default(),
            lights: LightLevels::default(),
            layout: SceneLayout::default(),
            bindings: KeyBindings::default(),
        }
    }
}

impl WalkthroughConfig {
    /// Defaults plus the native scene path override.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(path) = std::env::var(SCENE_PATH_ENV) {
            config.scene_path = path;
        }
        config
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SpawnSettings {
    pub eye: Vec3,
    /// Radians; -PI/2 faces down -Z.
    pub yaw: f32,
    pub fov_y_degrees: f32,
}

impl Default for SpawnSettings {
    fn default() -> Self {
        Self {
            eye: Vec3::new(-13.828, 9.834, 32.849),
            yaw: -std::f32::consts::FRAC_PI_2,
            fov_y_degrees: 75.0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MovementSettings {
    /// Distance per frame along each held axis.
    pub speed: f32,
    pub mouse_sensitivity: f32,
}

impl Default for MovementSettings {
    fn default() -> Self {
        Self { speed: 0.2, mouse_sensitivity: 0.002 }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BodySettings {
    pub size: Vec3,
    /// World-space height of the body box center.
    pub center_height: f32,
}

impl Default for BodySettings {
    fn default() -> Self {
        Self { size: Vec3::new(0.6, 1.7, 0.6), center_height: 5.0 }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DoorSettings {
    /// Y rotation of the fully open door, radians.
    pub open_angle: f32,
    /// Radians per frame.
    pub step: f32,
}

impl Default for DoorSettings {
    fn default() -> Self {
        Self { open_angle: -2.36, step: 0.02 }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LightLevels {
    pub on: f32,
    pub dimmed: f32,
}

impl Default for LightLevels {
    fn default() -> Self {
        Self { on: 300.0, dimmed: 3.0 }
    }
}

/// Node names the walkthrough resolves once the model is loaded.
#[derive(Debug, Clone)]
pub struct SceneLayout {
    /// Mesh nodes that never block movement.
    pub walkthrough_meshes: Vec<String>,
    /// The metal leaf of the door, the only collider that moves.
    pub door_leaf: String,
    pub door: String,
    /// Lowercase substring identifying the door trigger anchor.
    pub door_anchor: String,
    pub door_trigger_size: Vec3,
    pub monitor: String,
    /// Lowercase substring identifying the monitor trigger anchor.
    pub monitor_anchor: String,
    pub monitor_trigger_size: Vec3,
    /// The exporter names the light switch `mesh_42`.
    pub light_switch: String,
    pub light_trigger_size: Vec3,
    pub monitor_screen: String,
    pub projector_screen: String,
    pub front_light: String,
    pub back_light: String,
}

impl Default for SceneLayout {
    fn default() -> Self {
        Self {
            walkthrough_meshes: ["ClassroomDoorway", "doorwayFront", "doorwayFront_1", "door_1_1", "door_1_2"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            door_leaf: "Classroom_door_1_1".to_string(),
            door: "ClassroomDoor".to_string(),
            door_anchor: "classroom_door_1_1".to_string(),
            door_trigger_size: Vec3::new(15.0, 15.0, 15.0),
            monitor: "Monitor".to_string(),
            monitor_anchor: "monitor".to_string(),
            monitor_trigger_size: Vec3::new(10.0, 8.0, 10.0),
            light_switch: "mesh_42".to_string(),
            light_trigger_size: Vec3::new(5.0, 15.0, 5.0),
            monitor_screen: "MonitorScreen".to_string(),
            projector_screen: "ProjectorScreen".to_string(),
            front_light: "FrontClassroomPointLight".to_string(),
            back_light: "BackClassroomPointLight".to_string(),
        }
    }
}
