use glam::Vec3;

use classroom_walkthrough::config::WalkthroughConfig;
use classroom_walkthrough::controller::{InputEvent, InputState, InteractionState, MoveOutcome, Walkthrough};
use classroom_walkthrough::model::{Aabb, InteractionKind, MeshRef, Node, PointLight, SceneGraph};
use classroom_walkthrough::view::LightingUniform;

const EYE_HEIGHT: f32 = 9.0;

fn mesh(min: [f32; 3], max: [f32; 3]) -> MeshRef {
    MeshRef { mesh_index: 0, local_bounds: Aabb::new(Vec3::from_array(min), Vec3::from_array(max)) }
}

/// A small classroom: back wall, monitor with screens, light switch, a
/// hinged door next to a walk-through doorway, and the two room lights.
fn classroom() -> SceneGraph {
    furnish(SceneGraph::new())
}

/// Add the classroom to `g` after whatever it already holds.
fn furnish(mut g: SceneGraph) -> SceneGraph {
    let root = SceneGraph::ROOT;

    g.add_node(root, Node::new("BackWall").with_translation(Vec3::new(0.0, 0.0, -10.0)).with_mesh(mesh([-20.0, 0.0, -0.5], [20.0, 10.0, 0.5])));

    let monitor = g.add_node(root, Node::new("Monitor").with_translation(Vec3::new(0.0, 0.0, 5.0)));
    g.add_node(monitor, Node::new("monitor_body").with_translation(Vec3::new(0.0, 4.0, 0.0)).with_mesh(mesh([-0.5, 0.0, -0.5], [0.5, 1.0, 0.5])));
    g.add_node(root, Node::new("MonitorScreen").with_translation(Vec3::new(0.0, 6.0, 5.0)).with_mesh(mesh([-0.5, 0.0, -0.05], [0.5, 1.0, 0.05])));
    g.add_node(root, Node::new("ProjectorScreen").with_translation(Vec3::new(0.0, 8.0, -9.0)).with_mesh(mesh([-2.0, 0.0, -0.05], [2.0, 1.0, 0.05])));

    g.add_node(root, Node::new("mesh_42").with_translation(Vec3::new(20.0, 5.0, 0.0)).with_mesh(mesh([-0.1; 3], [0.1; 3])));

    let door = g.add_node(root, Node::new("ClassroomDoor").with_translation(Vec3::new(-20.0, 0.0, 0.0)));
    g.add_node(door, Node::new("Classroom_door_1_1").with_mesh(mesh([0.0, 0.0, -0.05], [2.0, 8.0, 0.05])));
    g.add_node(root, Node::new("ClassroomDoorway").with_translation(Vec3::new(-19.0, 0.0, 0.0)).with_mesh(mesh([-1.0, 0.0, -1.0], [1.0, 8.0, 1.0])));

    for (name, z) in [("FrontClassroomPointLight", 5.0), ("BackClassroomPointLight", -5.0)] {
        let light = PointLight { color: Vec3::ONE, intensity: 1.0 };
        g.add_node(root, Node::new(name).with_translation(Vec3::new(0.0, 9.0, z)).with_light(light));
    }
    g
}

fn setup() -> (Walkthrough, InputState) {
    setup_with(classroom())
}

fn setup_with(graph: SceneGraph) -> (Walkthrough, InputState) {
    let mut config = WalkthroughConfig::default();
    config.spawn.eye = Vec3::new(0.0, EYE_HEIGHT, 0.0);
    let mut walk = Walkthrough::new(config, 800, 600);
    walk.install_scene(graph);

    let mut input = InputState::new();
    input.process_event(&InputEvent::PointerLockChanged { locked: true }, &walk.input_processor);
    (walk, input)
}

fn teleport(walk: &mut Walkthrough, x: f32, z: f32) {
    walk.camera.eye = Vec3::new(x, EYE_HEIGHT, z);
}

/// One frame with a single key tapped.
fn tap(walk: &mut Walkthrough, input: &mut InputState, key: &str) -> Vec<InteractionKind> {
    let processor = walk.input_processor.clone();
    input.process_event(&InputEvent::KeyDown { key: key.to_string(), repeat: false }, &processor);
    let report = walk.update(input);
    input.process_event(&InputEvent::KeyUp(key.to_string()), &processor);
    report.fired
}

fn frames(walk: &mut Walkthrough, input: &mut InputState, n: usize) {
    for _ in 0..n {
        walk.update(input);
    }
}

fn light_intensities(walk: &Walkthrough) -> Vec<f32> {
    walk.anchors
        .classroom_lights()
        .filter_map(|id| walk.graph.node(id).light.map(|l| l.intensity))
        .collect()
}

#[test]
fn installing_the_scene_builds_registries_and_initial_state() {
    let (walk, _) = setup();

    // doorway excluded, everything else with a mesh blocks
    let names: Vec<_> = walk.colliders.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(
        names,
        ["BackWall", "monitor_body", "MonitorScreen", "ProjectorScreen", "mesh_42", "Classroom_door_1_1"]
    );
    assert_eq!(walk.colliders.door_collider().map(|c| c.name.as_str()), Some("Classroom_door_1_1"));

    let kinds: Vec<_> = walk.triggers.iter().map(|t| t.kind).collect();
    assert_eq!(kinds, [InteractionKind::Monitor, InteractionKind::Light, InteractionKind::Door]);

    assert!(walk.anchors.screens().all(|s| !walk.graph.node(s).visible));
    assert_eq!(light_intensities(&walk), [300.0, 300.0]);
    assert_eq!(walk.state, InteractionState::default());
    assert_eq!(walk.door_angle(), Some(0.0));
}

#[test]
fn interaction_before_the_first_locked_frame_does_nothing() {
    let (mut walk, _) = setup();
    let mut unlocked = InputState::new();
    assert!(tap(&mut walk, &mut unlocked, "e").is_empty());
    assert!(!walk.hint_visible);
    assert_eq!(walk.state, InteractionState::default());
}

/// Hold a key for `n` frames.
fn walk_for(walk: &mut Walkthrough, input: &mut InputState, key: &str, n: usize) {
    let processor = walk.input_processor.clone();
    input.process_event(&InputEvent::KeyDown { key: key.to_string(), repeat: false }, &processor);
    frames(walk, input, n);
    input.process_event(&InputEvent::KeyUp(key.to_string()), &processor);
}

#[test]
fn monitor_scenario_enter_press_leave_return_press() {
    let (mut walk, mut input) = setup();

    assert_eq!(tap(&mut walk, &mut input, "e"), [InteractionKind::Monitor]);
    assert!(walk.state.monitor_on);
    assert!(walk.hint_visible);
    assert!(walk.anchors.screens().all(|s| walk.graph.node(s).visible));

    // back out of the trigger, pressing there does nothing
    walk_for(&mut walk, &mut input, "w", 3);
    assert!(!walk.hint_visible);
    assert!(tap(&mut walk, &mut input, "e").is_empty());
    assert!(walk.state.monitor_on);

    walk_for(&mut walk, &mut input, "s", 3);
    assert!(walk.hint_visible);
    assert_eq!(tap(&mut walk, &mut input, "E"), [InteractionKind::Monitor]);
    assert!(!walk.state.monitor_on);
    assert!(walk.anchors.screens().all(|s| !walk.graph.node(s).visible));
}

#[test]
fn two_presses_before_one_frame_toggle_twice() {
    let (mut walk, mut input) = setup();
    let processor = walk.input_processor.clone();
    for _ in 0..2 {
        input.process_event(&InputEvent::KeyDown { key: "e".into(), repeat: false }, &processor);
        input.process_event(&InputEvent::KeyUp("e".into()), &processor);
    }

    let report = walk.update(&mut input);
    assert_eq!(report.fired, [InteractionKind::Monitor, InteractionKind::Monitor]);
    assert!(!walk.state.monitor_on);
    assert!(walk.anchors.screens().all(|s| !walk.graph.node(s).visible));
}

#[test]
fn walking_into_the_wall_stops_at_the_wall() {
    let (mut walk, mut input) = setup();
    teleport(&mut walk, 0.0, -8.0);

    let processor = walk.input_processor.clone();
    input.process_event(&InputEvent::KeyDown { key: "w".into(), repeat: false }, &processor);

    let mut last = MoveOutcome::Idle;
    for _ in 0..20 {
        last = walk.update(&mut input).movement;
    }
    assert_eq!(last, MoveOutcome::Blocked { collider: "BackWall".into() });

    // the body never entered the wall
    let stopped = walk.camera.eye;
    assert!(stopped.z - 0.3 > -9.5);
    assert!(stopped.z < -8.9);
    assert!(!walk.hint_visible);

    walk.update(&mut input);
    assert_eq!(walk.camera.eye, stopped);

    // backing off is free again
    input.process_event(&InputEvent::KeyUp("w".into()), &processor);
    input.process_event(&InputEvent::KeyDown { key: "s".into(), repeat: false }, &processor);
    assert_eq!(walk.update(&mut input).movement, MoveOutcome::Committed);
    assert!(walk.camera.eye.z > stopped.z);
}

#[test]
fn door_swings_open_and_closed_dragging_its_collider() {
    let (mut walk, mut input) = setup();
    teleport(&mut walk, -15.0, 3.0);
    let closed = walk.colliders.door_collider().map(|c| c.aabb).unwrap();

    assert_eq!(tap(&mut walk, &mut input, "e"), [InteractionKind::Door]);
    assert!(walk.state.door_open);
    // the swing starts on the following frame
    assert_eq!(walk.door_angle(), Some(0.0));

    let report = walk.update(&mut input);
    assert!(report.door_moved);
    assert!((walk.door_angle().unwrap() + 0.02).abs() < 1e-6);

    frames(&mut walk, &mut input, 130);
    assert_eq!(walk.door_angle(), Some(-2.36));
    assert!(!walk.update(&mut input).door_moved);

    let open = walk.colliders.door_collider().map(|c| c.aabb).unwrap();
    assert!(open.max.x <= -19.9);
    assert!(open.min.x < -21.0);
    assert!(open.max.z > 1.0);

    assert_eq!(tap(&mut walk, &mut input, "e"), [InteractionKind::Door]);
    assert!(!walk.state.door_open);
    frames(&mut walk, &mut input, 130);
    assert_eq!(walk.door_angle(), Some(0.0));

    let reclosed = walk.colliders.door_collider().map(|c| c.aabb).unwrap();
    assert!((reclosed.min - closed.min).length() < 1e-4);
    assert!((reclosed.max - closed.max).length() < 1e-4);
}

#[test]
fn open_doorway_mesh_does_not_block() {
    let (mut walk, mut input) = setup();
    teleport(&mut walk, -19.0, 0.9);

    let processor = walk.input_processor.clone();
    input.process_event(&InputEvent::KeyDown { key: "d".into(), repeat: false }, &processor);
    assert_eq!(walk.update(&mut input).movement, MoveOutcome::Committed);
}

#[test]
fn light_switch_dims_and_restores_both_lights() {
    let (mut walk, mut input) = setup();
    teleport(&mut walk, 18.5, 0.0);

    assert_eq!(tap(&mut walk, &mut input, "e"), [InteractionKind::Light]);
    assert!(!walk.state.light_on);
    assert_eq!(light_intensities(&walk), [3.0, 3.0]);

    assert_eq!(tap(&mut walk, &mut input, "e"), [InteractionKind::Light]);
    assert!(walk.state.light_on);
    assert_eq!(light_intensities(&walk), [300.0, 300.0]);
}

#[test]
fn light_switch_reaches_the_shader_with_more_lights_in_the_scene() {
    let mut hallway = SceneGraph::new();
    for i in 0..4 {
        let light = PointLight { color: Vec3::ONE, intensity: 300.0 };
        let at = Vec3::new(40.0 + i as f32 * 5.0, 9.0, 0.0);
        hallway.add_node(SceneGraph::ROOT, Node::new(format!("HallwayLight{i}")).with_translation(at).with_light(light));
    }
    let (mut walk, mut input) = setup_with(furnish(hallway));
    teleport(&mut walk, 18.5, 0.0);

    let shaded = |walk: &Walkthrough| {
        let lighting = LightingUniform::from_graph(&walk.graph, walk.anchors.classroom_lights());
        [lighting.lights[0].intensity, lighting.lights[1].intensity]
    };
    assert_eq!(shaded(&walk), [300.0, 300.0]);

    assert_eq!(tap(&mut walk, &mut input, "e"), [InteractionKind::Light]);
    assert_eq!(shaded(&walk), [3.0, 3.0]);
}

#[test]
fn hint_follows_the_player_between_triggers() {
    let (mut walk, mut input) = setup();

    assert!(walk.update(&mut input).hint_visible);

    teleport(&mut walk, 10.0, -5.0);
    assert!(!walk.update(&mut input).hint_visible);

    teleport(&mut walk, 18.5, 0.0);
    assert!(walk.update(&mut input).hint_visible);
}
