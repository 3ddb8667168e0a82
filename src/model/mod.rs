// MODEL: Scene data, registries and loading
pub mod aabb;
pub mod camera;
pub mod scene_graph;
pub mod anchors;
pub mod colliders;
pub mod interactions;
pub mod loader;

pub use aabb::Aabb;
pub use camera::Camera;
pub use scene_graph::{MeshRef, Node, NodeId, PointLight, SceneGraph};
pub use anchors::SceneAnchors;
pub use colliders::{Collider, ColliderRegistry};
pub use interactions::{InteractionKind, InteractionRegistry, InteractionTrigger};
pub use loader::{parse_scene, LoadedScene};
