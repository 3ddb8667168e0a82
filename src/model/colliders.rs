use tracing::debug;

use crate::config::SceneLayout;
use super::{Aabb, NodeId, SceneGraph};

#[derive(Debug, Clone, PartialEq)]
pub struct Collider {
    pub name: String,
    pub node: NodeId,
    pub aabb: Aabb,
}

/// Static world-space boxes that block the player, plus the one door
/// collider whose box follows the door's rotation.
#[derive(Debug, Clone, Default)]
pub struct ColliderRegistry {
    colliders: Vec<Collider>,
    door_collider: Option<usize>,
}

impl ColliderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// One collider per mesh node in traversal order, skipping the
    /// walk-through doorway meshes.
    pub fn build(graph: &SceneGraph, layout: &SceneLayout) -> Self {
        let mut registry = Self::new();

        for id in graph.traverse(SceneGraph::ROOT) {
            let node = graph.node(id);
            if !node.is_mesh() || layout.walkthrough_meshes.iter().any(|n| *n == node.name) {
                continue;
            }

            if node.name == layout.door_leaf {
                registry.door_collider = Some(registry.colliders.len());
            }
            registry.colliders.push(Collider {
                name: node.name.clone(),
                node: id,
                aabb: graph.world_bounds(id),
            });
        }

        debug!(
            colliders = registry.colliders.len(),
            door = registry.door_collider.is_some(),
            "built collider registry"
        );
        registry
    }

    pub fn push(&mut self, collider: Collider) {
        self.colliders.push(collider);
    }

    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Collider> {
        self.colliders.iter()
    }

    pub fn door_collider(&self) -> Option<&Collider> {
        self.door_collider.map(|i| &self.colliders[i])
    }

    pub fn has_door_collider(&self) -> bool {
        self.door_collider.is_some()
    }

    /// Recompute the door collider from the door node's current subtree bounds.
    pub fn refresh_door(&mut self, graph: &SceneGraph, door: NodeId) {
        if let Some(i) = self.door_collider {
            self.colliders[i].aabb = graph.world_bounds(door);
        }
    }

    /// First collider, in insertion order, that overlaps `aabb`.
    pub fn first_hit(&self, aabb: &Aabb) -> Option<&Collider> {
        self.colliders.iter().find(|c| c.aabb.intersects(aabb))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MeshRef, Node};
    use glam::Vec3;

    fn mesh() -> MeshRef {
        MeshRef { mesh_index: 0, local_bounds: Aabb::new(Vec3::ZERO, Vec3::ONE) }
    }

    #[test]
    fn doorway_meshes_are_walkable() {
        let mut g = SceneGraph::new();
        g.add_node(SceneGraph::ROOT, Node::new("Wall").with_mesh(mesh()));
        g.add_node(SceneGraph::ROOT, Node::new("doorwayFront").with_mesh(mesh()));
        g.add_node(SceneGraph::ROOT, Node::new("door_1_2").with_mesh(mesh()));
        g.add_node(SceneGraph::ROOT, Node::new("EmptyGroup"));

        let registry = ColliderRegistry::build(&g, &SceneLayout::default());
        let names: Vec<_> = registry.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Wall"]);
        assert!(!registry.has_door_collider());
    }

    #[test]
    fn door_leaf_follows_door_rotation() {
        let mut g = SceneGraph::new();
        let door = g.add_node(SceneGraph::ROOT, Node::new("ClassroomDoor"));
        g.add_node(
            door,
            Node::new("Classroom_door_1_1").with_mesh(MeshRef {
                mesh_index: 0,
                local_bounds: Aabb::new(Vec3::ZERO, Vec3::new(4.0, 8.0, 0.2)),
            }),
        );
        let mut registry = ColliderRegistry::build(&g, &SceneLayout::default());
        assert_eq!(registry.door_collider().unwrap().aabb.max.x, 4.0);

        g.node_mut(door).rotation.y = -std::f32::consts::FRAC_PI_2;
        registry.refresh_door(&g, door);
        let aabb = registry.door_collider().unwrap().aabb;
        assert!(aabb.max.x < 0.3);
        assert!((aabb.max.z - 4.0).abs() < 1e-4);
    }

    #[test]
    fn first_hit_respects_insertion_order() {
        let mut registry = ColliderRegistry::new();
        registry.push(Collider { name: "a".into(), node: 1, aabb: Aabb::new(Vec3::ZERO, Vec3::splat(2.0)) });
        registry.push(Collider { name: "b".into(), node: 2, aabb: Aabb::new(Vec3::ZERO, Vec3::splat(3.0)) });
        let probe = Aabb::from_center_and_size(Vec3::splat(1.0), Vec3::splat(0.5));
        assert_eq!(registry.first_hit(&probe).unwrap().name, "a");
        let far = Aabb::from_center_and_size(Vec3::splat(10.0), Vec3::splat(0.5));
        assert!(registry.first_hit(&far).is_none());
    }
}
