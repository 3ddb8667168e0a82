use glam::{EulerRot, Mat4, Quat, Vec3};

use super::Aabb;

/// Index of a node inside a [`SceneGraph`]. Stable for the lifetime of the graph.
pub type NodeId = usize;

/// Geometry attached to a node: which CPU/GPU mesh it draws and the
/// mesh-local bounds used for collision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshRef {
    pub mesh_index: usize,
    pub local_bounds: Aabb,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub color: Vec3,
    pub intensity: f32,
}

impl Default for PointLight {
    fn default() -> Self {
        Self { color: Vec3::ONE, intensity: 1.0 }
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub translation: Vec3,
    /// Euler angles in radians, applied in XYZ order.
    pub rotation: Vec3,
    pub scale: Vec3,
    pub mesh: Option<MeshRef>,
    pub light: Option<PointLight>,
    pub visible: bool,
}

impl Node {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            children: Vec::new(),
            translation: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
            mesh: None,
            light: None,
            visible: true,
        }
    }

    pub fn with_translation(mut self, translation: Vec3) -> Self {
        self.translation = translation;
        self
    }

    pub fn with_rotation(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_mesh(mut self, mesh: MeshRef) -> Self {
        self.mesh = Some(mesh);
        self
    }

    pub fn with_light(mut self, light: PointLight) -> Self {
        self.light = Some(light);
        self
    }

    pub fn is_mesh(&self) -> bool {
        self.mesh.is_some()
    }

    pub fn local_matrix(&self) -> Mat4 {
        let q = Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z);
        Mat4::from_scale_rotation_translation(self.scale, q, self.translation)
    }
}

/// Arena-backed node tree. Node 0 is always the scene root.
#[derive(Debug, Clone)]
pub struct SceneGraph {
    nodes: Vec<Node>,
}

impl SceneGraph {
    pub const ROOT: NodeId = 0;

    pub fn new() -> Self {
        Self { nodes: vec![Node::new("Scene")] }
    }

    pub fn add_node(&mut self, parent: NodeId, mut node: Node) -> NodeId {
        let id = self.nodes.len();
        node.parent = Some(parent);
        node.children.clear();
        self.nodes.push(node);
        self.nodes[parent].children.push(id);
        id
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        // the root alone counts as empty
        self.nodes.len() <= 1
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id]
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate()
    }

    /// Depth-first pre-order walk starting at (and including) `start`.
    pub fn traverse(&self, start: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            order.push(id);
            // reversed so the first child is visited first
            stack.extend(self.nodes[id].children.iter().rev().copied());
        }
        order
    }

    /// First node with exactly this name, in traversal order.
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.traverse(Self::ROOT)
            .into_iter()
            .find(|&id| self.nodes[id].name == name)
    }

    pub fn world_matrix(&self, id: NodeId) -> Mat4 {
        let node = &self.nodes[id];
        let local = node.local_matrix();
        match node.parent {
            Some(parent) => self.world_matrix(parent) * local,
            None => local,
        }
    }

    pub fn world_position(&self, id: NodeId) -> Vec3 {
        self.world_matrix(id).w_axis.truncate()
    }

    /// World-space bounds of every mesh in the subtree rooted at `id`.
    pub fn world_bounds(&self, id: NodeId) -> Aabb {
        self.traverse(id)
            .into_iter()
            .filter_map(|n| {
                self.nodes[n]
                    .mesh
                    .map(|m| m.local_bounds.transformed(&self.world_matrix(n)))
            })
            .fold(Aabb::EMPTY, |acc, b| acc.union(&b))
    }

    /// A node is drawn only if it and all of its ancestors are visible.
    pub fn is_effectively_visible(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(n) = current {
            if !self.nodes[n].visible {
                return false;
            }
            current = self.nodes[n].parent;
        }
        true
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_mesh() -> MeshRef {
        MeshRef { mesh_index: 0, local_bounds: Aabb::new(Vec3::ZERO, Vec3::ONE) }
    }

    #[test]
    fn traversal_is_pre_order() {
        let mut g = SceneGraph::new();
        let a = g.add_node(SceneGraph::ROOT, Node::new("a"));
        let a1 = g.add_node(a, Node::new("a1"));
        let b = g.add_node(SceneGraph::ROOT, Node::new("b"));
        let a2 = g.add_node(a, Node::new("a2"));
        assert_eq!(g.traverse(SceneGraph::ROOT), vec![0, a, a1, a2, b]);
    }

    #[test]
    fn world_position_composes_parents() {
        let mut g = SceneGraph::new();
        let parent = g.add_node(
            SceneGraph::ROOT,
            Node::new("parent").with_translation(Vec3::new(10.0, 0.0, 0.0)).with_scale(Vec3::splat(2.0)),
        );
        let child = g.add_node(parent, Node::new("child").with_translation(Vec3::new(1.0, 1.0, 0.0)));
        assert_eq!(g.world_position(child), Vec3::new(12.0, 2.0, 0.0));
    }

    #[test]
    fn subtree_bounds_include_children() {
        let mut g = SceneGraph::new();
        let group = g.add_node(SceneGraph::ROOT, Node::new("group"));
        g.add_node(group, Node::new("m1").with_mesh(unit_mesh()));
        g.add_node(group, Node::new("m2").with_mesh(unit_mesh()).with_translation(Vec3::new(4.0, 0.0, 0.0)));
        let b = g.world_bounds(group);
        assert_eq!(b.min, Vec3::ZERO);
        assert_eq!(b.max, Vec3::new(5.0, 1.0, 1.0));
    }

    #[test]
    fn hidden_parent_hides_children() {
        let mut g = SceneGraph::new();
        let parent = g.add_node(SceneGraph::ROOT, Node::new("parent"));
        let child = g.add_node(parent, Node::new("child").with_mesh(unit_mesh()));
        assert!(g.is_effectively_visible(child));
        g.node_mut(parent).visible = false;
        assert!(!g.is_effectively_visible(child));
    }
}
