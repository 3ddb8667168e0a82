use std::fmt;

use glam::Vec3;
use tracing::debug;

use crate::config::SceneLayout;
use super::{Aabb, NodeId, SceneGraph};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InteractionKind {
    Monitor,
    Door,
    Light,
}

impl InteractionKind {
    pub fn name(&self) -> &'static str {
        match self {
            InteractionKind::Monitor => "monitor",
            InteractionKind::Door => "door",
            InteractionKind::Light => "light",
        }
    }
}

impl fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InteractionTrigger {
    pub kind: InteractionKind,
    pub volume: Aabb,
    /// The node the interaction belongs to (switch mesh, door or monitor group).
    pub node: NodeId,
}

/// Trigger volumes the player can stand in to use an object.
#[derive(Debug, Clone, Default)]
pub struct InteractionRegistry {
    triggers: Vec<InteractionTrigger>,
}

impl InteractionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build(graph: &SceneGraph, layout: &SceneLayout) -> Self {
        let mut registry = Self::new();

        for id in graph.traverse(SceneGraph::ROOT) {
            let name = graph.node(id).name.as_str();

            if name == layout.light_switch {
                registry.push_trigger(graph, InteractionKind::Light, id, id, layout.light_trigger_size);
            }
            if name == layout.door {
                match last_mesh_containing(graph, id, &layout.door_anchor) {
                    Some(anchor) => {
                        registry.push_trigger(graph, InteractionKind::Door, id, anchor, layout.door_trigger_size)
                    }
                    None => debug!(node = name, "door has no anchor mesh, skipping trigger"),
                }
            }
            if name == layout.monitor {
                match last_mesh_containing(graph, id, &layout.monitor_anchor) {
                    Some(anchor) => registry.push_trigger(
                        graph,
                        InteractionKind::Monitor,
                        id,
                        anchor,
                        layout.monitor_trigger_size,
                    ),
                    None => debug!(node = name, "monitor has no anchor mesh, skipping trigger"),
                }
            }
        }

        debug!(triggers = registry.triggers.len(), "built interaction registry");
        registry
    }

    fn push_trigger(&mut self, graph: &SceneGraph, kind: InteractionKind, node: NodeId, anchor: NodeId, size: Vec3) {
        let volume = Aabb::from_center_and_size(graph.world_position(anchor), size);
        self.triggers.push(InteractionTrigger { kind, volume, node });
    }

    pub fn push(&mut self, trigger: InteractionTrigger) {
        self.triggers.push(trigger);
    }

    pub fn len(&self) -> usize {
        self.triggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &InteractionTrigger> {
        self.triggers.iter()
    }

    /// Triggers whose volume overlaps `aabb`, in registration order.
    pub fn overlapping<'a>(&'a self, aabb: &'a Aabb) -> impl Iterator<Item = &'a InteractionTrigger> + 'a {
        self.triggers.iter().filter(move |t| t.volume.intersects(aabb))
    }

    pub fn any_overlapping(&self, aabb: &Aabb) -> bool {
        self.overlapping(aabb).next().is_some()
    }
}

/// Last mesh in the subtree of `root` (including `root`) whose lowercase name
/// contains `needle`.
fn last_mesh_containing(graph: &SceneGraph, root: NodeId, needle: &str) -> Option<NodeId> {
    graph
        .traverse(root)
        .into_iter()
        .filter(|&id| {
            let node = graph.node(id);
            node.is_mesh() && node.name.to_lowercase().contains(needle)
        })
        .last()
}
