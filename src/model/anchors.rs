use tracing::debug;

use crate::config::{LightLevels, SceneLayout};
use super::{NodeId, SceneGraph};

/// Nodes the interactions act on, looked up by name once after loading.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SceneAnchors {
    pub monitor_screen: Option<NodeId>,
    pub projector_screen: Option<NodeId>,
    pub door: Option<NodeId>,
    pub front_light: Option<NodeId>,
    pub back_light: Option<NodeId>,
}

impl SceneAnchors {
    /// Resolve the anchors and put the scene in its initial state: both
    /// screens hidden, every light visible at full intensity.
    ///
    /// When a name occurs more than once the last node in traversal order wins.
    pub fn resolve(graph: &mut SceneGraph, layout: &SceneLayout, levels: &LightLevels) -> Self {
        let mut anchors = Self::default();

        for id in graph.traverse(SceneGraph::ROOT) {
            let node = graph.node_mut(id);
            let name = node.name.as_str();

            if name == layout.door {
                anchors.door = Some(id);
            }
            if name == layout.monitor_screen {
                anchors.monitor_screen = Some(id);
                node.visible = false;
            }
            if name == layout.projector_screen {
                anchors.projector_screen = Some(id);
                node.visible = false;
            }
            if let Some(light) = node.light.as_mut() {
                light.intensity = levels.on;
                node.visible = true;

                if node.name == layout.front_light {
                    anchors.front_light = Some(id);
                }
                if node.name == layout.back_light {
                    anchors.back_light = Some(id);
                }
            }
        }

        debug!(?anchors, "resolved scene anchors");
        anchors
    }

    pub fn classroom_lights(&self) -> impl Iterator<Item = NodeId> {
        self.front_light.into_iter().chain(self.back_light)
    }

    pub fn screens(&self) -> impl Iterator<Item = NodeId> {
        self.monitor_screen.into_iter().chain(self.projector_screen)
    }
}
