use std::collections::HashMap;

use glam::{EulerRot, Quat, Vec3};
use tracing::{debug, info, warn};

use crate::error::SceneLoadError;
use crate::utils::{Mesh, Vertex};
use super::{MeshRef, Node, NodeId, PointLight, SceneGraph};

/// A parsed model: the node tree plus one CPU mesh per glTF primitive.
pub struct LoadedScene {
    pub graph: SceneGraph,
    pub meshes: Vec<Mesh>,
}

/// Things a glTF node can carry besides its children.
enum Attachment {
    Mesh(String, MeshRef),
    /// A mesh with several primitives becomes an unnamed group of meshes.
    MeshGroup(Vec<(String, MeshRef)>),
    Light(String, PointLight),
}

/// Hands out node names, suffixing `_1`, `_2`, ... on reuse so that names
/// such as `Classroom_door_1_1` stay predictable across exports.
#[derive(Default)]
pub struct UniqueNames {
    used: HashMap<String, u32>,
}

impl UniqueNames {
    pub fn claim(&mut self, original: &str) -> String {
        let sanitized: String = original
            .chars()
            .filter(|c| !matches!(c, '[' | ']' | '.' | ':' | '/' | '\\'))
            .map(|c| if c.is_whitespace() { '_' } else { c })
            .collect();

        match self.used.get_mut(&sanitized) {
            Some(count) => {
                *count += 1;
                format!("{sanitized}_{count}")
            }
            None => {
                self.used.insert(sanitized.clone(), 0);
                sanitized
            }
        }
    }
}

/// Parse a `.glb` (or self-contained `.gltf`) document.
pub fn parse_scene(bytes: &[u8]) -> Result<LoadedScene, SceneLoadError> {
    let gltf::Gltf { document, blob } = gltf::Gltf::from_slice(bytes)?;
    let buffers = gltf::import_buffers(&document, None, blob)?;

    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or(SceneLoadError::NoScene)?;

    let mut builder = SceneBuilder {
        graph: SceneGraph::new(),
        meshes: Vec::new(),
        names: UniqueNames::default(),
        buffers: &buffers,
    };
    for node in scene.nodes() {
        builder.add_node(SceneGraph::ROOT, &node);
    }

    info!(nodes = builder.graph.len(), meshes = builder.meshes.len(), "parsed scene");
    Ok(LoadedScene { graph: builder.graph, meshes: builder.meshes })
}

/// Read and parse a scene from disk.
#[cfg(not(target_arch = "wasm32"))]
pub fn load_scene_file(path: impl AsRef<std::path::Path>) -> Result<LoadedScene, SceneLoadError> {
    let path = path.as_ref();
    info!(path = %path.display(), "loading scene");
    let bytes = std::fs::read(path)?;
    parse_scene(&bytes)
}

/// Fetch and parse a scene relative to the current page.
#[cfg(target_arch = "wasm32")]
pub async fn fetch_scene(path: &str) -> Result<LoadedScene, SceneLoadError> {
    use wasm_bindgen::JsCast;
    use wasm_bindgen_futures::JsFuture;

    fn fetch_error(e: wasm_bindgen::JsValue) -> SceneLoadError {
        SceneLoadError::Fetch(format!("{e:?}"))
    }

    info!(path, "fetching scene");
    let window = web_sys::window().ok_or_else(|| SceneLoadError::Fetch("no global `window`".into()))?;
    let response: web_sys::Response = JsFuture::from(window.fetch_with_str(path))
        .await
        .map_err(fetch_error)?
        .dyn_into()
        .map_err(fetch_error)?;
    if !response.ok() {
        return Err(SceneLoadError::Fetch(format!("{path} returned HTTP {}", response.status())));
    }
    let buffer = JsFuture::from(response.array_buffer().map_err(fetch_error)?)
        .await
        .map_err(fetch_error)?;
    let bytes = js_sys::Uint8Array::new(&buffer).to_vec();
    parse_scene(&bytes)
}

struct SceneBuilder<'a> {
    graph: SceneGraph,
    meshes: Vec<Mesh>,
    names: UniqueNames,
    buffers: &'a [gltf::buffer::Data],
}

impl SceneBuilder<'_> {
    fn add_node(&mut self, parent: NodeId, source: &gltf::Node) -> NodeId {
        let name = source.name().map(|n| self.names.claim(n));

        let (translation, rotation, scale) = source.transform().decomposed();
        let (rx, ry, rz) = Quat::from_array(rotation).to_euler(EulerRot::XYZ);
        let mut node = Node::new(name.clone().unwrap_or_default())
            .with_translation(Vec3::from_array(translation))
            .with_rotation(Vec3::new(rx, ry, rz))
            .with_scale(Vec3::from_array(scale));

        let mut attachments = Vec::new();
        if let Some(mesh) = source.mesh() {
            attachments.push(self.read_mesh(&mesh));
        }
        if let Some(light) = source.light() {
            let light_name = self.names.claim(light.name().unwrap_or(&format!("light_{}", light.index())));
            let color = Vec3::from_array(light.color());
            attachments.push(Attachment::Light(light_name, PointLight { color, intensity: light.intensity() }));
        }

        // A single attachment is folded into the node itself.
        let id = if attachments.len() == 1 {
            match attachments.pop() {
                Some(Attachment::Mesh(mesh_name, mesh)) => {
                    node.name = name.unwrap_or(mesh_name);
                    node.mesh = Some(mesh);
                    self.graph.add_node(parent, node)
                }
                Some(Attachment::Light(light_name, light)) => {
                    node.name = name.unwrap_or(light_name);
                    node.light = Some(light);
                    self.graph.add_node(parent, node)
                }
                Some(Attachment::MeshGroup(prims)) => {
                    let id = self.graph.add_node(parent, node);
                    self.add_primitives(id, prims);
                    id
                }
                None => self.graph.add_node(parent, node),
            }
        } else {
            let id = self.graph.add_node(parent, node);
            for attachment in attachments {
                match attachment {
                    Attachment::Mesh(mesh_name, mesh) => {
                        self.graph.add_node(id, Node::new(mesh_name).with_mesh(mesh));
                    }
                    Attachment::MeshGroup(prims) => {
                        let group = self.graph.add_node(id, Node::new(""));
                        self.add_primitives(group, prims);
                    }
                    Attachment::Light(light_name, light) => {
                        self.graph.add_node(id, Node::new(light_name).with_light(light));
                    }
                }
            }
            id
        };

        for child in source.children() {
            self.add_node(id, &child);
        }
        id
    }

    fn add_primitives(&mut self, parent: NodeId, prims: Vec<(String, MeshRef)>) {
        for (prim_name, mesh) in prims {
            self.graph.add_node(parent, Node::new(prim_name).with_mesh(mesh));
        }
    }

    fn read_mesh(&mut self, mesh: &gltf::Mesh) -> Attachment {
        let base_name = mesh
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("mesh_{}", mesh.index()));

        let mut prims = Vec::new();
        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                warn!(mesh = %base_name, mode = ?primitive.mode(), "skipping non-triangle primitive");
                continue;
            }
            let cpu = self.read_primitive(&primitive);
            let mesh_ref = MeshRef { mesh_index: self.meshes.len(), local_bounds: cpu.bounds() };
            self.meshes.push(cpu);
            prims.push((self.names.claim(&base_name), mesh_ref));
        }

        if prims.len() == 1 {
            let (name, mesh_ref) = prims.remove(0);
            Attachment::Mesh(name, mesh_ref)
        } else {
            Attachment::MeshGroup(prims)
        }
    }

    fn read_primitive(&self, primitive: &gltf::Primitive) -> Mesh {
        let reader = primitive.reader(|b| self.buffers.get(b.index()).map(|data| &data.0[..]));
        let base_color = primitive.material().pbr_metallic_roughness().base_color_factor();

        let positions: Vec<[f32; 3]> = match reader.read_positions() {
            Some(iter) => iter.collect(),
            None => {
                debug!("primitive without positions");
                return Mesh::empty();
            }
        };
        let normals: Vec<[f32; 3]> = reader
            .read_normals()
            .map(|iter| iter.collect())
            .unwrap_or_else(|| vec![[0.0, 1.0, 0.0]; positions.len()]);
        let colors: Option<Vec<[f32; 4]>> = reader.read_colors(0).map(|c| c.into_rgba_f32().collect());

        let vertices = positions
            .iter()
            .enumerate()
            .map(|(i, pos)| {
                let tint = colors.as_ref().and_then(|c| c.get(i)).copied().unwrap_or([1.0; 4]);
                Vertex {
                    pos: *pos,
                    normal: normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
                    color: [
                        base_color[0] * tint[0],
                        base_color[1] * tint[1],
                        base_color[2] * tint[2],
                        base_color[3] * tint[3],
                    ],
                }
            })
            .collect();

        let indices = reader
            .read_indices()
            .map(|idx| idx.into_u32().collect())
            .unwrap_or_else(|| (0..positions.len() as u32).collect());

        Mesh { vertices, indices }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NODES_ONLY: &str = r#"{
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [ { "nodes": [0, 2] } ],
        "nodes": [
            { "name": "ClassroomDoor", "translation": [1.0, 2.0, 3.0], "children": [1] },
            { "name": "Hinge", "rotation": [0.0, 0.38268343, 0.0, 0.9238795] },
            { "name": "FrontClassroomPointLight", "extensions": { "KHR_lights_punctual": { "light": 0 } } }
        ],
        "extensionsUsed": ["KHR_lights_punctual"],
        "extensions": {
            "KHR_lights_punctual": {
                "lights": [ { "type": "point", "intensity": 12.5, "color": [1.0, 0.5, 0.25] } ]
            }
        }
    }"#;

    #[test]
    fn unique_names_suffix_repeats() {
        let mut names = UniqueNames::default();
        assert_eq!(names.claim("door_1"), "door_1");
        assert_eq!(names.claim("door_1"), "door_1_1");
        assert_eq!(names.claim("door_1"), "door_1_2");
        assert_eq!(names.claim("front desk"), "front_desk");
        assert_eq!(names.claim("a.b:c"), "abc");
    }

    #[test]
    fn parses_hierarchy_transforms_and_lights() {
        let loaded = parse_scene(NODES_ONLY.as_bytes()).unwrap();
        let g = &loaded.graph;
        assert!(loaded.meshes.is_empty());

        let door = g.find_by_name("ClassroomDoor").unwrap();
        let hinge = g.find_by_name("Hinge").unwrap();
        assert_eq!(g.node(hinge).parent, Some(door));
        assert!((g.world_position(hinge) - Vec3::new(1.0, 2.0, 3.0)).length() < 1e-5);
        assert!((g.node(hinge).rotation.y - std::f32::consts::FRAC_PI_4).abs() < 1e-4);

        let light = g.find_by_name("FrontClassroomPointLight").unwrap();
        let light = g.node(light).light.unwrap();
        assert_eq!(light.intensity, 12.5);
        assert_eq!(light.color, Vec3::new(1.0, 0.5, 0.25));
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(parse_scene(b"definitely not gltf"), Err(SceneLoadError::Gltf(_))));
    }

    #[test]
    fn rejects_document_without_scene() {
        let doc = br#"{ "asset": { "version": "2.0" } }"#;
        assert!(matches!(parse_scene(doc), Err(SceneLoadError::NoScene)));
    }
}
