use wgpu::*;
use wgpu::util::DeviceExt;
use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use tracing::{debug, warn};

use crate::controller::Walkthrough;
use crate::model::{NodeId, SceneGraph};
use crate::utils::{Mesh, MeshBuffer, Vertex};

pub const MAX_LIGHTS: usize = 4;
pub const DEPTH_FORMAT: TextureFormat = TextureFormat::Depth32Float;

const AMBIENT: [f32; 3] = [0.06, 0.06, 0.07];
const TRIGGER_BOX_COLOR: [f32; 4] = [1.0, 0.85, 0.1, 0.25];
const DOOR_BOX_COLOR: [f32; 4] = [1.0, 0.2, 0.2, 0.3];
const PLAYER_BOX_COLOR: [f32; 4] = [0.2, 0.6, 1.0, 0.35];

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, Pod, Zeroable)]
pub struct PointLightUniform {
    pub position: [f32; 3],
    pub intensity: f32,
    pub color: [f32; 3],
    pub _pad: f32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct LightingUniform {
    pub lights: [PointLightUniform; MAX_LIGHTS],
    pub ambient: [f32; 3],
    pub light_count: u32,
}

impl LightingUniform {
    /// Collect up to `MAX_LIGHTS` visible point lights. The `first` nodes
    /// take the leading slots, the rest follow in traversal order.
    pub fn from_graph(graph: &SceneGraph, first: impl IntoIterator<Item = NodeId>) -> Self {
        let mut uniform = Self {
            lights: [PointLightUniform::default(); MAX_LIGHTS],
            ambient: AMBIENT,
            light_count: 0,
        };

        let first: Vec<NodeId> = first.into_iter().collect();
        let rest = graph.traverse(SceneGraph::ROOT).into_iter().filter(|id| !first.contains(id));
        let lights = first
            .iter()
            .copied()
            .chain(rest)
            .filter(|&id| graph.is_effectively_visible(id))
            .filter_map(|id| graph.node(id).light.map(|l| (id, l)));

        for (slot, (id, light)) in uniform.lights.iter_mut().zip(lights) {
            *slot = PointLightUniform {
                position: graph.world_position(id).to_array(),
                intensity: light.intensity,
                color: light.color.to_array(),
                _pad: 0.0,
            };
            uniform.light_count += 1;
        }
        uniform
    }
}

// Shared graphics setup used by native and web
pub struct CameraResources {
    pub camera_buffer: Buffer,
    pub lighting_buffer: Buffer,
    pub bind_group_layout: BindGroupLayout,
    pub camera_bind_group: BindGroup,
}

pub struct PipelineResources {
    pub pipeline: RenderPipeline,
    pub debug_pipeline: RenderPipeline,
}

/// One mesh-carrying node and the uniform holding its world matrix.
struct DrawItem {
    node: NodeId,
    mesh_index: usize,
    model_buffer: Buffer,
    bind_group: BindGroup,
    visible: bool,
}

pub fn create_depth_texture(device: &Device, width: u32, height: u32) -> (Texture, TextureView) {
    let depth_texture = device.create_texture(&TextureDescriptor {
        label: Some("depth_texture"),
        size: Extent3d { width: width.max(1), height: height.max(1), depth_or_array_layers: 1 },
        mip_level_count: 1,
        sample_count: 1,
        dimension: TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let depth_view = depth_texture.create_view(&TextureViewDescriptor::default());
    (depth_texture, depth_view)
}

fn uniform_entry(binding: u32, visibility: ShaderStages) -> BindGroupLayoutEntry {
    BindGroupLayoutEntry {
        binding,
        visibility,
        ty: BindingType::Buffer {
            ty: BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

pub fn create_camera_resources(device: &Device) -> CameraResources {
    let camera_buffer = device.create_buffer(&BufferDescriptor {
        label: Some("camera_buffer"),
        size: std::mem::size_of::<CameraUniform>() as BufferAddress,
        usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let lighting_buffer = device.create_buffer(&BufferDescriptor {
        label: Some("lighting_buffer"),
        size: std::mem::size_of::<LightingUniform>() as BufferAddress,
        usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let bind_group_layout = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
        label: Some("camera_bind_group_layout"),
        entries: &[uniform_entry(0, ShaderStages::VERTEX), uniform_entry(1, ShaderStages::FRAGMENT)],
    });

    let camera_bind_group = device.create_bind_group(&BindGroupDescriptor {
        label: Some("camera_bind_group"),
        layout: &bind_group_layout,
        entries: &[
            BindGroupEntry { binding: 0, resource: camera_buffer.as_entire_binding() },
            BindGroupEntry { binding: 1, resource: lighting_buffer.as_entire_binding() },
        ],
    });

    CameraResources { camera_buffer, lighting_buffer, bind_group_layout, camera_bind_group }
}

pub fn create_model_layout(device: &Device) -> BindGroupLayout {
    device.create_bind_group_layout(&BindGroupLayoutDescriptor {
        label: Some("model_bind_group_layout"),
        entries: &[uniform_entry(0, ShaderStages::VERTEX)],
    })
}

fn create_model_binding(device: &Device, layout: &BindGroupLayout, matrix: Mat4) -> (Buffer, BindGroup) {
    let buffer = device.create_buffer_init(&util::BufferInitDescriptor {
        label: Some("model_buffer"),
        contents: bytemuck::cast_slice(&matrix.to_cols_array_2d()),
        usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
    });
    let bind_group = device.create_bind_group(&BindGroupDescriptor {
        label: Some("model_bind_group"),
        layout,
        entries: &[BindGroupEntry { binding: 0, resource: buffer.as_entire_binding() }],
    });
    (buffer, bind_group)
}

pub fn create_scene_pipelines(
    device: &Device,
    format: TextureFormat,
    camera_layout: &BindGroupLayout,
    model_layout: &BindGroupLayout,
) -> PipelineResources {
    let shader = device.create_shader_module(ShaderModuleDescriptor {
        label: Some("scene_shader"),
        source: ShaderSource::Wgsl(include_str!("shaders/scene.wgsl").into()),
    });

    let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
        label: Some("pipeline_layout"),
        bind_group_layouts: &[camera_layout, model_layout],
        push_constant_ranges: &[],
    });

    let vertex_attributes = [
        VertexAttribute { offset: 0, shader_location: 0, format: VertexFormat::Float32x3 },
        VertexAttribute { offset: 12, shader_location: 1, format: VertexFormat::Float32x3 },
        VertexAttribute { offset: 24, shader_location: 2, format: VertexFormat::Float32x4 },
    ];
    let vertex_layout = VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex>() as BufferAddress,
        step_mode: VertexStepMode::Vertex,
        attributes: &vertex_attributes,
    };

    let build = |label: &str, fragment_entry: &str, depth_write_enabled: bool| {
        device.create_render_pipeline(&RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(&pipeline_layout),
            vertex: VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[vertex_layout.clone()],
                compilation_options: Default::default(),
            },
            fragment: Some(FragmentState {
                module: &shader,
                entry_point: Some(fragment_entry),
                targets: &[Some(ColorTargetState { format, blend: Some(BlendState::ALPHA_BLENDING), write_mask: ColorWrites::ALL })],
                compilation_options: Default::default(),
            }),
            // exported classroom meshes are not consistently wound
            primitive: PrimitiveState {
                topology: PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled,
                depth_compare: CompareFunction::Less,
                stencil: StencilState::default(),
                bias: DepthBiasState::default(),
            }),
            multisample: MultisampleState { count: 1, mask: !0, alpha_to_coverage_enabled: false },
            multiview: None,
            cache: None,
        })
    };

    PipelineResources {
        pipeline: build("scene_pipeline", "fs_main", true),
        debug_pipeline: build("debug_box_pipeline", "fs_unlit", false),
    }
}

/// Translucent boxes for every trigger volume, the door collider and the
/// player body.
pub fn debug_box_mesh(walk: &Walkthrough) -> Mesh {
    let mut mesh = Mesh::empty();
    for trigger in walk.triggers.iter() {
        mesh.push_box(&trigger.volume, TRIGGER_BOX_COLOR);
    }
    if let Some(door) = walk.colliders.door_collider() {
        mesh.push_box(&door.aabb, DOOR_BOX_COLOR);
    }
    if !walk.player_box.is_empty() {
        mesh.push_box(&walk.player_box, PLAYER_BOX_COLOR);
    }
    mesh
}

///////////////////////////////////////////////////////////////////////////////

/// Everything needed to draw the classroom and the egui overlay.
pub struct SceneRenderer {
    pub format: TextureFormat,
    pub alpha_mode: CompositeAlphaMode,
    pub width: u32,
    pub height: u32,

    pipelines: PipelineResources,
    camera: CameraResources,
    model_layout: BindGroupLayout,
    _depth_texture: Texture,
    depth_view: TextureView,

    mesh_buffers: Vec<MeshBuffer>,
    draw_items: Vec<DrawItem>,

    pub show_debug_boxes: bool,
    debug_mesh: Option<MeshBuffer>,
    identity_model: BindGroup,

    // UI
    pub egui_renderer: egui_wgpu::Renderer,
    pub egui_primitives: Option<Vec<egui::ClippedPrimitive>>,
    pub egui_full_output: Option<egui::FullOutput>,
    pub egui_dpr: f32,
}

impl SceneRenderer {
    pub fn new(device: &Device, format: TextureFormat, alpha_mode: CompositeAlphaMode, width: u32, height: u32) -> Self {
        let camera = create_camera_resources(device);
        let model_layout = create_model_layout(device);
        let pipelines = create_scene_pipelines(device, format, &camera.bind_group_layout, &model_layout);
        let (_depth_texture, depth_view) = create_depth_texture(device, width, height);
        let (_, identity_model) = create_model_binding(device, &model_layout, Mat4::IDENTITY);
        let egui_renderer = egui_wgpu::Renderer::new(device, format, egui_wgpu::RendererOptions::default());

        Self {
            format,
            alpha_mode,
            width,
            height,
            pipelines,
            camera,
            model_layout,
            _depth_texture,
            depth_view,
            mesh_buffers: Vec::new(),
            draw_items: Vec::new(),
            show_debug_boxes: false,
            debug_mesh: None,
            identity_model,
            egui_renderer,
            egui_primitives: None,
            egui_full_output: None,
            egui_dpr: 1.0,
        }
    }

    /// Upload every mesh once and allocate a model uniform per mesh node.
    pub fn upload_scene(&mut self, device: &Device, meshes: &[Mesh], graph: &SceneGraph) {
        self.mesh_buffers = meshes.iter().map(|m| m.upload(device)).collect();
        self.draw_items = graph
            .nodes()
            .filter_map(|(id, node)| node.mesh.map(|m| (id, m.mesh_index)))
            .filter(|&(_, mesh_index)| mesh_index < self.mesh_buffers.len())
            .map(|(node, mesh_index)| {
                let (model_buffer, bind_group) = create_model_binding(device, &self.model_layout, graph.world_matrix(node));
                DrawItem { node, mesh_index, model_buffer, bind_group, visible: true }
            })
            .collect();

        debug!(meshes = self.mesh_buffers.len(), draw_items = self.draw_items.len(), "scene uploaded");
    }

    pub fn resize(&mut self, device: &Device, surface: &Surface, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.width = width;
        self.height = height;
        surface.configure(device, &self.surface_config());
        let (texture, view) = create_depth_texture(device, width, height);
        self._depth_texture = texture;
        self.depth_view = view;
    }

    fn surface_config(&self) -> SurfaceConfiguration {
        SurfaceConfiguration {
            usage: TextureUsages::RENDER_ATTACHMENT,
            format: self.format,
            width: self.width,
            height: self.height,
            present_mode: PresentMode::Fifo,
            alpha_mode: self.alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        }
    }

    /// Push this frame's camera, lights, node transforms and visibility.
    pub fn prepare(&mut self, device: &Device, queue: &Queue, walk: &Walkthrough) {
        let camera = CameraUniform { view_proj: walk.camera.view_proj().to_cols_array_2d() };
        queue.write_buffer(&self.camera.camera_buffer, 0, bytemuck::bytes_of(&camera));

        let lighting = LightingUniform::from_graph(&walk.graph, walk.anchors.classroom_lights());
        queue.write_buffer(&self.camera.lighting_buffer, 0, bytemuck::bytes_of(&lighting));

        for item in &mut self.draw_items {
            item.visible = walk.graph.is_effectively_visible(item.node);
            if item.visible {
                let model = walk.graph.world_matrix(item.node).to_cols_array_2d();
                queue.write_buffer(&item.model_buffer, 0, bytemuck::cast_slice(&model));
            }
        }

        self.debug_mesh = if self.show_debug_boxes {
            let mesh = debug_box_mesh(walk);
            (!mesh.is_empty()).then(|| mesh.upload(device))
        } else {
            None
        };
    }

    fn acquire_frame(&self, device: &Device, surface: &Surface) -> Option<SurfaceTexture> {
        match surface.get_current_texture() {
            Ok(frame) => Some(frame),
            Err(SurfaceError::Lost | SurfaceError::Outdated) => {
                surface.configure(device, &self.surface_config());
                surface
                    .get_current_texture()
                    .map_err(|e| warn!("failed to acquire frame after reconfigure: {e:?}"))
                    .ok()
            }
            Err(e) => {
                warn!("surface error: {e:?}");
                None
            }
        }
    }

    pub fn draw_frame(&mut self, device: &Device, queue: &Queue, surface: &Surface) {
        let Some(frame) = self.acquire_frame(device, surface) else {
            return;
        };

        let view = frame.texture.create_view(&TextureViewDescriptor::default());
        let mut encoder = device.create_command_encoder(&CommandEncoderDescriptor {
            label: Some("encoder"),
        });

        {
            let mut rp = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("render_pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Clear(Color {
                            r: 0.05,
                            g: 0.05,
                            b: 0.07,
                            a: 1.0,
                        }),
                        store: StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(Operations {
                        load: LoadOp::Clear(1.0),
                        store: StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            rp.set_pipeline(&self.pipelines.pipeline);
            rp.set_bind_group(0, &self.camera.camera_bind_group, &[]);

            for item in self.draw_items.iter().filter(|item| item.visible) {
                let mesh_buffer = &self.mesh_buffers[item.mesh_index];
                if mesh_buffer.index_count == 0 {
                    continue;
                }
                rp.set_bind_group(1, &item.bind_group, &[]);
                rp.set_vertex_buffer(0, mesh_buffer.vertex_buffer.slice(..));
                rp.set_index_buffer(mesh_buffer.index_buffer.slice(..), IndexFormat::Uint32);
                rp.draw_indexed(0..mesh_buffer.index_count, 0, 0..1);
            }

            // Boxes are already in world space
            if let Some(debug_mesh) = &self.debug_mesh {
                rp.set_pipeline(&self.pipelines.debug_pipeline);
                rp.set_bind_group(1, &self.identity_model, &[]);
                rp.set_vertex_buffer(0, debug_mesh.vertex_buffer.slice(..));
                rp.set_index_buffer(debug_mesh.index_buffer.slice(..), IndexFormat::Uint32);
                rp.draw_indexed(0..debug_mesh.index_count, 0, 0..1);
            }
        }

        if let (Some(egui_primitives), Some(egui_full_output)) = (self.egui_primitives.take(), self.egui_full_output.take()) {
            let screen_descriptor = egui_wgpu::ScreenDescriptor {
                size_in_pixels: [self.width, self.height],
                pixels_per_point: self.egui_dpr,
            };

            // Upload egui textures
            for (id, image_delta) in &egui_full_output.textures_delta.set {
                self.egui_renderer.update_texture(device, queue, *id, image_delta);
            }

            // Update egui buffers
            self.egui_renderer
                .update_buffers(device, queue, &mut encoder, &egui_primitives, &screen_descriptor);

            // Render egui overlay
            {
                let egui_pass = encoder.begin_render_pass(&RenderPassDescriptor {
                    label: Some("egui_render_pass"),
                    color_attachments: &[Some(RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: Operations {
                            load: LoadOp::Load,
                            store: StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                });

                self.egui_renderer
                    .render(&mut egui_pass.forget_lifetime(), &egui_primitives, &screen_descriptor);
            }

            // Free egui textures
            for id in &egui_full_output.textures_delta.free {
                self.egui_renderer.free_texture(id);
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
        frame.present();
    }
}
