use winit::{
    event::*,
    event_loop::EventLoop,
    keyboard::{Key, NamedKey},
    window::{CursorGrabMode, Window},
};
use std::sync::Arc;
use tracing::{error, info, warn};

// Import from the library crate
use classroom_walkthrough::{
    config::WalkthroughConfig,
    controller::{InputEvent, InputState, Walkthrough},
    logging,
    model::loader::load_scene_file,
    ui,
    view::{GpuContext, SceneRenderer},
};

struct App {
    window: Arc<Window>,
    gpu: GpuContext,
    renderer: SceneRenderer,

    // egui
    egui_state: egui_winit::State,
    egui_ctx: egui::Context,

    walk: Walkthrough,
    input_state: InputState,

    // Frame timing
    last_frame_time: std::time::Instant,
}

/// Web-style key name so one set of bindings serves both hosts.
fn key_name(key: &Key) -> Option<String> {
    match key {
        Key::Character(s) => Some(s.to_string()),
        Key::Named(NamedKey::Escape) => Some("Escape".to_string()),
        Key::Named(NamedKey::Space) => Some(" ".to_string()),
        Key::Named(named) => Some(format!("{named:?}")),
        _ => None,
    }
}

impl App {
    async fn new(window: Arc<Window>, config: WalkthroughConfig) -> Result<Self, classroom_walkthrough::error::GpuInitError> {
        let size = window.inner_size();
        let gpu = GpuContext::new_native(window.clone(), size.width, size.height).await?;
        let renderer = SceneRenderer::new(&gpu.device, gpu.format, gpu.config.alpha_mode, gpu.config.width, gpu.config.height);

        // Initialize egui
        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            None,
            None,
            None,
        );

        let scene_path = config.scene_path.clone();
        let mut app = Self {
            walk: Walkthrough::new(config, gpu.config.width, gpu.config.height),
            window,
            gpu,
            renderer,
            egui_state,
            egui_ctx,
            input_state: InputState::new(),
            last_frame_time: std::time::Instant::now(),
        };

        // A missing or broken scene leaves an empty, walkable world
        match load_scene_file(&scene_path) {
            Ok(loaded) => {
                app.renderer.upload_scene(&app.gpu.device, &loaded.meshes, &loaded.graph);
                app.walk.install_scene(loaded.graph);
            }
            Err(e) => error!(path = %scene_path, "failed to load scene: {e}"),
        }

        Ok(app)
    }

    fn push_input(&mut self, event: InputEvent) {
        self.input_state.process_event(&event, &self.walk.input_processor);
    }

    fn set_pointer_locked(&mut self, locked: bool) {
        if locked {
            // Not every platform supports a locked cursor
            let grabbed = self
                .window
                .set_cursor_grab(CursorGrabMode::Locked)
                .or_else(|_| self.window.set_cursor_grab(CursorGrabMode::Confined));
            if let Err(e) = grabbed {
                warn!("cursor grab failed: {e}");
                return;
            }
        } else {
            let _ = self.window.set_cursor_grab(CursorGrabMode::None);
        }
        self.window.set_cursor_visible(!locked);
        self.push_input(InputEvent::PointerLockChanged { locked });
    }

    fn input(&mut self, event: &WindowEvent) -> bool {
        // egui only gets input while the cursor is free
        if !self.input_state.pointer_locked && self.egui_state.on_window_event(self.window.as_ref(), event).consumed {
            return true;
        }

        match event {
            WindowEvent::KeyboardInput { event: KeyEvent { state, logical_key, repeat, .. }, .. } => {
                let Some(key) = key_name(logical_key) else { return true };
                match state {
                    ElementState::Pressed => {
                        if self.walk.input_processor.is_escape(&key) {
                            self.set_pointer_locked(false);
                        }
                        self.push_input(InputEvent::KeyDown { key, repeat: *repeat });
                    }
                    ElementState::Released => self.push_input(InputEvent::KeyUp(key)),
                }
                true
            }
            WindowEvent::MouseInput { state: ElementState::Pressed, button: MouseButton::Left, .. } => {
                if !self.input_state.pointer_locked {
                    self.set_pointer_locked(true);
                }
                true
            }
            WindowEvent::Focused(false) => {
                self.push_input(InputEvent::FocusLost);
                self.set_pointer_locked(false);
                true
            }
            WindowEvent::Occluded(occluded) => {
                self.push_input(InputEvent::VisibilityChanged { visible: !occluded });
                true
            }
            _ => false,
        }
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        self.renderer.resize(&self.gpu.device, &self.gpu.surface, new_size.width, new_size.height);
        if new_size.width > 0 && new_size.height > 0 {
            self.walk.resize(new_size.width, new_size.height);
        }
    }

    fn handle_mouse_motion(&mut self, dx: f64, dy: f64) {
        self.push_input(InputEvent::MouseMove { dx: dx as f32, dy: dy as f32 });
    }

    fn update(&mut self, dt: f32) {
        self.walk.update(&mut self.input_state);
        self.renderer.show_debug_boxes = self.input_state.show_debug_boxes;
        self.renderer.prepare(&self.gpu.device, &self.gpu.queue, &self.walk);

        let raw_input = self.egui_state.take_egui_input(&self.window);
        let mut output = ui::build_ui(&self.egui_ctx, raw_input, &self.walk, &self.input_state, true, dt);
        self.egui_state.handle_platform_output(&self.window, std::mem::take(&mut output.platform_output));

        let dpr = self.window.scale_factor() as f32;
        let primitives = self.egui_ctx.tessellate(std::mem::take(&mut output.shapes), dpr);
        self.renderer.egui_primitives = Some(primitives);
        self.renderer.egui_full_output = Some(output);
        self.renderer.egui_dpr = dpr;
    }

    fn render(&mut self) {
        self.renderer.draw_frame(&self.gpu.device, &self.gpu.queue, &self.gpu.surface);
    }
}

#[allow(deprecated)]
fn main() {
    logging::init();

    let config = WalkthroughConfig::from_env();
    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            error!("failed to create event loop: {e}");
            return;
        }
    };
    let window_attributes = Window::default_attributes()
        .with_title("Classroom Walkthrough")
        .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));
    let window = match event_loop.create_window(window_attributes) {
        Ok(window) => Arc::new(window),
        Err(e) => {
            error!("failed to create window: {e}");
            return;
        }
    };

    let mut app = match pollster::block_on(App::new(window, config)) {
        Ok(app) => app,
        Err(e) => {
            error!("GPU init failed: {e}");
            return;
        }
    };
    info!("walkthrough ready, click the window to look around");

    let result = event_loop.run(move |event, elwt| {
        match event {
            Event::WindowEvent {
                ref event,
                window_id,
            } if window_id == app.window.id() => {
                if !app.input(event) {
                    match event {
                        WindowEvent::CloseRequested => elwt.exit(),
                        WindowEvent::Resized(physical_size) => {
                            app.resize(*physical_size);
                        }
                        WindowEvent::RedrawRequested => {
                            let now = std::time::Instant::now();
                            let dt = (now - app.last_frame_time).as_secs_f32();
                            app.last_frame_time = now;

                            app.update(dt);
                            app.render();
                        }
                        _ => {}
                    }
                }
            }
            Event::DeviceEvent { event: DeviceEvent::MouseMotion { delta }, .. } => {
                app.handle_mouse_motion(delta.0, delta.1);
            }
            Event::AboutToWait => {
                app.window.request_redraw();
            }
            _ => {}
        }
    });
    if let Err(e) = result {
        error!("event loop error: {e}");
    }
}
