// Re-export all public modules so they can be used from main.rs
pub mod config;
pub mod error;
pub mod logging;
pub mod utils;
pub mod ui;

// MVC Architecture
pub mod model;
pub mod view;
pub mod controller;

#[cfg(target_arch = "wasm32")]
pub use web::start;

#[cfg(target_arch = "wasm32")]
mod web {
    use std::cell::RefCell;
    use std::rc::Rc;

    use tracing::{error, info, warn};
    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::{prelude::wasm_bindgen, JsCast, JsValue};
    use web_sys::{Document, Event, HtmlCanvasElement, HtmlElement, KeyboardEvent, MouseEvent, Window};

    use crate::config::WalkthroughConfig;
    use crate::controller::input::wasm::{keyboard_event_to_input, mouse_move_to_input};
    use crate::controller::{InputEvent, InputProcessor, InputState, Walkthrough};
    use crate::model::loader::fetch_scene;
    use crate::view::{GpuContext, SceneRenderer};
    use crate::{logging, ui};

    /// Element the page may provide for the interaction hint.
    const HINT_ELEMENT_ID: &str = "pressE";

    /// Everything the frame callback touches.
    struct WebApp {
        gpu: GpuContext,
        renderer: SceneRenderer,
        walk: Walkthrough,
        egui_ctx: egui::Context,
        hint_el: Option<HtmlElement>,
        shown_hint: Option<bool>,
        last_time: f64,
    }

    impl WebApp {
        /// Mirror the hint flag onto the page element, touching the DOM only on change.
        fn sync_hint(&mut self) {
            let Some(el) = &self.hint_el else { return };
            let visible = self.walk.hint_visible;
            if self.shown_hint == Some(visible) {
                return;
            }
            let display = if visible { "block" } else { "none" };
            if let Err(e) = el.style().set_property("display", display) {
                warn!("failed to update hint element: {e:?}");
            }
            self.shown_hint = Some(visible);
        }

        fn frame(&mut self, window: &Window, input: &mut InputState) {
            let now = window.performance().map(|p| p.now()).unwrap_or(0.0);
            let dt = ((now - self.last_time) / 1000.0) as f32;
            self.last_time = now;

            self.walk.update(input);
            self.sync_hint();

            self.renderer.show_debug_boxes = input.show_debug_boxes;
            self.renderer.prepare(&self.gpu.device, &self.gpu.queue, &self.walk);

            // Build egui input
            let dpr = window.device_pixel_ratio() as f32;
            let mut raw_input = egui::RawInput::default();
            raw_input.time = Some(now / 1000.0);
            raw_input.screen_rect = Some(egui::Rect::from_min_size(
                egui::Pos2::new(0.0, 0.0),
                egui::vec2(self.renderer.width as f32 / dpr, self.renderer.height as f32 / dpr),
            ));
            self.egui_ctx.set_pixels_per_point(dpr);

            let mut full_output = ui::build_ui(&self.egui_ctx, raw_input, &self.walk, input, self.hint_el.is_none(), dt);
            let primitives = self.egui_ctx.tessellate(std::mem::take(&mut full_output.shapes), dpr);
            self.renderer.egui_primitives = Some(primitives);
            self.renderer.egui_full_output = Some(full_output);
            self.renderer.egui_dpr = dpr;

            self.renderer.draw_frame(&self.gpu.device, &self.gpu.queue, &self.gpu.surface);
        }

        fn resize(&mut self, width: u32, height: u32) {
            self.renderer.resize(&self.gpu.device, &self.gpu.surface, width, height);
            self.walk.resize(width, height);
        }
    }

    #[wasm_bindgen(start)]
    pub async fn start() -> Result<(), JsValue> {
        logging::init();
        let (window, document, canvas) = init_canvas()?;
        setup_app(window, document, canvas).await
    }

    /// Main application setup for WASM
    async fn setup_app(window: Window, document: Document, canvas: HtmlCanvasElement) -> Result<(), JsValue> {
        let (width, height) = (canvas.width(), canvas.height());
        let gpu = GpuContext::new(&canvas, width, height)
            .await
            .map_err(|e| js_error(format!("GPU init failed: {e}")))?;

        let config = WalkthroughConfig::default();
        let scene_path = config.scene_path.clone();
        let renderer = SceneRenderer::new(gpu.device.as_ref(), gpu.format, gpu.config.alpha_mode, width, height);
        let walk = Walkthrough::new(config, width, height);

        let hint_el = document
            .get_element_by_id(HINT_ELEMENT_ID)
            .and_then(|el| el.dyn_into::<HtmlElement>().ok());
        if hint_el.is_none() {
            info!("no #{HINT_ELEMENT_ID} element on the page, drawing the hint in the overlay");
        }

        let input_processor = walk.input_processor.clone();
        let app = Rc::new(RefCell::new(WebApp {
            gpu,
            renderer,
            walk,
            egui_ctx: egui::Context::default(),
            hint_el,
            shown_hint: None,
            last_time: window.performance().map(|p| p.now()).unwrap_or(0.0),
        }));
        let input_state = Rc::new(RefCell::new(InputState::new()));

        setup_input_listeners(&document, &window, &canvas, input_state.clone(), input_processor)?;
        setup_resize_listener(&window, &canvas, app.clone())?;

        // The walkthrough runs inert until the scene arrives
        {
            let app = app.clone();
            wasm_bindgen_futures::spawn_local(async move {
                match fetch_scene(&scene_path).await {
                    Ok(loaded) => {
                        let mut app = app.borrow_mut();
                        let app = &mut *app;
                        app.renderer.upload_scene(app.gpu.device.as_ref(), &loaded.meshes, &loaded.graph);
                        app.walk.install_scene(loaded.graph);
                    }
                    Err(e) => error!(path = %scene_path, "failed to load scene: {e}"),
                }
            });
        }

        // Continuous redraw using requestAnimationFrame
        let f = RcCellCallback::new(window.clone(), {
            let window_for_loop = window.clone();
            move || {
                let mut input = input_state.borrow_mut();
                app.borrow_mut().frame(&window_for_loop, &mut input);
            }
        });
        f.start();

        Ok(())
    }

    /// Wire DOM events into the shared input state
    fn setup_input_listeners(
        document: &Document,
        window: &Window,
        canvas: &HtmlCanvasElement,
        input_state: Rc<RefCell<InputState>>,
        input_processor: InputProcessor,
    ) -> Result<(), JsValue> {
        // Keyboard down
        {
            let input_state = input_state.clone();
            let input_processor = input_processor.clone();
            let document_for_exit = document.clone();
            let keydown = Closure::wrap(Box::new(move |e: KeyboardEvent| {
                let key = e.key();
                if input_processor.is_escape(&key) {
                    document_for_exit.exit_pointer_lock();
                }
                // Keep WASD from scrolling the page
                if input_processor.is_movement(&key) {
                    e.prevent_default();
                }
                input_state.borrow_mut().process_event(&keyboard_event_to_input(&e, true), &input_processor);
            }) as Box<dyn FnMut(KeyboardEvent)>);
            document.add_event_listener_with_callback("keydown", keydown.as_ref().unchecked_ref())?;
            keydown.forget();
        }

        // Keyboard up
        {
            let input_state = input_state.clone();
            let input_processor = input_processor.clone();
            let keyup = Closure::wrap(Box::new(move |e: KeyboardEvent| {
                input_state.borrow_mut().process_event(&keyboard_event_to_input(&e, false), &input_processor);
            }) as Box<dyn FnMut(KeyboardEvent)>);
            document.add_event_listener_with_callback("keyup", keyup.as_ref().unchecked_ref())?;
            keyup.forget();
        }

        // Focus loss - clear all keys
        {
            let input_state = input_state.clone();
            let input_processor = input_processor.clone();
            let blur = Closure::wrap(Box::new(move |_e: Event| {
                input_state.borrow_mut().process_event(&InputEvent::FocusLost, &input_processor);
            }) as Box<dyn FnMut(Event)>);
            window.add_event_listener_with_callback("blur", blur.as_ref().unchecked_ref())?;
            blur.forget();
        }

        // Visibility change - clear all keys
        {
            let input_state = input_state.clone();
            let input_processor = input_processor.clone();
            let doc_vis = document.clone();
            let visibility = Closure::wrap(Box::new(move |_e: Event| {
                let event = InputEvent::VisibilityChanged { visible: !doc_vis.hidden() };
                input_state.borrow_mut().process_event(&event, &input_processor);
            }) as Box<dyn FnMut(Event)>);
            document.add_event_listener_with_callback("visibilitychange", visibility.as_ref().unchecked_ref())?;
            visibility.forget();
        }

        // Pointer lock change
        {
            let input_state = input_state.clone();
            let input_processor = input_processor.clone();
            let doc_pl = document.clone();
            let plc = Closure::wrap(Box::new(move |_e: Event| {
                let event = InputEvent::PointerLockChanged { locked: doc_pl.pointer_lock_element().is_some() };
                input_state.borrow_mut().process_event(&event, &input_processor);
            }) as Box<dyn FnMut(Event)>);
            document.add_event_listener_with_callback("pointerlockchange", plc.as_ref().unchecked_ref())?;
            plc.forget();
        }

        // Canvas click to enter pointer lock
        {
            let canvas_click = canvas.clone();
            let click = Closure::wrap(Box::new(move |_e: MouseEvent| {
                canvas_click.request_pointer_lock();
            }) as Box<dyn FnMut(MouseEvent)>);
            canvas.add_event_listener_with_callback("click", click.as_ref().unchecked_ref())?;
            click.forget();
        }

        // Mouse move
        {
            let mm = Closure::wrap(Box::new(move |e: MouseEvent| {
                input_state.borrow_mut().process_event(&mouse_move_to_input(&e), &input_processor);
            }) as Box<dyn FnMut(MouseEvent)>);
            document.add_event_listener_with_callback("mousemove", mm.as_ref().unchecked_ref())?;
            mm.forget();
        }

        Ok(())
    }

    fn setup_resize_listener(window: &Window, canvas: &HtmlCanvasElement, app: Rc<RefCell<WebApp>>) -> Result<(), JsValue> {
        let window_for_resize = window.clone();
        let canvas = canvas.clone();
        let resize = Closure::wrap(Box::new(move |_e: Event| {
            let (width, height) = canvas_size(&window_for_resize);
            canvas.set_width(width);
            canvas.set_height(height);
            app.borrow_mut().resize(width, height);
        }) as Box<dyn FnMut(Event)>);
        window.add_event_listener_with_callback("resize", resize.as_ref().unchecked_ref())?;
        resize.forget();
        Ok(())
    }

    /// Window size in physical pixels.
    fn canvas_size(window: &Window) -> (u32, u32) {
        let dpr = window.device_pixel_ratio();
        let css = |v: Result<JsValue, JsValue>, fallback: f64| v.ok().and_then(|v| v.as_f64()).unwrap_or(fallback);
        let width = css(window.inner_width(), 800.0) * dpr;
        let height = css(window.inner_height(), 600.0) * dpr;
        (width.max(1.0) as u32, height.max(1.0) as u32)
    }

    /// Full-window canvas appended to the body.
    fn init_canvas() -> Result<(Window, Document, HtmlCanvasElement), JsValue> {
        let window = web_sys::window().ok_or(js_error("no global `window`"))?;
        let document = window.document().ok_or(js_error("no document on window"))?;
        let body = document.body().ok_or(js_error("no body on document"))?;
        body.style().set_property("margin", "0")?;
        body.style().set_property("overflow", "hidden")?;

        let canvas_el = document
            .create_element("canvas")?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| js_error("failed to create canvas"))?;
        let (width, height) = canvas_size(&window);
        canvas_el.set_width(width);
        canvas_el.set_height(height);
        canvas_el.style().set_property("display", "block")?;
        canvas_el.style().set_property("width", "100vw")?;
        canvas_el.style().set_property("height", "100vh")?;
        body.append_child(&canvas_el)?;
        Ok((window, document, canvas_el))
    }

    fn js_error<E: Into<String>>(msg: E) -> JsValue {
        JsValue::from_str(&msg.into())
    }

    struct RcCellCallback {
        inner: Rc<RefCell<Box<dyn FnMut()>>>,
        window: Window,
    }

    impl RcCellCallback {
        fn new(window: Window, f: impl FnMut() + 'static) -> Self {
            Self {
                inner: Rc::new(RefCell::new(Box::new(f))),
                window,
            }
        }

        fn start(self) {
            let inner = self.inner.clone();
            let window = self.window.clone();

            let callback = Rc::new(RefCell::new(None::<Closure<dyn FnMut()>>));
            let callback_clone = callback.clone();

            *callback.borrow_mut() = Some(Closure::wrap(Box::new(move || {
                inner.borrow_mut().as_mut()();

                // Recursively schedule next frame
                if let Some(cb) = callback_clone.borrow().as_ref() {
                    if let Err(e) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                        error!("requestAnimationFrame failed, stopping the frame loop: {e:?}");
                    }
                }
            }) as Box<dyn FnMut()>));

            if let Some(cb) = callback.borrow().as_ref() {
                if let Err(e) = self.window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                    error!("requestAnimationFrame failed to start: {e:?}");
                }
            }

            // Leak the closure to keep it alive
            std::mem::forget(callback);
        }
    }
}
