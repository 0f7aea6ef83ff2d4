use parking_lot::Mutex;
use std::future::Future;
use std::rc::Rc;
use std::sync::Arc;
use wgpu::WasmNotSend;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::window::{Window, WindowId};

pub fn run<T: App + 'static>(title: &'static str) -> Result<(), impl std::error::Error> {
    init_logger();

    let events_loop = EventLoop::new().unwrap();
    let mut app = AppHandler::<T>::new(title);
    events_loop.run_app(&mut app)
}

pub trait App {
    #[allow(opaque_hidden_inferred_bound)]
    fn new(window: Arc<Window>) -> impl Future<Output = Self> + WasmNotSend;

    /// Records that the window size changed; the surface is reconfigured
    /// lazily on the next redraw, not here.
    ///
    /// # NOTE:
    /// While a browser window is being resized, size events arrive faster
    /// than the render rate; reconfiguring the surface on every one of them
    /// makes the canvas flicker.
    fn set_window_resized(&mut self, new_size: PhysicalSize<u32>);

    fn keyboard_input(&mut self, _event: &KeyEvent) -> bool {
        false
    }

    /// Advance per-frame state.
    fn update(&mut self, _dt: instant::Duration) {}

    /// Submit a frame.
    fn render(&mut self) -> Result<(), wgpu::SurfaceError>;
}

pub struct AppHandler<T: App> {
    window: Option<Arc<Window>>,
    title: &'static str,
    app: Rc<Mutex<Option<T>>>,
    /// Resize that arrived before the app finished initializing.
    ///
    /// # NOTE
    /// On the web the app initializes asynchronously, so a resized event can
    /// land before there is an app to deliver it to; once initialization
    /// completes, `set_window_resized` is called with the missed size.
    #[allow(dead_code)]
    missed_resize: Rc<Mutex<Option<PhysicalSize<u32>>>>,
    /// Redraw request that arrived before the app finished initializing.
    ///
    /// # NOTE
    /// Same async-init window as `missed_resize`: replayed after init to
    /// kick off the requestAnimationFrame loop.
    #[allow(dead_code)]
    missed_request_redraw: Rc<Mutex<bool>>,
    /// When the previous frame was rendered.
    last_render_time: instant::Instant,
}

impl<T: App> AppHandler<T> {
    pub fn new(title: &'static str) -> AppHandler<T> {
        AppHandler {
            title,
            window: None,
            app: Rc::new(Mutex::new(None)),
            missed_resize: Rc::new(Mutex::new(None)),
            missed_request_redraw: Rc::new(Mutex::new(false)),
            last_render_time: instant::Instant::now(),
        }
    }

    fn config_window(&mut self) {
        let window = self.window.as_mut().unwrap();
        window.set_title(self.title);

        #[cfg(target_arch = "wasm32")]
        {
            use winit::platform::web::WindowExtWebSys;

            let canvas = window.canvas().unwrap();

            // Attach the canvas to the page.
            web_sys::window()
                .and_then(|win| win.document())
                .map(|doc| {
                    doc.body().map(|body| body.append_child(canvas.as_ref()));
                })
                .expect("couldn't append canvas to document body");

            // Make the canvas focusable so it receives keyboard events.
            // https://developer.mozilla.org/en-US/docs/Web/HTML/Global_attributes/tabindex
            canvas.set_tab_index(0);

            let style = canvas.style();
            style.set_property("outline", "none").unwrap();
            style.set_property("width", "800px").unwrap();
            style.set_property("height", "600px").unwrap();
            canvas.focus().expect("couldn't focus the canvas");
        }
    }

    /// Notify the windowing system right before presenting.
    fn pre_present_notify(&self) {
        if let Some(window) = self.window.as_ref() {
            window.pre_present_notify();
        }
    }

    fn request_redraw(&self) {
        if let Some(window) = self.window.as_ref() {
            window.request_redraw();
        }
    }
}

impl<T: App + 'static> ApplicationHandler for AppHandler<T> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        log::info!("winit application resumed!");
        if self.app.as_ref().lock().is_some() {
            return;
        }

        self.last_render_time = instant::Instant::now();

        let window_attributes = Window::default_attributes();
        let window = Arc::new(event_loop.create_window(window_attributes).unwrap());
        self.window = Some(window.clone());
        self.config_window();

        #[cfg(target_arch = "wasm32")]
        {
            let app = self.app.clone();
            let missed_resize = self.missed_resize.clone();
            let missed_request_redraw = self.missed_request_redraw.clone();

            wasm_bindgen_futures::spawn_local(async move {
                let window_cloned = window.clone();

                // NOTE create the inner app first and only then take the
                // lock; the other order deadlocks on platforms where
                // parking is unsupported.
                let inner_app = T::new(window).await;
                let mut app = app.lock();
                *app = Some(inner_app);

                if let Some(resize) = *missed_resize.lock() {
                    app.as_mut().unwrap().set_window_resized(resize);
                }

                if *missed_request_redraw.lock() {
                    window_cloned.request_redraw();
                }
            });
        }
        #[cfg(not(target_arch = "wasm32"))]
        {
            let app = pollster::block_on(T::new(window));
            self.app.lock().replace(app);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let mut app = self.app.lock();

        if app.as_ref().is_none() {
            // App not initialized yet: remember the events it missed.
            match event {
                WindowEvent::Resized(physical_size) => {
                    if physical_size.width > 0 && physical_size.height > 0 {
                        let mut missed_resize = self.missed_resize.lock();
                        *missed_resize = Some(physical_size);
                    }
                }
                WindowEvent::RedrawRequested => {
                    let mut missed_request_redraw = self.missed_request_redraw.lock();
                    *missed_request_redraw = true;
                }
                _ => (),
            }
            return;
        }

        let app = app.as_mut().unwrap();
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                if physical_size.width == 0 || physical_size.height == 0 {
                    // Minimized: the app keeps updating but skips rendering.
                    log::info!("Window minimized!");
                } else {
                    log::info!("Window resized: {:?}", physical_size);
                }
                // Web surfaces cap out at 2048x2048.
                #[cfg(target_arch = "wasm32")]
                let physical_size = PhysicalSize::new(
                    physical_size.width.min(2048),
                    physical_size.height.min(2048),
                );

                app.set_window_resized(physical_size);
            }
            WindowEvent::KeyboardInput { event, .. } => {
                let _ = app.keyboard_input(&event);
            }
            WindowEvent::RedrawRequested => {
                let now = instant::Instant::now();
                let delta = now - self.last_render_time;
                self.last_render_time = now;

                app.update(delta);

                self.pre_present_notify();

                match app.render() {
                    Ok(_) => {}
                    // A lost surface needs reconfiguring.
                    Err(wgpu::SurfaceError::Lost) => log::error!("Surface is lost"),
                    // Other errors (outdated, timeout, ...) resolve themselves
                    // by the next frame.
                    Err(e) => log::error!("{e:?}"),
                }

                // RedrawRequested only fires once unless we ask again.
                self.request_redraw();
            }
            _ => (),
        }
    }
}

fn init_logger() {
    #[cfg(target_arch = "wasm32")]
    {
        // fern rather than console_log directly, for per-module filtering.
        fern::Dispatch::new()
            .level(log::LevelFilter::Info)
            .level_for("wgpu_core", log::LevelFilter::Info)
            .level_for("wgpu_hal", log::LevelFilter::Error)
            .level_for("naga", log::LevelFilter::Error)
            .chain(fern::Output::call(console_log::log))
            .apply()
            .unwrap();
        std::panic::set_hook(Box::new(console_error_panic_hook::hook));
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        // parse_default_env reads RUST_LOG on top of these defaults.
        env_logger::builder()
            .filter_level(log::LevelFilter::Info)
            .filter_module("wgpu_core", log::LevelFilter::Info)
            .filter_module("wgpu_hal", log::LevelFilter::Error)
            .filter_module("naga", log::LevelFilter::Error)
            .parse_default_env()
            .init();
    }
}
