//! Application event loop.
//!
//! [`run`] opens a window (the `canvas.webgl` element on the web), creates the
//! GPU context and drives a [`RenderLoop`] from winit redraw requests. Scene
//! textures stream in alongside: the first frames sample neutral fallbacks and
//! every image is bound as soon as it has decoded.
//!
//! # Lifecycle
//!
//! 1. `resumed` creates the window, starts the texture loader and the GPU
//!    setup. Native builds load on a dedicated thread driven by the tokio
//!    runtime and block on the GPU setup; web builds spawn both on the page's
//!    executor. Results come back as [`SceneEvent`]s.
//! 2. Once a [`Session`] exists, window events are routed to the viewport,
//!    the orbit controls and the debug panel.
//! 3. Every `RedrawRequested` runs one [`RenderLoop::tick`], which requests
//!    the next redraw itself.
//! 4. Every [`SceneEvent::TextureSettled`] lands in the [`TextureLibrary`]
//!    and rebinds whatever samples that texture.

use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy},
    keyboard::PhysicalKey,
    window::Window,
};

use crate::{
    config::SceneConfig,
    context::Context,
    frame::{RenderLoop, WindowScheduler},
    render::GpuRenderer,
    resources::{
        LoadingManager, TextureLibrary, TextureOutcome, stream_scene_textures, texture_requests,
    },
    state::AppContext,
};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Everything that exists once setup has finished.
pub struct Session {
    pub app: AppContext,
    renderer: GpuRenderer,
    render_loop: RenderLoop<WindowScheduler>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("app", &self.app)
            .field("renderer", &self.renderer)
            .field("frames", &self.render_loop.frames())
            .finish()
    }
}

impl Session {
    async fn new(window: Arc<Window>, config: SceneConfig) -> anyhow::Result<Self> {
        let gpu = Context::new(window.clone()).await?;
        let app = AppContext::new(&config, gpu.size());
        // Nothing has arrived yet; the library only knows the sampler settings.
        let pending = TextureLibrary::expecting(&texture_requests(&config));
        let renderer = GpuRenderer::new(gpu, &app.scene, &pending);
        let render_loop = RenderLoop::start(WindowScheduler(window));
        Ok(Self {
            app,
            renderer,
            render_loop,
        })
    }

    fn window(&self) -> &Arc<Window> {
        self.renderer.context().window()
    }

    fn sync_textures(&mut self, library: &TextureLibrary) {
        self.renderer.sync_textures(&self.app.scene, library);
    }
}

#[derive(Debug)]
pub(crate) enum SceneEvent {
    TextureSettled(TextureOutcome),
    #[cfg(target_arch = "wasm32")]
    Initialized(Box<Session>),
}

pub struct App {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    proxy: EventLoopProxy<SceneEvent>,
    // Taken once the window exists.
    config: Option<SceneConfig>,
    library: TextureLibrary,
    session: Option<Session>,
}

impl App {
    fn new(event_loop: &EventLoop<SceneEvent>, config: SceneConfig) -> anyhow::Result<Self> {
        let proxy = event_loop.create_proxy();
        #[cfg(not(target_arch = "wasm32"))]
        let async_runtime = tokio::runtime::Runtime::new()?;
        let library = TextureLibrary::expecting(&texture_requests(&config));
        Ok(Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime,
            proxy,
            config: Some(config),
            library,
            session: None,
        })
    }

    fn start(&mut self, mut session: Session) {
        let size = session.window().inner_size();
        log::info!("scene ready at {}x{}", size.width, size.height);
        // Textures that settled while the GPU was being set up.
        session.sync_textures(&self.library);
        self.session = Some(session);
    }

    fn settle(&mut self, outcome: TextureOutcome) {
        if let TextureOutcome::Failed(request) = &outcome {
            log::warn!(
                "{:?} texture unavailable, keeping its fallback ({})",
                request.key,
                request.url
            );
        }
        self.library.record(outcome);
        if let Some(session) = &mut self.session {
            session.sync_textures(&self.library);
        }
    }

    fn spawn_texture_loader(&self, config: SceneConfig) {
        let proxy = self.proxy.clone();

        #[cfg(not(target_arch = "wasm32"))]
        {
            // The loading manager is single threaded, so the batch gets a
            // thread of its own while file reads run on the runtime.
            let handle = self.async_runtime.handle().clone();
            let spawned = std::thread::Builder::new()
                .name("texture-loader".into())
                .spawn(move || handle.block_on(stream_to_event_loop(config, proxy)));
            if let Err(e) = spawned {
                log::error!("unable to start the texture loader: {}", e);
            }
        }

        #[cfg(target_arch = "wasm32")]
        wasm_bindgen_futures::spawn_local(stream_to_event_loop(config, proxy));
    }
}

/// Streams the scene textures back to the event loop, one
/// [`SceneEvent::TextureSettled`] per image.
async fn stream_to_event_loop(config: SceneConfig, proxy: EventLoopProxy<SceneEvent>) {
    let manager = LoadingManager::with_logging();
    stream_scene_textures(&config, &manager, |outcome| {
        if proxy.send_event(SceneEvent::TextureSettled(outcome)).is_err() {
            log::debug!("event loop closed, dropping texture");
        }
    })
    .await;
}

impl ApplicationHandler<SceneEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let Some(config) = self.config.take() else {
            return;
        };

        #[allow(unused_mut)]
        let mut window_attributes = Window::default_attributes().with_title(config.title.clone());

        #[cfg(target_arch = "wasm32")]
        {
            use wasm_bindgen::JsCast;
            use winit::platform::web::WindowAttributesExtWebSys;

            const CANVAS_SELECTOR: &str = "canvas.webgl";

            let window = wgpu::web_sys::window().unwrap_throw();
            let document = window.document().unwrap_throw();
            let canvas = document
                .query_selector(CANVAS_SELECTOR)
                .unwrap_throw()
                .unwrap_throw();
            let html_canvas_element = canvas.unchecked_into();
            window_attributes = window_attributes.with_canvas(Some(html_canvas_element));
        }

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("unable to create a window: {}", e);
                event_loop.exit();
                return;
            }
        };

        self.spawn_texture_loader(config.clone());
        let init_future = Session::new(window, config);

        #[cfg(not(target_arch = "wasm32"))]
        {
            match self.async_runtime.block_on(init_future) {
                Ok(session) => self.start(session),
                Err(e) => {
                    log::error!("startup failed: {:#}", e);
                    event_loop.exit();
                }
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                match init_future.await {
                    Ok(session) => {
                        assert!(
                            proxy
                                .send_event(SceneEvent::Initialized(Box::new(session)))
                                .is_ok()
                        );
                    }
                    Err(e) => log::error!("startup failed: {:#}", e),
                }
            });
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: SceneEvent) {
        match event {
            SceneEvent::TextureSettled(outcome) => self.settle(outcome),
            #[cfg(target_arch = "wasm32")]
            SceneEvent::Initialized(session) => {
                // This is the message from our wasm `spawn_local`
                let mut session = *session;
                let size = session.window().inner_size();
                session.app.resize(size.width, size.height);
                self.start(session);
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let Some(session) = &mut self.session else {
            if let WindowEvent::CloseRequested = event {
                event_loop.exit();
            }
            return;
        };

        let Session {
            app,
            renderer,
            render_loop,
        } = session;

        if app
            .controls
            .handle_window_event(&event, &app.camera, app.sizes)
        {
            return;
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                app.resize(size.width, size.height);
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                app.panel.handle_key(&mut app.scene, code);
            }
            WindowEvent::RedrawRequested => {
                log::trace!("frame {}", render_loop.frames());
                if let Err(e) = render_loop.tick(app, renderer) {
                    log::error!("Unable to render {}", e);
                }
            }
            _ => {}
        }
    }
}

/// Opens the window and runs the scene until it is closed.
pub fn run(config: SceneConfig) -> anyhow::Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        console_log::init_with_level(log::Level::Info).unwrap_throw();
    }

    let event_loop: EventLoop<SceneEvent> = EventLoop::with_user_event().build()?;
    let mut app = App::new(&event_loop, config)?;

    event_loop.run_app(&mut app)?;

    Ok(())
}
