//! Window, event loop and the per-frame driver.
//!
//! [`run`] opens a window (on the web: a canvas inside the configured
//! container element), builds the GPU context and the puzzle, then drives a
//! [`FrameLoop`] tick on every redraw. Window events are translated into
//! [`InputEvent`]s and handed to the puzzle through its [`InputBindings`],
//! which are torn down when the loop exits.
//!
//! On native targets the async GPU setup is resolved on a tokio runtime. On
//! the web it is spawned locally and the result comes back as an
//! [`AppEvent::Initialized`] user event.

use std::{fmt::Debug, sync::Arc};

use instant::{Duration, Instant};
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::Window,
};

use crate::{
    config::PuzzleConfig,
    context::Context,
    error::PuzzleError,
    frame::FrameLoop,
    input::{InputBindings, InputEvent},
    pipelines::blit::BlitPass,
    puzzle::{InputOutcome, PuzzleContext},
    render::{Compositor, SurfaceFrame},
};

/// Everything that exists once the window and GPU are up.
pub(crate) struct AppState {
    ctx: Context,
    puzzle: PuzzleContext,
    compositor: Compositor,
    blit: BlitPass,
    frame_loop: FrameLoop,
    bindings: Option<InputBindings>,
    clear: wgpu::Color,
}

impl AppState {
    async fn new(window: Arc<Window>, config: PuzzleConfig) -> anyhow::Result<Self> {
        let ctx = Context::new(window).await?;
        let mut puzzle = PuzzleContext::new(&config)?;
        let compositor = Compositor::new(&ctx.device, &config, &puzzle.scene);

        let bindings = InputBindings::puzzle_defaults();
        let size = ctx.window.inner_size();
        puzzle.handle_input(
            InputEvent::Resize {
                width: size.width,
                height: size.height,
            },
            &bindings,
        );
        let blit = BlitPass::new(
            &ctx.device,
            compositor.output(),
            &crate::data_structures::texture::create_linear_sampler(&ctx.device, "blit_sampler"),
            ctx.config.format,
            &puzzle.viewport,
        );

        Ok(Self {
            ctx,
            puzzle,
            compositor,
            blit,
            frame_loop: FrameLoop::new(),
            bindings: Some(bindings),
            clear: config.clear_colour,
        })
    }

    fn handle_window_event(&mut self, event: &WindowEvent) {
        let Some(bindings) = &self.bindings else {
            return;
        };
        let Some(input) = InputEvent::from_window_event(event, self.ctx.window.scale_factor())
        else {
            return;
        };
        match self.puzzle.handle_input(input, bindings) {
            InputOutcome::Resized { width, height } => {
                log::debug!("surface resized to {}x{}", width, height);
                self.ctx.resize(width, height);
            }
            InputOutcome::Rotated(delta) => log::trace!("drag rotated by {:?}", delta),
            _ => (),
        }
    }

    fn render(&mut self, dt: Duration) -> anyhow::Result<()> {
        let output = match self.ctx.surface.get_current_texture() {
            wgpu::CurrentSurfaceTexture::Success(output)
            | wgpu::CurrentSurfaceTexture::Suboptimal(output) => output,
            // Reconfigure the surface if it's lost or outdated
            wgpu::CurrentSurfaceTexture::Lost | wgpu::CurrentSurfaceTexture::Outdated => {
                self.ctx.reconfigure();
                return Ok(());
            }
            wgpu::CurrentSurfaceTexture::Timeout | wgpu::CurrentSurfaceTexture::Occluded => {
                log::warn!("surface timed out, skipping frame");
                return Ok(());
            }
            wgpu::CurrentSurfaceTexture::Validation => {
                anyhow::bail!("surface validation error while acquiring frame")
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let viewport = self.puzzle.viewport;

        let mut frame = SurfaceFrame {
            ctx: &self.ctx,
            compositor: &mut self.compositor,
            blit: &mut self.blit,
            viewport: &viewport,
            target: &view,
            clear: self.clear,
        };
        self.frame_loop
            .tick(&mut self.puzzle, dt, Instant::now(), &mut frame)?;

        output.present();
        Ok(())
    }

    fn teardown(&mut self) {
        if let Some(bindings) = self.bindings.take() {
            let released = bindings.teardown();
            log::info!(
                "released {} input listeners after {} frames",
                released,
                self.frame_loop.frames()
            );
        }
    }
}

pub(crate) enum AppEvent {
    #[allow(dead_code)]
    Initialized(anyhow::Result<AppState>),
}

impl Debug for AppEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Initialized(Ok(_)) => f.write_str("Initialized(Ok)"),
            Self::Initialized(Err(e)) => write!(f, "Initialized(Err({}))", e),
        }
    }
}

pub(crate) struct App {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    #[allow(dead_code)]
    proxy: winit::event_loop::EventLoopProxy<AppEvent>,
    config: PuzzleConfig,
    state: Option<AppState>,
    starting: bool,
    error: Option<anyhow::Error>,
    last_time: Instant,
}

impl App {
    fn new(event_loop: &EventLoop<AppEvent>, config: PuzzleConfig) -> anyhow::Result<Self> {
        Ok(Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime: tokio::runtime::Runtime::new()?,
            proxy: event_loop.create_proxy(),
            config,
            state: None,
            starting: false,
            error: None,
            last_time: Instant::now(),
        })
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        log::error!("{:#}", error);
        self.error = Some(error);
        event_loop.exit();
    }

    fn start(&mut self, state: AppState) {
        state.ctx.window.request_redraw();
        self.last_time = Instant::now();
        self.state = Some(state);
    }

    #[cfg(target_arch = "wasm32")]
    fn window_attributes(&self) -> anyhow::Result<winit::window::WindowAttributes> {
        Ok(Window::default_attributes().with_title("puzzle cube"))
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn window_attributes(&self) -> anyhow::Result<winit::window::WindowAttributes> {
        let [width, height] = self.config.composite_size;
        Ok(Window::default_attributes()
            .with_title("puzzle cube")
            .with_inner_size(winit::dpi::LogicalSize::new(width, height)))
    }

    /// Appends the window's canvas to the container element.
    #[cfg(target_arch = "wasm32")]
    fn mount(&self, window: &Window) -> anyhow::Result<()> {
        use winit::platform::web::WindowExtWebSys;

        let container = find_container(&self.config.container_id)?;
        let canvas = window
            .canvas()
            .ok_or_else(|| anyhow::anyhow!("window has no canvas"))?;
        container
            .append_child(&canvas)
            .map_err(|e| anyhow::anyhow!("failed to mount canvas: {:?}", e))?;
        Ok(())
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn mount(&self, _window: &Window) -> anyhow::Result<()> {
        Ok(())
    }
}

impl ApplicationHandler<AppEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() || self.starting {
            return;
        }

        let window = match self
            .window_attributes()
            .and_then(|attributes| Ok(event_loop.create_window(attributes)?))
        {
            Ok(window) => Arc::new(window),
            Err(e) => return self.fail(event_loop, e),
        };
        if let Err(e) = self.mount(&window) {
            return self.fail(event_loop, e);
        }

        let init_future = AppState::new(window, self.config.clone());

        #[cfg(not(target_arch = "wasm32"))]
        {
            match self.async_runtime.block_on(init_future) {
                Ok(state) => self.start(state),
                Err(e) => self.fail(event_loop, e),
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            self.starting = true;
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let result = init_future.await;
                if proxy.send_event(AppEvent::Initialized(result)).is_err() {
                    log::error!("event loop closed before the puzzle was initialized");
                }
            });
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: AppEvent) {
        match event {
            // This is the message from our wasm `spawn_local`
            AppEvent::Initialized(result) => {
                self.starting = false;
                match result {
                    Ok(state) => self.start(state),
                    Err(e) => self.fail(event_loop, e),
                }
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };

        state.handle_window_event(&event);

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::RedrawRequested => {
                let dt = self.last_time.elapsed();
                self.last_time = Instant::now();

                if let Err(e) = state.render(dt) {
                    log::error!("Unable to render {:#}", e);
                    state.teardown();
                    return self.fail(event_loop, e);
                }
                state.ctx.window.request_redraw();
            }
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &mut self.state {
            state.teardown();
        }
    }
}

/// Hands back the element the canvas mounts into, or the mount failure for
/// `container_id`.
pub fn require_mount_surface<T>(container_id: &str, element: Option<T>) -> Result<T, PuzzleError> {
    element.ok_or_else(|| PuzzleError::MountSurfaceMissing(container_id.to_string()))
}

#[cfg(target_arch = "wasm32")]
fn find_container(container_id: &str) -> anyhow::Result<web_sys::Element> {
    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| anyhow::anyhow!("no browser document"))?;
    Ok(require_mount_surface(
        container_id,
        document.get_element_by_id(container_id),
    )?)
}

/// Runs the puzzle until its window is closed.
///
/// On the web the event loop never returns control here, so a missing
/// container is reported before the loop starts.
pub fn run(config: PuzzleConfig) -> anyhow::Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            log::warn!("Could not initialize logger: {}", e);
        }
    }

    config.validate()?;
    #[cfg(target_arch = "wasm32")]
    find_container(&config.container_id)?;

    let event_loop: EventLoop<AppEvent> = EventLoop::with_user_event().build()?;
    let mut app = App::new(&event_loop, config)?;

    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(error) => Err(error),
        None => Ok(()),
    }
}
