//! wavebox - a box on procedural hills beside simulated water.
//!
//! The CPU prepares up to three frames ahead of the GPU through a ring of
//! frame resources; left-drag orbits the camera, Escape quits.

use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use wavebox::cli::Args;
use wavebox::error::{DemoError, Result};
use wavebox::frame::{FrameResource, FrameResourceRing, GpuCompletionCounter};
use wavebox::orchestrator::FrameOrchestrator;
use wavebox::params::{DemoConfig, FRAME_RESOURCE_COUNT};
use wavebox::rendering::{DrawOutcome, RenderSystem};
use wavebox::scene::Scene;
use wavebox::timer::{average_frame_time, FrameStats, FrameTimer};
use wavebox::waves::Waves;

const APP_NAME: &str = "Land and Waves";

/// Everything that exists once the window is up
struct Running {
    window: Arc<Window>,
    scene: Scene,
    render_system: RenderSystem,
    orchestrator: FrameOrchestrator<FrameResource, GpuCompletionCounter>,
    timer: FrameTimer,
    stats: FrameStats,
}

/// Main application state
struct App {
    config: DemoConfig,
    max_frames: Option<u64>,

    running: Option<Running>,
    cursor: (f32, f32),
    frames: u64,
    started: Instant,

    /// First fatal error; reported after the event loop returns
    error: Option<DemoError>,
}

impl App {
    fn new(args: &Args) -> Self {
        Self {
            config: args.to_config(),
            max_frames: args.max_frames,
            running: None,
            cursor: (0.0, 0.0),
            frames: 0,
            started: Instant::now(),
            error: None,
        }
    }

    fn init(&self, event_loop: &ActiveEventLoop) -> Result<Running> {
        let window_attributes = Window::default_attributes()
            .with_title(APP_NAME)
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.config.render.window_width,
                self.config.render.window_height,
            ));
        let window = Arc::new(event_loop.create_window(window_attributes)?);

        let waves = Waves::from_params(&self.config.waves);
        let mut scene = Scene::build(&self.config.land, &waves)?;

        let render_system = pollster::block_on(RenderSystem::new(
            Arc::clone(&window),
            &mut scene,
            &self.config.render,
        ))?;

        let object_count = scene.items.len();
        let wave_vertex_count = waves.vertex_count();
        let ring = FrameResourceRing::new(FRAME_RESOURCE_COUNT, |_| {
            render_system.create_frame_resource(object_count, wave_vertex_count)
        })?;
        log::info!(
            "{} frame resources: {object_count} objects, {wave_vertex_count} wave vertices each",
            ring.depth()
        );

        let counter = render_system.completion_counter();
        let mut orchestrator = FrameOrchestrator::new(ring, counter, waves, &self.config);
        let (width, height) = render_system.size();
        orchestrator.resize(width, height);

        Ok(Running {
            window,
            scene,
            render_system,
            orchestrator,
            timer: FrameTimer::new(),
            stats: FrameStats::default(),
        })
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: DemoError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
        event_loop.exit();
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        if let Some(running) = &mut self.running {
            if width > 0 && height > 0 {
                running.render_system.resize(width, height)?;
                running.orchestrator.resize(width, height);
            }
        }
        Ok(())
    }

    /// Prepare, draw and stamp one frame
    fn render_frame(&mut self) -> Result<()> {
        let Some(running) = self.running.as_mut() else {
            return Ok(());
        };

        running.timer.tick();
        let total = running.timer.total_time();

        running
            .orchestrator
            .update(&mut running.scene.items, total, running.timer.delta_time())?;

        let frame = &mut running.orchestrator.current_frame_mut().resources;
        if running.render_system.draw(&running.scene, frame)? == DrawOutcome::Skipped {
            log::debug!("Frame {} skipped", self.frames);
        }
        running.orchestrator.finish_frame();

        if running.stats.frame(total) {
            running.window.set_title(&running.stats.title(APP_NAME));
        }
        self.frames += 1;
        Ok(())
    }
}

impl ApplicationHandler for App {
    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(running) = &self.running {
            running.window.request_redraw();
        }
    }

    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.running.is_some() {
            return; // Already initialized
        }

        match self.init(event_loop) {
            Ok(running) => {
                log::info!("{APP_NAME} is running, press ESC to quit");
                self.started = Instant::now();
                self.running = Some(running);
            }
            Err(error) => self.fail(event_loop, error),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => event_loop.exit(),
            WindowEvent::Resized(size) => {
                if let Err(error) = self.resize(size.width, size.height) {
                    self.fail(event_loop, error);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = (position.x as f32, position.y as f32);
                if let Some(running) = &mut self.running {
                    running.orchestrator.camera_mut().on_mouse_move(self.cursor.0, self.cursor.1);
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if let Some(running) = &mut self.running {
                    let camera = running.orchestrator.camera_mut();
                    match state {
                        ElementState::Pressed => {
                            camera.on_mouse_down(button, self.cursor.0, self.cursor.1)
                        }
                        ElementState::Released => camera.on_mouse_up(button),
                    }
                }
            }
            WindowEvent::RedrawRequested => {
                if let Err(error) = self.render_frame() {
                    self.fail(event_loop, error);
                    return;
                }
                if self.max_frames.is_some_and(|max| self.frames >= max) {
                    log::info!(
                        "Rendered {} frames, average {:?} per frame",
                        self.frames,
                        average_frame_time(self.started.elapsed(), self.frames)
                    );
                    event_loop.exit();
                }
            }
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        // Drain the GPU before the frame resources are released
        if let Some(running) = &mut self.running {
            if let Err(error) = running.orchestrator.flush() {
                log::error!("Failed to drain GPU work: {error}");
            }
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let mut app = App::new(args);
    let event_loop = EventLoop::new()?;
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(error) => Err(error),
        None => Ok(()),
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if let Err(error) = run(&args) {
        log::error!("{error}");
        std::process::exit(1);
    }
}
