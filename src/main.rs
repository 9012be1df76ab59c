//! Audioribbon - audio spectrum visualizer
//!
//! Plays (or listens to) audio, samples its spectrum and draws it as a
//! mirrored ribbon or a bank of pillars.

use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use std::time::Instant;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use audioribbon::audio::{AudioSystem, SilentSource, SpectrumSource};
use audioribbon::camera::CameraSystem;
use audioribbon::cli::{Args, VisualMode};
use audioribbon::error::Result;
use audioribbon::logging;
use audioribbon::params::FftWindow;
use audioribbon::rendering::RenderSystem;
use audioribbon::settings::Settings;
use audioribbon::visualizer::{LineFillVisualizer, PillarVisualizer};

/// Live audio, or silence when no device could be opened
enum Source {
    Live(AudioSystem),
    Silent(SilentSource),
}

impl SpectrumSource for Source {
    fn get_spectrum(
        &mut self,
        buffer: &mut [f32],
        channel: usize,
        window: FftWindow,
    ) -> Result<()> {
        match self {
            Source::Live(audio) => audio.get_spectrum(buffer, channel, window),
            Source::Silent(silent) => silent.get_spectrum(buffer, channel, window),
        }
    }
}

enum Scene {
    Ribbon(LineFillVisualizer),
    Pillars(PillarVisualizer),
}

/// Main application state
struct App {
    settings: Settings,

    // Window and rendering
    window: Option<Arc<Window>>,
    render_system: Option<RenderSystem>,

    scene: Scene,
    camera: CameraSystem,
    source: Option<Source>,

    // Time tracking
    start_time: Instant,
    last_frame: Instant,
}

impl App {
    fn new(settings: Settings, mode: VisualMode) -> Self {
        let scene = match mode {
            VisualMode::Ribbon => Scene::Ribbon(LineFillVisualizer::new(
                settings.sample,
                settings.ribbon,
                settings.audio,
            )),
            VisualMode::Pillars => Scene::Pillars(PillarVisualizer::new(
                settings.sample,
                settings.pillars,
                settings.audio,
            )),
        };
        let camera = CameraSystem::new(settings.camera.preset());
        let now = Instant::now();

        Self {
            settings,
            window: None,
            render_system: None,
            scene,
            camera,
            source: None,
            start_time: now,
            last_frame: now,
        }
    }

    fn open_source(&self) -> Source {
        match AudioSystem::new(self.settings.audio) {
            Ok(audio) => {
                let rate = audio.device_rate_hz();
                let sample = &self.settings.sample;
                tracing::info!(
                    "Sampling {:.0}-{:.0} Hz",
                    self.settings.audio.bin_to_hz(sample.spectrum_offset, rate),
                    self.settings
                        .audio
                        .bin_to_hz(sample.spectrum_offset + sample.spectrum_range, rate)
                );
                Source::Live(audio)
            }
            Err(e) => {
                tracing::warn!("Audio unavailable ({}), continuing with silence", e);
                Source::Silent(SilentSource)
            }
        }
    }
}

impl ApplicationHandler for App {
    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return; // Already initialized
        }

        let window_attributes = Window::default_attributes()
            .with_title("Audioribbon")
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.settings.render.window_width,
                self.settings.render.window_height,
            ));

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                tracing::error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        let render_system = match pollster::block_on(RenderSystem::new(
            Arc::clone(&window),
            &self.settings.render,
        )) {
            Ok(render_system) => render_system,
            Err(e) => {
                tracing::error!("{}", e);
                event_loop.exit();
                return;
            }
        };

        let (width, height) = render_system.size();
        self.settings.render.window_width = width;
        self.settings.render.window_height = height;

        self.source = Some(self.open_source());
        tracing::info!("Running; press ESC to quit");

        self.window = Some(window);
        self.render_system = Some(render_system);
        self.last_frame = Instant::now();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => event_loop.exit(),
            WindowEvent::Resized(size) => self.resize(size.width, size.height),
            WindowEvent::RedrawRequested => self.render_frame(event_loop),
            _ => {}
        }
    }
}

impl App {
    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        if let Some(render_system) = &mut self.render_system {
            render_system.resize(width, height);
        }
        self.settings.render.window_width = width;
        self.settings.render.window_height = height;
    }

    /// Render a single frame
    fn render_frame(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(render_system), Some(source)) = (&mut self.render_system, &mut self.source)
        else {
            return;
        };

        let now = Instant::now();
        let delta_s = (now - self.last_frame).as_secs_f32();
        self.last_frame = now;
        let time_s = self.start_time.elapsed().as_secs_f32();

        let updated = match &mut self.scene {
            Scene::Ribbon(ribbon) => ribbon.update(source, render_system).map(|_| ()),
            Scene::Pillars(pillars) => pillars.update(source, render_system, delta_s),
        };
        if let Err(e) = updated {
            tracing::error!("Frame update failed: {}", e);
        }

        let (view_proj, _eye) = self
            .camera
            .create_view_proj_matrix(time_s, &self.settings.render);

        match render_system.render(view_proj) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let (width, height) = render_system.size();
                render_system.resize(width, height);
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                tracing::error!("GPU out of memory");
                event_loop.exit();
            }
            Err(e) => tracing::warn!("Render error: {:?}", e),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut settings =
        Settings::load(args.config.as_deref()).context("Failed to load settings")?;
    args.apply(&mut settings);

    logging::init(&settings.log_level);
    let settings = settings.sanitized();
    tracing::info!("Audioribbon starting in {:?} mode", args.mode);

    let mut app = App::new(settings, args.mode);
    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    event_loop.run_app(&mut app).context("Event loop failed")?;

    Ok(())
}
