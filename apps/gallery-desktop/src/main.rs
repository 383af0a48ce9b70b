use anyhow::Result;
use clap::Parser;
use egui::Context as EguiContext;
use gallery_assets::{AssetError, ModelBounds, ModelSource};
use gallery_input::{Command, InputTracker, MoveKey};
use gallery_render_wgpu::{FpsCamera, GalleryRenderer};
use gallery_session::{FireResult, GameSession};
use std::path::PathBuf;
use std::sync::mpsc::{Receiver, TryRecvError};
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, ElementState, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{CursorGrabMode, Window, WindowId};

const DEFAULT_MODEL_URL: &str =
    "https://vazxmixjsiawhamofees.supabase.co/storage/v1/object/public/models/anime-girl/model.glb";

#[derive(Parser)]
#[command(name = "gallery-desktop", about = "First-person shooting gallery")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// URL of the target model (GLB)
    #[arg(long, default_value = DEFAULT_MODEL_URL)]
    model_url: String,

    /// Local model file, used instead of the URL when set
    #[arg(long)]
    model: Option<PathBuf>,

    /// Seed for target placement
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

fn map_move_key(key: KeyCode) -> Option<MoveKey> {
    match key {
        KeyCode::KeyW | KeyCode::ArrowUp => Some(MoveKey::Forward),
        KeyCode::KeyS | KeyCode::ArrowDown => Some(MoveKey::Backward),
        KeyCode::KeyA | KeyCode::ArrowLeft => Some(MoveKey::Left),
        KeyCode::KeyD | KeyCode::ArrowRight => Some(MoveKey::Right),
        _ => None,
    }
}

/// Application state: the session core plus the window-layer glue.
struct AppState {
    session: GameSession,
    tracker: InputTracker,
    camera: FpsCamera,
    model_rx: Option<Receiver<Result<ModelBounds, AssetError>>>,
    last_frame: Instant,
}

impl AppState {
    fn new(cli: &Cli) -> Self {
        let source = match &cli.model {
            Some(path) => ModelSource::File(path.clone()),
            None => ModelSource::Url(cli.model_url.clone()),
        };
        let model_rx = gallery_assets::spawn_model_load(source);

        Self {
            session: GameSession::new(cli.seed),
            tracker: InputTracker::new(),
            camera: FpsCamera::default(),
            model_rx: Some(model_rx),
            last_frame: Instant::now(),
        }
    }

    /// Drain the model-load channel. The pool stays empty if the load
    /// failed; the session runs regardless.
    fn poll_model(&mut self) {
        let Some(rx) = &self.model_rx else {
            return;
        };
        match rx.try_recv() {
            Ok(Ok(model)) => {
                tracing::info!(name = %model.name, parts = model.parts.len(), "model ready");
                self.session.install_model(&model.parts);
                self.model_rx = None;
            }
            Ok(Err(e)) => {
                tracing::error!("model load failed: {e}");
                self.model_rx = None;
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => {
                self.model_rx = None;
            }
        }
    }

    fn update(&mut self, now: Instant, dt: f32) {
        self.poll_model();
        let displacement = self.session.tick(now, dt, self.tracker.intent());
        self.camera.apply_displacement(displacement);
    }

    fn command(&mut self, command: Command) -> Option<LockChange> {
        let now = Instant::now();
        match command {
            Command::Fire => {
                if let FireResult::Hit(hit) = self.session.fire(
                    now,
                    self.camera.position,
                    self.camera.forward(),
                ) {
                    tracing::debug!(distance = hit.distance, "hit");
                }
                None
            }
            Command::Reload => {
                self.session.reload(now);
                None
            }
            Command::RequestResume => Some(LockChange::Grab),
            Command::RequestExit => {
                self.session.request_exit();
                None
            }
        }
    }

    /// Mirror the actual grab outcome into tracker and session.
    fn set_locked(&mut self, locked: bool) {
        if self.tracker.set_locked(locked) {
            self.session.set_lock_state(locked);
        }
    }

    fn draw_hud(&self, ctx: &EguiContext) {
        let hud = self.session.hud();

        egui::Area::new(egui::Id::new("hud"))
            .anchor(egui::Align2::LEFT_TOP, [16.0, 16.0])
            .show(ctx, |ui| {
                ui.label(
                    egui::RichText::new(format!("Score: {}", hud.score))
                        .size(22.0)
                        .strong(),
                );
                let ammo_text = if hud.reloading {
                    "Reloading...".to_string()
                } else {
                    format!("Ammo: {}", hud.ammo)
                };
                ui.label(egui::RichText::new(ammo_text).size(18.0));
            });

        if hud.paused {
            egui::Area::new(egui::Id::new("pause_overlay"))
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.label(egui::RichText::new("Paused").size(28.0).strong());
                        ui.label("Click to play  |  WASD move, LMB fire, R reload");
                    });
                });
        } else {
            // Crosshair dot.
            egui::Area::new(egui::Id::new("crosshair"))
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.label(egui::RichText::new("+").size(18.0));
                });
        }
    }
}

/// Pointer-lock transitions requested by a command.
enum LockChange {
    Grab,
    Release,
}

struct GpuApp {
    state: AppState,
    window: Option<Arc<Window>>,
    surface: Option<wgpu::Surface<'static>>,
    device: Option<wgpu::Device>,
    queue: Option<wgpu::Queue>,
    config: Option<wgpu::SurfaceConfiguration>,
    renderer: Option<GalleryRenderer>,
    egui_ctx: EguiContext,
    egui_winit: Option<egui_winit::State>,
    egui_renderer: Option<egui_wgpu::Renderer>,
}

impl GpuApp {
    fn new(cli: &Cli) -> Self {
        Self {
            state: AppState::new(cli),
            window: None,
            surface: None,
            device: None,
            queue: None,
            config: None,
            renderer: None,
            egui_ctx: EguiContext::default(),
            egui_winit: None,
            egui_renderer: None,
        }
    }

    fn apply_lock_change(&mut self, change: LockChange) {
        let Some(window) = &self.window else {
            return;
        };
        match change {
            LockChange::Grab => {
                let grabbed = window
                    .set_cursor_grab(CursorGrabMode::Locked)
                    .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));
                match grabbed {
                    Ok(()) => {
                        window.set_cursor_visible(false);
                        self.state.set_locked(true);
                    }
                    Err(e) => {
                        // Stay paused; the next click tries again.
                        tracing::warn!("pointer lock denied: {e}");
                    }
                }
            }
            LockChange::Release => {
                if let Err(e) = window.set_cursor_grab(CursorGrabMode::None) {
                    tracing::warn!("pointer release failed: {e}");
                }
                window.set_cursor_visible(true);
                self.state.set_locked(false);
            }
        }
    }

    fn handle_key(&mut self, key: KeyCode, pressed: bool) {
        if let Some(move_key) = map_move_key(key) {
            if pressed {
                self.state.tracker.key_down(move_key);
            } else {
                self.state.tracker.key_up(move_key);
            }
            return;
        }

        if !pressed {
            return;
        }

        match key {
            KeyCode::KeyR => {
                if let Some(change) = self.state.command(Command::Reload) {
                    self.apply_lock_change(change);
                }
            }
            KeyCode::Escape => {
                // First press drops the lock, a second one quits.
                if self.state.tracker.locked() {
                    self.apply_lock_change(LockChange::Release);
                } else if let Some(change) = self.state.command(Command::RequestExit) {
                    self.apply_lock_change(change);
                }
            }
            _ => {}
        }
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title("Shooting Gallery")
            .with_inner_size(PhysicalSize::new(1280u32, 720));
        let window = Arc::new(event_loop.create_window(attrs).expect("create window"));

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .expect("create surface");

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .expect("find adapter");

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("gallery_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .expect("create device");

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        self.state.camera.aspect = size.width as f32 / size.height.max(1) as f32;

        let renderer = GalleryRenderer::new(&device, surface_format, size.width, size.height);

        let egui_winit = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        self.window = Some(window);
        self.surface = Some(surface);
        self.device = Some(device);
        self.queue = Some(queue);
        self.config = Some(config);
        self.renderer = Some(renderer);
        self.egui_winit = Some(egui_winit);
        self.egui_renderer = Some(egui_renderer);

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        // While the pointer is locked the HUD is display-only; events go
        // straight to gameplay.
        if !self.state.tracker.locked()
            && let Some(egui_winit) = &mut self.egui_winit
        {
            let response = egui_winit.on_window_event(self.window.as_ref().unwrap(), &event);
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Focused(false) => {
                // Lock does not survive focus loss.
                self.apply_lock_change(LockChange::Release);
            }
            WindowEvent::Resized(new_size) => {
                if let (Some(surface), Some(device), Some(config)) =
                    (&self.surface, &self.device, &mut self.config)
                {
                    config.width = new_size.width.max(1);
                    config.height = new_size.height.max(1);
                    surface.configure(device, config);
                    self.state.camera.aspect =
                        config.width as f32 / config.height.max(1) as f32;
                    if let Some(renderer) = &mut self.renderer {
                        renderer.resize(device, config.width, config.height);
                    }
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: key_state,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                self.handle_key(key, key_state == ElementState::Pressed);
            }
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state: ElementState::Pressed,
                ..
            } => {
                let command = if self.state.tracker.locked() {
                    Command::Fire
                } else {
                    Command::RequestResume
                };
                if let Some(change) = self.state.command(command) {
                    self.apply_lock_change(change);
                }
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let dt = (now - self.state.last_frame).as_secs_f32().min(0.1);
                self.state.last_frame = now;
                self.state.update(now, dt);

                if self.state.session.exit_requested() {
                    event_loop.exit();
                    return;
                }

                let (Some(surface), Some(device), Some(queue)) =
                    (&self.surface, &self.device, &self.queue)
                else {
                    return;
                };

                let output = match surface.get_current_texture() {
                    Ok(t) => t,
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        if let Some(config) = &self.config {
                            surface.configure(device, config);
                        }
                        return;
                    }
                    Err(e) => {
                        tracing::error!("surface error: {e}");
                        return;
                    }
                };

                let view = output
                    .texture
                    .create_view(&wgpu::TextureViewDescriptor::default());

                if let Some(renderer) = &self.renderer {
                    renderer.render(
                        device,
                        queue,
                        &view,
                        &self.state.camera,
                        &self.state.session,
                        self.state.session.weapon().muzzle_flash_active(now),
                    );
                }

                let raw_input = self
                    .egui_winit
                    .as_mut()
                    .unwrap()
                    .take_egui_input(self.window.as_ref().unwrap());
                let full_output = self.egui_ctx.run(raw_input, |ctx| {
                    self.state.draw_hud(ctx);
                });

                self.egui_winit.as_mut().unwrap().handle_platform_output(
                    self.window.as_ref().unwrap(),
                    full_output.platform_output,
                );

                let paint_jobs = self
                    .egui_ctx
                    .tessellate(full_output.shapes, full_output.pixels_per_point);

                let screen_descriptor = egui_wgpu::ScreenDescriptor {
                    size_in_pixels: [
                        self.config.as_ref().unwrap().width,
                        self.config.as_ref().unwrap().height,
                    ],
                    pixels_per_point: full_output.pixels_per_point,
                };

                {
                    let egui_renderer = self.egui_renderer.as_mut().unwrap();
                    for (id, image_delta) in &full_output.textures_delta.set {
                        egui_renderer.update_texture(device, queue, *id, image_delta);
                    }
                    let mut encoder =
                        device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                            label: Some("egui_encoder"),
                        });
                    egui_renderer.update_buffers(
                        device,
                        queue,
                        &mut encoder,
                        &paint_jobs,
                        &screen_descriptor,
                    );
                    {
                        let mut pass = encoder
                            .begin_render_pass(&wgpu::RenderPassDescriptor {
                                label: Some("egui_pass"),
                                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                                    view: &view,
                                    resolve_target: None,
                                    ops: wgpu::Operations {
                                        load: wgpu::LoadOp::Load,
                                        store: wgpu::StoreOp::Store,
                                    },
                                })],
                                depth_stencil_attachment: None,
                                ..Default::default()
                            })
                            .forget_lifetime();
                        egui_renderer.render(&mut pass, &paint_jobs, &screen_descriptor);
                    }
                    queue.submit(std::iter::once(encoder.finish()));
                    for id in &full_output.textures_delta.free {
                        egui_renderer.free_texture(id);
                    }
                }

                output.present();
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event
            && self.state.tracker.locked()
        {
            self.state.camera.rotate(delta.0 as f32, delta.1 as f32);
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("gallery-desktop starting");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(&cli);
    event_loop.run_app(&mut app)?;

    Ok(())
}
