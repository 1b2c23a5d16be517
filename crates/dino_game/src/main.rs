//! Dino Runner -- main loop and application entry point.
//!
//! winit drives the event loop via `ApplicationHandler`. Each `RedrawRequested`:
//!
//!   1. measure the capped frame delta
//!   2. poll the config file and apply it between frames
//!   3. turn touch state into a `FrameInput` and update the `World`
//!   4. write dirty sprites into the batch, upload it in one write
//!   5. clear with the day/night background and draw the batch in one call,
//!      then composite the egui overlay
//!
//! Mouse, touch and keyboard all feed the same `TouchInput`: the left button
//! or a finger is a touch, Space/Up press the jump half of the screen and Down
//! holds the duck half.

mod animation;
mod atlas;
mod bitmap_text;
mod collision;
mod config;
mod controls;
mod day_night;
mod entities;
mod replay;
mod world;

use std::path::PathBuf;
use std::sync::Arc;

use dino_core::assets::{AssetSource, DirAssetSource};
use dino_core::input::{TouchInput, TouchSlot};
use dino_core::time::FrameTime;
use dino_devtools::{DebugOverlay, OverlayStats};
use dino_platform::window::PlatformConfig;
use dino_render::{
    GpuContext, GpuSpriteBatch, ScreenCamera, SpriteBatch, SpritePipeline, Texture, MAX_SPRITES,
};
use glam::Vec2;
use wgpu::util::DeviceExt;
use winit::application::ApplicationHandler;
use winit::event::{ElementState, MouseButton, TouchPhase, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use atlas::load_atlas_or_default;
use config::{load_config_from_path, load_config_or_default, FileWatcher};
use controls::FrameInput;
use replay::{load_replay, ReplayPlayer};
use world::World;

const ASSET_ROOT: &str = "assets";
const CONFIG_PATH: &str = "assets/config/dino.json";
const ATLAS_PATH: &str = "atlas/dino_atlas.json";
const SHADER_PATH: &str = "shaders/sprite.wgsl";
const REPLAY_ENV: &str = "DINO_REPLAY";
const SINGLE_STEP_DT: f32 = 1.0 / 60.0;
/// Normalized touch points the keyboard stands in for.
const KEY_JUMP_TOUCH: Vec2 = Vec2::new(0.75, 0.5);
const KEY_DUCK_TOUCH: Vec2 = Vec2::new(0.25, 0.5);

struct EngineState {
    window: Arc<Window>,
    gpu: GpuContext,
    time: FrameTime,
    touch: TouchInput,
    camera: ScreenCamera,
    sprite_pipeline: SpritePipeline,
    debug_overlay: DebugOverlay,

    world: World,
    config_watcher: FileWatcher,
    replay: Option<ReplayPlayer>,
    cursor: Option<Vec2>,
    confirm_requested: bool,
    single_step_requested: bool,
    needs_full_sync: bool,

    // The batch is staged on the CPU every frame and uploaded in one write.
    batch: SpriteBatch,
    gpu_batch: GpuSpriteBatch,
    atlas_bind_group: wgpu::BindGroup,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
}

impl EngineState {
    fn new(window: Arc<Window>) -> Result<Self, String> {
        let gpu = GpuContext::new(window.clone());
        let assets = DirAssetSource::new(ASSET_ROOT);
        log::info!("Loading assets from {}", assets.root().display());

        let shader_source = match assets.read_text(SHADER_PATH) {
            Ok(source) => Some(source),
            Err(err) => {
                log::warn!("{err}. Using built-in sprite shader.");
                None
            }
        };
        let sprite_pipeline = SpritePipeline::new_or_builtin(
            &gpu.device,
            gpu.surface_format,
            shader_source.as_deref(),
        );
        let debug_overlay = DebugOverlay::new(&gpu.device, gpu.surface_format, &window);

        let atlas = load_atlas_or_default(&assets, ATLAS_PATH);
        let loaded_texture = assets.read_bytes(&atlas.texture_path).and_then(|bytes| {
            Texture::from_bytes(&gpu.device, &gpu.queue, &bytes, &atlas.texture_path)
        });
        let (atlas_texture, texture_loaded) = match loaded_texture {
            Ok(texture) => (texture, true),
            Err(err) => {
                log::error!("{err}. Drawing with a blank texture.");
                (Texture::white(&gpu.device, &gpu.queue), false)
            }
        };
        let atlas_bind_group =
            sprite_pipeline.create_texture_bind_group(&gpu.device, &atlas_texture);

        let config_path = PathBuf::from(CONFIG_PATH);
        let config_watcher = FileWatcher::new(config_path.clone());
        let config = load_config_or_default(&config_path);

        let mut batch = SpriteBatch::new(MAX_SPRITES);
        let mut world = World::new(&mut batch, &atlas, config)?;
        if texture_loaded {
            world.set_texture_size(atlas_texture.size.0, atlas_texture.size.1);
        }
        let gpu_batch = GpuSpriteBatch::new(&gpu.device, &batch);

        let camera = ScreenCamera::new(gpu.size.0, gpu.size.1);
        let camera_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Camera Uniform Buffer"),
                contents: bytemuck::cast_slice(&[camera.build_uniform()]),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
        let camera_bind_group =
            sprite_pipeline.create_camera_bind_group(&gpu.device, &camera_buffer);

        let replay = std::env::var(REPLAY_ENV).ok().and_then(|path| {
            match load_replay(&assets, &path) {
                Ok(sequence) => {
                    log::info!(
                        "Playing replay '{}' ({} frames)",
                        path,
                        sequence.expanded_inputs().len()
                    );
                    Some(ReplayPlayer::new(&sequence))
                }
                Err(err) => {
                    log::error!("{err}. Ignoring {REPLAY_ENV}.");
                    None
                }
            }
        });

        Ok(Self {
            window,
            gpu,
            time: FrameTime::new(),
            touch: TouchInput::new(),
            camera,
            sprite_pipeline,
            debug_overlay,
            world,
            config_watcher,
            replay,
            cursor: None,
            confirm_requested: false,
            single_step_requested: false,
            needs_full_sync: true,
            batch,
            gpu_batch,
            atlas_bind_group,
            camera_buffer,
            camera_bind_group,
        })
    }

    fn surface_size(&self) -> Vec2 {
        Vec2::new(self.gpu.size.0 as f32, self.gpu.size.1 as f32)
    }

    fn reload_config(&mut self, reason: &str) {
        match load_config_from_path(self.config_watcher.path()) {
            Ok(config) => {
                log::info!("Reloading game config ({reason})");
                self.world.apply_config(config);
            }
            Err(err) => log::error!("Config reload failed ({reason}): {err}"),
        }
    }

    /// Input for this frame and the delta to simulate it with. A running
    /// replay overrides both.
    fn next_input(&mut self, measured_dt: f32) -> (FrameInput, f32) {
        if let Some(player) = self.replay.as_mut() {
            if let Some(input) = player.next_input() {
                return (input, player.fixed_dt());
            }
            log::info!("Replay finished, switching to live input");
            self.replay = None;
        }
        let mut input = FrameInput::from_touch(&self.touch, self.world.config());
        input.confirm = self.confirm_requested;
        (input, measured_dt)
    }

    fn handle_key(
        &mut self,
        event_loop: &ActiveEventLoop,
        key: KeyCode,
        state: ElementState,
        repeat: bool,
    ) {
        let pressed = state == ElementState::Pressed;
        match key {
            KeyCode::Space | KeyCode::ArrowUp => {
                if pressed && !repeat {
                    self.touch.touch_normalized(TouchSlot::Primary, KEY_JUMP_TOUCH);
                } else if !pressed {
                    self.touch.touch_up(TouchSlot::Primary);
                }
            }
            KeyCode::ArrowDown => {
                if pressed && !repeat {
                    self.touch.touch_normalized(TouchSlot::Secondary, KEY_DUCK_TOUCH);
                } else if !pressed {
                    self.touch.touch_up(TouchSlot::Secondary);
                }
            }
            _ if !pressed || repeat => {}
            KeyCode::Enter => self.confirm_requested = true,
            KeyCode::KeyP => self.world.toggle_pause(),
            KeyCode::KeyR => self.reload_config("manual trigger (R)"),
            KeyCode::F3 => self.debug_overlay.toggle(),
            KeyCode::Escape => {
                log::info!("Escape pressed, exiting.");
                event_loop.exit();
            }
            _ => {}
        }
    }

    fn render(&mut self) {
        let dt = self.time.begin_frame();

        if self.config_watcher.should_reload() {
            self.reload_config("file watcher");
        }

        let (input, dt) = self.next_input(dt);
        if self.single_step_requested {
            self.world.step(SINGLE_STEP_DT, &input);
            self.single_step_requested = false;
        } else {
            self.world.update(dt, &input);
        }
        self.touch.end_frame();
        self.confirm_requested = false;

        let screen_scale = self
            .camera
            .screen_scale(self.world.config().work_resolution);
        self.world
            .sync_batch(&mut self.batch, screen_scale, self.needs_full_sync);
        self.needs_full_sync = false;
        self.gpu_batch.flush(&self.gpu.queue, &self.batch);

        self.gpu.queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::cast_slice(&[self.camera.build_uniform()]),
        );

        let Some((output, view)) = self.gpu.begin_frame() else {
            return;
        };

        let stats = OverlayStats {
            phase_label: self.world.phase().label().to_string(),
            score: self.world.score(),
            high_score: self.world.high_score(),
            objects_velocity: self.world.objects_velocity(),
            night: self.world.is_night(),
            sprites_used: self.batch.allocated(),
            sprite_capacity: self.batch.capacity(),
            draw_calls: 1,
            paused: self.world.is_paused(),
        };
        let (egui_primitives, egui_textures_delta, overlay_actions) =
            self.debug_overlay.prepare(&self.window, &self.time, &stats);

        if overlay_actions.toggle_pause {
            self.world.toggle_pause();
        }
        if overlay_actions.single_step {
            self.single_step_requested = true;
        }
        if overlay_actions.reload_config {
            self.reload_config("overlay");
        }

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.gpu.size.0, self.gpu.size.1],
            pixels_per_point: self.window.scale_factor() as f32,
        };

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let [r, g, b, a] = self.world.background().to_normalized();
            let clear_color = wgpu::Color {
                r: r as f64,
                g: g as f64,
                b: b as f64,
                a: a as f64,
            };
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Sprite Batch Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                ..Default::default()
            });

            render_pass.set_pipeline(&self.sprite_pipeline.render_pipeline);
            render_pass.set_bind_group(0, &self.camera_bind_group, &[]);
            render_pass.set_bind_group(1, &self.atlas_bind_group, &[]);
            self.gpu_batch.draw(&mut render_pass);
        }

        self.debug_overlay.upload(
            &self.gpu.device,
            &self.gpu.queue,
            &mut encoder,
            &egui_primitives,
            &egui_textures_delta,
            &screen_descriptor,
        );

        {
            let mut egui_pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui Render Pass"),
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

            self.debug_overlay
                .paint(&mut egui_pass, &egui_primitives, &screen_descriptor);
        }

        self.debug_overlay.cleanup(&egui_textures_delta);

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
    }
}

fn touch_slot(id: u64) -> TouchSlot {
    if id == 0 {
        TouchSlot::Primary
    } else {
        TouchSlot::Secondary
    }
}

struct App {
    config: PlatformConfig,
    state: Option<EngineState>,
}

impl App {
    fn new() -> Self {
        Self {
            config: PlatformConfig::default(),
            state: None,
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        let window = dino_platform::window::create_window(event_loop, &self.config);
        log::info!(
            "Window created: {}x{}",
            self.config.width,
            self.config.height
        );
        match EngineState::new(window) {
            Ok(state) => self.state = Some(state),
            Err(err) => {
                log::error!("Failed to start: {err}");
                event_loop.exit();
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &self.state {
            state.window.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let state = match self.state.as_mut() {
            Some(s) => s,
            None => return,
        };

        let egui_consumed = state
            .debug_overlay
            .handle_window_event(&state.window, &event);

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting.");
                event_loop.exit();
            }

            WindowEvent::Resized(physical_size) => {
                let w = physical_size.width;
                let h = physical_size.height;
                if w > 0 && h > 0 {
                    state.gpu.resize(w, h);
                    state.camera.viewport = (w, h);
                    state.needs_full_sync = true;
                    log::info!("Resized to {}x{}", w, h);
                }
            }

            WindowEvent::KeyboardInput { event, .. } if !egui_consumed => {
                if let PhysicalKey::Code(key_code) = event.physical_key {
                    state.handle_key(event_loop, key_code, event.state, event.repeat);
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                let pixel = Vec2::new(position.x as f32, position.y as f32);
                state.cursor = Some(pixel);
                let surface = state.surface_size();
                state.touch.touch_moved(TouchSlot::Primary, pixel, surface);
            }

            WindowEvent::CursorLeft { .. } => {
                state.cursor = None;
            }

            WindowEvent::MouseInput {
                state: button_state,
                button: MouseButton::Left,
                ..
            } if !egui_consumed => match button_state {
                ElementState::Pressed => {
                    if let Some(pixel) = state.cursor {
                        let surface = state.surface_size();
                        state.touch.touch_down(TouchSlot::Primary, pixel, surface);
                    }
                }
                ElementState::Released => state.touch.touch_up(TouchSlot::Primary),
            },

            WindowEvent::Touch(touch) => {
                let slot = touch_slot(touch.id);
                let pixel = Vec2::new(touch.location.x as f32, touch.location.y as f32);
                let surface = state.surface_size();
                match touch.phase {
                    TouchPhase::Started => state.touch.touch_down(slot, pixel, surface),
                    TouchPhase::Moved => state.touch.touch_moved(slot, pixel, surface),
                    TouchPhase::Ended | TouchPhase::Cancelled => state.touch.touch_up(slot),
                }
            }

            WindowEvent::RedrawRequested => {
                if state.gpu.size.0 == 0 || state.gpu.size.1 == 0 {
                    return;
                }
                state.render();
            }

            _ => {}
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Dino Runner starting...");

    let event_loop = EventLoop::new().expect("Failed to create event loop");
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new();
    event_loop.run_app(&mut app).expect("Event loop error");
}
