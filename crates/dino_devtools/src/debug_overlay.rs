//! Debug overlay rendered via egui on top of the sprite batch.
//!
//! egui needs a `RenderPass<'static>` while `begin_render_pass` borrows the
//! encoder, so rendering is split into phases:
//!
//!   1. `prepare()` -- run the UI, produce tessellated primitives
//!   2. `upload()`  -- upload textures and update GPU buffers
//!   3. `paint()`   -- draw into a second render pass with `forget_lifetime()`
//!   4. `cleanup()` -- free textures egui no longer references
//!
//! The window only exists while `visible` is true (toggled by F3), but events
//! are always routed through egui so the overlay can swallow clicks.

use dino_core::time::FrameTime;
use winit::window::Window;

#[derive(Debug, Clone, Default)]
pub struct OverlayStats {
    /// Game phase label (e.g. "playing")
    pub phase_label: String,
    pub score: u32,
    pub high_score: u32,
    pub objects_velocity: f32,
    pub night: bool,
    pub sprites_used: usize,
    pub sprite_capacity: usize,
    pub draw_calls: u32,
    pub paused: bool,
}

#[derive(Debug, Clone, Default)]
pub struct OverlayActions {
    pub toggle_pause: bool,
    /// Advance one frame while paused
    pub single_step: bool,
    pub reload_config: bool,
}

/// Text rows shown in the overlay, in display order.
pub fn stat_lines(time: &FrameTime, stats: &OverlayStats) -> Vec<String> {
    vec![
        format!("FPS: {:.1}", time.smoothed_fps),
        format!("Frame time: {:.2} ms", time.smoothed_frame_time_ms),
        format!("Frame: {}", time.frame_count),
        format!("Phase: {}", stats.phase_label),
        format!("Score: {} (HI {})", stats.score, stats.high_score),
        format!("Speed: x{:.2}", stats.objects_velocity),
        format!("Palette: {}", if stats.night { "night" } else { "day" }),
        format!(
            "Sprites: {}/{} in {} draw call(s)",
            stats.sprites_used, stats.sprite_capacity, stats.draw_calls
        ),
    ]
}

pub struct DebugOverlay {
    pub egui_ctx: egui::Context,
    pub egui_winit_state: egui_winit::State,
    pub egui_renderer: egui_wgpu::Renderer,
    pub visible: bool,
}

impl DebugOverlay {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        window: &Window,
    ) -> Self {
        let egui_ctx = egui::Context::default();
        let egui_winit_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui_ctx.viewport_id(),
            window,
            None,
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(device, surface_format, None, 1, false);

        Self {
            egui_ctx,
            egui_winit_state,
            egui_renderer,
            visible: false,
        }
    }

    pub fn handle_window_event(
        &mut self,
        window: &Window,
        event: &winit::event::WindowEvent,
    ) -> bool {
        let response = self.egui_winit_state.on_window_event(window, event);
        response.consumed && self.visible
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
        log::info!("Debug overlay: {}", if self.visible { "ON" } else { "OFF" });
    }

    pub fn prepare(
        &mut self,
        window: &Window,
        time: &FrameTime,
        stats: &OverlayStats,
    ) -> (
        Vec<egui::ClippedPrimitive>,
        egui::TexturesDelta,
        OverlayActions,
    ) {
        let mut actions = OverlayActions::default();
        let raw_input = self.egui_winit_state.take_egui_input(window);
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            if !self.visible {
                return;
            }
            egui::Window::new("Debug")
                .default_pos([10.0, 10.0])
                .show(ctx, |ui| {
                    for line in stat_lines(time, stats) {
                        ui.label(line);
                    }

                    ui.separator();
                    ui.horizontal(|ui| {
                        let pause_label = if stats.paused { "Resume" } else { "Pause" };
                        if ui.button(pause_label).clicked() {
                            actions.toggle_pause = true;
                        }
                        if stats.paused && ui.button("Step").clicked() {
                            actions.single_step = true;
                        }
                        if ui.button("Reload config").clicked() {
                            actions.reload_config = true;
                        }
                    });
                    if stats.paused {
                        ui.label("\u{23f8} PAUSED");
                    }
                });
        });

        self.egui_winit_state
            .handle_platform_output(window, full_output.platform_output);

        let primitives = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        (primitives, full_output.textures_delta, actions)
    }

    /// Upload textures and update buffers. Call before creating the egui render pass.
    pub fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        primitives: &[egui::ClippedPrimitive],
        textures_delta: &egui::TexturesDelta,
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) {
        for (id, image_delta) in &textures_delta.set {
            self.egui_renderer
                .update_texture(device, queue, *id, image_delta);
        }

        self.egui_renderer
            .update_buffers(device, queue, encoder, primitives, screen_descriptor);
    }

    pub fn paint(
        &self,
        render_pass: &mut wgpu::RenderPass<'static>,
        primitives: &[egui::ClippedPrimitive],
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) {
        self.egui_renderer
            .render(render_pass, primitives, screen_descriptor);
    }

    pub fn cleanup(&mut self, textures_delta: &egui::TexturesDelta) {
        for id in &textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stat_lines_cover_game_state() {
        let mut time = FrameTime::new();
        time.record(0.02);
        let stats = OverlayStats {
            phase_label: "dead".to_string(),
            score: 120,
            high_score: 340,
            objects_velocity: 1.5,
            night: true,
            sprites_used: 23,
            sprite_capacity: 50,
            draw_calls: 1,
            paused: false,
        };
        let lines = stat_lines(&time, &stats);
        assert!(lines.contains(&"Phase: dead".to_string()));
        assert!(lines.contains(&"Score: 120 (HI 340)".to_string()));
        assert!(lines.contains(&"Palette: night".to_string()));
        assert!(lines.contains(&"Sprites: 23/50 in 1 draw call(s)".to_string()));
        assert!(lines.contains(&"Frame: 1".to_string()));
    }
}
