use glam::{Mat4, Vec2};

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

/// Pixel-space orthographic camera: `(0, 0)` is the top-left corner of the
/// surface and Y grows downward.
pub struct ScreenCamera {
    pub viewport: (u32, u32),
}

impl ScreenCamera {
    pub fn new(viewport_width: u32, viewport_height: u32) -> Self {
        Self {
            viewport: (viewport_width, viewport_height),
        }
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::orthographic_rh(
            0.0,
            self.viewport.0.max(1) as f32,
            self.viewport.1.max(1) as f32,
            0.0,
            0.0,
            1.0,
        )
    }

    pub fn build_uniform(&self) -> CameraUniform {
        CameraUniform {
            view_proj: self.projection().to_cols_array_2d(),
        }
    }

    /// Per-axis factor mapping work-resolution units to surface pixels.
    pub fn screen_scale(&self, work_resolution: Vec2) -> Vec2 {
        if work_resolution.x <= 0.0 || work_resolution.y <= 0.0 {
            return Vec2::ONE;
        }
        Vec2::new(self.viewport.0 as f32, self.viewport.1 as f32) / work_resolution
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    #[test]
    fn corners_map_to_clip_space() {
        let camera = ScreenCamera::new(1280, 720);
        let proj = camera.projection();
        let top_left = proj * Vec4::new(0.0, 0.0, 0.0, 1.0);
        let bottom_right = proj * Vec4::new(1280.0, 720.0, 0.0, 1.0);
        assert!((top_left.x + 1.0).abs() < 1e-5);
        assert!((top_left.y - 1.0).abs() < 1e-5);
        assert!((bottom_right.x - 1.0).abs() < 1e-5);
        assert!((bottom_right.y + 1.0).abs() < 1e-5);
    }

    #[test]
    fn screen_scale_divides_display_by_work() {
        let camera = ScreenCamera::new(2560, 1440);
        assert_eq!(camera.screen_scale(Vec2::new(1280.0, 720.0)), Vec2::new(2.0, 2.0));
        assert_eq!(camera.screen_scale(Vec2::ZERO), Vec2::ONE);
    }
}
