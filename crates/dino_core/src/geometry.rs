//! Plain value types shared by the renderer and the game: rectangles in atlas
//! pixel space and packed RGBA colors. Points and sizes use `glam::Vec2`.

use glam::Vec2;
use serde::Deserialize;

/// Axis-aligned rectangle, top-left origin, Y grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    #[serde(alias = "w")]
    pub width: f32,
    #[serde(alias = "h")]
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn origin(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Same size, shifted horizontally by `dx`.
    pub fn offset_x(&self, dx: f32) -> Self {
        Self {
            x: self.x + dx,
            ..*self
        }
    }
}

/// Color packed as `0xRRGGBBAA`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color(pub u32);

impl Color {
    pub const WHITE: Color = Color(0xFFFF_FFFF);

    pub const fn from_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Color(((r as u32) << 24) | ((g as u32) << 16) | ((b as u32) << 8) | a as u32)
    }

    /// Opaque grey of the given intensity, clamped to `[0, 1]`.
    pub fn from_intensity(intensity: f32) -> Self {
        let level = (intensity.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self::from_rgba(level, level, level, 0xFF)
    }

    pub const fn r(self) -> u8 {
        (self.0 >> 24) as u8
    }

    pub const fn g(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub const fn b(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn a(self) -> u8 {
        self.0 as u8
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Color((self.0 & 0xFFFF_FF00) | a as u32)
    }

    pub fn to_normalized(self) -> [f32; 4] {
        [
            self.r() as f32 / 255.0,
            self.g() as f32 / 255.0,
            self.b() as f32 / 255.0,
            self.a() as f32 / 255.0,
        ]
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}

/// Linear interpolation between `a` and `b`; `t` is clamped to `[0, 1]`.
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_channels_unpack_in_rgba_order() {
        let c = Color(0x1122_3344);
        assert_eq!(c.r(), 0x11);
        assert_eq!(c.g(), 0x22);
        assert_eq!(c.b(), 0x33);
        assert_eq!(c.a(), 0x44);
        assert_eq!(Color::from_rgba(0x11, 0x22, 0x33, 0x44), c);
    }

    #[test]
    fn with_alpha_keeps_rgb() {
        let c = Color(0xAABB_CCDD).with_alpha(0);
        assert_eq!(c, Color(0xAABB_CC00));
    }

    #[test]
    fn normalized_white_is_all_ones() {
        assert_eq!(Color::WHITE.to_normalized(), [1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn intensity_is_clamped_and_opaque() {
        assert_eq!(Color::from_intensity(2.0), Color::WHITE);
        assert_eq!(Color::from_intensity(-1.0), Color(0x0000_00FF));
    }

    #[test]
    fn lerp_clamps_progress() {
        assert_eq!(lerp(0.0, 10.0, 0.5), 5.0);
        assert_eq!(lerp(0.0, 10.0, 3.0), 10.0);
        assert_eq!(lerp(4.0, 2.0, -1.0), 4.0);
    }

    #[test]
    fn rect_deserializes_short_field_names() {
        let rect: Rect = serde_json::from_str(r#"{ "x": 1, "y": 2, "w": 3, "h": 4 }"#)
            .expect("rect should parse");
        assert_eq!(rect, Rect::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!(rect.right(), 4.0);
        assert_eq!(rect.bottom(), 6.0);
    }
}
