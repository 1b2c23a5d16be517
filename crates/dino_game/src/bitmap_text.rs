//! Digit strings drawn from a strip of glyphs on the atlas.
//!
//! The atlas lays digits `0..=9` side by side starting at `digit_0`, so digit
//! `d` is the base rect shifted right by `d * glyph_pitch`.

use dino_core::Rect;
use dino_render::SpriteBatch;
use glam::Vec2;

use crate::entities::Sprite;

/// Zero-padded decimal of `value`, clamped to the largest number that fits in
/// `width` digits.
pub fn score_to_string(value: u32, width: usize) -> String {
    let max = 10u64
        .checked_pow(width as u32)
        .map_or(u64::MAX, |limit| limit - 1);
    let clamped = u64::from(value).min(max);
    format!("{clamped:0width$}")
}

#[derive(Debug, Clone)]
pub struct BitmapText {
    glyphs: Vec<Sprite>,
    has_glyph: Vec<bool>,
    glyph_pitch: f32,
    base_rect: Rect,
    visible: bool,
}

impl BitmapText {
    pub fn new(
        batch: &mut SpriteBatch,
        glyph_count: usize,
        base_rect: Rect,
        glyph_pitch: f32,
        origin: Vec2,
        advance: f32,
        scale: Vec2,
    ) -> Result<Self, String> {
        let glyphs = (0..glyph_count)
            .map(|_| Ok(Sprite::new(batch.allocate_slot()?, base_rect, scale)))
            .collect::<Result<Vec<_>, String>>()?;
        let mut text = Self {
            has_glyph: vec![true; glyph_count],
            glyphs,
            glyph_pitch,
            base_rect,
            visible: true,
        };
        text.layout(origin, advance, scale);
        Ok(text)
    }

    /// Remap every glyph to the matching character of `text`. Non-digits and
    /// positions past the end of `text` are blanked; characters past the last
    /// glyph are dropped.
    pub fn set_text(&mut self, text: &str) {
        let mut chars = text.chars();
        for (glyph, has_glyph) in self.glyphs.iter_mut().zip(self.has_glyph.iter_mut()) {
            match chars.next().and_then(|c| c.to_digit(10)) {
                Some(digit) => {
                    glyph.set_source(self.base_rect.offset_x(digit as f32 * self.glyph_pitch));
                    *has_glyph = true;
                }
                None => *has_glyph = false,
            }
            glyph.set_visible(self.visible && *has_glyph);
        }
    }

    /// Move the first glyph to `origin` and space the rest by `advance`.
    pub fn layout(&mut self, origin: Vec2, advance: f32, scale: Vec2) {
        for (i, glyph) in self.glyphs.iter_mut().enumerate() {
            glyph.set_scale(scale);
            glyph.set_position(origin + Vec2::new(advance * i as f32, 0.0));
        }
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
        for (glyph, has_glyph) in self.glyphs.iter_mut().zip(&self.has_glyph) {
            glyph.set_visible(visible && *has_glyph);
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn glyphs(&self) -> &[Sprite] {
        &self.glyphs
    }

    pub fn glyphs_mut(&mut self) -> impl Iterator<Item = &mut Sprite> {
        self.glyphs.iter_mut()
    }
}
