//! Game entities and their batch slots.
//!
//! Every drawable owns one slot for the whole session. Slots are allocated in
//! draw order (backdrop first, UI last) because the batch is drawn with a
//! single indexed call.

use dino_core::animation::AnimationClock;
use dino_core::{Color, Rect};
use dino_render::{ScreenMapping, SlotId, SpriteBatch, SpriteQuad};
use glam::Vec2;

use crate::animation::{AnimationId, AnimationSet};
use crate::atlas::AtlasRegistry;
use crate::bitmap_text::BitmapText;
use crate::collision::Bounds;
use crate::config::{GameConfig, SCORE_DIGITS};

pub const CLOUD_COUNT: usize = 3;
pub const CACTUS_COUNT: usize = 3;

/// Logical state of one batch slot. Setters only mark the slot dirty when the
/// value actually changes.
#[derive(Debug, Clone)]
pub struct Sprite {
    slot: SlotId,
    position: Vec2,
    size: Vec2,
    scale: Vec2,
    source: Rect,
    color: Color,
    visible: bool,
    dirty: bool,
}

impl Sprite {
    pub fn new(slot: SlotId, source: Rect, scale: Vec2) -> Self {
        Self {
            slot,
            position: Vec2::ZERO,
            size: source.size(),
            scale,
            source,
            color: Color::WHITE,
            visible: true,
            dirty: true,
        }
    }

    pub fn slot(&self) -> SlotId {
        self.slot
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn source(&self) -> Rect {
        self.source
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// On-screen size in work units.
    pub fn extent(&self) -> Vec2 {
        self.size * self.scale
    }

    pub fn right(&self) -> f32 {
        self.position.x + self.extent().x
    }

    pub fn bottom(&self) -> f32 {
        self.position.y + self.extent().y
    }

    pub fn set_position(&mut self, position: Vec2) {
        if self.position != position {
            self.position = position;
            self.dirty = true;
        }
    }

    pub fn set_x(&mut self, x: f32) {
        self.set_position(Vec2::new(x, self.position.y));
    }

    pub fn set_y(&mut self, y: f32) {
        self.set_position(Vec2::new(self.position.x, y));
    }

    pub fn translate_x(&mut self, dx: f32) {
        self.set_x(self.position.x + dx);
    }

    /// Also resizes the sprite to the rect.
    pub fn set_source(&mut self, source: Rect) {
        if self.source != source {
            self.source = source;
            self.size = source.size();
            self.dirty = true;
        }
    }

    /// Swap the source rect while keeping the bottom edge in place.
    pub fn set_source_keep_bottom(&mut self, source: Rect) {
        let bottom = self.bottom();
        self.set_source(source);
        self.set_y(bottom - self.extent().y);
    }

    pub fn set_scale(&mut self, scale: Vec2) {
        if self.scale != scale {
            self.scale = scale;
            self.dirty = true;
        }
    }

    pub fn set_color(&mut self, color: Color) {
        if self.color != color {
            self.color = color;
            self.dirty = true;
        }
    }

    pub fn set_visible(&mut self, visible: bool) {
        if self.visible != visible {
            self.visible = visible;
            self.dirty = true;
        }
    }

    pub fn quad(&self) -> SpriteQuad {
        let color = if self.visible {
            self.color
        } else {
            self.color.with_alpha(0)
        };
        SpriteQuad {
            position: self.position,
            size: self.size,
            scale: self.scale,
            source: self.source,
            color,
        }
    }

    /// Write the slot's vertices when dirty (or when `force` is set) and
    /// clear the flag. Returns whether anything was written.
    pub fn sync(&mut self, batch: &mut SpriteBatch, mapping: &ScreenMapping, force: bool) -> bool {
        if !self.dirty && !force {
            return false;
        }
        batch.write_vertices(self.slot, &self.quad(), mapping);
        self.dirty = false;
        true
    }
}

impl Bounds for Sprite {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn size(&self) -> Vec2 {
        self.size
    }

    fn scale(&self) -> Vec2 {
        self.scale
    }
}

#[derive(Debug, Clone)]
pub struct Dino {
    pub sprite: Sprite,
    /// Vertical velocity, positive is down.
    pub gravity: f32,
    pub jump_influence: f32,
    pub is_jumping: bool,
    pub is_ducking: bool,
    animation: AnimationId,
    clock: AnimationClock,
}

impl Dino {
    pub fn new(sprite: Sprite) -> Self {
        Self {
            sprite,
            gravity: 0.0,
            jump_influence: 1.0,
            is_jumping: false,
            is_ducking: false,
            animation: AnimationId::DinoIdle,
            clock: AnimationClock::new(),
        }
    }

    pub fn animation(&self) -> AnimationId {
        self.animation
    }

    pub fn is_grounded(&self) -> bool {
        !self.is_jumping
    }

    /// Switch clips. Restarts the clock only when the clip changes.
    pub fn play(&mut self, id: AnimationId, animations: &AnimationSet) {
        if self.animation == id {
            return;
        }
        self.animation = id;
        self.clock.reset();
        if let Some(frame) = animations.get(id).first_frame() {
            self.sprite.set_source_keep_bottom(frame);
        }
    }

    pub fn animate(&mut self, animations: &AnimationSet, dt: f32) {
        if let Some(frame) = self.clock.advance(animations.get(self.animation), dt) {
            self.sprite.set_source_keep_bottom(frame);
        }
    }

    pub fn place_on_ground(&mut self, ground_y: f32) {
        self.sprite.set_y(ground_y - self.sprite.extent().y);
        self.gravity = 0.0;
        self.jump_influence = 1.0;
        self.is_jumping = false;
    }

    /// Start a jump if grounded. Returns whether the jump happened.
    pub fn jump(&mut self, config: &GameConfig) -> bool {
        if self.is_jumping {
            return false;
        }
        self.gravity = -config.jump_force;
        self.is_jumping = true;
        self.is_ducking = false;
        true
    }

    /// Grounded: toggles the crouch. Airborne: holding duck speeds up the fall.
    pub fn set_ducking(&mut self, duck: bool, config: &GameConfig) {
        if self.is_jumping {
            self.is_ducking = false;
            self.jump_influence = if duck {
                config.fast_fall_influence
            } else {
                1.0
            };
        } else {
            self.is_ducking = duck;
        }
    }

    /// Integrate one frame. Returns true on the frame a jump lands.
    pub fn step_physics(&mut self, dt: f32, config: &GameConfig) -> bool {
        self.gravity = (self.gravity + config.jump_weight * self.jump_influence * dt)
            .min(config.max_fall_speed);
        let y = self.sprite.position().y + self.gravity * dt;
        let height = self.sprite.extent().y;

        if y + height > config.ground_y {
            let landed = self.is_jumping;
            self.place_on_ground(config.ground_y);
            return landed;
        }
        self.sprite.set_y(y);
        false
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObstacleKind {
    Cactus,
    Pterodactyl,
}

#[derive(Debug, Clone)]
pub struct Obstacle {
    pub sprite: Sprite,
    pub kind: ObstacleKind,
    clock: AnimationClock,
}

impl Obstacle {
    pub fn new(sprite: Sprite, kind: ObstacleKind) -> Self {
        Self {
            sprite,
            kind,
            clock: AnimationClock::new(),
        }
    }

    /// Per-pair shrink factors, `(dino, obstacle)`.
    pub fn shrink(&self, config: &GameConfig) -> (Vec2, Vec2) {
        match self.kind {
            ObstacleKind::Cactus => (config.cactus_shrink_dino, config.cactus_shrink),
            ObstacleKind::Pterodactyl => {
                (config.pterodactyl_shrink_dino, config.pterodactyl_shrink)
            }
        }
    }

    pub fn animate(&mut self, animations: &AnimationSet, dt: f32) {
        if self.kind != ObstacleKind::Pterodactyl {
            return;
        }
        if let Some(frame) = self.clock.advance(animations.get(AnimationId::Pterodactyl), dt) {
            self.sprite.set_source(frame);
        }
    }
}

pub struct Entities {
    pub clouds: Vec<Sprite>,
    pub ground: Sprite,
    pub obstacles: Vec<Obstacle>,
    pub dino: Dino,
    pub score: BitmapText,
    pub hi_label: Sprite,
    pub high_score: BitmapText,
    pub game_over: Sprite,
    pub retry: Sprite,
    pub tap_hint: Sprite,
    pub cactus_shapes: Vec<Rect>,
}

impl Entities {
    /// Allocate every slot the game uses. Fails if the batch runs out.
    pub fn new(
        batch: &mut SpriteBatch,
        atlas: &AtlasRegistry,
        animations: &AnimationSet,
        config: &GameConfig,
    ) -> Result<Self, String> {
        let scale = config.sprite_scale_vec();
        let work = config.work_resolution;

        let cloud_rect = atlas.region("cloud")?;
        let mut clouds = Vec::with_capacity(CLOUD_COUNT);
        for i in 0..CLOUD_COUNT {
            let mut cloud = Sprite::new(batch.allocate_slot()?, cloud_rect, scale);
            let spacing = work.x / CLOUD_COUNT as f32;
            let y_span = config.cloud_y_range[1] - config.cloud_y_range[0];
            cloud.set_position(Vec2::new(
                spacing * (i as f32 + 0.5),
                config.cloud_y_range[0] + y_span * (i as f32 / CLOUD_COUNT as f32),
            ));
            clouds.push(cloud);
        }

        let ground = Sprite::new(
            batch.allocate_slot()?,
            atlas.region("ground")?,
            Vec2::new(config.ground_scale_x, config.sprite_scale),
        );

        let cactus_shapes = vec![
            atlas.region("cactus_small")?,
            atlas.region("cactus_large")?,
            atlas.region("cactus_group")?,
        ];
        let mut obstacles = Vec::with_capacity(CACTUS_COUNT + 1);
        for _ in 0..CACTUS_COUNT {
            let sprite = Sprite::new(batch.allocate_slot()?, cactus_shapes[0], scale);
            obstacles.push(Obstacle::new(sprite, ObstacleKind::Cactus));
        }
        let ptero_frame = animations
            .get(AnimationId::Pterodactyl)
            .first_frame()
            .ok_or_else(|| "Animation 'pterodactyl' has no frames".to_string())?;
        let ptero = Sprite::new(batch.allocate_slot()?, ptero_frame, scale);
        obstacles.push(Obstacle::new(ptero, ObstacleKind::Pterodactyl));

        let idle_frame = animations
            .get(AnimationId::DinoIdle)
            .first_frame()
            .ok_or_else(|| "Animation 'dino_idle' has no frames".to_string())?;
        let dino = Dino::new(Sprite::new(batch.allocate_slot()?, idle_frame, scale));

        let digit_rect = atlas.region("digit_0")?;
        let score = BitmapText::new(
            batch,
            SCORE_DIGITS,
            digit_rect,
            atlas.digit_pitch,
            config.score_position,
            config.glyph_advance,
            scale,
        )?;
        let hi_label = Sprite::new(batch.allocate_slot()?, atlas.region("hi")?, scale);
        let high_score = BitmapText::new(
            batch,
            SCORE_DIGITS,
            digit_rect,
            atlas.digit_pitch,
            config.high_score_position,
            config.glyph_advance,
            scale,
        )?;

        let game_over = Sprite::new(batch.allocate_slot()?, atlas.region("game_over")?, scale);
        let retry = Sprite::new(batch.allocate_slot()?, atlas.region("restart")?, scale);
        let tap_hint = Sprite::new(batch.allocate_slot()?, atlas.region("tap_hint")?, scale);

        let mut entities = Self {
            clouds,
            ground,
            obstacles,
            dino,
            score,
            hi_label,
            high_score,
            game_over,
            retry,
            tap_hint,
            cactus_shapes,
        };
        entities.apply_layout(config);
        entities.dino.place_on_ground(config.ground_y);
        entities.show_menu();
        Ok(entities)
    }

    /// Position and scale everything whose placement comes from the config.
    /// Moving objects keep their X.
    pub fn apply_layout(&mut self, config: &GameConfig) {
        let scale = config.sprite_scale_vec();

        self.ground
            .set_scale(Vec2::new(config.ground_scale_x, config.sprite_scale));
        self.ground.set_y(config.ground_sprite_y);
        for cloud in &mut self.clouds {
            cloud.set_scale(scale);
        }
        for obstacle in &mut self.obstacles {
            obstacle.sprite.set_scale(scale);
        }
        self.dino.sprite.set_scale(scale);
        self.dino.sprite.set_x(config.dino_x);

        self.score
            .layout(config.score_position, config.glyph_advance, scale);
        self.high_score
            .layout(config.high_score_position, config.glyph_advance, scale);
        self.hi_label.set_scale(scale);
        let hi_width = self.hi_label.extent().x;
        self.hi_label.set_position(Vec2::new(
            config.high_score_position.x - hi_width - config.glyph_advance,
            config.high_score_position.y,
        ));

        for (sprite, position) in [
            (&mut self.game_over, config.game_over_position),
            (&mut self.retry, config.retry_position),
            (&mut self.tap_hint, config.tap_hint_position),
        ] {
            sprite.set_scale(scale);
            sprite.set_position(position);
        }
    }

    /// Menu layout: idle dino and the tap hint, nothing else.
    pub fn show_menu(&mut self) {
        self.score.set_visible(false);
        self.high_score.set_visible(false);
        self.hi_label.set_visible(false);
        self.game_over.set_visible(false);
        self.retry.set_visible(false);
        self.tap_hint.set_visible(true);
        for obstacle in &mut self.obstacles {
            obstacle.sprite.set_visible(false);
        }
    }

    pub fn show_playing_ui(&mut self, show_high_score: bool) {
        self.tap_hint.set_visible(false);
        self.game_over.set_visible(false);
        self.retry.set_visible(false);
        self.score.set_visible(true);
        self.high_score.set_visible(show_high_score);
        self.hi_label.set_visible(show_high_score);
    }

    pub fn show_game_over(&mut self) {
        self.game_over.set_visible(true);
        self.retry.set_visible(true);
    }

    pub fn for_each_sprite_mut(&mut self, mut f: impl FnMut(&mut Sprite)) {
        for cloud in &mut self.clouds {
            f(cloud);
        }
        f(&mut self.ground);
        for obstacle in &mut self.obstacles {
            f(&mut obstacle.sprite);
        }
        f(&mut self.dino.sprite);
        for glyph in self.score.glyphs_mut() {
            f(glyph);
        }
        f(&mut self.hi_label);
        for glyph in self.high_score.glyphs_mut() {
            f(glyph);
        }
        f(&mut self.game_over);
        f(&mut self.retry);
        f(&mut self.tap_hint);
    }

    pub fn set_tint(&mut self, tint: Color) {
        self.for_each_sprite_mut(|sprite| sprite.set_color(tint));
    }

    /// Write dirty sprites into the batch. Returns how many slots were written.
    pub fn sync(&mut self, batch: &mut SpriteBatch, mapping: &ScreenMapping, force: bool) -> usize {
        let mut written = 0;
        self.for_each_sprite_mut(|sprite| {
            if sprite.sync(batch, mapping, force) {
                written += 1;
            }
        });
        written
    }
}
