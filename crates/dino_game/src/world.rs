//! Game state and the per-frame update.
//!
//! ```text
//! Menu ──(first landing after a jump)──> Playing ──(obstacle hit)──> Dead
//!                                           ^                          │
//!                                           └──(grace over)── Respawning <┘ (retry tap)
//! ```
//!
//! The world never touches the GPU. Each frame the host calls [`World::update`]
//! and then [`World::sync_batch`], which writes dirty sprites into the CPU
//! staging batch for upload.

use dino_core::{Color, Rect};
use dino_render::{ScreenMapping, SpriteBatch};
use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::animation::{AnimationId, AnimationSet};
use crate::atlas::AtlasRegistry;
use crate::bitmap_text::score_to_string;
use crate::collision::{overlaps, point_hits};
use crate::config::{GameConfig, MAX_SCORE, SCORE_DIGITS};
use crate::controls::FrameInput;
use crate::day_night::DayNight;
use crate::entities::{Entities, Obstacle, ObstacleKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    Menu,
    Playing,
    Dead,
    Respawning,
}

impl GamePhase {
    pub fn label(self) -> &'static str {
        match self {
            Self::Menu => "menu",
            Self::Playing => "playing",
            Self::Dead => "dead",
            Self::Respawning => "respawning",
        }
    }
}

pub struct World {
    config: GameConfig,
    phase: GamePhase,
    paused: bool,
    entities: Entities,
    animations: AnimationSet,
    atlas_size: Vec2,
    rng: StdRng,
    score: u32,
    high_score: u32,
    score_timer: f32,
    objects_velocity: f32,
    day_night: DayNight,
    grace_timer: f32,
    hint_timer: f32,
    has_jumped: bool,
    tint_dirty: bool,
    needs_full_sync: bool,
}

impl World {
    /// Allocate every sprite slot and lay out the menu. Fails when the atlas
    /// lacks a clip or region, or the batch is too small.
    pub fn new(
        batch: &mut SpriteBatch,
        atlas: &AtlasRegistry,
        config: GameConfig,
    ) -> Result<Self, String> {
        let animations = AnimationSet::from_atlas(atlas)?;
        let entities = Entities::new(batch, atlas, &animations, &config)?;
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        log::info!(
            "World ready: {} of {} sprite slots in use",
            batch.allocated(),
            batch.capacity()
        );

        let mut world = Self {
            config,
            phase: GamePhase::Menu,
            paused: false,
            entities,
            animations,
            atlas_size: atlas.size,
            rng,
            score: 0,
            high_score: 0,
            score_timer: 0.0,
            objects_velocity: 1.0,
            day_night: DayNight::new(),
            grace_timer: 0.0,
            hint_timer: 0.0,
            has_jumped: false,
            tint_dirty: true,
            needs_full_sync: true,
        };
        world.refresh_score_text();
        world.refresh_high_score_text();
        Ok(world)
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn objects_velocity(&self) -> f32 {
        self.objects_velocity
    }

    pub fn is_night(&self) -> bool {
        self.day_night.is_night()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn entities(&self) -> &Entities {
        &self.entities
    }

    pub fn atlas_size(&self) -> Vec2 {
        self.atlas_size
    }

    /// Normalize UVs by the pixel size of the texture actually uploaded rather
    /// than the size the atlas metadata declares.
    pub fn set_texture_size(&mut self, width: u32, height: u32) {
        let size = Vec2::new(width as f32, height as f32);
        if size == self.atlas_size {
            return;
        }
        log::warn!(
            "Atlas texture is {}x{} but metadata declares {}x{}; using the texture size",
            width,
            height,
            self.atlas_size.x,
            self.atlas_size.y
        );
        self.atlas_size = size;
        self.needs_full_sync = true;
    }

    pub fn set_paused(&mut self, paused: bool) {
        if self.paused != paused {
            self.paused = paused;
            log::info!("{}", if paused { "Paused" } else { "Resumed" });
        }
    }

    pub fn toggle_pause(&mut self) {
        self.set_paused(!self.paused);
    }

    /// Swap in a reloaded config. Layout changes apply immediately; the
    /// random seed only matters at startup.
    pub fn apply_config(&mut self, config: GameConfig) {
        self.entities.apply_layout(&config);
        let dino = &mut self.entities.dino;
        let resting = self.phase == GamePhase::Menu || self.phase == GamePhase::Dead;
        if resting && dino.is_grounded() {
            dino.place_on_ground(config.ground_y);
        }
        self.objects_velocity = self.objects_velocity.min(config.max_objects_velocity);
        self.config = config;
        self.tint_dirty = true;
        self.needs_full_sync = true;
        log::info!("Game config applied");
    }

    /// Advance one frame unless paused.
    pub fn update(&mut self, dt: f32, input: &FrameInput) {
        if self.paused {
            return;
        }
        self.step(dt, input);
    }

    /// Advance one frame regardless of the pause flag.
    pub fn step(&mut self, dt: f32, input: &FrameInput) {
        match self.phase {
            GamePhase::Menu => self.update_menu(dt, input),
            GamePhase::Playing => self.update_running(dt, input, false),
            GamePhase::Respawning => {
                self.grace_timer -= dt;
                if self.grace_timer <= 0.0 {
                    self.grace_timer = 0.0;
                    self.phase = GamePhase::Playing;
                    log::info!("Grace period over");
                }
                let in_grace = self.phase == GamePhase::Respawning;
                self.update_running(dt, input, in_grace);
            }
            GamePhase::Dead => self.update_dead(input),
        }
        self.update_colors(dt);
    }

    fn update_menu(&mut self, dt: f32, input: &FrameInput) {
        self.hint_timer += dt;
        if self.hint_timer >= self.config.hint_blink {
            self.hint_timer = 0.0;
            let visible = self.entities.tap_hint.is_visible();
            self.entities.tap_hint.set_visible(!visible);
        }

        let dino = &mut self.entities.dino;
        if input.jump && dino.jump(&self.config) {
            self.has_jumped = true;
        }
        let landed = dino.step_physics(dt, &self.config);
        self.animate_dino(dt);

        if landed && self.has_jumped {
            self.start_playing();
        }
    }

    fn update_running(&mut self, dt: f32, input: &FrameInput, in_grace: bool) {
        let dino = &mut self.entities.dino;
        if !in_grace {
            if input.jump {
                dino.jump(&self.config);
            }
            dino.set_ducking(input.duck, &self.config);
            dino.step_physics(dt, &self.config);
        } else if dino.is_grounded() {
            dino.set_ducking(input.duck, &self.config);
        }

        self.objects_velocity = (self.objects_velocity + self.config.velocity_ramp * dt)
            .min(self.config.max_objects_velocity);
        self.scroll(dt);
        self.animate_dino(dt);
        for obstacle in &mut self.entities.obstacles {
            obstacle.animate(&self.animations, dt);
        }
        self.tick_score(dt);

        if self.dino_hit_obstacle() {
            self.die();
        }
    }

    fn update_dead(&mut self, input: &FrameInput) {
        let tapped_retry = input
            .tap
            .is_some_and(|point| point_hits(point, &self.entities.retry));
        if tapped_retry || input.confirm {
            self.respawn();
        }
    }

    fn start_playing(&mut self) {
        self.phase = GamePhase::Playing;
        self.entities.show_playing_ui(self.high_score > 0);
        self.reset_obstacles();
        log::info!("Run started");
    }

    fn die(&mut self) {
        self.phase = GamePhase::Dead;
        self.high_score = self.high_score.max(self.score);
        let dino = &mut self.entities.dino;
        dino.gravity = 0.0;
        dino.is_ducking = false;
        dino.play(AnimationId::DinoDead, &self.animations);
        self.entities.show_game_over();
        self.refresh_high_score_text();
        log::info!(
            "Game over at score {} (high score {})",
            self.score,
            self.high_score
        );
    }

    fn respawn(&mut self) {
        self.phase = GamePhase::Respawning;
        self.grace_timer = self.config.respawn_grace;
        self.score = 0;
        self.score_timer = 0.0;
        self.objects_velocity = 1.0;
        self.day_night.reset();
        self.tint_dirty = true;

        let dino = &mut self.entities.dino;
        dino.is_ducking = false;
        dino.play(AnimationId::DinoRun, &self.animations);
        dino.place_on_ground(self.config.ground_y);

        self.reset_obstacles();
        self.entities.show_playing_ui(self.high_score > 0);
        self.refresh_score_text();
        log::info!("Respawning");
    }

    fn animate_dino(&mut self, dt: f32) {
        let dino = &self.entities.dino;
        let id = match self.phase {
            GamePhase::Dead => AnimationId::DinoDead,
            _ if dino.is_jumping => AnimationId::DinoJump,
            GamePhase::Menu => AnimationId::DinoIdle,
            _ if dino.is_ducking => AnimationId::DinoDuck,
            _ => AnimationId::DinoRun,
        };
        let dino = &mut self.entities.dino;
        dino.play(id, &self.animations);
        dino.animate(&self.animations, dt);
    }

    fn scroll(&mut self, dt: f32) {
        let shift = self.config.base_speed * self.objects_velocity * dt;

        let ground = &mut self.entities.ground;
        ground.translate_x(-shift);
        if ground.position().x < -ground.extent().x / 2.0 {
            ground.set_x(0.0);
        }

        let cloud_shift = self.config.cloud_speed * self.objects_velocity * dt;
        let [min_y, max_y] = self.config.cloud_y_range;
        for cloud in &mut self.entities.clouds {
            cloud.translate_x(-cloud_shift);
            if cloud.right() < 0.0 {
                let y = self.rng.gen_range(min_y..=max_y);
                cloud.set_position(Vec2::new(self.config.work_resolution.x, y));
            }
        }

        for obstacle in &mut self.entities.obstacles {
            obstacle.sprite.translate_x(-shift);
        }
        for index in 0..self.entities.obstacles.len() {
            if self.entities.obstacles[index].sprite.right() >= 0.0 {
                continue;
            }
            let behind = farthest_right(&self.entities.obstacles, Some(index))
                .max(self.config.work_resolution.x);
            place_obstacle(
                &mut self.entities.obstacles[index],
                behind,
                &self.entities.cactus_shapes,
                &self.config,
                &mut self.rng,
            );
        }
    }

    fn reset_obstacles(&mut self) {
        let mut behind = self.config.work_resolution.x;
        for obstacle in &mut self.entities.obstacles {
            behind = place_obstacle(
                obstacle,
                behind,
                &self.entities.cactus_shapes,
                &self.config,
                &mut self.rng,
            );
        }
    }

    fn dino_hit_obstacle(&self) -> bool {
        let dino = &self.entities.dino.sprite;
        self.entities
            .obstacles
            .iter()
            .filter(|obstacle| obstacle.sprite.is_visible())
            .any(|obstacle| {
                let (shrink_dino, shrink_obstacle) = obstacle.shrink(&self.config);
                overlaps(dino, &obstacle.sprite, shrink_dino, shrink_obstacle)
            })
    }

    fn tick_score(&mut self, dt: f32) {
        let before = self.score;
        self.score_timer += dt;
        while self.score_timer >= self.config.score_step {
            self.score_timer -= self.config.score_step;
            if self.score >= MAX_SCORE {
                self.score_timer = 0.0;
                break;
            }
            let fade_block = self.score / self.config.score_to_fade;
            self.score += 1;
            if self.score / self.config.score_to_fade != fade_block {
                self.day_night.start_flip();
            }
        }
        if self.score != before {
            self.refresh_score_text();
        }
    }

    fn update_colors(&mut self, dt: f32) {
        let fading = self.day_night.update(dt, self.config.fade_duration);
        if fading || self.tint_dirty {
            let tint = self.day_night.tint(&self.config);
            self.entities.set_tint(tint);
            self.tint_dirty = false;
        }
    }

    fn refresh_score_text(&mut self) {
        self.entities
            .score
            .set_text(&score_to_string(self.score, SCORE_DIGITS));
    }

    fn refresh_high_score_text(&mut self) {
        self.entities
            .high_score
            .set_text(&score_to_string(self.high_score, SCORE_DIGITS));
        if self.phase != GamePhase::Menu {
            let show = self.high_score > 0;
            self.entities.high_score.set_visible(show);
            self.entities.hi_label.set_visible(show);
        }
    }

    /// Clear color for this frame.
    pub fn background(&self) -> Color {
        self.day_night.background(&self.config)
    }

    /// Write dirty sprites to `batch`. `force` rewrites every slot, which the
    /// host requests after a resize changes `screen_scale`.
    pub fn sync_batch(
        &mut self,
        batch: &mut SpriteBatch,
        screen_scale: Vec2,
        force: bool,
    ) -> usize {
        let mapping = ScreenMapping::new(self.atlas_size, screen_scale);
        let force = force || self.needs_full_sync;
        self.needs_full_sync = false;
        self.entities.sync(batch, &mapping, force)
    }
}

fn farthest_right(obstacles: &[Obstacle], skip: Option<usize>) -> f32 {
    obstacles
        .iter()
        .enumerate()
        .filter(|(i, _)| Some(*i) != skip)
        .map(|(_, obstacle)| obstacle.sprite.right())
        .fold(f32::MIN, f32::max)
}

/// Put `obstacle` a random gap past `behind` with a random shape or lane.
/// Returns its new right edge.
fn place_obstacle(
    obstacle: &mut Obstacle,
    behind: f32,
    cactus_shapes: &[Rect],
    config: &GameConfig,
    rng: &mut StdRng,
) -> f32 {
    let gap = config.obstacle_min_gap + rng.gen_range(0.0..=config.obstacle_gap_jitter);
    let sprite = &mut obstacle.sprite;
    match obstacle.kind {
        ObstacleKind::Cactus => {
            if !cactus_shapes.is_empty() {
                sprite.set_source(cactus_shapes[rng.gen_range(0..cactus_shapes.len())]);
            }
            sprite.set_y(config.ground_y - sprite.extent().y);
        }
        ObstacleKind::Pterodactyl => {
            let lane = config.pterodactyl_lanes[rng.gen_range(0..config.pterodactyl_lanes.len())];
            sprite.set_y(lane);
        }
    }
    sprite.set_x(behind + gap);
    sprite.set_visible(true);
    sprite.right()
}
