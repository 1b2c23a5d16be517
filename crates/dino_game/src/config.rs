//! Gameplay tuning loaded from `assets/config/dino.json`.
//!
//! Every field has a default, so the file only needs to list what it changes.
//! The host polls the file's mtime and re-applies the config between frames.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use glam::Vec2;
use serde::Deserialize;

/// Highest score the five-digit counter can display.
pub const MAX_SCORE: u32 = 99_999;
pub const SCORE_DIGITS: usize = 5;

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    pub work_resolution: Vec2,
    pub sprite_scale: f32,
    pub rng_seed: Option<u64>,

    pub ground_y: f32,
    pub ground_sprite_y: f32,
    pub ground_scale_x: f32,
    pub dino_x: f32,

    pub jump_force: f32,
    pub jump_weight: f32,
    pub max_fall_speed: f32,
    pub fast_fall_influence: f32,

    pub base_speed: f32,
    pub velocity_ramp: f32,
    pub max_objects_velocity: f32,
    pub cloud_speed: f32,
    pub cloud_y_range: [f32; 2],
    pub obstacle_min_gap: f32,
    pub obstacle_gap_jitter: f32,
    pub pterodactyl_lanes: Vec<f32>,

    pub cactus_shrink_dino: Vec2,
    pub cactus_shrink: Vec2,
    pub pterodactyl_shrink_dino: Vec2,
    pub pterodactyl_shrink: Vec2,

    pub score_step: f32,
    pub score_to_fade: u32,
    pub fade_duration: f32,
    pub day_background: f32,
    pub night_background: f32,
    pub day_tint: f32,
    pub night_tint: f32,

    pub respawn_grace: f32,
    pub hint_blink: f32,
    /// Touches left of this normalized X duck, the rest jump.
    pub duck_zone: f32,

    pub score_position: Vec2,
    pub high_score_position: Vec2,
    pub glyph_advance: f32,
    pub game_over_position: Vec2,
    pub retry_position: Vec2,
    pub tap_hint_position: Vec2,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            work_resolution: Vec2::new(1280.0, 720.0),
            sprite_scale: 2.0,
            rng_seed: None,

            ground_y: 560.0,
            ground_sprite_y: 546.0,
            ground_scale_x: 2.2,
            dino_x: 100.0,

            jump_force: 1300.0,
            jump_weight: 4200.0,
            max_fall_speed: 1600.0,
            fast_fall_influence: 3.0,

            base_speed: 500.0,
            velocity_ramp: 0.01,
            max_objects_velocity: 2.5,
            cloud_speed: 60.0,
            cloud_y_range: [100.0, 300.0],
            obstacle_min_gap: 450.0,
            obstacle_gap_jitter: 500.0,
            pterodactyl_lanes: vec![330.0, 420.0, 480.0],

            cactus_shrink_dino: Vec2::new(0.9, 0.9),
            cactus_shrink: Vec2::new(1.0, 1.0),
            pterodactyl_shrink_dino: Vec2::new(0.8, 0.9),
            pterodactyl_shrink: Vec2::new(0.9, 0.6),

            score_step: 0.1,
            score_to_fade: 700,
            fade_duration: 1.0,
            day_background: 0.97,
            night_background: 0.13,
            day_tint: 0.33,
            night_tint: 0.85,

            respawn_grace: 0.5,
            hint_blink: 0.5,
            duck_zone: 0.5,

            score_position: Vec2::new(1130.0, 40.0),
            high_score_position: Vec2::new(960.0, 40.0),
            glyph_advance: 22.0,
            game_over_position: Vec2::new(449.0, 250.0),
            retry_position: Vec2::new(604.0, 310.0),
            tap_hint_position: Vec2::new(520.0, 400.0),
        }
    }
}

impl GameConfig {
    pub fn sprite_scale_vec(&self) -> Vec2 {
        Vec2::splat(self.sprite_scale)
    }
}

pub fn parse_config(raw: &str, origin: &str) -> Result<GameConfig, String> {
    let config: GameConfig = serde_json::from_str(raw)
        .map_err(|e| format!("Failed to parse game config {origin}: {e}"))?;
    validate_config(&config)?;
    Ok(config)
}

pub fn load_config_from_path(path: &Path) -> Result<GameConfig, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read game config {}: {e}", path.display()))?;
    parse_config(&raw, &path.display().to_string())
}

/// Load `path`, or fall back to the built-in defaults.
pub fn load_config_or_default(path: &Path) -> GameConfig {
    match load_config_from_path(path) {
        Ok(config) => {
            log::info!("Game config loaded from {}", path.display());
            config
        }
        Err(err) => {
            log::warn!("{err}. Using default game config.");
            GameConfig::default()
        }
    }
}

fn validate_config(config: &GameConfig) -> Result<(), String> {
    if config.work_resolution.x <= 0.0 || config.work_resolution.y <= 0.0 {
        return Err("Config validation failed: work_resolution must be > 0".to_string());
    }
    if config.sprite_scale <= 0.0 || config.ground_scale_x <= 0.0 {
        return Err("Config validation failed: sprite scales must be > 0".to_string());
    }
    if config.score_step <= 0.0 {
        return Err("Config validation failed: score_step must be > 0".to_string());
    }
    if config.score_to_fade == 0 {
        return Err("Config validation failed: score_to_fade must be > 0".to_string());
    }
    if config.fade_duration <= 0.0 {
        return Err("Config validation failed: fade_duration must be > 0".to_string());
    }
    if config.jump_weight <= 0.0 || config.jump_force <= 0.0 || config.max_fall_speed <= 0.0 {
        return Err(
            "Config validation failed: jump_force, jump_weight and max_fall_speed must be > 0"
                .to_string(),
        );
    }
    if config.max_objects_velocity < 1.0 {
        return Err("Config validation failed: max_objects_velocity must be >= 1".to_string());
    }
    if config.velocity_ramp < 0.0 {
        return Err("Config validation failed: velocity_ramp must be >= 0".to_string());
    }
    if config.respawn_grace < 0.0 {
        return Err("Config validation failed: respawn_grace must be >= 0".to_string());
    }
    if config.hint_blink <= 0.0 {
        return Err("Config validation failed: hint_blink must be > 0".to_string());
    }
    if config.cloud_y_range[0] > config.cloud_y_range[1] {
        return Err("Config validation failed: cloud_y_range is inverted".to_string());
    }
    if config.obstacle_gap_jitter < 0.0 || config.obstacle_min_gap < 0.0 {
        return Err("Config validation failed: obstacle gaps must be >= 0".to_string());
    }
    if config.pterodactyl_lanes.is_empty() {
        return Err("Config validation failed: pterodactyl_lanes is empty".to_string());
    }
    if !(0.0..=1.0).contains(&config.duck_zone) {
        return Err("Config validation failed: duck_zone must be within [0, 1]".to_string());
    }
    Ok(())
}

/// Polls a file's modification time.
pub struct FileWatcher {
    path: PathBuf,
    last_seen_modified: Option<SystemTime>,
}

impl FileWatcher {
    pub fn new(path: PathBuf) -> Self {
        let last_seen_modified = modified_time(&path);
        Self {
            path,
            last_seen_modified,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn should_reload(&mut self) -> bool {
        let current = modified_time(&self.path);
        match (self.last_seen_modified, current) {
            (Some(old), Some(now)) if now > old => {
                self.last_seen_modified = Some(now);
                true
            }
            (None, Some(now)) => {
                self.last_seen_modified = Some(now);
                true
            }
            _ => false,
        }
    }
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).ok()?.modified().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::UNIX_EPOCH;

    fn temp_file_path(name_hint: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "dino_config_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    #[test]
    fn empty_object_yields_defaults() {
        let config = parse_config("{}", "test").expect("defaults are valid");
        assert_eq!(config, GameConfig::default());
    }

    #[test]
    fn partial_file_overrides_listed_fields() {
        let config = parse_config(
            r#"{ "score_to_fade": 100, "work_resolution": [640, 360], "rng_seed": 7 }"#,
            "test",
        )
        .expect("valid config");
        assert_eq!(config.score_to_fade, 100);
        assert_eq!(config.work_resolution, Vec2::new(640.0, 360.0));
        assert_eq!(config.rng_seed, Some(7));
        assert_eq!(config.jump_force, GameConfig::default().jump_force);
    }

    #[test]
    fn rejects_zero_score_step() {
        let err = parse_config(r#"{ "score_step": 0 }"#, "test").expect_err("invalid");
        assert!(err.contains("score_step"));
    }

    #[test]
    fn rejects_negative_ramp_and_grace() {
        let err = parse_config(r#"{ "velocity_ramp": -0.5 }"#, "test").expect_err("invalid");
        assert!(err.contains("velocity_ramp"));
        let err = parse_config(r#"{ "respawn_grace": -1.0 }"#, "test").expect_err("invalid");
        assert!(err.contains("respawn_grace"));
        assert!(parse_config(r#"{ "velocity_ramp": 0.0, "respawn_grace": 0.0 }"#, "test").is_ok());
    }

    #[test]
    fn rejects_non_positive_hint_blink() {
        let err = parse_config(r#"{ "hint_blink": 0.0 }"#, "test").expect_err("invalid");
        assert!(err.contains("hint_blink"));
    }

    #[test]
    fn rejects_empty_lanes() {
        let err = parse_config(r#"{ "pterodactyl_lanes": [] }"#, "test").expect_err("invalid");
        assert!(err.contains("pterodactyl_lanes"));
    }

    #[test]
    fn rejects_malformed_json() {
        let err = parse_config("{ nope", "test").expect_err("invalid json");
        assert!(err.contains("Failed to parse"));
    }

    #[test]
    fn load_config_from_path_reads_file() {
        let path = temp_file_path("load");
        fs::write(&path, r#"{ "respawn_grace": 1.25 }"#).expect("write temp file");
        let config = load_config_from_path(&path).expect("valid config");
        assert_eq!(config.respawn_grace, 1.25);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let path = temp_file_path("missing");
        assert_eq!(load_config_or_default(&path), GameConfig::default());
    }

    #[test]
    fn shipped_config_matches_defaults() {
        let raw = include_str!("../../../assets/config/dino.json");
        let config = parse_config(raw, "dino.json").expect("shipped config is valid");
        assert_eq!(config, GameConfig::default());
    }

    #[test]
    fn watcher_reports_new_file_once() {
        let path = temp_file_path("watch");
        let mut watcher = FileWatcher::new(path.clone());
        assert!(!watcher.should_reload());
        fs::write(&path, "{}").expect("write temp file");
        assert!(watcher.should_reload());
        assert!(!watcher.should_reload());
        let _ = fs::remove_file(path);
    }
}
