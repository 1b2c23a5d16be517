//! Scripted input sequences for deterministic runs.
//!
//! A replay is a fixed timestep plus a list of [`FrameInput`]s, each repeated
//! `repeat` times. Set `DINO_REPLAY=replays/<file>.json` to drive the game from
//! one instead of the mouse and keyboard.

use dino_core::assets::AssetSource;
use serde::Deserialize;

use crate::controls::FrameInput;

#[derive(Debug, Deserialize, Clone)]
pub struct ReplaySequence {
    #[serde(default = "default_dt")]
    pub fixed_dt: f32,
    pub frames: Vec<ReplayFrame>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReplayFrame {
    #[serde(flatten)]
    pub input: FrameInput,
    #[serde(default = "default_repeat")]
    pub repeat: u32,
}

impl ReplaySequence {
    pub fn expanded_inputs(&self) -> Vec<FrameInput> {
        let mut out = Vec::new();
        for frame in &self.frames {
            for _ in 0..frame.repeat.max(1) {
                out.push(frame.input);
            }
        }
        out
    }
}

/// Feeds a replay one frame at a time.
pub struct ReplayPlayer {
    fixed_dt: f32,
    inputs: Vec<FrameInput>,
    cursor: usize,
}

impl ReplayPlayer {
    pub fn new(replay: &ReplaySequence) -> Self {
        Self {
            fixed_dt: replay.fixed_dt,
            inputs: replay.expanded_inputs(),
            cursor: 0,
        }
    }

    pub fn fixed_dt(&self) -> f32 {
        self.fixed_dt
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.inputs.len()
    }

    pub fn next_input(&mut self) -> Option<FrameInput> {
        let input = self.inputs.get(self.cursor).copied()?;
        self.cursor += 1;
        Some(input)
    }
}

pub fn parse_replay(raw: &str, origin: &str) -> Result<ReplaySequence, String> {
    let replay: ReplaySequence = serde_json::from_str(raw)
        .map_err(|e| format!("Failed to parse replay JSON {origin}: {e}"))?;
    validate_replay(&replay)?;
    Ok(replay)
}

pub fn load_replay(source: &dyn AssetSource, path: &str) -> Result<ReplaySequence, String> {
    let raw = source.read_text(path)?;
    parse_replay(&raw, path)
}

fn validate_replay(replay: &ReplaySequence) -> Result<(), String> {
    if replay.fixed_dt <= 0.0 {
        return Err("Replay validation failed: fixed_dt must be > 0".to_string());
    }
    if replay.frames.is_empty() {
        return Err("Replay validation failed: frames list is empty".to_string());
    }
    Ok(())
}

const fn default_dt() -> f32 {
    1.0 / 60.0
}

const fn default_repeat() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlas::default_atlas;
    use crate::config::GameConfig;
    use crate::world::{GamePhase, World};
    use dino_core::assets::MemoryAssetSource;
    use dino_render::{SpriteBatch, MAX_SPRITES};

    const FIRST_RUN: &str = include_str!("../../../assets/replays/first_run.json");

    fn run(replay: &ReplaySequence, seed: u64) -> World {
        let config = GameConfig {
            rng_seed: Some(seed),
            ..GameConfig::default()
        };
        let mut batch = SpriteBatch::new(MAX_SPRITES);
        let mut world = World::new(&mut batch, &default_atlas(), config).expect("world builds");
        let mut player = ReplayPlayer::new(replay);
        while let Some(input) = player.next_input() {
            world.update(player.fixed_dt(), &input);
            world.sync_batch(&mut batch, glam::Vec2::ONE, false);
        }
        world
    }

    #[test]
    fn replay_parses_and_expands() {
        let replay = parse_replay(
            r#"{
              "fixed_dt": 0.02,
              "frames": [
                { "repeat": 3 },
                { "jump": true },
                { "duck": true, "repeat": 2 },
                { "tap": [604.0, 320.0] }
              ]
            }"#,
            "test",
        )
        .expect("replay should load");
        let expanded = replay.expanded_inputs();
        assert_eq!(expanded.len(), 7);
        assert!(expanded[3].jump);
        assert!(expanded[5].duck);
        assert_eq!(expanded[6].tap, Some(glam::Vec2::new(604.0, 320.0)));
        assert_eq!(replay.fixed_dt, 0.02);
    }

    #[test]
    fn replay_rejects_empty_frames() {
        let err = parse_replay(r#"{ "frames": [] }"#, "test").expect_err("empty replay");
        assert!(err.contains("frames list is empty"));
    }

    #[test]
    fn replay_loads_from_asset_source() {
        let mut source = MemoryAssetSource::new();
        source.insert("replays/first_run.json", FIRST_RUN);
        let replay = load_replay(&source, "replays/first_run.json").expect("loads");
        let mut player = ReplayPlayer::new(&replay);
        assert!(!player.is_finished());
        let frames = std::iter::from_fn(|| player.next_input()).count();
        assert_eq!(frames, replay.expanded_inputs().len());
        assert!(player.is_finished());
    }

    #[test]
    fn idle_runner_dies_and_retries() {
        let replay = parse_replay(FIRST_RUN, "first_run").expect("valid replay");
        let world = run(&replay, 11);
        assert!(world.high_score() > 0);
        assert_ne!(world.phase(), GamePhase::Menu);
        assert_ne!(world.phase(), GamePhase::Dead);
    }

    #[test]
    fn replay_run_is_deterministic() {
        let replay = parse_replay(FIRST_RUN, "first_run").expect("valid replay");
        let a = run(&replay, 3);
        let b = run(&replay, 3);
        assert_eq!(a.phase(), b.phase());
        assert_eq!(a.score(), b.score());
        assert_eq!(a.high_score(), b.high_score());
        let xs = |w: &World| -> Vec<f32> {
            w.entities()
                .obstacles
                .iter()
                .map(|o| o.sprite.position().x)
                .collect()
        };
        assert_eq!(xs(&a), xs(&b));
        assert_eq!(
            a.entities().dino.sprite.position(),
            b.entities().dino.sprite.position()
        );
    }
}
