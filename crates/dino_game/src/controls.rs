//! Touch-to-intent mapping.
//!
//! The screen is split at `duck_zone` (normalized X): fingers on the left half
//! duck while held, a new finger on the right half jumps. Any new finger is
//! also reported as a tap in work coordinates for button hit tests.

use dino_core::input::{TouchInput, TouchSlot};
use glam::Vec2;
use serde::Deserialize;

use crate::config::GameConfig;

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FrameInput {
    /// Rising edge only.
    pub jump: bool,
    /// Level-triggered.
    pub duck: bool,
    /// Rising edge, in work coordinates.
    pub tap: Option<Vec2>,
    /// Keyboard shortcut for the retry button.
    pub confirm: bool,
}

impl FrameInput {
    pub fn from_touch(touch: &TouchInput, config: &GameConfig) -> Self {
        let mut input = Self::default();
        for slot in TouchSlot::ALL {
            if !touch.is_active(slot) {
                continue;
            }
            let position = touch.position(slot);
            let in_duck_zone = position.x < config.duck_zone;
            if in_duck_zone {
                input.duck = true;
            }
            if touch.just_pressed(slot) {
                if !in_duck_zone {
                    input.jump = true;
                }
                if input.tap.is_none() {
                    input.tap = Some(position * config.work_resolution);
                }
            }
        }
        input
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_touch_produces_no_intent() {
        let input = FrameInput::from_touch(&TouchInput::new(), &GameConfig::default());
        assert_eq!(input, FrameInput::default());
    }

    #[test]
    fn right_side_press_jumps_once() {
        let config = GameConfig::default();
        let mut touch = TouchInput::new();
        touch.touch_normalized(TouchSlot::Primary, Vec2::new(0.75, 0.5));
        let first = FrameInput::from_touch(&touch, &config);
        assert!(first.jump);
        assert!(!first.duck);
        assert_eq!(first.tap, Some(Vec2::new(960.0, 360.0)));

        touch.end_frame();
        let held = FrameInput::from_touch(&touch, &config);
        assert!(!held.jump);
        assert_eq!(held.tap, None);
    }

    #[test]
    fn left_side_hold_ducks_every_frame() {
        let config = GameConfig::default();
        let mut touch = TouchInput::new();
        touch.touch_normalized(TouchSlot::Secondary, Vec2::new(0.1, 0.9));
        assert!(FrameInput::from_touch(&touch, &config).duck);
        touch.end_frame();
        let held = FrameInput::from_touch(&touch, &config);
        assert!(held.duck);
        assert!(!held.jump);
        touch.touch_up(TouchSlot::Secondary);
        assert!(!FrameInput::from_touch(&touch, &config).duck);
    }

    #[test]
    fn two_fingers_duck_and_jump_together() {
        let config = GameConfig::default();
        let mut touch = TouchInput::new();
        touch.touch_normalized(TouchSlot::Primary, Vec2::new(0.2, 0.5));
        touch.touch_normalized(TouchSlot::Secondary, Vec2::new(0.8, 0.5));
        let input = FrameInput::from_touch(&touch, &config);
        assert!(input.duck);
        assert!(input.jump);
        assert_eq!(input.tap, Some(Vec2::new(256.0, 360.0)));
    }
}
