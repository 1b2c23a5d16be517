//! Day/night color phase with a linear fade between the two palettes.

use dino_core::geometry::lerp;
use dino_core::Color;

use crate::config::GameConfig;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DayNight {
    is_night: bool,
    /// Seconds into the current fade, `None` once it has finished.
    fade_elapsed: Option<f32>,
}

impl DayNight {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_night(&self) -> bool {
        self.is_night
    }

    pub fn is_fading(&self) -> bool {
        self.fade_elapsed.is_some()
    }

    /// Flip the target phase and restart the fade from the opposite palette.
    pub fn start_flip(&mut self) {
        self.is_night = !self.is_night;
        self.fade_elapsed = Some(0.0);
        log::info!(
            "Fading to {}",
            if self.is_night { "night" } else { "day" }
        );
    }

    /// Advance the fade. Returns true while colors are still changing,
    /// including the frame the fade completes.
    pub fn update(&mut self, dt: f32, duration: f32) -> bool {
        let Some(elapsed) = self.fade_elapsed else {
            return false;
        };
        let elapsed = elapsed + dt;
        self.fade_elapsed = if elapsed >= duration {
            None
        } else {
            Some(elapsed)
        };
        true
    }

    /// Fade progress in `[0, 1]`; `1` when no fade is running.
    pub fn progress(&self, duration: f32) -> f32 {
        match self.fade_elapsed {
            Some(elapsed) if duration > 0.0 => (elapsed / duration).clamp(0.0, 1.0),
            _ => 1.0,
        }
    }

    pub fn reset(&mut self) {
        self.is_night = false;
        self.fade_elapsed = None;
    }

    pub fn background(&self, config: &GameConfig) -> Color {
        Color::from_intensity(self.blend(config.day_background, config.night_background, config))
    }

    pub fn tint(&self, config: &GameConfig) -> Color {
        Color::from_intensity(self.blend(config.day_tint, config.night_tint, config))
    }

    fn blend(&self, day: f32, night: f32, config: &GameConfig) -> f32 {
        let (from, to) = if self.is_night { (day, night) } else { (night, day) };
        lerp(from, to, self.progress(config.fade_duration))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_in_full_day() {
        let config = GameConfig::default();
        let phase = DayNight::new();
        assert!(!phase.is_night());
        assert_eq!(phase.background(&config), Color::from_intensity(config.day_background));
        assert_eq!(phase.tint(&config), Color::from_intensity(config.day_tint));
    }

    #[test]
    fn fade_interpolates_linearly() {
        let config = GameConfig {
            fade_duration: 1.0,
            day_background: 1.0,
            night_background: 0.0,
            ..GameConfig::default()
        };
        let mut phase = DayNight::new();
        phase.start_flip();
        assert!(phase.is_night());
        assert_eq!(phase.progress(1.0), 0.0);
        assert_eq!(phase.background(&config), Color::from_intensity(1.0));

        assert!(phase.update(0.5, 1.0));
        assert_eq!(phase.progress(1.0), 0.5);
        assert_eq!(phase.background(&config), Color::from_intensity(0.5));

        assert!(phase.update(0.5, 1.0));
        assert!(!phase.is_fading());
        assert_eq!(phase.background(&config), Color::from_intensity(0.0));
        assert!(!phase.update(0.5, 1.0));
    }

    #[test]
    fn flipping_back_fades_to_day() {
        let config = GameConfig::default();
        let mut phase = DayNight::new();
        phase.start_flip();
        phase.update(10.0, config.fade_duration);
        phase.start_flip();
        assert!(!phase.is_night());
        assert_eq!(phase.tint(&config), Color::from_intensity(config.night_tint));
        phase.update(10.0, config.fade_duration);
        assert_eq!(phase.tint(&config), Color::from_intensity(config.day_tint));
    }

    #[test]
    fn reset_returns_to_day_immediately() {
        let mut phase = DayNight::new();
        phase.start_flip();
        phase.reset();
        assert!(!phase.is_night());
        assert!(!phase.is_fading());
    }
}
