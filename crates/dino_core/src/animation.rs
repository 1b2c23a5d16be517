//! Frame-stepped sprite animation.
//!
//! An [`Animation`] is a shared, immutable list of source rectangles plus a
//! fixed frame step. Every animated entity owns its own [`AnimationClock`], so
//! two entities playing the same clip can sit on different frames.
//!
//! Stepping is single-step: when the accumulated timer reaches the frame step
//! the timer resets to zero and the index moves forward by exactly one frame,
//! no matter how far `dt` overshot. Large frame times therefore under-animate
//! instead of skipping frames.

use crate::geometry::Rect;

/// A named clip resolved from atlas metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Animation {
    /// Seconds each frame stays on screen.
    pub frame_step: f32,
    pub frames: Vec<Rect>,
}

impl Animation {
    pub fn new(frame_step: f32, frames: Vec<Rect>) -> Self {
        Self { frame_step, frames }
    }

    pub fn first_frame(&self) -> Option<Rect> {
        self.frames.first().copied()
    }
}

/// Pure stepping function. Returns the new timer, the new index and the rect
/// for that index (`None` only for an empty clip).
pub fn advance(animation: &Animation, timer: f32, index: usize, dt: f32) -> (f32, usize, Option<Rect>) {
    let mut timer = timer + dt;
    let mut index = index;

    if timer >= animation.frame_step {
        timer = 0.0;
        index += 1;
        if index > animation.frames.len().saturating_sub(1) {
            index = 0;
        }
    }

    (timer, index, animation.frames.get(index).copied())
}

/// Per-entity timer and frame index.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AnimationClock {
    pub timer: f32,
    pub index: usize,
}

impl AnimationClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.timer = 0.0;
        self.index = 0;
    }

    pub fn advance(&mut self, animation: &Animation, dt: f32) -> Option<Rect> {
        let (timer, index, rect) = advance(animation, self.timer, self.index, dt);
        self.timer = timer;
        self.index = index;
        rect
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clip(frame_count: usize) -> Animation {
        let frames = (0..frame_count)
            .map(|i| Rect::new(i as f32 * 10.0, 0.0, 10.0, 10.0))
            .collect();
        Animation::new(0.1, frames)
    }

    #[test]
    fn timer_accumulates_before_step() {
        let anim = clip(2);
        let mut clock = AnimationClock::new();
        let rect = clock.advance(&anim, 0.05);
        assert_eq!(clock.index, 0);
        assert!((clock.timer - 0.05).abs() < 1e-6);
        assert_eq!(rect, Some(anim.frames[0]));
    }

    #[test]
    fn reaching_frame_step_moves_one_frame_and_resets_timer() {
        let anim = clip(2);
        let mut clock = AnimationClock::new();
        clock.advance(&anim, 0.05);
        let rect = clock.advance(&anim, 0.05);
        assert_eq!(clock.index, 1);
        assert_eq!(clock.timer, 0.0);
        assert_eq!(rect, Some(anim.frames[1]));
    }

    #[test]
    fn index_wraps_after_last_frame() {
        let anim = clip(2);
        let mut clock = AnimationClock { timer: 0.0, index: 1 };
        clock.advance(&anim, 0.05);
        let rect = clock.advance(&anim, 0.05);
        assert_eq!(clock.index, 0);
        assert_eq!(rect, Some(anim.frames[0]));
    }

    #[test]
    fn large_dt_advances_only_one_frame() {
        let anim = clip(4);
        let (timer, index, _) = advance(&anim, 0.0, 0, 1.0);
        assert_eq!(index, 1);
        assert_eq!(timer, 0.0);
    }

    #[test]
    fn single_frame_clip_keeps_index_but_cycles_timer() {
        let anim = clip(1);
        let (timer, index, rect) = advance(&anim, 0.09, 0, 0.05);
        assert_eq!(index, 0);
        assert_eq!(timer, 0.0);
        assert_eq!(rect, Some(anim.frames[0]));

        let (timer, index, _) = advance(&anim, timer, index, 0.05);
        assert_eq!(index, 0);
        assert!((timer - 0.05).abs() < 1e-6);
    }

    #[test]
    fn empty_clip_yields_no_rect() {
        let anim = Animation::new(0.1, Vec::new());
        let mut clock = AnimationClock::new();
        assert_eq!(clock.advance(&anim, 0.2), None);
        assert_eq!(clock.index, 0);
    }

    #[test]
    fn clocks_sharing_a_clip_are_independent() {
        let anim = clip(3);
        let mut a = AnimationClock::new();
        let mut b = AnimationClock::new();
        a.advance(&anim, 0.1);
        a.advance(&anim, 0.1);
        b.advance(&anim, 0.1);
        assert_eq!(a.index, 2);
        assert_eq!(b.index, 1);
        assert_eq!(a.advance(&anim, 0.1), Some(anim.frames[0]));
    }
}
