//! Touch input with both level-triggered and edge-triggered queries.
//!
//! Positions are normalized to `[0, 1]` on each axis. A slot with no finger
//! down reports the [`NO_TOUCH`] sentinel `(-1, -1)`; callers must go through
//! [`TouchInput::is_active`] (or check for the sentinel) before treating a
//! position as a screen coordinate.
//!
//! - **Level-triggered:** `is_active(slot)` is true every frame a finger is down.
//! - **Edge-triggered:** `just_pressed(slot)` / `just_released(slot)` are true
//!   only until `end_frame()` runs at the end of the update that consumed them.

use glam::Vec2;

/// Position reported for a slot with no active touch.
pub const NO_TOUCH: Vec2 = Vec2::new(-1.0, -1.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TouchSlot {
    Primary,
    Secondary,
}

impl TouchSlot {
    pub const ALL: [TouchSlot; 2] = [TouchSlot::Primary, TouchSlot::Secondary];

    const fn index(self) -> usize {
        match self {
            TouchSlot::Primary => 0,
            TouchSlot::Secondary => 1,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct SlotState {
    position: Vec2,
    just_pressed: bool,
    just_released: bool,
}

impl Default for SlotState {
    fn default() -> Self {
        Self {
            position: NO_TOUCH,
            just_pressed: false,
            just_released: false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TouchInput {
    slots: [SlotState; 2],
}

impl TouchInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a finger at a pixel position inside a surface of `surface` pixels.
    /// Zero-sized surfaces are ignored rather than divided by.
    pub fn touch_down(&mut self, slot: TouchSlot, pixel: Vec2, surface: Vec2) {
        if surface.x <= 0.0 || surface.y <= 0.0 {
            log::warn!("Ignoring touch on zero-sized surface {surface:?}");
            return;
        }
        let normalized = (pixel / surface).clamp(Vec2::ZERO, Vec2::ONE);
        self.touch_normalized(slot, normalized);
    }

    /// Record a finger at an already normalized position.
    pub fn touch_normalized(&mut self, slot: TouchSlot, position: Vec2) {
        let state = &mut self.slots[slot.index()];
        if state.position == NO_TOUCH {
            state.just_pressed = true;
        }
        state.position = position.clamp(Vec2::ZERO, Vec2::ONE);
    }

    /// Move an active finger. Has no effect on an inactive slot.
    pub fn touch_moved(&mut self, slot: TouchSlot, pixel: Vec2, surface: Vec2) {
        if self.is_active(slot) && surface.x > 0.0 && surface.y > 0.0 {
            self.slots[slot.index()].position = (pixel / surface).clamp(Vec2::ZERO, Vec2::ONE);
        }
    }

    pub fn touch_up(&mut self, slot: TouchSlot) {
        let state = &mut self.slots[slot.index()];
        if state.position != NO_TOUCH {
            state.position = NO_TOUCH;
            state.just_released = true;
        }
    }

    /// Normalized position, or [`NO_TOUCH`].
    pub fn position(&self, slot: TouchSlot) -> Vec2 {
        self.slots[slot.index()].position
    }

    pub fn is_active(&self, slot: TouchSlot) -> bool {
        self.slots[slot.index()].position != NO_TOUCH
    }

    pub fn just_pressed(&self, slot: TouchSlot) -> bool {
        self.slots[slot.index()].just_pressed
    }

    pub fn just_released(&self, slot: TouchSlot) -> bool {
        self.slots[slot.index()].just_released
    }

    pub fn end_frame(&mut self) {
        for state in &mut self.slots {
            state.just_pressed = false;
            state.just_released = false;
        }
    }
}
