// Input normalization: wheel, touch, and keyboard events become discrete navigation intents.
// Input arriving while the pager is locked is dropped, never queued.

use log::trace;

use crate::types::*;

/// Accumulates raw input and emits at most one `NavIntent` per event.
#[derive(Debug, Clone)]
pub struct InputNormalizer {
    settings: InputSettings,
    accumulator: f32,
    reset_deadline: Option<Timestamp>,
    touch_start_y: Option<f32>,
}

impl InputNormalizer {
    pub fn new(settings: InputSettings) -> Self {
        InputNormalizer {
            settings,
            accumulator: 0.0,
            reset_deadline: None,
            touch_start_y: None,
        }
    }

    /// Current partial wheel gesture.
    pub fn accumulated(&self) -> f32 {
        self.accumulator
    }

    /// Fires the inactivity reset if its deadline has passed.
    pub fn poll(&mut self, now: Timestamp) {
        if let Some(deadline) = self.reset_deadline {
            if now >= deadline {
                trace!("wheel accumulator reset after pause ({})", self.accumulator);
                self.clear_wheel();
            }
        }
    }

    /// Adds a wheel delta. Emits `Next`/`Prev` once the accumulated magnitude crosses
    /// the threshold.
    pub fn on_wheel(&mut self, delta_y: f32, now: Timestamp, locked: bool) -> Option<NavIntent> {
        if locked {
            self.clear_wheel();
            return None;
        }
        if !delta_y.is_finite() {
            return None;
        }

        self.poll(now);
        self.accumulator += delta_y;
        self.reset_deadline = Some(now.after_millis(self.settings.wheel_reset_ms));

        if self.accumulator.abs() < self.settings.wheel_threshold {
            return None;
        }

        // A single huge spike still yields exactly one intent.
        let intent = if self.accumulator > 0.0 {
            NavIntent::Next
        } else {
            NavIntent::Prev
        };
        self.clear_wheel();
        Some(intent)
    }

    pub fn on_touch_start(&mut self, y: f32, locked: bool) {
        self.touch_start_y = if locked { None } else { Some(y) };
    }

    /// Resolves a touch gesture. A swipe up (finger moving toward the top) advances.
    pub fn on_touch_end(&mut self, y: f32, locked: bool) -> Option<NavIntent> {
        let start_y = self.touch_start_y.take()?;
        if locked {
            return None;
        }

        let delta_y = start_y - y;
        if delta_y.abs() <= self.settings.touch_threshold {
            return None;
        }
        Some(if delta_y > 0.0 {
            NavIntent::Next
        } else {
            NavIntent::Prev
        })
    }

    /// Maps a navigation key. `last_index` is the index `End` jumps to.
    pub fn on_key_down(
        &mut self,
        key: Key,
        shift: bool,
        last_index: usize,
        locked: bool,
    ) -> Option<NavIntent> {
        if locked {
            return None;
        }
        let intent = match key {
            Key::ArrowDown | Key::PageDown => NavIntent::Next,
            Key::Space if shift => NavIntent::Prev,
            Key::Space => NavIntent::Next,
            Key::ArrowUp | Key::PageUp => NavIntent::Prev,
            Key::Home => NavIntent::JumpTo(0),
            Key::End => NavIntent::JumpTo(last_index),
        };
        Some(intent)
    }

    fn clear_wheel(&mut self) {
        self.accumulator = 0.0;
        self.reset_deadline = None;
    }
}
