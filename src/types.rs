// Strong typing over strings. Newtypes for timestamps, directions, and section geometry.
// Settings structs are parsed from host JSON with per-field serde defaults.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Upper bound of the virtual scroll position driving the animation sequence.
pub const MAX_SCROLL: f32 = 900.0;

/// Timestamp in microseconds on the host clock. Newtype for type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct Timestamp(u64);

impl Timestamp {
    pub fn from_micros(us: u64) -> Self {
        Timestamp(us)
    }

    /// Converts a `performance.now()` style reading. Negative or NaN input maps to zero.
    pub fn from_millis(ms: f64) -> Self {
        if ms.is_finite() && ms > 0.0 {
            Timestamp((ms * 1000.0).round() as u64)
        } else {
            Timestamp(0)
        }
    }

    pub fn as_micros(&self) -> u64 {
        self.0
    }

    pub fn as_millis(&self) -> f64 {
        self.0 as f64 / 1000.0
    }

    /// The instant `ms` milliseconds after this one.
    pub fn after_millis(&self, ms: u64) -> Self {
        Timestamp(self.0.saturating_add(ms.saturating_mul(1000)))
    }
}

/// Sign of the last pager navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum NavDirection {
    Backward,
    #[default]
    None,
    Forward,
}

impl NavDirection {
    pub fn between(from: usize, to: usize) -> Self {
        match to.cmp(&from) {
            std::cmp::Ordering::Greater => NavDirection::Forward,
            std::cmp::Ordering::Less => NavDirection::Backward,
            std::cmp::Ordering::Equal => NavDirection::None,
        }
    }

    pub fn as_i8(&self) -> i8 {
        match self {
            NavDirection::Backward => -1,
            NavDirection::None => 0,
            NavDirection::Forward => 1,
        }
    }
}

/// Direction of a single scroll gesture. Positive wheel delta scrolls down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScrollDirection {
    Up,
    Down,
}

impl ScrollDirection {
    /// `None` for a zero delta, which carries no direction.
    pub fn from_delta(delta_y: f32) -> Option<Self> {
        if delta_y > 0.0 {
            Some(ScrollDirection::Down)
        } else if delta_y < 0.0 {
            Some(ScrollDirection::Up)
        } else {
            None
        }
    }
}

/// A discrete navigation request emitted by the input normalizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "index")]
pub enum NavIntent {
    Next,
    Prev,
    JumpTo(usize),
}

/// Navigation keys the pager understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    ArrowDown,
    ArrowUp,
    PageDown,
    PageUp,
    Space,
    Home,
    End,
}

impl Key {
    /// Parses a DOM `KeyboardEvent.key` value.
    pub fn from_dom(key: &str) -> Option<Self> {
        match key {
            "ArrowDown" | "Down" => Some(Key::ArrowDown),
            "ArrowUp" | "Up" => Some(Key::ArrowUp),
            "PageDown" => Some(Key::PageDown),
            "PageUp" => Some(Key::PageUp),
            " " | "Spacebar" | "Space" => Some(Key::Space),
            "Home" => Some(Key::Home),
            "End" => Some(Key::End),
            _ => None,
        }
    }
}

/// Transition phase of the section pager. Drives CSS state on the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PagerPhase {
    #[default]
    Idle,
    ZoomOut,
    FadeOut,
    Enter,
}

/// Bounding box of the pinned section relative to the viewport, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectionGeometry {
    pub top: f32,
    pub bottom: f32,
    pub viewport_height: f32,
}

impl SectionGeometry {
    pub fn new(top: f32, bottom: f32, viewport_height: f32) -> Self {
        SectionGeometry {
            top,
            bottom,
            viewport_height,
        }
    }

    /// Section top edge is within `margin` pixels of the viewport top.
    pub fn top_near_viewport_top(&self, margin: f32) -> bool {
        self.top.abs() <= margin
    }

    /// Section spans the whole viewport, allowing `margin` pixels of slack on each edge.
    pub fn covers_viewport(&self, margin: f32) -> bool {
        self.top <= margin && self.bottom >= self.viewport_height - margin
    }

    /// Fraction of the viewport height occupied by the section (0.0 to 1.0).
    pub fn visible_ratio(&self) -> f32 {
        if self.viewport_height <= 0.0 {
            return 0.0;
        }
        let visible = self.bottom.min(self.viewport_height) - self.top.max(0.0);
        (visible / self.viewport_height).clamp(0.0, 1.0)
    }

    /// Section starts below the bottom edge of the viewport.
    pub fn is_below_viewport(&self) -> bool {
        self.top >= self.viewport_height
    }
}

// =============================================================================
// Settings
// =============================================================================

/// Section pager timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagerSettings {
    /// Length of the zoom-out phase (milliseconds).
    #[serde(default = "default_zoom_duration")]
    pub zoom_duration_ms: u64,
    /// Length of the optional fade-out phase. Zero skips it.
    #[serde(default)]
    pub fade_duration_ms: u64,
    /// Length of the optional enter phase. Zero skips it.
    #[serde(default)]
    pub enter_duration_ms: u64,
    /// Mirrors `prefers-reduced-motion: reduce`.
    #[serde(default)]
    pub prefers_reduced_motion: bool,
    #[serde(default)]
    pub initial_index: usize,
}

fn default_zoom_duration() -> u64 {
    400
}

impl Default for PagerSettings {
    fn default() -> Self {
        PagerSettings {
            zoom_duration_ms: default_zoom_duration(),
            fade_duration_ms: 0,
            enter_duration_ms: 0,
            prefers_reduced_motion: false,
            initial_index: 0,
        }
    }
}

/// Thresholds for turning raw input into navigation intents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputSettings {
    /// Accumulated wheel delta that triggers one navigation.
    #[serde(default = "default_wheel_threshold")]
    pub wheel_threshold: f32,
    /// Inactivity window after which a partial wheel gesture is discarded (milliseconds).
    #[serde(default = "default_wheel_reset")]
    pub wheel_reset_ms: u64,
    /// Minimum touch drag distance (pixels).
    #[serde(default = "default_touch_threshold")]
    pub touch_threshold: f32,
}

fn default_wheel_threshold() -> f32 {
    250.0
}

fn default_wheel_reset() -> u64 {
    200
}

fn default_touch_threshold() -> f32 {
    60.0
}

impl Default for InputSettings {
    fn default() -> Self {
        InputSettings {
            wheel_threshold: default_wheel_threshold(),
            wheel_reset_ms: default_wheel_reset(),
            touch_threshold: default_touch_threshold(),
        }
    }
}

impl InputSettings {
    pub fn validate(&self) -> Result<(), EngineError> {
        ensure_positive("wheel_threshold", self.wheel_threshold)?;
        ensure_positive("touch_threshold", self.touch_threshold)
    }
}

/// Per-frame smoothing rates. Reversing rates apply while the user scrolls back up.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SmoothingSettings {
    #[serde(default = "default_fast_rate")]
    pub fast_rate: f32,
    #[serde(default = "default_fast_rate_reversing")]
    pub fast_rate_reversing: f32,
    #[serde(default = "default_slow_rate")]
    pub slow_rate: f32,
    #[serde(default = "default_slow_rate_reversing")]
    pub slow_rate_reversing: f32,
}

fn default_fast_rate() -> f32 {
    0.18
}

fn default_fast_rate_reversing() -> f32 {
    0.25
}

fn default_slow_rate() -> f32 {
    0.12
}

fn default_slow_rate_reversing() -> f32 {
    0.22
}

impl Default for SmoothingSettings {
    fn default() -> Self {
        SmoothingSettings {
            fast_rate: default_fast_rate(),
            fast_rate_reversing: default_fast_rate_reversing(),
            slow_rate: default_slow_rate(),
            slow_rate_reversing: default_slow_rate_reversing(),
        }
    }
}

impl SmoothingSettings {
    pub fn validate(&self) -> Result<(), EngineError> {
        ensure_unit("fast_rate", self.fast_rate)?;
        ensure_unit("fast_rate_reversing", self.fast_rate_reversing)?;
        ensure_unit("slow_rate", self.slow_rate)?;
        ensure_unit("slow_rate_reversing", self.slow_rate_reversing)
    }
}

/// How close the smoothed values must be to the start state before control is released upward.
/// Tuned by eye; treat as knobs, not semantics.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ReversalLeniency {
    #[serde(default = "default_max_opacity")]
    pub max_opacity: f32,
    #[serde(default = "default_min_scale")]
    pub min_scale: f32,
}

fn default_max_opacity() -> f32 {
    0.15
}

fn default_min_scale() -> f32 {
    0.85
}

impl Default for ReversalLeniency {
    fn default() -> Self {
        ReversalLeniency {
            max_opacity: default_max_opacity(),
            min_scale: default_min_scale(),
        }
    }
}

/// Input arbitration for the scroll-gated sequencer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequencerSettings {
    /// Section top must be within this many pixels of the viewport top to capture downward scroll.
    #[serde(default = "default_activation_margin")]
    pub activation_margin: f32,
    /// Slack on each edge for the "section covers the viewport" check.
    #[serde(default = "default_cover_margin")]
    pub cover_margin: f32,
    /// Looser coverage check used for fast upward flings.
    #[serde(default = "default_mostly_visible_ratio")]
    pub mostly_visible_ratio: f32,
    #[serde(default = "default_wheel_scale")]
    pub wheel_scale: f32,
    #[serde(default = "default_fast_wheel_scale")]
    pub fast_wheel_scale: f32,
    /// Deltas at or above this magnitude use `fast_wheel_scale`.
    #[serde(default = "default_fast_delta_threshold")]
    pub fast_delta_threshold: f32,
    /// Touch drag distance to wheel delta factor.
    #[serde(default = "default_touch_multiplier")]
    pub touch_multiplier: f32,
    #[serde(default)]
    pub smoothing: SmoothingSettings,
    #[serde(default)]
    pub leniency: ReversalLeniency,
}

fn default_activation_margin() -> f32 {
    100.0
}

fn default_cover_margin() -> f32 {
    50.0
}

fn default_mostly_visible_ratio() -> f32 {
    0.8
}

fn default_wheel_scale() -> f32 {
    0.4
}

fn default_fast_wheel_scale() -> f32 {
    0.6
}

fn default_fast_delta_threshold() -> f32 {
    50.0
}

fn default_touch_multiplier() -> f32 {
    2.0
}

impl Default for SequencerSettings {
    fn default() -> Self {
        SequencerSettings {
            activation_margin: default_activation_margin(),
            cover_margin: default_cover_margin(),
            mostly_visible_ratio: default_mostly_visible_ratio(),
            wheel_scale: default_wheel_scale(),
            fast_wheel_scale: default_fast_wheel_scale(),
            fast_delta_threshold: default_fast_delta_threshold(),
            touch_multiplier: default_touch_multiplier(),
            smoothing: SmoothingSettings::default(),
            leniency: ReversalLeniency::default(),
        }
    }
}

impl SequencerSettings {
    pub fn validate(&self) -> Result<(), EngineError> {
        ensure_positive("activation_margin", self.activation_margin)?;
        ensure_non_negative("cover_margin", self.cover_margin)?;
        ensure_positive("fast_delta_threshold", self.fast_delta_threshold)?;
        ensure_positive("wheel_scale", self.wheel_scale)?;
        ensure_positive("fast_wheel_scale", self.fast_wheel_scale)?;
        ensure_positive("touch_multiplier", self.touch_multiplier)?;
        ensure_unit("mostly_visible_ratio", self.mostly_visible_ratio)?;
        ensure_unit("leniency.max_opacity", self.leniency.max_opacity)?;
        ensure_unit("leniency.min_scale", self.leniency.min_scale)?;
        self.smoothing.validate()
    }
}

/// Breakpoints for the responsive layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewportSettings {
    #[serde(default = "default_mobile_breakpoint")]
    pub mobile_breakpoint: f32,
    #[serde(default = "default_tablet_breakpoint")]
    pub tablet_breakpoint: f32,
    /// Width the desktop layout was designed at; scale is 1.0 here.
    #[serde(default = "default_design_width")]
    pub design_width: f32,
}

fn default_mobile_breakpoint() -> f32 {
    768.0
}

fn default_tablet_breakpoint() -> f32 {
    1024.0
}

fn default_design_width() -> f32 {
    1440.0
}

impl Default for ViewportSettings {
    fn default() -> Self {
        ViewportSettings {
            mobile_breakpoint: default_mobile_breakpoint(),
            tablet_breakpoint: default_tablet_breakpoint(),
            design_width: default_design_width(),
        }
    }
}

impl ViewportSettings {
    pub fn validate(&self) -> Result<(), EngineError> {
        ensure_positive("mobile_breakpoint", self.mobile_breakpoint)?;
        ensure_positive("design_width", self.design_width)?;
        if self.tablet_breakpoint < self.mobile_breakpoint {
            return Err(EngineError::OutOfRange {
                name: "tablet_breakpoint",
                expected: "at least mobile_breakpoint",
                value: self.tablet_breakpoint as f64,
            });
        }
        Ok(())
    }
}

fn ensure_positive(name: &'static str, value: f32) -> Result<(), EngineError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(EngineError::OutOfRange {
            name,
            expected: "positive",
            value: value as f64,
        })
    }
}

fn ensure_non_negative(name: &'static str, value: f32) -> Result<(), EngineError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(EngineError::OutOfRange {
            name,
            expected: "non-negative",
            value: value as f64,
        })
    }
}

fn ensure_unit(name: &'static str, value: f32) -> Result<(), EngineError> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(EngineError::OutOfRange {
            name,
            expected: "in (0, 1]",
            value: value as f64,
        })
    }
}
