// Scroll-gated timeline: which phase a virtual scroll position is in, and what every
// animated parameter should be heading toward there. Pure functions of position only.
//
// Ranges are half-open and start-inclusive: [0,200) Rotate, [200,600) Split,
// [600,700) CardsIn, [700,900] ZoomOut. MAX_SCROLL itself belongs to ZoomOut.

use serde::{Deserialize, Serialize};

use crate::types::MAX_SCROLL;

pub const SPLIT_START: f32 = 200.0;
pub const CARDS_START: f32 = 600.0;
pub const ZOOM_START: f32 = 700.0;

/// Fraction of the split range spent gathering the rings before they separate.
pub const SPLIT_GATHER_FRACTION: f32 = 0.6;

/// Sub-stage of the ring split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SplitStage {
    /// Rings fade in and spin up around the cube.
    Gather,
    /// Rings move apart while the cube shrinks.
    Separate,
}

/// Animation phase of the trade sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", content = "stage")]
pub enum Phase {
    Rotate,
    Split(SplitStage),
    CardsIn,
    ZoomOut,
}

/// Classify a scroll position. Out-of-range input is clamped first.
pub fn classify(position: f32) -> Phase {
    let position = clamp_position(position);
    if position < SPLIT_START {
        Phase::Rotate
    } else if position < CARDS_START {
        if split_progress(position) < SPLIT_GATHER_FRACTION {
            Phase::Split(SplitStage::Gather)
        } else {
            Phase::Split(SplitStage::Separate)
        }
    } else if position < ZOOM_START {
        Phase::CardsIn
    } else {
        Phase::ZoomOut
    }
}

pub fn clamp_position(position: f32) -> f32 {
    if position.is_nan() {
        return 0.0;
    }
    position.clamp(0.0, MAX_SCROLL)
}

/// Progress through [start, end) as 0.0..=1.0.
fn progress(position: f32, start: f32, end: f32) -> f32 {
    ((position - start) / (end - start)).clamp(0.0, 1.0)
}

fn split_progress(position: f32) -> f32 {
    progress(position, SPLIT_START, CARDS_START)
}

/// One orbit ring around the cube.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RingValues {
    /// Degrees.
    pub rotation: f32,
    pub opacity: f32,
}

/// Every animated parameter of the trade scene. Used for both targets and smoothed values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnimationValues {
    /// Degrees.
    pub cube_rotation_x: f32,
    /// Degrees.
    pub cube_rotation_y: f32,
    pub cube_scale: f32,
    pub cube_opacity: f32,
    pub rings: [RingValues; 3],
    /// 0.0 rings stacked on the cube, 1.0 fully split apart.
    pub ring_split: f32,
    pub person_opacity: f32,
    pub problem_card_opacity: f32,
    pub solution_opacity: f32,
    pub scene_scale: f32,
}

impl AnimationValues {
    /// Values at scroll position 0.
    pub fn initial() -> Self {
        targets_for(0.0)
    }

    /// Values at `MAX_SCROLL`.
    pub fn finished() -> Self {
        targets_for(MAX_SCROLL)
    }
}

impl Default for AnimationValues {
    fn default() -> Self {
        Self::initial()
    }
}

const RING_BASE_SPIN: [f32; 3] = [120.0, -90.0, 60.0];

/// Target values for a scroll position.
pub fn targets_for(position: f32) -> AnimationValues {
    let position = clamp_position(position);

    let rotate = progress(position, 0.0, SPLIT_START);
    let split = split_progress(position);
    let gather = (split / SPLIT_GATHER_FRACTION).clamp(0.0, 1.0);
    let separate =
        ((split - SPLIT_GATHER_FRACTION) / (1.0 - SPLIT_GATHER_FRACTION)).clamp(0.0, 1.0);
    let cards = progress(position, CARDS_START, ZOOM_START);
    let zoom = progress(position, ZOOM_START, MAX_SCROLL);

    let mut rings = [RingValues {
        rotation: 0.0,
        opacity: 0.0,
    }; 3];
    for (i, ring) in rings.iter_mut().enumerate() {
        // Staggered fade so the rings appear one after another.
        ring.opacity = (gather * 3.0 - i as f32).clamp(0.0, 1.0);
        ring.rotation = RING_BASE_SPIN[i] * gather + RING_BASE_SPIN[i] * 0.5 * separate;
    }

    AnimationValues {
        cube_rotation_x: 20.0 * rotate,
        cube_rotation_y: 180.0 * rotate + 180.0 * split,
        cube_scale: 1.0 - 0.4 * separate,
        // Dims while the rings separate, back to full in the final scene.
        cube_opacity: 1.0 - 0.5 * separate + 0.5 * zoom,
        rings,
        ring_split: separate,
        person_opacity: separate,
        problem_card_opacity: cards,
        solution_opacity: zoom,
        scene_scale: 1.0 - 0.3 * zoom,
    }
}
