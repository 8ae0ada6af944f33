// Per-frame exponential smoothing of animation values toward their targets.
// current += (target - current) * rate, with rates normalized to a 60 Hz frame.

use crate::phase::AnimationValues;
use crate::types::{ReversalLeniency, SmoothingSettings};

/// Frame interval the configured rates are tuned for.
pub const REFERENCE_FRAME_MS: f32 = 1000.0 / 60.0;

/// Below this every parameter counts as having arrived.
const SETTLE_EPSILON: f32 = 1e-3;

/// Converts a per-reference-frame rate into the rate for a frame of `dt_ms`.
pub fn frame_rate(rate: f32, dt_ms: f32) -> f32 {
    if dt_ms.is_nan() || dt_ms <= 0.0 {
        return 0.0;
    }
    let rate = rate.clamp(0.0, 1.0);
    1.0 - (1.0 - rate).powf(dt_ms / REFERENCE_FRAME_MS)
}

fn approach(current: f32, target: f32, rate: f32) -> f32 {
    current + (target - current) * rate
}

/// Moves `current` one frame toward `target`.
///
/// Primary object parameters use the fast rate; rings, cards and the scene use the slow
/// rate. While `reversing`, both switch to their reversing rates so scrolling back feels
/// responsive.
pub fn smooth(
    current: &mut AnimationValues,
    target: &AnimationValues,
    settings: &SmoothingSettings,
    reversing: bool,
    dt_ms: f32,
) {
    let (fast, slow) = if reversing {
        (settings.fast_rate_reversing, settings.slow_rate_reversing)
    } else {
        (settings.fast_rate, settings.slow_rate)
    };
    let fast = frame_rate(fast, dt_ms);
    let slow = frame_rate(slow, dt_ms);

    current.cube_rotation_x = approach(current.cube_rotation_x, target.cube_rotation_x, fast);
    current.cube_rotation_y = approach(current.cube_rotation_y, target.cube_rotation_y, fast);
    current.cube_scale = approach(current.cube_scale, target.cube_scale, fast);
    current.cube_opacity = approach(current.cube_opacity, target.cube_opacity, fast);

    for (ring, goal) in current.rings.iter_mut().zip(target.rings.iter()) {
        ring.rotation = approach(ring.rotation, goal.rotation, slow);
        ring.opacity = approach(ring.opacity, goal.opacity, slow);
    }
    current.ring_split = approach(current.ring_split, target.ring_split, slow);
    current.person_opacity = approach(current.person_opacity, target.person_opacity, slow);
    current.problem_card_opacity =
        approach(current.problem_card_opacity, target.problem_card_opacity, slow);
    current.solution_opacity = approach(current.solution_opacity, target.solution_opacity, slow);
    current.scene_scale = approach(current.scene_scale, target.scene_scale, slow);
}

/// Whether the smoothed values are visually back at the start state.
pub fn is_fully_reversed(current: &AnimationValues, leniency: &ReversalLeniency) -> bool {
    let faded = current
        .rings
        .iter()
        .map(|ring| ring.opacity)
        .chain([
            current.person_opacity,
            current.problem_card_opacity,
            current.solution_opacity,
        ])
        .all(|opacity| opacity < leniency.max_opacity);

    faded && current.cube_scale > leniency.min_scale && current.scene_scale > leniency.min_scale
}

/// Largest absolute difference across all parameters.
pub fn max_difference(a: &AnimationValues, b: &AnimationValues) -> f32 {
    let mut diffs = vec![
        a.cube_rotation_x - b.cube_rotation_x,
        a.cube_rotation_y - b.cube_rotation_y,
        a.cube_scale - b.cube_scale,
        a.cube_opacity - b.cube_opacity,
        a.ring_split - b.ring_split,
        a.person_opacity - b.person_opacity,
        a.problem_card_opacity - b.problem_card_opacity,
        a.solution_opacity - b.solution_opacity,
        a.scene_scale - b.scene_scale,
    ];
    for (ra, rb) in a.rings.iter().zip(b.rings.iter()) {
        diffs.push(ra.rotation - rb.rotation);
        diffs.push(ra.opacity - rb.opacity);
    }
    diffs.into_iter().fold(0.0, |max, d| max.max(d.abs()))
}

pub fn is_settled(current: &AnimationValues, target: &AnimationValues) -> bool {
    max_difference(current, target) < SETTLE_EPSILON
}
