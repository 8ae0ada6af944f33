// Scroll ownership arbitration between the sequencer and native page scroll.
// Wheel, touch and native-scroll adapters all ask this one resolver.

use serde::{Deserialize, Serialize};

use crate::types::{ScrollDirection, SectionGeometry, SequencerSettings};

/// Where the animation starts when the sequencer takes over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryPoint {
    /// Entered from above: play forward from position 0.
    Start,
    /// Entered from below: resume at `MAX_SCROLL` to play in reverse.
    End,
}

/// What to do with one scroll gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NavigationDecision {
    /// Not ours; let the page scroll.
    PassThrough,
    /// Take over scroll and reset to the entry state.
    Activate(EntryPoint),
    /// Feed the delta into the virtual scroll position.
    Advance,
    /// Animation finished; hand scroll back to the page going down.
    ReleaseForward,
    /// Reverse animation finished; hand scroll back to the page going up.
    ReleaseBackward,
    /// At position 0 but the visuals have not caught up yet. Keep blocking.
    HoldForReverse,
}

impl NavigationDecision {
    /// Whether the native event must be cancelled.
    pub fn prevents_default(&self) -> bool {
        matches!(
            self,
            NavigationDecision::Activate(_)
                | NavigationDecision::Advance
                | NavigationDecision::HoldForReverse
        )
    }
}

/// The slice of sequencer state the resolver needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArbitrationState {
    pub is_active: bool,
    pub animation_complete: bool,
    pub scroll_position: f32,
    pub fully_reversed: bool,
    /// Control was handed back going up and the section has not left the viewport since.
    pub released_backward: bool,
}

/// Decide who owns a scroll gesture. `None` geometry means the section is not mounted.
pub fn resolve(
    direction: ScrollDirection,
    geometry: Option<&SectionGeometry>,
    state: &ArbitrationState,
    settings: &SequencerSettings,
) -> NavigationDecision {
    let Some(geometry) = geometry else {
        return NavigationDecision::PassThrough;
    };

    if state.is_active {
        return match direction {
            ScrollDirection::Down if state.animation_complete => NavigationDecision::ReleaseForward,
            ScrollDirection::Down => NavigationDecision::Advance,
            ScrollDirection::Up if state.scroll_position <= 0.0 => {
                if state.fully_reversed {
                    NavigationDecision::ReleaseBackward
                } else {
                    NavigationDecision::HoldForReverse
                }
            }
            ScrollDirection::Up => NavigationDecision::Advance,
        };
    }

    match direction {
        ScrollDirection::Down
            if !state.animation_complete
                && geometry.top_near_viewport_top(settings.activation_margin) =>
        {
            NavigationDecision::Activate(EntryPoint::Start)
        }
        ScrollDirection::Up
            if !state.released_backward && engaged_from_below(geometry, settings) =>
        {
            NavigationDecision::Activate(EntryPoint::End)
        }
        _ => NavigationDecision::PassThrough,
    }
}

/// The section fills the viewport, strictly or (for fast flings) mostly.
pub fn engaged_from_below(geometry: &SectionGeometry, settings: &SequencerSettings) -> bool {
    geometry.covers_viewport(settings.cover_margin)
        || geometry.visible_ratio() >= settings.mostly_visible_ratio
}
