// cinescroll_core: Rust/WASM scroll engine
// Owns all scroll arbitration and animation state; JS forwards DOM events and paints snapshots.

mod error;
mod input;
mod intent;
mod pager;
mod phase;
mod scroll_lock;
mod sequencer;
mod smoothing;
mod types;
mod viewport;

use wasm_bindgen::prelude::*;

pub use error::EngineError;
pub use input::InputNormalizer;
pub use intent::{resolve, ArbitrationState, EntryPoint, NavigationDecision};
pub use pager::{
    PagerConfig, PagerController, PagerInput, PagerOutcome, PagerSnapshot, SectionPager,
    WasmSectionPager,
};
pub use phase::{classify, targets_for, AnimationValues, Phase, RingValues, SplitStage};
pub use scroll_lock::{PageScrollHost, ScrollLock, ScrollLockGuard};
pub use sequencer::{
    InputOutcome, ScrollSequencer, SequencerConfig, SequencerEvent, SequencerSnapshot,
    WasmScrollSequencer,
};
pub use smoothing::{is_fully_reversed, smooth};
pub use types::*;
pub use viewport::{LayoutConstants, ViewportAdapter};

/// Install the panic hook and console logger.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    // A second init (hot reload) fails harmlessly; the first logger stays.
    #[cfg(feature = "console_log")]
    let _ = console_log::init_with_level(log::Level::Debug);
}

/// Engine version, for the host's diagnostics overlay.
#[wasm_bindgen]
pub fn engine_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_configs_build() {
        assert!(PagerConfig {
            count: 3,
            ..Default::default()
        }
        .build()
        .is_ok());
        assert!(ScrollSequencer::from_json("{}").is_ok());
        assert!(!engine_version().is_empty());
    }
}
