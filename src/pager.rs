// Section pager: one active section, one locked transition at a time.
// Requests during a transition are dropped, not queued. Out-of-range requests are ignored.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

use crate::error::EngineError;
use crate::input::InputNormalizer;
use crate::scroll_lock::{PageScrollHost, ScrollLock, ScrollLockGuard};
use crate::types::*;
use crate::viewport::{is_mobile_user_agent, ViewportAdapter};

/// Timed phases in playback order. `Idle` is implicit before and after.
const TRANSITION_PHASES: [PagerPhase; 3] =
    [PagerPhase::ZoomOut, PagerPhase::FadeOut, PagerPhase::Enter];

/// State exposed to the rendering layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagerSnapshot {
    pub active_index: usize,
    pub target_index: usize,
    pub phase: PagerPhase,
    pub direction: i8,
    pub is_animating: bool,
    pub count: usize,
    pub prefers_reduced_motion: bool,
    pub is_mobile: bool,
}

/// Transition state machine over a fixed list of sections.
#[derive(Debug, Clone)]
pub struct SectionPager {
    settings: PagerSettings,
    count: usize,
    section_ids: Vec<String>,
    active_index: usize,
    target_index: usize,
    phase: PagerPhase,
    direction: NavDirection,
    locked: bool,
    phase_deadline: Option<Timestamp>,
}

impl SectionPager {
    pub fn new(count: usize, settings: PagerSettings) -> Result<Self, EngineError> {
        if count == 0 {
            return Err(EngineError::EmptyPager);
        }
        let initial = settings.initial_index.min(count - 1);
        Ok(SectionPager {
            settings,
            count,
            section_ids: Vec::new(),
            active_index: initial,
            target_index: initial,
            phase: PagerPhase::Idle,
            direction: NavDirection::None,
            locked: false,
            phase_deadline: None,
        })
    }

    /// Pager whose sections can also be addressed by URL hash.
    pub fn with_section_ids(
        ids: Vec<String>,
        settings: PagerSettings,
    ) -> Result<Self, EngineError> {
        let mut pager = Self::new(ids.len(), settings)?;
        pager.section_ids = ids;
        Ok(pager)
    }

    pub fn active_index(&self) -> usize {
        self.active_index
    }

    pub fn target_index(&self) -> usize {
        self.target_index
    }

    pub fn phase(&self) -> PagerPhase {
        self.phase
    }

    pub fn direction(&self) -> NavDirection {
        self.direction
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn last_index(&self) -> usize {
        self.count - 1
    }

    pub fn prefers_reduced_motion(&self) -> bool {
        self.settings.prefers_reduced_motion
    }

    /// Follows `prefers-reduced-motion` changes. An in-flight transition finishes immediately.
    pub fn set_prefers_reduced_motion(&mut self, reduce: bool) {
        self.settings.prefers_reduced_motion = reduce;
        if reduce && self.locked {
            self.commit();
        }
    }

    pub fn go_next(&mut self, now: Timestamp) -> bool {
        if self.active_index + 1 >= self.count {
            return false;
        }
        self.go_to(self.active_index + 1, now)
    }

    pub fn go_prev(&mut self, now: Timestamp) -> bool {
        match self.active_index.checked_sub(1) {
            Some(index) => self.go_to(index, now),
            None => false,
        }
    }

    /// Starts a transition to `index`. Returns `false` if the request was dropped.
    pub fn go_to(&mut self, index: usize, now: Timestamp) -> bool {
        if self.locked || index >= self.count || index == self.active_index {
            return false;
        }

        self.direction = NavDirection::between(self.active_index, index);
        self.target_index = index;
        self.locked = true;
        debug!(
            "pager transition {} -> {} ({:?})",
            self.active_index, index, self.direction
        );

        if self.settings.prefers_reduced_motion {
            self.commit();
            return true;
        }
        self.enter_phase(PagerPhase::ZoomOut, now);
        true
    }

    pub fn apply(&mut self, intent: NavIntent, now: Timestamp) -> bool {
        match intent {
            NavIntent::Next => self.go_next(now),
            NavIntent::Prev => self.go_prev(now),
            NavIntent::JumpTo(index) => self.go_to(index, now),
        }
    }

    /// Advances timed phases whose deadline has passed. Returns `true` if anything changed.
    pub fn tick(&mut self, now: Timestamp) -> bool {
        let mut changed = false;
        while let Some(deadline) = self.phase_deadline {
            if now < deadline {
                break;
            }
            changed = true;
            // Chain from the deadline, not from `now`, so phase lengths stay fixed.
            match self.following_phase(self.phase) {
                Some(next) => self.enter_phase(next, deadline),
                None => self.commit(),
            }
        }
        changed
    }

    /// Resizes the section list. Indices are clamped; a transition to a removed section
    /// is cancelled.
    pub fn set_count(&mut self, count: usize) -> Result<(), EngineError> {
        if count == 0 {
            return Err(EngineError::EmptyPager);
        }
        self.count = count;
        self.section_ids.truncate(count);
        self.active_index = self.active_index.min(count - 1);

        if self.target_index >= count {
            debug!("pager transition cancelled, target {} removed", self.target_index);
            self.target_index = self.active_index;
            self.phase = PagerPhase::Idle;
            self.phase_deadline = None;
            self.locked = false;
        }
        Ok(())
    }

    /// `#id` of the active section, for `history.replaceState`.
    pub fn active_hash(&self) -> Option<String> {
        self.section_ids
            .get(self.active_index)
            .map(|id| format!("#{}", id))
    }

    /// Navigates to the section whose id matches `hash` (with or without the leading `#`).
    pub fn go_to_hash(&mut self, hash: &str, now: Timestamp) -> bool {
        let id = hash.trim_start_matches('#');
        match self.section_ids.iter().position(|candidate| candidate == id) {
            Some(index) => self.go_to(index, now),
            None => false,
        }
    }

    pub fn snapshot(&self) -> PagerSnapshot {
        PagerSnapshot {
            active_index: self.active_index,
            target_index: self.target_index,
            phase: self.phase,
            direction: self.direction.as_i8(),
            is_animating: self.locked,
            count: self.count,
            prefers_reduced_motion: self.settings.prefers_reduced_motion,
            is_mobile: false,
        }
    }

    fn phase_duration(&self, phase: PagerPhase) -> u64 {
        match phase {
            PagerPhase::ZoomOut => self.settings.zoom_duration_ms,
            PagerPhase::FadeOut => self.settings.fade_duration_ms,
            PagerPhase::Enter => self.settings.enter_duration_ms,
            PagerPhase::Idle => 0,
        }
    }

    fn following_phase(&self, phase: PagerPhase) -> Option<PagerPhase> {
        TRANSITION_PHASES
            .iter()
            .skip_while(|candidate| **candidate != phase)
            .skip(1)
            .find(|candidate| self.phase_duration(**candidate) > 0)
            .copied()
    }

    fn enter_phase(&mut self, phase: PagerPhase, start: Timestamp) {
        self.phase = phase;
        self.phase_deadline = Some(start.after_millis(self.phase_duration(phase)));
    }

    fn commit(&mut self) {
        self.active_index = self.target_index;
        self.phase = PagerPhase::Idle;
        self.phase_deadline = None;
        self.locked = false;
        debug!("pager settled on section {}", self.active_index);
    }
}

/// Raw input routed to the pager.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PagerInput {
    Wheel { delta_y: f32 },
    TouchStart { y: f32 },
    TouchEnd { y: f32 },
    KeyDown { key: Key, shift: bool },
}

/// What the host should do with the native event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PagerOutcome {
    pub prevent_default: bool,
    pub navigated: bool,
}

/// Full-page pager: input normalization, transitions, mobile bypass, and the page scroll lock.
#[derive(Debug)]
pub struct PagerController {
    pager: SectionPager,
    input: InputNormalizer,
    viewport: ViewportAdapter,
    mobile_agent: bool,
    scroll_lock: Option<ScrollLock>,
    lock_guard: Option<ScrollLockGuard>,
}

impl PagerController {
    pub fn new(pager: SectionPager, input: InputSettings, viewport: ViewportSettings) -> Self {
        PagerController {
            pager,
            input: InputNormalizer::new(input),
            viewport: ViewportAdapter::new(viewport),
            mobile_agent: false,
            scroll_lock: None,
            lock_guard: None,
        }
    }

    pub fn from_json(config_json: &str) -> Result<Self, EngineError> {
        let config: PagerConfig = serde_json::from_str(config_json)
            .map_err(|e| EngineError::InvalidConfig(e.to_string()))?;
        config.build()
    }

    pub fn pager(&self) -> &SectionPager {
        &self.pager
    }

    pub fn pager_mut(&mut self) -> &mut SectionPager {
        &mut self.pager
    }

    /// Mobile devices get native scroll-snap flow instead of the pager.
    pub fn is_mobile(&self) -> bool {
        self.mobile_agent || self.viewport.is_mobile()
    }

    pub fn set_user_agent(&mut self, user_agent: &str) {
        self.mobile_agent = is_mobile_user_agent(user_agent);
        self.sync_scroll_lock();
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        if self.viewport.update(width, height) {
            self.sync_scroll_lock();
        }
    }

    /// Takes the page scroll lock for as long as the pager is mounted on desktop.
    pub fn mount(&mut self, lock: ScrollLock) {
        self.scroll_lock = Some(lock);
        self.sync_scroll_lock();
    }

    pub fn unmount(&mut self) {
        self.lock_guard = None;
        self.scroll_lock = None;
    }

    pub fn is_mounted(&self) -> bool {
        self.scroll_lock.is_some()
    }

    pub fn handle(&mut self, input: PagerInput, now: Timestamp) -> PagerOutcome {
        if self.is_mobile() {
            return PagerOutcome::default();
        }

        self.pager.tick(now);
        let locked = self.pager.is_locked();
        let last_index = self.pager.last_index();

        let (intent, prevent_default) = match input {
            PagerInput::Wheel { delta_y } => (self.input.on_wheel(delta_y, now, locked), true),
            PagerInput::TouchStart { y } => {
                self.input.on_touch_start(y, locked);
                (None, false)
            }
            PagerInput::TouchEnd { y } => (self.input.on_touch_end(y, locked), false),
            PagerInput::KeyDown { key, shift } => {
                (self.input.on_key_down(key, shift, last_index, locked), true)
            }
        };

        let navigated = intent.map_or(false, |intent| self.pager.apply(intent, now));
        PagerOutcome {
            prevent_default,
            navigated,
        }
    }

    /// Programmatic navigation (buttons, dots, links). Ignored on mobile.
    pub fn navigate(&mut self, intent: NavIntent, now: Timestamp) -> bool {
        if self.is_mobile() {
            return false;
        }
        // A transition whose deadline passed before the next frame must not swallow this.
        self.pager.tick(now);
        self.pager.apply(intent, now)
    }

    pub fn navigate_to_hash(&mut self, hash: &str, now: Timestamp) -> bool {
        if self.is_mobile() {
            return false;
        }
        self.pager.tick(now);
        self.pager.go_to_hash(hash, now)
    }

    /// Per-frame update: expires the wheel accumulator and advances the transition.
    pub fn tick(&mut self, now: Timestamp) -> bool {
        self.input.poll(now);
        self.pager.tick(now)
    }

    pub fn snapshot(&self) -> PagerSnapshot {
        PagerSnapshot {
            is_mobile: self.is_mobile(),
            ..self.pager.snapshot()
        }
    }

    fn sync_scroll_lock(&mut self) {
        let wanted = !self.is_mobile();
        match (&self.scroll_lock, wanted) {
            (Some(lock), true) if self.lock_guard.is_none() => {
                self.lock_guard = Some(lock.acquire());
            }
            (_, false) => self.lock_guard = None,
            _ => {}
        }
    }
}

// =============================================================================
// WASM Bindings
// =============================================================================

/// JSON configuration accepted by `WasmSectionPager::new()`.
///
/// Either `count` or `section_ids` must be given; when both are, they must agree.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PagerConfig {
    #[serde(default)]
    pub count: usize,
    #[serde(default)]
    pub section_ids: Vec<String>,
    #[serde(default)]
    pub pager: PagerSettings,
    #[serde(default)]
    pub input: InputSettings,
    #[serde(default)]
    pub viewport: ViewportSettings,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub viewport_width: Option<f32>,
    #[serde(default)]
    pub viewport_height: Option<f32>,
}

impl PagerConfig {
    pub fn build(self) -> Result<PagerController, EngineError> {
        self.input.validate()?;
        self.viewport.validate()?;

        let pager = if self.section_ids.is_empty() {
            SectionPager::new(self.count, self.pager)?
        } else {
            if self.count != 0 && self.count != self.section_ids.len() {
                return Err(EngineError::SectionIdMismatch {
                    ids: self.section_ids.len(),
                    count: self.count,
                });
            }
            SectionPager::with_section_ids(self.section_ids, self.pager)?
        };

        let mut controller = PagerController::new(pager, self.input, self.viewport);
        if let Some(user_agent) = &self.user_agent {
            controller.set_user_agent(user_agent);
        }
        if let (Some(width), Some(height)) = (self.viewport_width, self.viewport_height) {
            controller.resize(width, height);
        }
        Ok(controller)
    }
}

/// Calls back into JS to toggle `document.body.style.overflow`.
struct JsScrollHost {
    callback: js_sys::Function,
}

impl PageScrollHost for JsScrollHost {
    fn set_page_scroll_locked(&self, locked: bool) {
        if let Err(err) = self
            .callback
            .call1(&JsValue::NULL, &JsValue::from_bool(locked))
        {
            warn!("scroll lock callback failed: {:?}", err);
        }
    }
}

/// WASM-exposed section pager.
///
/// # Example JSON Config
/// ```json
/// {
///   "section_ids": ["about", "logistics", "inspection", "finance", "rfq"],
///   "pager": { "zoom_duration_ms": 400 },
///   "user_agent": "Mozilla/5.0 ...",
///   "viewport_width": 1440,
///   "viewport_height": 900
/// }
/// ```
#[wasm_bindgen]
pub struct WasmSectionPager {
    inner: PagerController,
}

#[wasm_bindgen]
impl WasmSectionPager {
    /// Create a pager from JSON configuration.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Result<WasmSectionPager, JsValue> {
        let inner = PagerController::from_json(config_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid pager config: {}", e)))?;
        Ok(WasmSectionPager { inner })
    }

    /// Start owning page scroll. `on_scroll_lock(locked: boolean)` toggles body overflow.
    #[wasm_bindgen]
    pub fn mount(&mut self, on_scroll_lock: js_sys::Function) {
        self.inner.mount(ScrollLock::new(JsScrollHost {
            callback: on_scroll_lock,
        }));
    }

    /// Release the page scroll lock.
    #[wasm_bindgen]
    pub fn unmount(&mut self) {
        self.inner.unmount();
    }

    /// Wheel event. Returns `true` if the host should call `preventDefault()`.
    #[wasm_bindgen]
    pub fn wheel(&mut self, delta_y: f32, now_ms: f64) -> bool {
        self.inner
            .handle(PagerInput::Wheel { delta_y }, Timestamp::from_millis(now_ms))
            .prevent_default
    }

    #[wasm_bindgen]
    pub fn touch_start(&mut self, y: f32, now_ms: f64) {
        self.inner
            .handle(PagerInput::TouchStart { y }, Timestamp::from_millis(now_ms));
    }

    /// Touch end. Returns `true` if the swipe started a transition.
    #[wasm_bindgen]
    pub fn touch_end(&mut self, y: f32, now_ms: f64) -> bool {
        self.inner
            .handle(PagerInput::TouchEnd { y }, Timestamp::from_millis(now_ms))
            .navigated
    }

    /// Keydown with the DOM `key` value. Returns `true` if the host should call `preventDefault()`.
    #[wasm_bindgen]
    pub fn key_down(&mut self, key: &str, shift: bool, now_ms: f64) -> bool {
        match Key::from_dom(key) {
            Some(key) => {
                self.inner
                    .handle(PagerInput::KeyDown { key, shift }, Timestamp::from_millis(now_ms))
                    .prevent_default
            }
            None => false,
        }
    }

    #[wasm_bindgen]
    pub fn go_next(&mut self, now_ms: f64) -> bool {
        self.inner
            .navigate(NavIntent::Next, Timestamp::from_millis(now_ms))
    }

    #[wasm_bindgen]
    pub fn go_prev(&mut self, now_ms: f64) -> bool {
        self.inner
            .navigate(NavIntent::Prev, Timestamp::from_millis(now_ms))
    }

    #[wasm_bindgen]
    pub fn go_to(&mut self, index: usize, now_ms: f64) -> bool {
        self.inner
            .navigate(NavIntent::JumpTo(index), Timestamp::from_millis(now_ms))
    }

    #[wasm_bindgen]
    pub fn go_to_hash(&mut self, hash: &str, now_ms: f64) -> bool {
        self.inner
            .navigate_to_hash(hash, Timestamp::from_millis(now_ms))
    }

    /// Call from `requestAnimationFrame`. Returns `true` if the phase or index changed.
    #[wasm_bindgen]
    pub fn tick(&mut self, now_ms: f64) -> bool {
        self.inner.tick(Timestamp::from_millis(now_ms))
    }

    #[wasm_bindgen]
    pub fn resize(&mut self, width: f32, height: f32) {
        self.inner.resize(width, height);
    }

    #[wasm_bindgen]
    pub fn set_reduced_motion(&mut self, reduce: bool) {
        self.inner.pager_mut().set_prefers_reduced_motion(reduce);
    }

    #[wasm_bindgen]
    pub fn active_index(&self) -> usize {
        self.inner.pager().active_index()
    }

    /// `#id` of the active section, if ids were configured.
    #[wasm_bindgen]
    pub fn active_hash(&self) -> Option<String> {
        self.inner.pager().active_hash()
    }

    /// Current state as JSON (`PagerSnapshot`).
    #[wasm_bindgen]
    pub fn snapshot(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.inner.snapshot())
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scroll_lock::tests::RecordingHost;
    use proptest::prelude::*;

    fn ms(v: u64) -> Timestamp {
        Timestamp::from_micros(v * 1000)
    }

    fn pager(count: usize) -> SectionPager {
        SectionPager::new(count, PagerSettings::default()).expect("valid pager")
    }

    #[test]
    fn empty_pager_is_rejected() {
        assert!(matches!(
            SectionPager::new(0, PagerSettings::default()),
            Err(EngineError::EmptyPager)
        ));
    }

    #[test]
    fn transition_commits_after_zoom_duration() {
        let mut pager = pager(3);
        assert!(pager.go_next(ms(0)));
        assert_eq!(pager.phase(), PagerPhase::ZoomOut);
        assert_eq!(pager.target_index(), 1);
        assert_eq!(pager.active_index(), 0);
        assert!(pager.is_locked());

        assert!(!pager.tick(ms(399)));
        assert_eq!(pager.active_index(), 0);

        assert!(pager.tick(ms(400)));
        assert_eq!(pager.active_index(), 1);
        assert_eq!(pager.phase(), PagerPhase::Idle);
        assert!(!pager.is_locked());
        assert_eq!(pager.direction(), NavDirection::Forward);
    }

    #[test]
    fn requests_while_locked_are_dropped() {
        let mut pager = pager(5);
        assert!(pager.go_next(ms(0)));
        assert!(!pager.go_next(ms(100)));
        assert!(!pager.go_to(4, ms(200)));
        pager.tick(ms(400));
        assert_eq!(pager.active_index(), 1);
        assert!(!pager.tick(ms(2000)));
        assert_eq!(pager.active_index(), 1);
    }

    #[test]
    fn edges_are_silent_noops() {
        let mut pager = pager(2);
        assert!(!pager.go_prev(ms(0)));
        assert!(!pager.go_to(2, ms(0)));
        assert!(!pager.go_to(0, ms(0)));
        assert!(!pager.is_locked());

        pager.go_next(ms(0));
        pager.tick(ms(400));
        assert!(!pager.go_next(ms(500)));
        assert_eq!(pager.active_index(), 1);
    }

    #[test]
    fn go_to_sets_direction() {
        let mut pager = pager(5);
        pager.go_to(3, ms(0));
        pager.tick(ms(400));
        assert!(pager.go_to(1, ms(500)));
        assert_eq!(pager.direction(), NavDirection::Backward);
    }

    #[test]
    fn reduced_motion_skips_phases() {
        let settings = PagerSettings {
            prefers_reduced_motion: true,
            ..Default::default()
        };
        let mut pager = SectionPager::new(3, settings).unwrap();
        assert!(pager.go_next(ms(0)));
        assert_eq!(pager.active_index(), 1);
        assert_eq!(pager.phase(), PagerPhase::Idle);
        assert!(!pager.is_locked());
        assert!(pager.go_next(ms(1)));
        assert_eq!(pager.active_index(), 2);
    }

    #[test]
    fn switching_to_reduced_motion_finishes_transition() {
        let mut pager = pager(3);
        pager.go_next(ms(0));
        pager.set_prefers_reduced_motion(true);
        assert_eq!(pager.active_index(), 1);
        assert_eq!(pager.phase(), PagerPhase::Idle);
    }

    #[test]
    fn optional_phases_play_in_order() {
        let settings = PagerSettings {
            zoom_duration_ms: 400,
            fade_duration_ms: 150,
            enter_duration_ms: 250,
            ..Default::default()
        };
        let mut pager = SectionPager::new(2, settings).unwrap();
        pager.go_next(ms(0));
        pager.tick(ms(400));
        assert_eq!(pager.phase(), PagerPhase::FadeOut);
        pager.tick(ms(549));
        assert_eq!(pager.phase(), PagerPhase::FadeOut);
        pager.tick(ms(550));
        assert_eq!(pager.phase(), PagerPhase::Enter);
        assert_eq!(pager.active_index(), 0);
        pager.tick(ms(800));
        assert_eq!(pager.phase(), PagerPhase::Idle);
        assert_eq!(pager.active_index(), 1);
    }

    #[test]
    fn late_tick_runs_all_phases() {
        let settings = PagerSettings {
            fade_duration_ms: 100,
            ..Default::default()
        };
        let mut pager = SectionPager::new(2, settings).unwrap();
        pager.go_next(ms(0));
        assert!(pager.tick(ms(10_000)));
        assert_eq!(pager.active_index(), 1);
        assert!(!pager.is_locked());
    }

    #[test]
    fn hash_navigation() {
        let ids = vec!["about".to_string(), "logistics".to_string(), "rfq".to_string()];
        let mut pager = SectionPager::with_section_ids(ids, PagerSettings::default()).unwrap();
        assert_eq!(pager.active_hash().as_deref(), Some("#about"));
        assert!(!pager.go_to_hash("#missing", ms(0)));
        assert!(pager.go_to_hash("#rfq", ms(0)));
        pager.tick(ms(400));
        assert_eq!(pager.active_hash().as_deref(), Some("#rfq"));
        assert!(!pager.go_to_hash("rfq", ms(500)));
    }

    #[test]
    fn shrinking_cancels_transition_to_removed_section() {
        let mut pager = pager(4);
        pager.go_to(3, ms(0));
        pager.set_count(2).unwrap();
        assert!(!pager.is_locked());
        assert_eq!(pager.phase(), PagerPhase::Idle);
        assert_eq!(pager.active_index(), 0);
        assert!(pager.set_count(0).is_err());
    }

    #[test]
    fn initial_index_is_clamped() {
        let settings = PagerSettings {
            initial_index: 10,
            ..Default::default()
        };
        let pager = SectionPager::new(3, settings).unwrap();
        assert_eq!(pager.active_index(), 2);
    }

    fn controller(count: usize) -> PagerController {
        PagerController::new(
            pager(count),
            InputSettings::default(),
            ViewportSettings::default(),
        )
    }

    #[test]
    fn wheel_drives_one_transition_per_lock() {
        let mut controller = controller(4);
        let outcome = controller.handle(PagerInput::Wheel { delta_y: 300.0 }, ms(0));
        assert!(outcome.prevent_default);
        assert!(outcome.navigated);

        // Momentum scrolling during the transition is swallowed.
        for t in 1..10 {
            let outcome = controller.handle(PagerInput::Wheel { delta_y: 300.0 }, ms(t * 30));
            assert!(!outcome.navigated);
        }
        controller.tick(ms(400));
        assert_eq!(controller.pager().active_index(), 1);
    }

    #[test]
    fn keys_route_through_controller() {
        let mut controller = controller(4);
        let outcome = controller.handle(
            PagerInput::KeyDown {
                key: Key::End,
                shift: false,
            },
            ms(0),
        );
        assert!(outcome.navigated);
        controller.tick(ms(400));
        assert_eq!(controller.pager().active_index(), 3);

        controller.handle(
            PagerInput::KeyDown {
                key: Key::Home,
                shift: false,
            },
            ms(500),
        );
        controller.tick(ms(900));
        assert_eq!(controller.pager().active_index(), 0);
    }

    #[test]
    fn touch_swipe_navigates() {
        let mut controller = controller(3);
        controller.handle(PagerInput::TouchStart { y: 600.0 }, ms(0));
        let outcome = controller.handle(PagerInput::TouchEnd { y: 400.0 }, ms(120));
        assert!(outcome.navigated);
        assert!(!outcome.prevent_default);
    }

    #[test]
    fn programmatic_navigation_settles_expired_transition_first() {
        let mut controller = controller(4);
        assert!(controller.navigate(NavIntent::Next, ms(0)));

        // No frame ran after the zoom deadline; the request still goes through.
        assert!(controller.navigate(NavIntent::JumpTo(3), ms(450)));
        assert_eq!(controller.pager().active_index(), 1);
        assert_eq!(controller.pager().target_index(), 3);

        // Still mid-transition.
        assert!(!controller.navigate(NavIntent::Prev, ms(600)));
    }

    #[test]
    fn programmatic_navigation_is_ignored_on_mobile() {
        let mut controller = PagerConfig {
            section_ids: vec!["about".into(), "finance".into()],
            ..Default::default()
        }
        .build()
        .expect("valid config");
        controller.resize(390.0, 844.0);

        assert!(!controller.navigate(NavIntent::Next, ms(0)));
        assert!(!controller.navigate_to_hash("#finance", ms(0)));
        assert_eq!(controller.pager().active_index(), 0);

        controller.resize(1440.0, 900.0);
        assert!(controller.navigate_to_hash("#finance", ms(10)));
    }

    #[test]
    fn mobile_bypasses_pager() {
        let mut controller = controller(3);
        controller.resize(390.0, 844.0);
        assert!(controller.is_mobile());
        let outcome = controller.handle(PagerInput::Wheel { delta_y: 1000.0 }, ms(0));
        assert_eq!(outcome, PagerOutcome::default());
        assert!(controller.snapshot().is_mobile);
    }

    #[test]
    fn scroll_lock_follows_mount_and_breakpoint() {
        let host = RecordingHost::default();
        let lock = ScrollLock::new(host.clone());
        let mut controller = controller(3);

        controller.mount(lock.clone());
        assert!(lock.is_locked());

        controller.resize(600.0, 800.0);
        assert!(!lock.is_locked());
        controller.resize(1400.0, 800.0);
        assert!(lock.is_locked());

        controller.unmount();
        assert!(!lock.is_locked());
        assert_eq!(*host.calls.borrow(), vec![true, false, true, false]);
    }

    #[test]
    fn dropping_controller_releases_lock() {
        let lock = ScrollLock::new(RecordingHost::default());
        {
            let mut controller = controller(2);
            controller.mount(lock.clone());
            assert!(lock.is_locked());
        }
        assert!(!lock.is_locked());
    }

    #[test]
    fn config_from_json() {
        let controller = PagerController::from_json(
            r#"{
                "section_ids": ["about", "logistics", "finance"],
                "pager": { "zoom_duration_ms": 250 },
                "user_agent": "Mozilla/5.0 (Windows NT 10.0; Win64; x64)",
                "viewport_width": 1440,
                "viewport_height": 900
            }"#,
        )
        .expect("valid config");
        let snapshot = controller.snapshot();
        assert_eq!(snapshot.count, 3);
        assert!(!snapshot.is_mobile);
        assert_eq!(snapshot.phase, PagerPhase::Idle);
    }

    #[test]
    fn config_rejects_mismatched_ids() {
        let result = PagerController::from_json(r#"{ "count": 4, "section_ids": ["a", "b"] }"#);
        assert!(matches!(
            result,
            Err(EngineError::SectionIdMismatch { ids: 2, count: 4 })
        ));
        assert!(matches!(
            PagerController::from_json("{}"),
            Err(EngineError::EmptyPager)
        ));
        assert!(matches!(
            PagerController::from_json("not json"),
            Err(EngineError::InvalidConfig(_))
        ));
    }

    // =========================================================================
    // WASM Wrapper Tests
    // =========================================================================

    #[test]
    fn wasm_pager_navigation() {
        let mut pager = WasmSectionPager::new(r#"{ "section_ids": ["a", "b", "c"] }"#)
            .expect("Should parse valid config");
        assert!(pager.go_next(0.0));
        assert!(!pager.go_next(10.0));
        assert!(pager.tick(400.0));
        assert_eq!(pager.active_index(), 1);
        assert_eq!(pager.active_hash().as_deref(), Some("#b"));
        assert!(pager.key_down("End", false, 500.0));
        assert!(!pager.key_down("q", false, 500.0));
        pager.tick(900.0);
        assert_eq!(pager.active_index(), 2);
    }

    #[test]
    fn wasm_pager_snapshot_json() {
        let pager = WasmSectionPager::new(r#"{ "count": 2 }"#).expect("Should parse valid config");
        let json = pager.snapshot().expect("Should serialize");
        let snapshot: PagerSnapshot = serde_json::from_str(&json).expect("Should parse snapshot");
        assert_eq!(snapshot.count, 2);
        assert_eq!(snapshot.direction, 0);
        assert!(!snapshot.is_animating);
    }

    // Note: invalid config and the JS scroll lock callback are only testable on wasm32,
    // because JsValue and js_sys::Function are not usable on native targets.

    // =========================================================================
    // Property-Based Tests
    // =========================================================================

    #[derive(Debug, Clone)]
    enum Op {
        Next,
        Prev,
        GoTo(usize),
        Tick,
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            Just(Op::Next),
            Just(Op::Prev),
            (0usize..8).prop_map(Op::GoTo),
            Just(Op::Tick),
        ]
    }

    proptest! {
        /// Only one transition is ever in flight: the active index changes at most once
        /// per zoom window, and always to the target accepted when that transition began.
        #[test]
        fn transitions_are_mutually_exclusive(
            ops in prop::collection::vec((op_strategy(), 0u64..300), 1..60)
        ) {
            let mut pager = SectionPager::new(6, PagerSettings::default()).unwrap();
            let mut now = 0u64;
            let mut pending: Option<(usize, u64)> = None;
            let mut last_commit: Option<u64> = None;

            for (op, dt) in ops {
                now += dt;
                let before = pager.active_index();
                let accepted = match op {
                    Op::Next => pager.go_next(ms(now)),
                    Op::Prev => pager.go_prev(ms(now)),
                    Op::GoTo(i) => pager.go_to(i, ms(now)),
                    Op::Tick => {
                        pager.tick(ms(now));
                        false
                    }
                };

                if accepted {
                    prop_assert!(pending.is_none(), "accepted a request while locked");
                    pending = Some((pager.target_index(), now));
                }

                if pager.active_index() != before {
                    let (target, started) = pending
                        .take()
                        .expect("index changed without a transition");
                    prop_assert_eq!(pager.active_index(), target);
                    prop_assert!(now >= started + 400);
                    if let Some(previous) = last_commit {
                        prop_assert!(now >= previous + 400);
                    }
                    last_commit = Some(now);
                }
            }
        }

        /// Out-of-range jumps never move the pager.
        #[test]
        fn out_of_range_go_to_is_ignored(count in 1usize..10, offset in 0usize..100) {
            let mut pager = SectionPager::new(count, PagerSettings::default()).unwrap();
            prop_assert!(!pager.go_to(count + offset, ms(0)));
            pager.tick(ms(1000));
            prop_assert_eq!(pager.active_index(), 0);
            prop_assert!(!pager.is_locked());
        }

        /// With reduced motion, no call ever leaves an observable non-idle phase.
        #[test]
        fn reduced_motion_never_leaves_idle(
            ops in prop::collection::vec(op_strategy(), 1..40)
        ) {
            let settings = PagerSettings { prefers_reduced_motion: true, ..Default::default() };
            let mut pager = SectionPager::new(6, settings).unwrap();
            for op in ops {
                match op {
                    Op::Next => { pager.go_next(ms(0)); }
                    Op::Prev => { pager.go_prev(ms(0)); }
                    Op::GoTo(i) => { pager.go_to(i, ms(0)); }
                    Op::Tick => { pager.tick(ms(0)); }
                }
                prop_assert_eq!(pager.phase(), PagerPhase::Idle);
                prop_assert!(!pager.is_locked());
                prop_assert_eq!(pager.active_index(), pager.target_index());
            }
        }
    }
}
