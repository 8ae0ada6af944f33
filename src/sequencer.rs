// Scroll-gated animation sequencer. While active it hijacks wheel/touch input and turns it
// into a virtual scroll position in [0, MAX_SCROLL]; the position picks animation targets
// and a per-frame tick smooths the rendered values toward them.
//
// Lifecycle: register_mount() -> input/tick -> unmount(). Everything is a no-op unmounted.

use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

use crate::error::EngineError;
use crate::intent::{
    engaged_from_below, resolve, ArbitrationState, EntryPoint, NavigationDecision,
};
use crate::phase::{classify, clamp_position, targets_for, AnimationValues, Phase};
use crate::smoothing::{is_fully_reversed, is_settled, smooth, REFERENCE_FRAME_MS};
use crate::types::*;
use crate::viewport::{is_mobile_user_agent, LayoutConstants, ViewportAdapter};

/// Notifications for the surrounding page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SequencerEvent {
    Activated(EntryPoint),
    /// `scroll_position` reached `MAX_SCROLL`. Once per activation cycle.
    AnimationComplete,
    Released(ScrollDirection),
}

/// Result of one input event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputOutcome {
    /// Cancel the native event.
    pub prevent_default: bool,
    /// Scroll the document so the section top sits at the viewport top.
    pub snap_to_section: bool,
    pub events: Vec<SequencerEvent>,
}

impl InputOutcome {
    pub fn has_event(&self, event: SequencerEvent) -> bool {
        self.events.contains(&event)
    }
}

/// State exposed to the rendering layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequencerSnapshot {
    pub scroll_position: f32,
    pub phase: Phase,
    pub is_active: bool,
    pub animation_complete: bool,
    pub enabled: bool,
    pub values: AnimationValues,
    pub layout: LayoutConstants,
}

/// The trade animation state machine.
#[derive(Debug, Clone)]
pub struct ScrollSequencer {
    settings: SequencerSettings,
    viewport: ViewportAdapter,
    mobile_agent: bool,
    mounted: bool,
    scroll_position: f32,
    is_active: bool,
    animation_complete: bool,
    completion_notified: bool,
    released_backward: bool,
    reversing: bool,
    current: AnimationValues,
    target: AnimationValues,
    touch_last_y: Option<f32>,
    last_scroll_y: Option<f32>,
}

impl ScrollSequencer {
    pub fn new(
        settings: SequencerSettings,
        viewport: ViewportSettings,
    ) -> Result<Self, EngineError> {
        settings.validate()?;
        viewport.validate()?;
        Ok(ScrollSequencer {
            settings,
            viewport: ViewportAdapter::new(viewport),
            mobile_agent: false,
            mounted: false,
            scroll_position: 0.0,
            is_active: false,
            animation_complete: false,
            completion_notified: false,
            released_backward: false,
            reversing: false,
            current: AnimationValues::initial(),
            target: AnimationValues::initial(),
            touch_last_y: None,
            last_scroll_y: None,
        })
    }

    pub fn from_json(config_json: &str) -> Result<Self, EngineError> {
        let config: SequencerConfig = serde_json::from_str(config_json)
            .map_err(|e| EngineError::InvalidConfig(e.to_string()))?;
        let mut sequencer = Self::new(config.sequencer, config.viewport)?;
        if let Some(user_agent) = &config.user_agent {
            sequencer.set_user_agent(user_agent);
        }
        if let (Some(width), Some(height)) = (config.viewport_width, config.viewport_height) {
            sequencer.resize(width, height);
        }
        Ok(sequencer)
    }

    /// First phase of mounting: the section element exists. Input and ticks are live from here.
    pub fn register_mount(&mut self) {
        if !self.mounted {
            debug!("sequencer mounted");
            self.mounted = true;
        }
    }

    /// Stops the frame loop and drops all state.
    pub fn unmount(&mut self) {
        debug!("sequencer unmounted");
        self.mounted = false;
        self.reset_to(EntryPoint::Start);
        self.is_active = false;
        self.completion_notified = false;
        self.released_backward = false;
        self.touch_last_y = None;
        self.last_scroll_y = None;
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Hijacking is off on mobile; sections flow with native scroll-snap instead.
    pub fn is_enabled(&self) -> bool {
        !(self.mobile_agent || self.viewport.is_mobile())
    }

    pub fn set_user_agent(&mut self, user_agent: &str) {
        let was_enabled = self.is_enabled();
        self.mobile_agent = is_mobile_user_agent(user_agent);
        self.on_enabled_changed(was_enabled);
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        let was_enabled = self.is_enabled();
        if self.viewport.update(width, height) {
            self.on_enabled_changed(was_enabled);
        }
    }

    pub fn scroll_position(&self) -> f32 {
        self.scroll_position
    }

    pub fn phase(&self) -> Phase {
        classify(self.scroll_position)
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn animation_complete(&self) -> bool {
        self.animation_complete
    }

    pub fn current(&self) -> &AnimationValues {
        &self.current
    }

    pub fn target(&self) -> &AnimationValues {
        &self.target
    }

    pub fn layout(&self) -> &LayoutConstants {
        self.viewport.layout()
    }

    pub fn is_fully_reversed(&self) -> bool {
        is_fully_reversed(&self.current, &self.settings.leniency)
    }

    /// Wheel event adapter.
    pub fn on_wheel(&mut self, delta_y: f32, geometry: Option<SectionGeometry>) -> InputOutcome {
        self.handle_delta(delta_y, geometry)
    }

    pub fn on_touch_start(&mut self, y: f32) {
        if self.mounted {
            self.touch_last_y = Some(y);
        }
    }

    /// Touch move adapter: finger travel since the last move, scaled into a wheel-like delta.
    pub fn on_touch_move(&mut self, y: f32, geometry: Option<SectionGeometry>) -> InputOutcome {
        let Some(last_y) = self.touch_last_y.replace(y) else {
            return InputOutcome::default();
        };
        let delta_y = (last_y - y) * self.settings.touch_multiplier;
        self.handle_delta(delta_y, geometry)
    }

    pub fn on_touch_end(&mut self) {
        self.touch_last_y = None;
    }

    /// Native scroll adapter. Catches fast upward flings into the section that the
    /// wheel/touch path missed, and rearms the sequence once the section is far below.
    pub fn on_native_scroll(
        &mut self,
        scroll_y: f32,
        geometry: Option<SectionGeometry>,
    ) -> InputOutcome {
        let previous = self.last_scroll_y.replace(scroll_y);
        if !self.mounted || !self.is_enabled() || self.is_active {
            return InputOutcome::default();
        }
        let Some(geometry) = geometry else {
            return InputOutcome::default();
        };

        self.observe_geometry(&geometry);
        if geometry.is_below_viewport() {
            if self.animation_complete {
                debug!("section left viewport below, rearming sequence");
                self.reset_to(EntryPoint::Start);
            }
            return InputOutcome::default();
        }

        let scrolled_up = matches!(previous, Some(previous) if scroll_y < previous);
        if !scrolled_up {
            return InputOutcome::default();
        }

        let mut outcome = InputOutcome::default();
        let decision = resolve(
            ScrollDirection::Up,
            Some(&geometry),
            &self.arbitration_state(),
            &self.settings,
        );
        if let NavigationDecision::Activate(entry) = decision {
            trace!("native scroll safety net caught upward fling");
            self.activate(entry, &mut outcome);
        }
        // Scroll events are not cancelable; only the snap matters here.
        outcome.prevent_default = false;
        outcome
    }

    /// Per-frame update. Returns `true` while values are still moving.
    pub fn tick(&mut self, dt_ms: f32) -> bool {
        if !self.mounted {
            return false;
        }
        if !self.is_enabled() {
            self.current = self.target;
            return false;
        }
        smooth(
            &mut self.current,
            &self.target,
            &self.settings.smoothing,
            self.reversing,
            dt_ms,
        );
        !is_settled(&self.current, &self.target)
    }

    pub fn snapshot(&self) -> SequencerSnapshot {
        SequencerSnapshot {
            scroll_position: self.scroll_position,
            phase: self.phase(),
            is_active: self.is_active,
            animation_complete: self.animation_complete,
            enabled: self.is_enabled(),
            values: self.current,
            layout: *self.viewport.layout(),
        }
    }

    fn arbitration_state(&self) -> ArbitrationState {
        ArbitrationState {
            is_active: self.is_active,
            animation_complete: self.animation_complete,
            scroll_position: self.scroll_position,
            fully_reversed: self.is_fully_reversed(),
            released_backward: self.released_backward,
        }
    }

    /// Clears the backward-release latch once the section no longer fills the viewport.
    fn observe_geometry(&mut self, geometry: &SectionGeometry) {
        if self.released_backward && !engaged_from_below(geometry, &self.settings) {
            trace!("section left viewport, upward entry rearmed");
            self.released_backward = false;
        }
    }

    fn handle_delta(&mut self, delta_y: f32, geometry: Option<SectionGeometry>) -> InputOutcome {
        if !self.mounted || !self.is_enabled() || !delta_y.is_finite() {
            return InputOutcome::default();
        }
        let Some(direction) = ScrollDirection::from_delta(delta_y) else {
            return InputOutcome {
                prevent_default: self.is_active,
                ..Default::default()
            };
        };

        if !self.is_active {
            if let Some(geometry) = &geometry {
                self.observe_geometry(geometry);
            }
        }
        let decision = resolve(
            direction,
            geometry.as_ref(),
            &self.arbitration_state(),
            &self.settings,
        );
        let mut outcome = InputOutcome {
            prevent_default: decision.prevents_default(),
            ..Default::default()
        };

        match decision {
            NavigationDecision::PassThrough => {}
            NavigationDecision::Activate(entry) => self.activate(entry, &mut outcome),
            NavigationDecision::Advance => self.advance(delta_y, direction, &mut outcome),
            NavigationDecision::ReleaseForward | NavigationDecision::ReleaseBackward => {
                debug!("sequencer released scroll ({:?})", direction);
                self.is_active = false;
                self.reversing = false;
                self.released_backward = decision == NavigationDecision::ReleaseBackward;
                outcome.events.push(SequencerEvent::Released(direction));
            }
            NavigationDecision::HoldForReverse => {
                trace!("holding scroll until reverse animation settles");
                self.reversing = true;
            }
        }
        outcome
    }

    fn activate(&mut self, entry: EntryPoint, outcome: &mut InputOutcome) {
        debug!("sequencer activated at {:?}", entry);
        self.reset_to(entry);
        self.is_active = true;
        self.released_backward = false;
        // Entering at the end: the page below already knows the sequence is done.
        self.completion_notified = entry == EntryPoint::End;
        outcome.snap_to_section = true;
        outcome.events.push(SequencerEvent::Activated(entry));
    }

    fn advance(&mut self, delta_y: f32, direction: ScrollDirection, outcome: &mut InputOutcome) {
        let scale = if delta_y.abs() >= self.settings.fast_delta_threshold {
            self.settings.fast_wheel_scale
        } else {
            self.settings.wheel_scale
        };
        self.scroll_position = clamp_position(self.scroll_position + delta_y * scale);
        self.target = targets_for(self.scroll_position);
        self.reversing = direction == ScrollDirection::Up;

        if self.scroll_position >= MAX_SCROLL {
            if direction == ScrollDirection::Down {
                self.animation_complete = true;
                if !self.completion_notified {
                    debug!("sequence complete");
                    self.completion_notified = true;
                    outcome.events.push(SequencerEvent::AnimationComplete);
                }
            }
        } else {
            self.animation_complete = false;
        }
    }

    fn reset_to(&mut self, entry: EntryPoint) {
        let (position, values, complete) = match entry {
            EntryPoint::Start => (0.0, AnimationValues::initial(), false),
            EntryPoint::End => (MAX_SCROLL, AnimationValues::finished(), true),
        };
        self.scroll_position = position;
        self.animation_complete = complete;
        self.current = values;
        self.target = values;
        self.reversing = entry == EntryPoint::End;
    }

    fn on_enabled_changed(&mut self, was_enabled: bool) {
        let enabled = self.is_enabled();
        if enabled == was_enabled {
            return;
        }
        if enabled {
            // Back on desktop: the section plays again from the top.
            debug!("sequencer re-enabled");
            self.reset_to(EntryPoint::Start);
            self.completion_notified = false;
            self.released_backward = false;
            return;
        }
        // Mobile: static final scene, page scroll untouched.
        if self.is_active {
            debug!("sequencer bypassed on mobile, releasing scroll");
        }
        self.is_active = false;
        self.reset_to(EntryPoint::End);
    }
}

// =============================================================================
// WASM Bindings
// =============================================================================

/// JSON configuration accepted by `WasmScrollSequencer::new()`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SequencerConfig {
    #[serde(default)]
    pub sequencer: SequencerSettings,
    #[serde(default)]
    pub viewport: ViewportSettings,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub viewport_width: Option<f32>,
    #[serde(default)]
    pub viewport_height: Option<f32>,
}

/// Section geometry from host numbers. Any non-finite value means the section is not mounted.
fn section_geometry(top: f32, bottom: f32, viewport_height: f32) -> Option<SectionGeometry> {
    if top.is_finite() && bottom.is_finite() && viewport_height.is_finite() {
        Some(SectionGeometry::new(top, bottom, viewport_height))
    } else {
        None
    }
}

/// WASM-exposed scroll sequencer.
///
/// Geometry arguments come from `section.getBoundingClientRect()` and `innerHeight`;
/// pass `NaN` when the section element is not available.
#[wasm_bindgen]
pub struct WasmScrollSequencer {
    inner: ScrollSequencer,
    on_complete: Option<js_sys::Function>,
    snap_requested: bool,
}

#[wasm_bindgen]
impl WasmScrollSequencer {
    /// Create a sequencer from JSON configuration (`SequencerConfig`).
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Result<WasmScrollSequencer, JsValue> {
        let inner = ScrollSequencer::from_json(config_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid sequencer config: {}", e)))?;
        Ok(WasmScrollSequencer {
            inner,
            on_complete: None,
            snap_requested: false,
        })
    }

    /// Register `onAnimationComplete`, called once per activation cycle.
    #[wasm_bindgen]
    pub fn set_on_animation_complete(&mut self, callback: js_sys::Function) {
        self.on_complete = Some(callback);
    }

    #[wasm_bindgen]
    pub fn register_mount(&mut self) {
        self.inner.register_mount();
    }

    #[wasm_bindgen]
    pub fn unmount(&mut self) {
        self.inner.unmount();
        self.snap_requested = false;
    }

    /// Wheel event. Returns `true` if the host should call `preventDefault()`.
    #[wasm_bindgen]
    pub fn wheel(&mut self, delta_y: f32, top: f32, bottom: f32, viewport_height: f32) -> bool {
        let outcome = self
            .inner
            .on_wheel(delta_y, section_geometry(top, bottom, viewport_height));
        self.dispatch(outcome)
    }

    #[wasm_bindgen]
    pub fn touch_start(&mut self, y: f32) {
        self.inner.on_touch_start(y);
    }

    /// Touch move. Returns `true` if the host should call `preventDefault()`.
    #[wasm_bindgen]
    pub fn touch_move(&mut self, y: f32, top: f32, bottom: f32, viewport_height: f32) -> bool {
        let outcome = self
            .inner
            .on_touch_move(y, section_geometry(top, bottom, viewport_height));
        self.dispatch(outcome)
    }

    #[wasm_bindgen]
    pub fn touch_end(&mut self) {
        self.inner.on_touch_end();
    }

    /// Native scroll event (passive).
    #[wasm_bindgen]
    pub fn native_scroll(&mut self, scroll_y: f32, top: f32, bottom: f32, viewport_height: f32) {
        let outcome = self
            .inner
            .on_native_scroll(scroll_y, section_geometry(top, bottom, viewport_height));
        self.dispatch(outcome);
    }

    /// Whether the host should align the section top with the viewport. Clears the request.
    #[wasm_bindgen]
    pub fn take_snap_request(&mut self) -> bool {
        std::mem::take(&mut self.snap_requested)
    }

    /// Call from `requestAnimationFrame` with the frame interval. Returns `true` while animating.
    #[wasm_bindgen]
    pub fn tick(&mut self, dt_ms: f32) -> bool {
        let dt_ms = if dt_ms > 0.0 { dt_ms } else { REFERENCE_FRAME_MS };
        self.inner.tick(dt_ms)
    }

    #[wasm_bindgen]
    pub fn resize(&mut self, width: f32, height: f32) {
        self.inner.resize(width, height);
    }

    #[wasm_bindgen]
    pub fn scroll_position(&self) -> f32 {
        self.inner.scroll_position()
    }

    #[wasm_bindgen]
    pub fn is_active(&self) -> bool {
        self.inner.is_active()
    }

    /// Current state as JSON (`SequencerSnapshot`).
    #[wasm_bindgen]
    pub fn snapshot(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.inner.snapshot())
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }
}

impl WasmScrollSequencer {
    fn dispatch(&mut self, outcome: InputOutcome) -> bool {
        self.snap_requested |= outcome.snap_to_section;
        if outcome.has_event(SequencerEvent::AnimationComplete) {
            if let Some(callback) = &self.on_complete {
                if let Err(err) = callback.call0(&JsValue::NULL) {
                    warn!("onAnimationComplete callback failed: {:?}", err);
                }
            }
        }
        outcome.prevent_default
    }
}
