// Browser-side checks for the JS-facing wrappers. Run with `wasm-pack test --headless --chrome`.
#![cfg(target_arch = "wasm32")]

use std::cell::Cell;
use std::rc::Rc;

use cinescroll_core::{WasmScrollSequencer, WasmSectionPager};
use wasm_bindgen::prelude::*;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn invalid_config_is_rejected() {
    assert!(WasmSectionPager::new("{}").is_err());
    assert!(WasmScrollSequencer::new(r#"{"sequencer":{"wheel_scale":0}}"#).is_err());
}

#[wasm_bindgen_test]
fn scroll_lock_callback_follows_transitions() {
    let mut pager =
        WasmSectionPager::new(r#"{"count":3,"viewport_width":1440,"viewport_height":900}"#)
            .expect("valid config");
    let locked = Rc::new(Cell::new(false));
    let seen = locked.clone();
    let callback = Closure::<dyn Fn(bool)>::new(move |value: bool| seen.set(value));
    pager.mount(callback.as_ref().unchecked_ref::<js_sys::Function>().clone());
    assert!(locked.get());

    pager.unmount();
    assert!(!locked.get());
}

#[wasm_bindgen_test]
fn completion_callback_fires_once() {
    let mut sequencer =
        WasmScrollSequencer::new(r#"{"viewport_width":1440,"viewport_height":800}"#)
            .expect("valid config");
    let calls = Rc::new(Cell::new(0u32));
    let counter = calls.clone();
    let callback = Closure::<dyn Fn()>::new(move || counter.set(counter.get() + 1));
    let function = callback.as_ref().unchecked_ref::<js_sys::Function>().clone();
    sequencer.set_on_animation_complete(function);
    sequencer.register_mount();

    for _ in 0..40 {
        sequencer.wheel(100.0, 0.0, 1000.0, 800.0);
    }
    assert_eq!(calls.get(), 1);
}
