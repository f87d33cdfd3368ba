/// `setTimeout` driver that keeps exactly one timer pending per sequencer
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;
use typewriter_core::{
    Language, LanguageProfile, MessageSequencer, Script, ScriptBook, SequencerError,
    StartOutcome, TimingParams,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::dom::DomSink;

struct Inner {
    sequencer: MessageSequencer<DomSink>,
    /// Handle of the pending `setTimeout`, if any
    handle: Option<i32>,
    /// Reused for every timer; holds only a weak reference back to us
    tick: Option<Closure<dyn FnMut()>>,
}

impl Inner {
    fn arm(&mut self) {
        let Some(delay) = self.sequencer.pending_delay() else {
            return;
        };
        let (Some(window), Some(tick)) = (web_sys::window(), self.tick.as_ref()) else {
            log::error!("no window to schedule the next tick on");
            return;
        };
        match window.set_timeout_with_callback_and_timeout_and_arguments_0(
            tick.as_ref().unchecked_ref(),
            timeout_ms(delay),
        ) {
            Ok(handle) => self.handle = Some(handle),
            Err(e) => log::error!("setTimeout failed: {:?}", e),
        }
    }

    fn disarm(&mut self) {
        if let (Some(handle), Some(window)) = (self.handle.take(), web_sys::window()) {
            window.clear_timeout_with_handle(handle);
        }
    }

    fn arm_if_started(&mut self, outcome: StartOutcome) {
        if outcome == StartOutcome::Started {
            self.disarm();
            self.arm();
        }
    }

    fn on_timer(&mut self) {
        self.handle = None;
        self.sequencer.fire();
        self.arm();
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.disarm();
    }
}

/// A message sequencer bound to a DOM element and driven by browser timers
#[wasm_bindgen]
#[derive(Clone)]
pub struct WebSequencer {
    inner: Rc<RefCell<Inner>>,
}

#[wasm_bindgen]
impl WebSequencer {
    /// Bind to the element with id `message_id` using the default timing
    #[wasm_bindgen(constructor)]
    pub fn new(message_id: &str) -> Result<WebSequencer, JsValue> {
        Self::attach(message_id, TimingParams::default())
    }

    #[wasm_bindgen(js_name = withTiming)]
    pub fn with_timing(
        message_id: &str,
        typing_speed_ms: u32,
        delete_delay_ms: u32,
        fade_ms: u32,
    ) -> Result<WebSequencer, JsValue> {
        let timing = TimingParams::new(u64::from(typing_speed_ms), u64::from(delete_delay_ms))
            .with_fade_ms(u64::from(fade_ms));
        Self::attach(message_id, timing)
    }

    /// Play one of the built-in scripts. Returns `false` when a sequence
    /// is already running.
    pub fn start(&self, language: &str) -> Result<bool, JsValue> {
        let language = language.parse::<Language>().map_err(to_js)?;
        let book = ScriptBook::builtin();
        let profile = book
            .profile(language)
            .ok_or_else(|| JsValue::from_str(&format!("no built-in script for {}", language)))?;
        self.start_profile(profile).map_err(to_js)
    }

    /// Play a caller-supplied list of messages
    #[wasm_bindgen(js_name = startMessages)]
    pub fn start_messages(&self, messages: Vec<String>) -> Result<bool, JsValue> {
        let mut inner = self.inner.borrow_mut();
        let outcome = inner.sequencer.start(Script::new(messages)).map_err(to_js)?;
        inner.arm_if_started(outcome);
        Ok(outcome == StartOutcome::Started)
    }

    /// Cancel the pending timer and go back to idle
    pub fn stop(&self) {
        let mut inner = self.inner.borrow_mut();
        inner.disarm();
        inner.sequencer.stop();
    }

    #[wasm_bindgen(js_name = isRunning)]
    pub fn is_running(&self) -> bool {
        self.inner.borrow().sequencer.is_running()
    }

    #[wasm_bindgen(js_name = isFinished)]
    pub fn is_finished(&self) -> bool {
        self.inner.borrow().sequencer.is_finished()
    }

    #[wasm_bindgen(js_name = messageIndex)]
    pub fn message_index(&self) -> usize {
        self.inner.borrow().sequencer.script_index()
    }
}

impl WebSequencer {
    pub fn attach(message_id: &str, timing: TimingParams) -> Result<WebSequencer, JsValue> {
        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let sink = DomSink::attach(&document, message_id)
            .map_err(SequencerError::from)
            .map_err(to_js)?;
        let sequencer = MessageSequencer::new(sink, timing).map_err(to_js)?;

        let inner = Rc::new(RefCell::new(Inner {
            sequencer,
            handle: None,
            tick: None,
        }));
        let weak: Weak<RefCell<Inner>> = Rc::downgrade(&inner);
        let tick = Closure::wrap(Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.borrow_mut().on_timer();
            }
        }) as Box<dyn FnMut()>);
        inner.borrow_mut().tick = Some(tick);

        Ok(WebSequencer { inner })
    }

    /// Apply the profile's font and play its script
    pub fn start_profile(&self, profile: &LanguageProfile) -> Result<bool, SequencerError> {
        let mut inner = self.inner.borrow_mut();
        let outcome = inner.sequencer.start_profile(profile)?;
        inner.arm_if_started(outcome);
        Ok(outcome == StartOutcome::Started)
    }
}

/// `setTimeout` takes whole milliseconds as an `i32`
pub fn timeout_ms(delay: Duration) -> i32 {
    i32::try_from(delay.as_millis()).unwrap_or(i32::MAX)
}

pub fn to_js<E: std::fmt::Display>(err: E) -> JsValue {
    JsValue::from_str(&err.to_string())
}
