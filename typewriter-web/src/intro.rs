/// Language choice page: buttons, intro fade and background music
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use gloo_timers::callback::Timeout;
use typewriter_core::{IntroParams, Language, LanguageProfile, ScriptBook, TimingParams};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{Document, HtmlAudioElement, HtmlElement};

use crate::dom::find_element;
use crate::driver::{to_js, WebSequencer};

pub const MESSAGE_ID: &str = "message";
pub const PANEL_ID: &str = "language-choice";
pub const LOADING_ID: &str = "loading";
pub const MUSIC_ID: &str = "bg-music";

/// Id of the button that selects `language`
pub fn button_id(language: Language) -> &'static str {
    language.key()
}

/// CSS transition for an opacity fade lasting `ms`
pub fn fade_transition(ms: u64) -> String {
    format!("opacity {}s ease-out", ms as f64 / 1000.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntroPhase {
    /// Buttons shown, nothing chosen yet
    Waiting,
    /// Language chosen, panels fading out
    Fading,
    Playing,
    Stopped,
}

/// Tracks the page from the first click to the card, so a late intro
/// timer cannot start a card that was stopped meanwhile.
#[derive(Debug)]
pub struct IntroGate {
    phase: Cell<IntroPhase>,
}

impl IntroGate {
    pub fn new() -> Self {
        Self {
            phase: Cell::new(IntroPhase::Waiting),
        }
    }

    pub fn phase(&self) -> IntroPhase {
        self.phase.get()
    }

    /// True only for the first choice
    pub fn choose(&self) -> bool {
        self.advance(IntroPhase::Waiting, IntroPhase::Fading)
    }

    /// True when the intro ended and the card may start
    pub fn finish_intro(&self) -> bool {
        self.advance(IntroPhase::Fading, IntroPhase::Playing)
    }

    pub fn stop(&self) {
        self.phase.set(IntroPhase::Stopped);
    }

    fn advance(&self, from: IntroPhase, to: IntroPhase) -> bool {
        if self.phase.get() != from {
            return false;
        }
        self.phase.set(to);
        true
    }
}

impl Default for IntroGate {
    fn default() -> Self {
        Self::new()
    }
}

/// The installed card, returned to JS so it can be stopped
#[wasm_bindgen]
pub struct Card {
    stage: Rc<Stage>,
}

#[wasm_bindgen]
impl Card {
    /// Stops the card, including an intro that is still fading
    pub fn stop(&self) {
        self.stage.gate.stop();
        // dropping a pending Timeout clears it
        self.stage.intro_timer.borrow_mut().take();
        self.stage.sequencer.stop();
    }

    #[wasm_bindgen(js_name = isFinished)]
    pub fn is_finished(&self) -> bool {
        self.stage.sequencer.is_finished()
    }
}

/// Wire the language buttons of the page to a sequencer.
///
/// Every element the card needs except the music is looked up here, so
/// a broken page fails now instead of after the first click.
#[wasm_bindgen]
pub fn install() -> Result<Card, JsValue> {
    install_with(TimingParams::default(), IntroParams::default())
}

pub fn install_with(timing: TimingParams, intro: IntroParams) -> Result<Card, JsValue> {
    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let stage = Rc::new(Stage {
        sequencer: WebSequencer::attach(MESSAGE_ID, timing)?,
        panel: find_element(&document, PANEL_ID).map_err(to_js)?,
        loading: find_element(&document, LOADING_ID).map_err(to_js)?,
        music: find_music(&document),
        intro,
        gate: IntroGate::new(),
        intro_timer: RefCell::new(None),
    });

    let book = ScriptBook::builtin();
    for language in Language::ALL {
        let button = find_element(&document, button_id(language)).map_err(to_js)?;
        let profile = book
            .profile(language)
            .cloned()
            .ok_or_else(|| JsValue::from_str(&format!("no built-in script for {}", language)))?;

        let stage = Rc::clone(&stage);
        let on_click = Closure::wrap(Box::new(move || {
            choose(&stage, &profile);
        }) as Box<dyn FnMut()>);
        button.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;
        on_click.forget();
    }

    log::info!("card installed, waiting for a language");
    Ok(Card { stage })
}

struct Stage {
    sequencer: WebSequencer,
    panel: HtmlElement,
    loading: HtmlElement,
    music: Option<HtmlAudioElement>,
    intro: IntroParams,
    gate: IntroGate,
    intro_timer: RefCell<Option<Timeout>>,
}

fn choose(stage: &Rc<Stage>, profile: &LanguageProfile) {
    if !stage.gate.choose() {
        log::debug!("ignoring language choice in phase {:?}", stage.gate.phase());
        return;
    }
    log::info!("language chosen: {}", profile.language);

    stage.play_music();
    fade_out(&stage.panel, stage.intro.panel_fade_ms);
    fade_out(&stage.loading, stage.intro.loading_fade_ms);

    let delay = u32::try_from(stage.intro.start_delay().as_millis()).unwrap_or(u32::MAX);
    let weak: Weak<Stage> = Rc::downgrade(stage);
    let profile = profile.clone();
    let timer = Timeout::new(delay, move || {
        let Some(stage) = weak.upgrade() else {
            return;
        };
        if !stage.gate.finish_intro() {
            log::debug!("intro ended after the card was stopped");
            return;
        }
        hide(&stage.panel);
        hide(&stage.loading);
        if let Err(e) = stage.sequencer.start_profile(&profile) {
            log::error!("failed to start the card: {}", e);
        }
    });
    *stage.intro_timer.borrow_mut() = Some(timer);
}

impl Stage {
    /// Best effort: browsers may refuse to autoplay
    fn play_music(&self) {
        let Some(music) = self.music.as_ref() else {
            return;
        };
        music.set_volume(self.intro.music_volume);
        match music.play() {
            Ok(promise) => spawn_local(async move {
                if let Err(e) = JsFuture::from(promise).await {
                    log::warn!("autoplay blocked, music stays off: {:?}", e);
                }
            }),
            Err(e) => log::warn!("music could not start: {:?}", e),
        }
    }
}

fn find_music(document: &Document) -> Option<HtmlAudioElement> {
    let music = document
        .get_element_by_id(MUSIC_ID)
        .and_then(|element| element.dyn_into::<HtmlAudioElement>().ok());
    if music.is_none() {
        log::warn!("#{} not found, playing without music", MUSIC_ID);
    }
    music
}

fn fade_out(element: &HtmlElement, ms: u64) {
    let style = element.style();
    let result = style
        .set_property("transition", &fade_transition(ms))
        .and_then(|_| style.set_property("opacity", "0"));
    if let Err(e) = result {
        log::warn!("fade failed: {:?}", e);
    }
}

fn hide(element: &HtmlElement) {
    if let Err(e) = element.style().set_property("display", "none") {
        log::warn!("hide failed: {:?}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fade_transition_format() {
        assert_eq!(fade_transition(2000), "opacity 2s ease-out");
        assert_eq!(fade_transition(8000), "opacity 8s ease-out");
        assert_eq!(fade_transition(2500), "opacity 2.5s ease-out");
    }

    #[test]
    fn test_only_first_choice_counts() {
        let gate = IntroGate::new();
        assert!(gate.choose());
        assert!(!gate.choose());
        assert_eq!(gate.phase(), IntroPhase::Fading);
        assert!(gate.finish_intro());
        assert_eq!(gate.phase(), IntroPhase::Playing);
        assert!(!gate.choose());
    }

    #[test]
    fn test_stop_during_intro_keeps_card_stopped() {
        let gate = IntroGate::new();
        assert!(gate.choose());
        gate.stop();

        // the intro timer fires late
        assert!(!gate.finish_intro());
        assert_eq!(gate.phase(), IntroPhase::Stopped);
        assert!(!gate.choose());
    }

    #[test]
    fn test_stop_before_choice_ignores_clicks() {
        let gate = IntroGate::new();
        gate.stop();
        assert!(!gate.choose());
        assert!(!gate.finish_intro());
    }

    #[test]
    fn test_button_ids_match_page() {
        assert_eq!(button_id(Language::English), "english");
        assert_eq!(button_id(Language::Mandarin), "mandarin");
    }
}
