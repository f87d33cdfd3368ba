/// Typewriter message sequencer
///
/// A finite-state machine that types messages into a [`TextSink`] one
/// character per tick, holds them, erases them at double speed and fades
/// to the next one. The sequencer owns no clock: it exposes the delay of
/// its single pending timer and the host calls [`MessageSequencer::fire`]
/// once that delay has elapsed.
use std::time::Duration;

use thiserror::Error;

use crate::script::{LanguageProfile, Script};
use crate::sink::{SinkError, TextSink};
use crate::timing::{ConfigError, TimingParams};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SequencerError {
    #[error("invalid timing: {0}")]
    Timing(#[from] ConfigError),

    #[error("sink is not ready: {0}")]
    Sink(#[from] SinkError),

    #[error("script has no messages")]
    EmptyScript,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerState {
    Idle,
    Typing,
    /// Message fully typed, waiting before deletion or finish
    HoldingFull,
    Deleting,
    /// Sink empty and faded out, waiting before the next message
    HoldingEmpty,
    Finished,
}

impl SequencerState {
    pub fn is_running(self) -> bool {
        !matches!(self, SequencerState::Idle | SequencerState::Finished)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    /// A sequence is already in progress; nothing was changed
    AlreadyRunning,
}

pub struct MessageSequencer<S: TextSink> {
    sink: S,
    timing: TimingParams,
    script: Script,
    state: SequencerState,
    script_index: usize,
    /// Characters of the current message on display, in Unicode scalars
    char_index: usize,
    pending: Option<Duration>,
    /// Bumped every time a timer is armed
    armed: u64,
}

impl<S: TextSink> MessageSequencer<S> {
    pub fn new(sink: S, timing: TimingParams) -> Result<Self, SequencerError> {
        timing.validate()?;
        sink.ensure_ready()?;

        Ok(Self {
            sink,
            timing,
            script: Script::default(),
            state: SequencerState::Idle,
            script_index: 0,
            char_index: 0,
            pending: None,
            armed: 0,
        })
    }

    /// Begin typing `script` from its first message.
    ///
    /// Only valid from Idle or Finished; otherwise nothing changes.
    pub fn start(&mut self, script: Script) -> Result<StartOutcome, SequencerError> {
        if self.state.is_running() {
            log::debug!(
                "start ignored, sequence already running at message {}",
                self.script_index
            );
            return Ok(StartOutcome::AlreadyRunning);
        }
        if script.is_empty() {
            return Err(SequencerError::EmptyScript);
        }

        log::info!("starting sequence of {} messages", script.len());
        self.script = script;
        self.script_index = 0;
        self.char_index = 0;
        self.sink.reset();
        self.enter_fade();
        Ok(StartOutcome::Started)
    }

    /// Apply the profile's font and start its script
    pub fn start_profile(
        &mut self,
        profile: &LanguageProfile,
    ) -> Result<StartOutcome, SequencerError> {
        if self.state.is_running() {
            log::debug!("language selection ignored, sequence already running");
            return Ok(StartOutcome::AlreadyRunning);
        }
        if let Some(font) = profile.font.as_deref() {
            self.sink.set_font(font);
        }
        log::debug!("language selected: {}", profile.language);
        self.start(profile.script.clone())
    }

    /// Drop the pending timer and return to Idle
    pub fn stop(&mut self) {
        if self.pending.take().is_some() {
            log::info!("sequence stopped at message {}", self.script_index);
        }
        self.state = SequencerState::Idle;
        self.script_index = 0;
        self.char_index = 0;
    }

    /// Delay of the single pending timer, if any
    pub fn pending_delay(&self) -> Option<Duration> {
        self.pending
    }

    /// Changes whenever a new timer is armed, so a host can tell a fresh
    /// pending delay from one it has already scheduled.
    pub fn timer_serial(&self) -> u64 {
        self.armed
    }

    /// Run the transition the pending timer was armed for.
    ///
    /// Arms at most one successor. Does nothing when no timer is pending.
    pub fn fire(&mut self) {
        if self.pending.take().is_none() {
            return;
        }

        match self.state {
            SequencerState::HoldingEmpty => self.begin_typing(),
            SequencerState::Typing => self.type_next(),
            SequencerState::HoldingFull => self.end_hold(),
            SequencerState::Deleting => self.erase_next(),
            SequencerState::Idle | SequencerState::Finished => {}
        }
    }

    pub fn state(&self) -> SequencerState {
        self.state
    }

    pub fn script_index(&self) -> usize {
        self.script_index
    }

    pub fn char_index(&self) -> usize {
        self.char_index
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    pub fn is_finished(&self) -> bool {
        self.state == SequencerState::Finished
    }

    pub fn script(&self) -> &Script {
        &self.script
    }

    pub fn current_message(&self) -> Option<&str> {
        match self.state {
            SequencerState::Idle => None,
            _ => self.script.get(self.script_index),
        }
    }

    pub fn timing(&self) -> &TimingParams {
        &self.timing
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    fn arm(&mut self, delay: Duration) {
        debug_assert!(self.pending.is_none());
        self.pending = Some(delay);
        self.armed = self.armed.wrapping_add(1);
    }

    fn message(&self) -> &str {
        self.script.get(self.script_index).unwrap_or_default()
    }

    fn message_len(&self) -> usize {
        self.message().chars().count()
    }

    fn render_prefix(&mut self) {
        let message = self.script.get(self.script_index).unwrap_or_default();
        let text = prefix(message, self.char_index);
        self.sink.render(text);
    }

    fn enter_fade(&mut self) {
        log::trace!("fading before message {}", self.script_index);
        self.state = SequencerState::HoldingEmpty;
        self.sink.set_opacity(0.0);
        self.arm(self.timing.fade());
    }

    fn begin_typing(&mut self) {
        log::trace!("typing message {}", self.script_index);
        self.sink.set_opacity(1.0);
        self.state = SequencerState::Typing;
        self.char_index = 0;
        if self.message_len() == 0 {
            self.enter_hold();
        } else {
            self.arm(self.timing.typing_interval());
        }
    }

    fn type_next(&mut self) {
        self.char_index += 1;
        self.render_prefix();
        if self.char_index >= self.message_len() {
            self.enter_hold();
        } else {
            self.arm(self.timing.typing_interval());
        }
    }

    fn enter_hold(&mut self) {
        self.state = SequencerState::HoldingFull;
        self.arm(self.timing.delete_delay());
    }

    fn end_hold(&mut self) {
        if Some(self.script_index) == self.script.last_index() {
            self.sink.hide_cursor();
            self.sink.mark_finished();
            self.state = SequencerState::Finished;
            log::info!("sequence finished after {} messages", self.script.len());
            return;
        }

        log::trace!("deleting message {}", self.script_index);
        self.state = SequencerState::Deleting;
        if self.char_index == 0 {
            self.next_message();
        } else {
            self.arm(self.timing.delete_interval());
        }
    }

    fn erase_next(&mut self) {
        self.char_index -= 1;
        self.render_prefix();
        if self.char_index == 0 {
            self.next_message();
        } else {
            self.arm(self.timing.delete_interval());
        }
    }

    fn next_message(&mut self) {
        self.script_index += 1;
        self.char_index = 0;
        self.enter_fade();
    }
}

/// First `chars` Unicode scalars of `message`
fn prefix(message: &str, chars: usize) -> &str {
    match message.char_indices().nth(chars) {
        Some((offset, _)) => &message[..offset],
        None => message,
    }
}
