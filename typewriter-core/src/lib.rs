/// Typewriter Core Library - Message sequencing shared by every host
///
/// This library provides the platform-free core of the typewriter card:
/// the message sequencer state machine, the text sink contract, scripts
/// and languages, timing configuration and a virtual timeline for driving
/// the sequencer without wall-clock timers.

pub mod book;
pub mod script;
pub mod sequencer;
pub mod sink;
pub mod timeline;
pub mod timing;

// Re-export commonly used types
pub use book::{parse_script_book, ScriptError};
pub use script::{Language, LanguageProfile, Script, ScriptBook};
pub use sequencer::{MessageSequencer, SequencerError, SequencerState, StartOutcome};
pub use sink::{RecordingSink, SinkError, SinkEvent, TextSink, CURSOR_GLYPH};
pub use timeline::Timeline;
pub use timing::{ConfigError, IntroParams, TimingParams};
