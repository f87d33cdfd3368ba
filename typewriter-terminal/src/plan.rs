/// Dry run: prints when every frame of the card would appear
use std::io::{self, Write};
use typewriter_core::{
    LanguageProfile, MessageSequencer, RecordingSink, SequencerError, SinkEvent, Timeline,
    TimingParams,
};

/// Upper bound on fired timers, far above any real card
const MAX_STEPS: usize = 1_000_000;

#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error(transparent)]
    Sequencer(#[from] SequencerError),

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub fn write_plan<W: Write>(
    out: &mut W,
    profile: &LanguageProfile,
    timing: TimingParams,
) -> Result<(), PlanError> {
    let mut sequencer = MessageSequencer::new(RecordingSink::new(), timing)?;
    sequencer.start_profile(profile)?;

    let mut timeline = Timeline::new();
    let events = timeline.run_recorded(&mut sequencer, MAX_STEPS);

    writeln!(
        out,
        "{} messages, typing {} ms, delete delay {} ms, fade {} ms",
        profile.script.len(),
        timing.typing_speed_ms,
        timing.delete_delay_ms,
        timing.fade_ms
    )?;
    for (at, event) in events {
        let line = match event {
            SinkEvent::Frame(frame) => format!("{frame:?}"),
            SinkEvent::Opacity(opacity) if opacity < 0.5 => "fade out".to_string(),
            SinkEvent::Opacity(_) => "fade in".to_string(),
            SinkEvent::CursorHidden => "cursor hidden".to_string(),
            SinkEvent::Finished => "finished".to_string(),
            SinkEvent::Font(font) => format!("font {font}"),
            SinkEvent::Reset => "reset".to_string(),
        };
        writeln!(out, "{:>9.3}s  {line}", at.as_secs_f64())?;
    }
    writeln!(out, "total {:.3}s", timeline.now().as_secs_f64())?;
    Ok(())
}
