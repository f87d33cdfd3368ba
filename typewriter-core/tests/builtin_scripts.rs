/// Plays the built-in birthday scripts end to end on a virtual clock
use std::time::Duration;

use typewriter_core::{
    Language, MessageSequencer, RecordingSink, ScriptBook, SinkEvent, Timeline, TimingParams,
};

fn expected_runtime(messages: &[String], timing: &TimingParams) -> Duration {
    let last = messages.len() - 1;
    messages
        .iter()
        .enumerate()
        .map(|(index, message)| {
            let chars = message.chars().count() as u32;
            let mut total = timing.fade() + timing.typing_interval() * chars + timing.delete_delay();
            if index != last {
                total += timing.delete_interval() * chars;
            }
            total
        })
        .sum()
}

#[test]
fn builtin_scripts_play_to_the_last_line() {
    let book = ScriptBook::builtin();
    let timing = TimingParams::default();

    for language in Language::ALL {
        let profile = book.profile(language).unwrap();
        let mut seq = MessageSequencer::new(RecordingSink::new(), timing).unwrap();
        seq.start_profile(profile).unwrap();

        let mut timeline = Timeline::new();
        timeline.run(&mut seq, 10_000);

        assert!(seq.is_finished(), "{language} did not finish");
        let last = profile.script.messages().last().unwrap();
        assert_eq!(seq.sink().display(), *last);
        assert_eq!(
            timeline.now(),
            expected_runtime(profile.script.messages(), &timing)
        );

        // the final line is typed once and never erased
        let frames = seq.sink().frames();
        let full = format!("{last}|");
        let position = frames.iter().position(|frame| *frame == full).unwrap();
        assert_eq!(&frames[position + 1..], &[last.as_str()]);
        assert!(matches!(seq.sink().events().last(), Some(SinkEvent::Finished)));
    }
}

#[test]
fn every_typed_message_is_cleared_before_the_next() {
    let book = ScriptBook::builtin();
    let profile = book.profile(Language::English).unwrap();
    let mut seq = MessageSequencer::new(RecordingSink::new(), TimingParams::new(2, 4)).unwrap();
    let mut timeline = Timeline::new();
    timeline.start(&mut seq, profile.script.clone()).unwrap();

    let events = timeline.run_recorded(&mut seq, 10_000);
    let mut last_frame = String::new();
    for (_, event) in &events {
        match event {
            SinkEvent::Frame(frame) => last_frame = frame.clone(),
            SinkEvent::Opacity(opacity) if *opacity == 0.0 => {
                assert!(last_frame.is_empty() || last_frame == "|", "left '{last_frame}' behind");
            }
            _ => {}
        }
    }
}
