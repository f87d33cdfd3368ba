/// Virtual clock for driving a sequencer without real timers
use std::time::Duration;

use crate::script::Script;
use crate::sequencer::{MessageSequencer, SequencerError, StartOutcome};
use crate::sink::{RecordingSink, SinkEvent, TextSink};

/// Fires a sequencer's pending timer at its virtual deadline.
///
/// A timer the timeline has not seen yet, e.g. from a `start` called on the
/// sequencer directly, counts from the current time.
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    now: Duration,
    armed_at: Duration,
    /// `timer_serial` of the timer `armed_at` belongs to
    seen: Option<u64>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Elapsed virtual time
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn start<S: TextSink>(
        &mut self,
        sequencer: &mut MessageSequencer<S>,
        script: Script,
    ) -> Result<StartOutcome, SequencerError> {
        let outcome = sequencer.start(script)?;
        if outcome == StartOutcome::Started {
            self.sync(sequencer);
        }
        Ok(outcome)
    }

    /// Virtual time at which the pending timer is due
    pub fn next_deadline<S: TextSink>(&self, sequencer: &MessageSequencer<S>) -> Option<Duration> {
        let base = if self.seen == Some(sequencer.timer_serial()) {
            self.armed_at
        } else {
            self.now
        };
        sequencer.pending_delay().map(|delay| base + delay)
    }

    /// Jump to the pending deadline and fire it. Returns the new time.
    pub fn step<S: TextSink>(&mut self, sequencer: &mut MessageSequencer<S>) -> Option<Duration> {
        let due = self.next_deadline(sequencer)?;
        self.now = self.now.max(due);
        sequencer.fire();
        self.sync(sequencer);
        Some(self.now)
    }

    fn sync<S: TextSink>(&mut self, sequencer: &MessageSequencer<S>) {
        self.armed_at = self.now;
        self.seen = Some(sequencer.timer_serial());
    }

    /// Move forward by `by`, firing every timer that falls due on the way.
    /// Returns how many fired.
    pub fn advance<S: TextSink>(&mut self, sequencer: &mut MessageSequencer<S>, by: Duration) -> usize {
        let target = self.now + by;
        let mut fired = 0;
        while let Some(due) = self.next_deadline(sequencer) {
            if due > target {
                break;
            }
            self.step(sequencer);
            fired += 1;
        }
        self.now = target;
        fired
    }

    /// Fire timers until none is pending or `max_steps` is reached.
    /// Returns how many fired.
    pub fn run<S: TextSink>(&mut self, sequencer: &mut MessageSequencer<S>, max_steps: usize) -> usize {
        let mut fired = 0;
        while fired < max_steps && self.step(sequencer).is_some() {
            fired += 1;
        }
        fired
    }

    /// Run to completion, stamping every sink event with the time it happened.
    ///
    /// Events recorded before the call are stamped with the current time.
    pub fn run_recorded(
        &mut self,
        sequencer: &mut MessageSequencer<RecordingSink>,
        max_steps: usize,
    ) -> Vec<(Duration, SinkEvent)> {
        let mut stamped: Vec<(Duration, SinkEvent)> = sequencer
            .sink_mut()
            .take_events()
            .into_iter()
            .map(|event| (self.now, event))
            .collect();

        for _ in 0..max_steps {
            let Some(at) = self.step(sequencer) else {
                break;
            };
            stamped.extend(
                sequencer
                    .sink_mut()
                    .take_events()
                    .into_iter()
                    .map(|event| (at, event)),
            );
        }
        stamped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timing::TimingParams;

    #[test]
    fn test_advance_stops_before_future_deadline() {
        let mut seq =
            MessageSequencer::new(RecordingSink::new(), TimingParams::new(100, 1000)).unwrap();
        let mut timeline = Timeline::new();
        timeline.start(&mut seq, Script::new(["ab"])).unwrap();

        assert_eq!(timeline.next_deadline(&seq), Some(Duration::from_millis(500)));
        assert_eq!(timeline.advance(&mut seq, Duration::from_millis(450)), 0);
        assert_eq!(timeline.now(), Duration::from_millis(450));

        // the fade still ends at 500 even though time moved in between
        assert_eq!(timeline.advance(&mut seq, Duration::from_millis(150)), 2);
        assert_eq!(seq.sink().text(), "a");
        assert_eq!(timeline.now(), Duration::from_millis(600));
    }

    #[test]
    fn test_run_honours_step_limit() {
        let mut seq =
            MessageSequencer::new(RecordingSink::new(), TimingParams::new(10, 10)).unwrap();
        let mut timeline = Timeline::new();
        timeline.start(&mut seq, Script::new(["abcdef"])).unwrap();

        assert_eq!(timeline.run(&mut seq, 3), 3);
        assert!(seq.is_running());
        assert_eq!(seq.sink().text(), "ab");

        seq.stop();
        assert_eq!(timeline.step(&mut seq), None);
        assert_eq!(timeline.run(&mut seq, 3), 0);
    }

    #[test]
    fn test_direct_restart_counts_from_now() {
        let mut seq =
            MessageSequencer::new(RecordingSink::new(), TimingParams::new(100, 1000)).unwrap();
        let mut timeline = Timeline::new();
        timeline.start(&mut seq, Script::new(["ab"])).unwrap();
        timeline.advance(&mut seq, Duration::from_millis(700));
        seq.stop();
        timeline.advance(&mut seq, Duration::from_millis(300));

        // restarted behind the timeline's back at t=1000
        seq.start(Script::new(["cd"])).unwrap();
        assert_eq!(timeline.next_deadline(&seq), Some(Duration::from_millis(1500)));
        assert_eq!(timeline.step(&mut seq), Some(Duration::from_millis(1500)));
        assert_eq!(timeline.next_deadline(&seq), Some(Duration::from_millis(1600)));
    }
}
