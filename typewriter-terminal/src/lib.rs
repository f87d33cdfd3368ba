/// Terminal host for the typewriter card
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{self},
};
use std::io::{self, stdout, Stdout};
use std::time::{Duration, Instant};
use typewriter_core::{LanguageProfile, MessageSequencer, SequencerError, TimingParams};

pub mod cli;
pub mod plan;
pub mod prompt;
pub mod sink;

pub use sink::TerminalSink;

/// How often input is polled once nothing is scheduled
const IDLE_POLL: Duration = Duration::from_millis(250);

const HINT_RUNNING: &str = "Q=Quit";
const HINT_FINISHED: &str = "R=Replay Q=Quit";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Sequencer(#[from] SequencerError),
}

/// Plays one language profile in the terminal
pub struct TerminalApp {
    sequencer: MessageSequencer<TerminalSink<Stdout>>,
    profile: LanguageProfile,
    running: bool,
    exit_on_finish: bool,
}

impl TerminalApp {
    pub fn new(profile: LanguageProfile, timing: TimingParams) -> Result<Self, AppError> {
        let sink = TerminalSink::stdout().map_err(SequencerError::from)?;
        let sequencer = MessageSequencer::new(sink, timing)?;

        Ok(Self {
            sequencer,
            profile,
            running: true,
            exit_on_finish: false,
        })
    }

    pub fn exit_on_finish(mut self, exit: bool) -> Self {
        self.exit_on_finish = exit;
        self
    }

    pub fn run(&mut self) -> Result<(), AppError> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        self.sequencer.stop();
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self) -> Result<(), AppError> {
        self.sequencer.sink_mut().status(HINT_RUNNING);
        self.sequencer.start_profile(&self.profile)?;
        tracing::info!(language = %self.profile.language, "card started");

        while self.running {
            match self.sequencer.pending_delay() {
                Some(delay) => {
                    self.wait(delay)?;
                    if self.running {
                        self.sequencer.fire();
                        if self.sequencer.is_finished() {
                            self.on_finished();
                        }
                    }
                }
                None if self.exit_on_finish => break,
                None => {
                    if event::poll(IDLE_POLL)? {
                        self.handle_input()?;
                    }
                }
            }

            if let Some(e) = self.sequencer.sink_mut().take_error() {
                return Err(e.into());
            }
        }

        Ok(())
    }

    /// Sleep until `delay` has passed while still reacting to keys
    fn wait(&mut self, delay: Duration) -> Result<(), AppError> {
        let deadline = Instant::now() + delay;
        while self.running {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            if event::poll(deadline - now)? {
                self.handle_input()?;
            }
        }
        Ok(())
    }

    fn on_finished(&mut self) {
        tracing::info!("card finished");
        if !self.exit_on_finish {
            self.sequencer.sink_mut().status(HINT_FINISHED);
        }
    }

    fn handle_input(&mut self) -> Result<(), AppError> {
        match event::read()? {
            Event::Key(KeyEvent {
                code,
                modifiers,
                kind: KeyEventKind::Press,
                ..
            }) => match code {
                KeyCode::Char('q') | KeyCode::Esc => {
                    self.quit();
                }
                KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                    self.quit();
                }
                KeyCode::Char('r') if self.sequencer.is_finished() => {
                    self.sequencer.sink_mut().status(HINT_RUNNING);
                    self.sequencer.start_profile(&self.profile)?;
                }
                _ => {}
            },
            Event::Resize(width, height) => {
                self.sequencer.sink_mut().resize(width, height);
                let hint = if self.sequencer.is_finished() {
                    HINT_FINISHED
                } else {
                    HINT_RUNNING
                };
                self.sequencer.sink_mut().status(hint);
            }
            _ => {}
        }
        Ok(())
    }

    fn quit(&mut self) {
        tracing::debug!(index = self.sequencer.script_index(), "quit requested");
        self.sequencer.stop();
        self.running = false;
    }
}
