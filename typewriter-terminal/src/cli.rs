/// Command-line configuration for the terminal card
use anyhow::Context;
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use typewriter_core::{parse_script_book, ConfigError, Language, ScriptBook, TimingParams};

#[derive(Debug, Parser)]
#[command(
    name = "typewriter",
    version,
    about = "Types a birthday card into the terminal, one character at a time"
)]
pub struct Args {
    /// Language to play (english or mandarin); asked interactively when absent
    #[arg(short, long, env = "TYPEWRITER_LANGUAGE")]
    pub language: Option<Language>,

    /// Script book file to use instead of the built-in messages
    #[arg(short, long, value_name = "FILE")]
    pub script: Option<PathBuf>,

    /// Milliseconds between typed characters [env: TYPEWRITER_TYPING_MS]
    #[arg(long, value_name = "MS")]
    pub typing_speed_ms: Option<u64>,

    /// Pause after a message is typed [env: TYPEWRITER_DELETE_DELAY_MS]
    #[arg(long, value_name = "MS")]
    pub delete_delay_ms: Option<u64>,

    /// Fade between messages [env: TYPEWRITER_FADE_MS]
    #[arg(long, value_name = "MS")]
    pub fade_ms: Option<u64>,

    /// Quit as soon as the last message is done
    #[arg(long)]
    pub exit_on_finish: bool,

    /// Print the schedule of the whole card and exit
    #[arg(long)]
    pub plan: bool,

    /// Log sequencer transitions to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Environment defaults with command-line overrides on top
    pub fn timing(&self) -> Result<TimingParams, ConfigError> {
        self.timing_over(TimingParams::from_env()?)
    }

    pub fn timing_over(&self, base: TimingParams) -> Result<TimingParams, ConfigError> {
        let mut timing = base;
        if let Some(ms) = self.typing_speed_ms {
            timing.typing_speed_ms = ms;
        }
        if let Some(ms) = self.delete_delay_ms {
            timing.delete_delay_ms = ms;
        }
        if let Some(ms) = self.fade_ms {
            timing.fade_ms = ms;
        }
        timing.validate()?;
        Ok(timing)
    }

    pub fn script_book(&self) -> anyhow::Result<ScriptBook> {
        let Some(path) = &self.script else {
            return Ok(ScriptBook::builtin());
        };
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read script book {}", path.display()))?;
        let book = parse_script_book(&text)
            .with_context(|| format!("failed to parse script book {}", path.display()))?;
        tracing::info!(path = %path.display(), languages = book.len(), "loaded script book");
        Ok(book)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_base_timing() {
        let args = Args::parse_from([
            "typewriter",
            "--language",
            "zh",
            "--typing-speed-ms",
            "30",
            "--fade-ms",
            "0",
        ]);
        assert_eq!(args.language, Some(Language::Mandarin));

        let timing = args.timing_over(TimingParams::new(100, 700)).unwrap();
        assert_eq!(timing, TimingParams::new(30, 700).with_fade_ms(0));
    }

    #[test]
    fn test_zero_typing_speed_is_rejected() {
        let args = Args::parse_from(["typewriter", "--typing-speed-ms", "0"]);
        assert_eq!(
            args.timing_over(TimingParams::default()),
            Err(ConfigError::ZeroTypingSpeed)
        );
    }

    #[test]
    fn test_unknown_language_fails_to_parse() {
        assert!(Args::try_parse_from(["typewriter", "-l", "elvish"]).is_err());
    }

    #[test]
    fn test_bundled_card_loads() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/cards/short.txt");
        let args = Args::parse_from(["typewriter", "--script", path]);
        let book = args.script_book().unwrap();

        let english = book.profile(Language::English).unwrap();
        assert_eq!(english.script.len(), 5);
        assert_eq!(english.script.get(4), Some("Happy Birthday <3"));
        assert!(book.profile(Language::Mandarin).is_some());
    }

    #[test]
    fn test_missing_script_file_names_the_path() {
        let args = Args::parse_from(["typewriter", "--script", "/nonexistent/card.txt"]);
        let err = args.script_book().unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/card.txt"));
    }
}
