/// Timing configuration for the sequencer and the host intro
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_TYPING_SPEED_MS: u64 = 100;
pub const DEFAULT_DELETE_DELAY_MS: u64 = 1000;
pub const DEFAULT_FADE_MS: u64 = 500;

pub const DEFAULT_PANEL_FADE_MS: u64 = 2000;
pub const DEFAULT_LOADING_FADE_MS: u64 = 8000;
pub const DEFAULT_MUSIC_VOLUME: f64 = 0.1;

pub const ENV_TYPING_SPEED_MS: &str = "TYPEWRITER_TYPING_MS";
pub const ENV_DELETE_DELAY_MS: &str = "TYPEWRITER_DELETE_DELAY_MS";
pub const ENV_FADE_MS: &str = "TYPEWRITER_FADE_MS";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{key} must be a whole number of milliseconds, got '{value}'")]
    NotANumber { key: &'static str, value: String },

    #[error("typing speed must be greater than zero")]
    ZeroTypingSpeed,
}

/// Delays that drive the sequencer, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingParams {
    /// Interval between two typed characters. Deletion runs at half of it.
    pub typing_speed_ms: u64,
    /// Pause after a message is fully typed
    pub delete_delay_ms: u64,
    /// Opacity cycle between two messages
    pub fade_ms: u64,
}

impl Default for TimingParams {
    fn default() -> Self {
        Self {
            typing_speed_ms: DEFAULT_TYPING_SPEED_MS,
            delete_delay_ms: DEFAULT_DELETE_DELAY_MS,
            fade_ms: DEFAULT_FADE_MS,
        }
    }
}

impl TimingParams {
    pub fn new(typing_speed_ms: u64, delete_delay_ms: u64) -> Self {
        Self {
            typing_speed_ms,
            delete_delay_ms,
            ..Self::default()
        }
    }

    pub fn with_fade_ms(mut self, fade_ms: u64) -> Self {
        self.fade_ms = fade_ms;
        self
    }

    /// Read overrides from the process environment.
    ///
    /// - `TYPEWRITER_TYPING_MS`: default 100
    /// - `TYPEWRITER_DELETE_DELAY_MS`: default 1000
    /// - `TYPEWRITER_FADE_MS`: default 500
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`TimingParams::from_env`] with an injectable variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let timing = Self {
            typing_speed_ms: parse_ms(&lookup, ENV_TYPING_SPEED_MS, defaults.typing_speed_ms)?,
            delete_delay_ms: parse_ms(&lookup, ENV_DELETE_DELAY_MS, defaults.delete_delay_ms)?,
            fade_ms: parse_ms(&lookup, ENV_FADE_MS, defaults.fade_ms)?,
        };
        timing.validate()?;
        Ok(timing)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.typing_speed_ms == 0 {
            return Err(ConfigError::ZeroTypingSpeed);
        }
        Ok(())
    }

    pub fn typing_interval(&self) -> Duration {
        Duration::from_millis(self.typing_speed_ms)
    }

    /// Deleting is twice as fast as typing
    pub fn delete_interval(&self) -> Duration {
        self.typing_interval() / 2
    }

    pub fn delete_delay(&self) -> Duration {
        Duration::from_millis(self.delete_delay_ms)
    }

    pub fn fade(&self) -> Duration {
        Duration::from_millis(self.fade_ms)
    }
}

fn parse_ms<F>(lookup: &F, key: &'static str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(value) => value.trim().parse::<u64>().map_err(|_| ConfigError::NotANumber {
            key,
            value,
        }),
    }
}

/// Entry animation played by hosts between language choice and the first message
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntroParams {
    /// Fade-out of the language selection panel
    pub panel_fade_ms: u64,
    /// Fade-out of the loading canvas; the sequencer starts once it ends
    pub loading_fade_ms: u64,
    /// Background music volume in `0.0..=1.0`
    pub music_volume: f64,
}

impl Default for IntroParams {
    fn default() -> Self {
        Self {
            panel_fade_ms: DEFAULT_PANEL_FADE_MS,
            loading_fade_ms: DEFAULT_LOADING_FADE_MS,
            music_volume: DEFAULT_MUSIC_VOLUME,
        }
    }
}

impl IntroParams {
    /// Time from the language click until the first message starts
    pub fn start_delay(&self) -> Duration {
        Duration::from_millis(self.panel_fade_ms.max(self.loading_fade_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_overrides() {
        let timing = TimingParams::from_lookup(lookup(&[])).unwrap();
        assert_eq!(timing, TimingParams::default());
        assert_eq!(timing.typing_interval(), Duration::from_millis(100));
        assert_eq!(timing.delete_interval(), Duration::from_millis(50));
        assert_eq!(timing.fade(), Duration::from_millis(500));
    }

    #[test]
    fn test_overrides_are_applied() {
        let timing = TimingParams::from_lookup(lookup(&[
            (ENV_TYPING_SPEED_MS, "40"),
            (ENV_DELETE_DELAY_MS, " 250 "),
            (ENV_FADE_MS, "0"),
        ]))
        .unwrap();
        assert_eq!(timing, TimingParams::new(40, 250).with_fade_ms(0));
        assert_eq!(timing.delete_interval(), Duration::from_millis(20));
    }

    #[test]
    fn test_bad_values_are_rejected() {
        let err = TimingParams::from_lookup(lookup(&[(ENV_FADE_MS, "soon")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::NotANumber {
                key: ENV_FADE_MS,
                value: "soon".to_string()
            }
        );

        let err = TimingParams::from_lookup(lookup(&[(ENV_TYPING_SPEED_MS, "0")])).unwrap_err();
        assert_eq!(err, ConfigError::ZeroTypingSpeed);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let timing: TimingParams = serde_json::from_str(r#"{"typing_speed_ms": 60}"#).unwrap();
        assert_eq!(timing.typing_speed_ms, 60);
        assert_eq!(timing.delete_delay_ms, DEFAULT_DELETE_DELAY_MS);
    }

    #[test]
    fn test_intro_from_partial_json() {
        assert_eq!(
            IntroParams::default().start_delay(),
            Duration::from_millis(8000)
        );

        let intro: IntroParams =
            serde_json::from_str(r#"{"panel_fade_ms": 9000, "music_volume": 0.5}"#).unwrap();
        assert_eq!(intro.loading_fade_ms, DEFAULT_LOADING_FADE_MS);
        assert_eq!(intro.music_volume, 0.5);
        // the longer fade decides when the card starts
        assert_eq!(intro.start_delay(), Duration::from_millis(9000));

        let json = serde_json::to_value(IntroParams::default()).unwrap();
        assert_eq!(json["loading_fade_ms"], 8000);
    }
}
