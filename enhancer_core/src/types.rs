// Configuration, actions and the values exchanged with JS.
// Configuration is built once, validated, then only ever borrowed.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::level_filters::LevelFilter;

use crate::error::EnhancerError;
use crate::keys;

/// Media-control action a key can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    SlowDown,
    SpeedUp,
    PauseResume,
    Forward,
    Backward,
    ToggleFullscreen,
}

impl Action {
    pub const ALL: [Action; 6] = [
        Action::SlowDown,
        Action::SpeedUp,
        Action::PauseResume,
        Action::Forward,
        Action::Backward,
        Action::ToggleFullscreen,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::SlowDown => "slow_down",
            Action::SpeedUp => "speed_up",
            Action::PauseResume => "pause_resume",
            Action::Forward => "forward",
            Action::Backward => "backward",
            Action::ToggleFullscreen => "toggle_fullscreen",
        }
    }

    /// Whether the browser's default action for the bound key is cancelled.
    /// The fullscreen key is left alone so typing "f" keeps working.
    pub fn prevents_default(&self) -> bool {
        !matches!(self, Action::ToggleFullscreen)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key identifier bound to each action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub slow_down: String,
    pub speed_up: String,
    pub pause_resume: String,
    pub forward: String,
    pub backward: String,
    pub toggle_fullscreen: String,
}

impl Default for KeyBindings {
    fn default() -> Self {
        KeyBindings {
            slow_down: "ArrowDown".to_string(),
            speed_up: "ArrowUp".to_string(),
            pause_resume: " ".to_string(),
            forward: "ArrowRight".to_string(),
            backward: "ArrowLeft".to_string(),
            toggle_fullscreen: "f".to_string(),
        }
    }
}

impl KeyBindings {
    pub fn key_for(&self, action: Action) -> &str {
        match action {
            Action::SlowDown => &self.slow_down,
            Action::SpeedUp => &self.speed_up,
            Action::PauseResume => &self.pause_resume,
            Action::Forward => &self.forward,
            Action::Backward => &self.backward,
            Action::ToggleFullscreen => &self.toggle_fullscreen,
        }
    }

    /// Resolve a key identifier (legacy or modern form) to its action.
    pub fn action_for(&self, key: &str) -> Option<Action> {
        let key = keys::normalize(key);
        Action::ALL
            .into_iter()
            .find(|action| keys::normalize(self.key_for(*action)) == key)
    }

    /// Bindings must be non-empty and pairwise distinct once normalized.
    pub fn validate(&self) -> Result<(), EnhancerError> {
        for (i, first) in Action::ALL.iter().enumerate() {
            let key = self.key_for(*first);
            if key.is_empty() {
                return Err(EnhancerError::InvalidConfig(format!(
                    "binding for {} is empty",
                    first
                )));
            }
            for second in &Action::ALL[i + 1..] {
                if keys::normalize(key) == keys::normalize(self.key_for(*second)) {
                    return Err(EnhancerError::DuplicateBinding {
                        first: *first,
                        second: *second,
                        key: key.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Console log verbosity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

/// Enhancer configuration passed from JS.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnhancerConfig {
    /// Playback-rate change per key release.
    #[serde(default = "default_speed_step")]
    pub speed_step: f64,
    /// Seek distance per key release, in seconds.
    #[serde(default = "default_time_step")]
    pub time_step: f64,
    #[serde(default = "default_min_playback_rate")]
    pub min_playback_rate: f64,
    #[serde(default = "default_max_playback_rate")]
    pub max_playback_rate: f64,
    #[serde(default)]
    pub key_bindings: KeyBindings,
    /// Selector of the player's fullscreen button.
    #[serde(default = "default_fullscreen_selector")]
    pub fullscreen_selector: String,
    /// Selector of the element showing the current rate.
    #[serde(default = "default_status_selector")]
    pub status_selector: String,
    #[serde(default)]
    pub log_level: LogLevel,
}

fn default_speed_step() -> f64 {
    0.25
}

fn default_time_step() -> f64 {
    5.0
}

fn default_min_playback_rate() -> f64 {
    0.25
}

fn default_max_playback_rate() -> f64 {
    16.0
}

fn default_fullscreen_selector() -> String {
    ".control.add-fullscreen".to_string()
}

fn default_status_selector() -> String {
    "button.control.speed-button > span.value".to_string()
}

impl Default for EnhancerConfig {
    fn default() -> Self {
        EnhancerConfig {
            speed_step: default_speed_step(),
            time_step: default_time_step(),
            min_playback_rate: default_min_playback_rate(),
            max_playback_rate: default_max_playback_rate(),
            key_bindings: KeyBindings::default(),
            fullscreen_selector: default_fullscreen_selector(),
            status_selector: default_status_selector(),
            log_level: LogLevel::default(),
        }
    }
}

impl EnhancerConfig {
    /// Parse and validate a JSON configuration. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, EnhancerError> {
        let config: EnhancerConfig = serde_json::from_str(json)
            .map_err(|e| EnhancerError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EnhancerError> {
        positive("speed_step", self.speed_step)?;
        positive("time_step", self.time_step)?;
        positive("min_playback_rate", self.min_playback_rate)?;
        positive("max_playback_rate", self.max_playback_rate)?;
        if self.min_playback_rate >= self.max_playback_rate {
            return Err(EnhancerError::InvalidConfig(format!(
                "min_playback_rate ({}) must be below max_playback_rate ({})",
                self.min_playback_rate, self.max_playback_rate
            )));
        }
        if self.fullscreen_selector.trim().is_empty() || self.status_selector.trim().is_empty() {
            return Err(EnhancerError::InvalidConfig(
                "selectors must not be empty".to_string(),
            ));
        }
        self.key_bindings.validate()
    }
}

fn positive(name: &str, value: f64) -> Result<(), EnhancerError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(EnhancerError::InvalidConfig(format!(
            "{} must be a positive number, got {}",
            name, value
        )))
    }
}

/// State of the addressed media element, reported to JS for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MediaSnapshot {
    pub paused: bool,
    pub current_time: f64,
    pub playback_rate: f64,
}

/// What a key handler did with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyOutcome {
    /// Action the key resolved to, if any.
    pub action: Option<Action>,
    /// The caller must cancel the browser's default action.
    pub prevent_default: bool,
}

impl KeyOutcome {
    pub fn ignored() -> Self {
        KeyOutcome::default()
    }
}

/// Status text for a playback rate, e.g. `1.25x`.
pub fn format_rate(rate: f64) -> String {
    format!("{}x", rate)
}
