//! Configuration management for stop-herald.
//!
//! Loads config from YAML files in standard locations. Every section has
//! defaults, so a missing or broken file only costs a warning.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub openai_model: String,
    pub openai_base_url: String,
    pub anthropic_model: String,
    pub anthropic_base_url: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            openai_model: "gpt-4.1-nano".into(),
            openai_base_url: "https://api.openai.com".into(),
            anthropic_model: "claude-3-5-haiku-latest".into(),
            anthropic_base_url: "https://api.anthropic.com".into(),
            max_tokens: 100,
            temperature: 0.7,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    pub elevenlabs_voice_id: String,
    pub elevenlabs_model: String,
    pub elevenlabs_base_url: String,
    pub openai_voice: String,
    pub openai_model: String,
    pub openai_base_url: String,
    /// Local speech commands, tried in order when looking one up on PATH.
    pub system_voices: Vec<String>,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            elevenlabs_voice_id: "21m00Tcm4TlvDq8ikWAM".into(),
            elevenlabs_model: "eleven_turbo_v2_5".into(),
            elevenlabs_base_url: "https://api.elevenlabs.io".into(),
            openai_voice: "nova".into(),
            openai_model: "gpt-4o-mini-tts".into(),
            openai_base_url: "https://api.openai.com".into(),
            system_voices: vec![
                "say".into(),
                "spd-say".into(),
                "espeak-ng".into(),
                "espeak".into(),
            ],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where `stop.json`, `chat.json` and the history file go.
    pub log_dir: PathBuf,
    /// Budget for a single provider attempt, both capabilities.
    pub timeout_secs: u64,
    pub llm: LlmConfig,
    pub speech: SpeechConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("logs"),
            timeout_secs: 10,
            llm: LlmConfig::default(),
            speech: SpeechConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from YAML file.
    ///
    /// Searches standard locations if no path is provided:
    /// 1. ./.claude/hooks/stop-herald.yaml
    /// 2. ~/.config/stop-herald/config.yaml
    /// 3. /etc/stop-herald/config.yaml
    pub fn load(path: Option<&Path>) -> Self {
        let resolved = path.map(PathBuf::from).or_else(|| {
            let candidates = [
                std::env::current_dir()
                    .ok()
                    .map(|d| d.join(".claude/hooks/stop-herald.yaml")),
                dirs::home_dir().map(|h| h.join(".config/stop-herald/config.yaml")),
                Some(PathBuf::from("/etc/stop-herald/config.yaml")),
            ];
            candidates.into_iter().flatten().find(|p| p.exists())
        });

        let Some(config_path) = resolved else {
            debug!("No config file found, using defaults");
            return Self::default();
        };

        match std::fs::read_to_string(&config_path) {
            Ok(contents) => Self::parse(&contents).unwrap_or_else(|e| {
                warn!("Failed to parse {}: {e}, using defaults", config_path.display());
                Self::default()
            }),
            Err(e) => {
                warn!("Failed to read {}: {e}, using defaults", config_path.display());
                Self::default()
            }
        }
    }

    pub fn parse(contents: &str) -> Result<Self, serde_yml::Error> {
        serde_yml::from_str(contents)
    }

    /// Per-attempt timeout. Zero in the file is bumped to one second.
    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}
