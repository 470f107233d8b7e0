//! Concrete text-generation and speech backends.
//!
//! - `llm`: OpenAI chat completions and Anthropic messages
//! - `cloud_tts`: ElevenLabs and OpenAI speech endpoints (raw PCM)
//! - `playback`: rodio output with drop-triggered cancellation
//! - `system_voice`: local speech command (say / spd-say / espeak)

pub mod cloud_tts;
pub mod llm;
pub mod playback;
pub mod system_voice;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::cascade::ProviderId;
use crate::config::Config;
use crate::environment::{Environment, ANTHROPIC_API_KEY, ELEVENLABS_API_KEY, OPENAI_API_KEY};
use crate::error::ProviderError;

#[async_trait]
pub trait TextBackend: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError>;
}

#[async_trait]
pub trait SpeechBackend: Send + Sync {
    /// Speak `text` aloud; returns once playback has finished.
    async fn speak(&self, text: &str) -> Result<(), ProviderError>;
}

/// Builds the backend behind a provider id. `None` means the provider
/// cannot be attempted after all.
pub trait BackendFactory: Send + Sync {
    fn text_backend(&self, id: ProviderId) -> Option<Box<dyn TextBackend>>;
    fn speech_backend(&self, id: ProviderId) -> Option<Box<dyn SpeechBackend>>;
}

/// Production factory backed by the real HTTP APIs and local commands.
pub struct LiveBackends {
    config: Config,
    env: Environment,
    client: Client,
}

impl LiveBackends {
    pub fn new(config: Config, env: Environment) -> Self {
        let client = http_client(config.attempt_timeout());
        Self {
            config,
            env,
            client,
        }
    }
}

/// HTTP client whose own timeout matches the attempt budget.
pub fn http_client(timeout: Duration) -> Client {
    Client::builder()
        .connect_timeout(Duration::from_secs(3).min(timeout))
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| Client::new())
}

impl BackendFactory for LiveBackends {
    fn text_backend(&self, id: ProviderId) -> Option<Box<dyn TextBackend>> {
        match id {
            ProviderId::OpenAi => {
                let key = self.env.credential(OPENAI_API_KEY)?;
                Some(Box::new(llm::OpenAiChat::new(
                    self.client.clone(),
                    &self.config.llm,
                    key,
                )))
            }
            ProviderId::Anthropic => {
                let key = self.env.credential(ANTHROPIC_API_KEY)?;
                Some(Box::new(llm::AnthropicMessages::new(
                    self.client.clone(),
                    &self.config.llm,
                    key,
                )))
            }
            _ => None,
        }
    }

    fn speech_backend(&self, id: ProviderId) -> Option<Box<dyn SpeechBackend>> {
        match id {
            ProviderId::ElevenLabs => {
                let key = self.env.credential(ELEVENLABS_API_KEY)?;
                Some(Box::new(cloud_tts::ElevenLabsSpeech::new(
                    self.client.clone(),
                    &self.config.speech,
                    key,
                )))
            }
            ProviderId::OpenAiTts => {
                let key = self.env.credential(OPENAI_API_KEY)?;
                Some(Box::new(cloud_tts::OpenAiSpeech::new(
                    self.client.clone(),
                    &self.config.speech,
                    key,
                )))
            }
            ProviderId::SystemVoice => {
                let program = self.env.find_command(&self.config.speech.system_voices)?;
                Some(Box::new(system_voice::SystemVoice::new(program)))
            }
            _ => None,
        }
    }
}
