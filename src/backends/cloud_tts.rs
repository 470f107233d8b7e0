//! Cloud TTS backends. Both ask for 24 kHz 16-bit mono PCM so the audio
//! can go straight into a rodio buffer without a decoder.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde_json::json;
use tracing::debug;

use super::playback::{self, PCM_SAMPLE_RATE};
use super::SpeechBackend;
use crate::config::SpeechConfig;
use crate::error::ProviderError;

pub struct ElevenLabsSpeech {
    client: Client,
    url: String,
    model: String,
    api_key: String,
}

impl ElevenLabsSpeech {
    pub fn new(client: Client, config: &SpeechConfig, api_key: &str) -> Self {
        Self {
            client,
            url: format!(
                "{}/v1/text-to-speech/{}",
                config.elevenlabs_base_url.trim_end_matches('/'),
                config.elevenlabs_voice_id
            ),
            model: config.elevenlabs_model.clone(),
            api_key: api_key.to_string(),
        }
    }
}

#[async_trait]
impl SpeechBackend for ElevenLabsSpeech {
    async fn speak(&self, text: &str) -> Result<(), ProviderError> {
        let request = self
            .client
            .post(&self.url)
            .query(&[("output_format", "pcm_24000")])
            .header("xi-api-key", &self.api_key)
            .json(&json!({
                "text": text,
                "model_id": self.model,
            }));

        let pcm = fetch_pcm(request).await?;
        debug!("ElevenLabs returned {} bytes of PCM", pcm.len());
        playback::play(playback::pcm16le_to_f32(&pcm), PCM_SAMPLE_RATE).await
    }
}

pub struct OpenAiSpeech {
    client: Client,
    url: String,
    model: String,
    voice: String,
    api_key: String,
}

impl OpenAiSpeech {
    pub fn new(client: Client, config: &SpeechConfig, api_key: &str) -> Self {
        Self {
            client,
            url: format!("{}/v1/audio/speech", config.openai_base_url.trim_end_matches('/')),
            model: config.openai_model.clone(),
            voice: config.openai_voice.clone(),
            api_key: api_key.to_string(),
        }
    }
}

#[async_trait]
impl SpeechBackend for OpenAiSpeech {
    async fn speak(&self, text: &str) -> Result<(), ProviderError> {
        let request = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&json!({
                "model": self.model,
                "input": text,
                "voice": self.voice,
                "response_format": "pcm",
            }));

        let pcm = fetch_pcm(request).await?;
        debug!("OpenAI TTS returned {} bytes of PCM", pcm.len());
        playback::play(playback::pcm16le_to_f32(&pcm), PCM_SAMPLE_RATE).await
    }
}

async fn fetch_pcm(request: RequestBuilder) -> Result<Vec<u8>, ProviderError> {
    let resp = request.send().await?;
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ProviderError::status(status.as_u16(), &body));
    }
    let bytes = resp.bytes().await?;
    if bytes.len() < 2 {
        return Err(ProviderError::EmptyOutput);
    }
    Ok(bytes.to_vec())
}
