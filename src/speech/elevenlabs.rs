//! ElevenLabs text-to-speech

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use super::{AudioEncoding, AudioPayload, SpeechProvider, status_error, transport_error};
use crate::Result;
use crate::config::TtsConfig;

pub(super) const PROVIDER: &str = "elevenlabs";

/// Public API endpoint
const DEFAULT_BASE_URL: &str = "https://api.elevenlabs.io";

const DEFAULT_VOICE: &str = "21m00Tcm4TlvDq8ikWAM";
const DEFAULT_MODEL: &str = "eleven_multilingual_v2";

/// ElevenLabs TTS, always MP3
pub struct ElevenLabsSpeech {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    voice_id: String,
    model: String,
}

impl ElevenLabsSpeech {
    /// Create a provider from TTS configuration
    #[must_use]
    pub fn new(client: reqwest::Client, api_key: SecretString, config: &TtsConfig) -> Self {
        Self {
            client,
            api_key,
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            voice_id: config
                .voice
                .clone()
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| DEFAULT_VOICE.to_string()),
            model: config
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        }
    }
}

#[async_trait]
impl SpeechProvider for ElevenLabsSpeech {
    async fn synthesize(&self, text: &str) -> Result<AudioPayload> {
        #[derive(Serialize)]
        struct ElevenLabsRequest<'a> {
            text: &'a str,
            model_id: &'a str,
        }

        let url = format!(
            "{}/v1/text-to-speech/{}",
            self.base_url.trim_end_matches('/'),
            self.voice_id
        );

        let request = ElevenLabsRequest {
            text,
            model_id: &self.model,
        };

        let response = self
            .client
            .post(&url)
            .header("xi-api-key", self.api_key.expose_secret())
            .header("Accept", "audio/mpeg")
            .json(&request)
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER, &e))?;

        if !response.status().is_success() {
            return Err(status_error(PROVIDER, response).await);
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| transport_error(PROVIDER, &e))?;

        tracing::debug!(bytes = audio.len(), "elevenlabs synthesis complete");

        Ok(AudioPayload::from_bytes(&audio, AudioEncoding::Mp3))
    }

    fn name(&self) -> &'static str {
        PROVIDER
    }
}
