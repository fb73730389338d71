//! Google Cloud Text-to-Speech

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::{AudioEncoding, AudioPayload, SpeechProvider, status_error, transport_error};
use crate::Result;
use crate::config::TtsConfig;

pub(super) const PROVIDER: &str = "google-tts";

/// Public API endpoint
const DEFAULT_BASE_URL: &str = "https://texttospeech.googleapis.com";

/// Google Cloud TTS over REST with API key auth
pub struct GoogleSpeech {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    language_code: String,
    voice: Option<String>,
    encoding: AudioEncoding,
    speaking_rate: f64,
}

impl GoogleSpeech {
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
            language_code: config.language_code.clone(),
            voice: config.voice.clone().filter(|v| !v.is_empty()),
            encoding: config.audio_encoding,
            speaking_rate: config.speaking_rate,
        }
    }
}

#[derive(Serialize)]
struct SynthesizeRequest<'a> {
    input: Input<'a>,
    voice: Voice<'a>,
    #[serde(rename = "audioConfig")]
    audio_config: AudioConfig,
}

#[derive(Serialize)]
struct Input<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Voice<'a> {
    language_code: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AudioConfig {
    audio_encoding: &'static str,
    speaking_rate: f64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeResponse {
    audio_content: String,
}

#[async_trait]
impl SpeechProvider for GoogleSpeech {
    async fn synthesize(&self, text: &str) -> Result<AudioPayload> {
        let request = SynthesizeRequest {
            input: Input { text },
            voice: Voice {
                language_code: &self.language_code,
                name: self.voice.as_deref(),
            },
            audio_config: AudioConfig {
                audio_encoding: self.encoding.as_str(),
                speaking_rate: self.speaking_rate,
            },
        };

        let url = format!("{}/v1/text:synthesize", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .header("X-Goog-Api-Key", self.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER, &e))?;

        if !response.status().is_success() {
            return Err(status_error(PROVIDER, response).await);
        }

        let body: SynthesizeResponse = response
            .json()
            .await
            .map_err(|e| transport_error(PROVIDER, &e))?;

        tracing::debug!(
            chars = text.chars().count(),
            audio_len = body.audio_content.len(),
            "google synthesis complete"
        );

        AudioPayload::from_base64(PROVIDER, body.audio_content, self.encoding)
    }

    fn name(&self) -> &'static str {
        PROVIDER
    }
}
