//! Text-to-speech proxy
//!
//! Forwards text to a remote TTS service (Google, ElevenLabs or Amazon Polly)
//! and hands the audio back as base64 plus a `data:` URL the widget can play
//! directly. One request per call, no retry; the configured timeout bounds
//! each call.

mod elevenlabs;
mod google;
mod polly;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::config::{TtsConfig, TtsProviderKind};
use crate::{Error, Result};

pub use elevenlabs::ElevenLabsSpeech;
pub use google::GoogleSpeech;
pub use polly::{PollyCredentials, PollySpeech};

/// Longest provider error text passed on to callers, in characters
const MAX_PROVIDER_MESSAGE: usize = 300;

/// Shared speech provider handle
pub type SharedSpeech = Arc<dyn SpeechProvider>;

/// Audio encodings a provider can be asked for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AudioEncoding {
    #[default]
    Mp3,
    OggOpus,
    Linear16,
}

impl AudioEncoding {
    /// MIME type used in the playback URL
    #[must_use]
    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Mp3 => "audio/mp3",
            Self::OggOpus => "audio/ogg",
            Self::Linear16 => "audio/wav",
        }
    }

    /// Name as sent to Google (`MP3`, `OGG_OPUS`, `LINEAR16`)
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mp3 => "MP3",
            Self::OggOpus => "OGG_OPUS",
            Self::Linear16 => "LINEAR16",
        }
    }
}

impl std::str::FromStr for AudioEncoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "MP3" => Ok(Self::Mp3),
            "OGG_OPUS" | "OGG" => Ok(Self::OggOpus),
            "LINEAR16" | "WAV" => Ok(Self::Linear16),
            other => Err(Error::Config(format!("unsupported audio encoding: {other}"))),
        }
    }
}

/// Synthesized audio, ready for JSON
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioPayload {
    /// Base64 audio bytes
    pub audio_content: String,
    /// `data:<mime>;base64,<audio>` playback URI
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
}

impl AudioPayload {
    /// Encode raw audio bytes
    #[must_use]
    pub fn from_bytes(audio: &[u8], encoding: AudioEncoding) -> Self {
        let content = base64::engine::general_purpose::STANDARD.encode(audio);
        Self::with_url(content, encoding)
    }

    /// Wrap audio a provider already returned as base64
    ///
    /// # Errors
    ///
    /// Returns `ProviderFailure` if the content is not valid base64
    pub fn from_base64(
        provider: &'static str,
        content: String,
        encoding: AudioEncoding,
    ) -> Result<Self> {
        base64::engine::general_purpose::STANDARD
            .decode(content.as_bytes())
            .map_err(|e| Error::ProviderFailure {
                provider,
                status: None,
                message: format!("invalid audio content: {e}"),
            })?;
        Ok(Self::with_url(content, encoding))
    }

    fn with_url(content: String, encoding: AudioEncoding) -> Self {
        let url = format!("data:{};base64,{content}", encoding.mime_type());
        Self {
            audio_content: content,
            audio_url: Some(url),
        }
    }
}

/// A remote text-to-speech service
#[async_trait]
pub trait SpeechProvider: Send + Sync {
    /// Synthesize `text` into audio
    ///
    /// # Errors
    ///
    /// Returns `ProviderFailure` if the service rejects the request or the
    /// call fails in transit
    async fn synthesize(&self, text: &str) -> Result<AudioPayload>;

    /// Provider name for logs and health output
    fn name(&self) -> &'static str;
}

/// Provider name for a configured kind, used even when credentials are absent
#[must_use]
pub const fn provider_name(kind: TtsProviderKind) -> &'static str {
    match kind {
        TtsProviderKind::Google => google::PROVIDER,
        TtsProviderKind::ElevenLabs => elevenlabs::PROVIDER,
        TtsProviderKind::Polly => polly::PROVIDER,
    }
}

/// Build the configured provider
///
/// # Errors
///
/// Returns `ProviderUnconfigured` if the provider's credentials are absent,
/// or `Config` if the HTTP client cannot be built
pub fn build_provider(config: &TtsConfig) -> Result<SharedSpeech> {
    let provider: SharedSpeech = match config.provider {
        TtsProviderKind::Google => {
            let key = config
                .google_api_key
                .clone()
                .ok_or(Error::ProviderUnconfigured(google::PROVIDER))?;
            Arc::new(GoogleSpeech::new(http_client(config.timeout)?, key, config))
        }
        TtsProviderKind::ElevenLabs => {
            let key = config
                .elevenlabs_api_key
                .clone()
                .ok_or(Error::ProviderUnconfigured(elevenlabs::PROVIDER))?;
            Arc::new(ElevenLabsSpeech::new(http_client(config.timeout)?, key, config))
        }
        TtsProviderKind::Polly => {
            let credentials = PollyCredentials::from_config(config)?;
            Arc::new(PollySpeech::new(credentials, config))
        }
    };
    tracing::info!(provider = provider.name(), "speech provider ready");
    Ok(provider)
}

fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))
}

/// Map a transport error to a provider failure
fn transport_error(provider: &'static str, err: &reqwest::Error) -> Error {
    Error::ProviderFailure {
        provider,
        status: err.status().map(|s| s.as_u16()),
        message: if err.is_timeout() {
            "request timed out".to_string()
        } else {
            err.to_string()
        },
    }
}

/// Turn a non-success response into a provider failure
async fn status_error(provider: &'static str, response: reqwest::Response) -> Error {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Error::ProviderFailure {
        provider,
        status: Some(status.as_u16()),
        message: provider_message(&body).unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string()
        }),
    }
}

/// Pull the human-readable message out of a provider error body
///
/// Google wraps it in `error.message`, ElevenLabs in `detail.message` or a
/// bare `detail` string.
fn provider_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    let from_json = serde_json::from_str::<serde_json::Value>(trimmed)
        .ok()
        .and_then(|value| {
            value
                .pointer("/error/message")
                .or_else(|| value.pointer("/detail/message"))
                .or_else(|| value.get("detail"))
                .and_then(serde_json::Value::as_str)
                .map(ToString::to_string)
        });

    let message = from_json.unwrap_or_else(|| trimmed.to_string());
    Some(truncate(message, MAX_PROVIDER_MESSAGE))
}

/// Cut `message` to at most `max` characters, marking the cut
fn truncate(message: String, max: usize) -> String {
    match message.char_indices().nth(max) {
        Some((end, _)) => format!("{}...", &message[..end]),
        None => message,
    }
}
