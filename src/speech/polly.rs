//! Amazon Polly text-to-speech

use async_trait::async_trait;
use aws_sdk_polly::Client;
use aws_sdk_polly::config::retry::RetryConfig;
use aws_sdk_polly::config::timeout::TimeoutConfig;
use aws_sdk_polly::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_polly::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_polly::operation::synthesize_speech::SynthesizeSpeechError;
use aws_sdk_polly::types::{Engine, LanguageCode, OutputFormat, VoiceId};
use secrecy::{ExposeSecret, SecretString};

use super::{AudioEncoding, AudioPayload, SpeechProvider};
use crate::config::TtsConfig;
use crate::{Error, Result};

pub(super) const PROVIDER: &str = "aws-polly";

/// Credentials needed to sign Polly requests
pub struct PollyCredentials {
    pub access_key_id: SecretString,
    pub secret_access_key: SecretString,
    pub session_token: Option<SecretString>,
    pub region: String,
}

impl PollyCredentials {
    /// Collect credentials and region from configuration
    ///
    /// # Errors
    ///
    /// Returns `ProviderUnconfigured` if a key or the region is missing
    pub fn from_config(config: &TtsConfig) -> Result<Self> {
        let unconfigured = || Error::ProviderUnconfigured(PROVIDER);
        Ok(Self {
            access_key_id: config.aws_access_key_id.clone().ok_or_else(unconfigured)?,
            secret_access_key: config
                .aws_secret_access_key
                .clone()
                .ok_or_else(unconfigured)?,
            session_token: config.aws_session_token.clone(),
            region: config.aws_region.clone().ok_or_else(unconfigured)?,
        })
    }
}

/// Polly voice for a language when none is configured
fn default_voice(language_code: &str) -> &'static str {
    match language_code {
        "es-MX" => "Mia",
        "es-US" => "Lupe",
        "en-US" => "Joanna",
        "en-GB" => "Amy",
        _ => "Lucia",
    }
}

/// Polly output format and the encoding it is reported as
///
/// Polly has no WAV output, so `LINEAR16` is served as MP3.
fn output_format(encoding: AudioEncoding) -> (OutputFormat, AudioEncoding) {
    match encoding {
        AudioEncoding::OggOpus => (OutputFormat::OggVorbis, AudioEncoding::OggOpus),
        AudioEncoding::Mp3 | AudioEncoding::Linear16 => (OutputFormat::Mp3, AudioEncoding::Mp3),
    }
}

/// Amazon Polly through the AWS SDK, signed with static credentials
pub struct PollySpeech {
    client: Client,
    voice_id: String,
    language_code: String,
    engine: Option<String>,
    encoding: AudioEncoding,
}

impl PollySpeech {
    /// Create a provider from TTS configuration
    #[must_use]
    pub fn new(credentials: PollyCredentials, config: &TtsConfig) -> Self {
        let mut builder = aws_sdk_polly::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(credentials.region))
            .credentials_provider(Credentials::new(
                credentials.access_key_id.expose_secret(),
                credentials.secret_access_key.expose_secret(),
                credentials
                    .session_token
                    .map(|token| token.expose_secret().to_string()),
                None,
                "sofia-config",
            ))
            .timeout_config(
                TimeoutConfig::builder()
                    .operation_timeout(config.timeout)
                    .build(),
            )
            .retry_config(RetryConfig::disabled());

        if let Some(url) = &config.base_url {
            builder = builder.endpoint_url(url);
        }

        Self {
            client: Client::from_conf(builder.build()),
            voice_id: config
                .voice
                .clone()
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default_voice(&config.language_code).to_string()),
            language_code: config.language_code.clone(),
            engine: config.model.clone().filter(|m| !m.is_empty()),
            encoding: config.audio_encoding,
        }
    }
}

/// Map an SDK failure to a provider failure
fn sdk_error(err: &SdkError<SynthesizeSpeechError>) -> Error {
    let message = if matches!(err, SdkError::TimeoutError(_)) {
        "request timed out".to_string()
    } else {
        err.message()
            .map_or_else(|| DisplayErrorContext(err).to_string(), ToString::to_string)
    };

    Error::ProviderFailure {
        provider: PROVIDER,
        status: err.raw_response().map(|r| r.status().as_u16()),
        message,
    }
}

#[async_trait]
impl SpeechProvider for PollySpeech {
    async fn synthesize(&self, text: &str) -> Result<AudioPayload> {
        let (format, encoding) = output_format(self.encoding);

        let output = self
            .client
            .synthesize_speech()
            .text(text)
            .voice_id(VoiceId::from(self.voice_id.as_str()))
            .language_code(LanguageCode::from(self.language_code.as_str()))
            .set_engine(self.engine.as_deref().map(Engine::from))
            .output_format(format)
            .send()
            .await
            .map_err(|e| sdk_error(&e))?;

        let audio = output
            .audio_stream
            .collect()
            .await
            .map_err(|e| Error::ProviderFailure {
                provider: PROVIDER,
                status: None,
                message: format!("failed to read audio stream: {e}"),
            })?
            .into_bytes();

        tracing::debug!(
            voice = %self.voice_id,
            bytes = audio.len(),
            "polly synthesis complete"
        );

        Ok(AudioPayload::from_bytes(&audio, encoding))
    }

    fn name(&self) -> &'static str {
        PROVIDER
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_region_is_unconfigured() {
        let config = TtsConfig {
            aws_access_key_id: Some(SecretString::from("AKIDEXAMPLE")),
            aws_secret_access_key: Some(SecretString::from("secret")),
            ..TtsConfig::default()
        };
        let err = PollyCredentials::from_config(&config).err().unwrap();
        assert!(matches!(err, Error::ProviderUnconfigured("aws-polly")));
    }

    #[test]
    fn test_default_voice_follows_language() {
        assert_eq!(default_voice("es-ES"), "Lucia");
        assert_eq!(default_voice("es-MX"), "Mia");
        assert_eq!(default_voice("pt-BR"), "Lucia");
    }

    #[test]
    fn test_linear16_served_as_mp3() {
        assert_eq!(
            output_format(AudioEncoding::Linear16),
            (OutputFormat::Mp3, AudioEncoding::Mp3)
        );
        assert_eq!(
            output_format(AudioEncoding::OggOpus),
            (OutputFormat::OggVorbis, AudioEncoding::OggOpus)
        );
    }
}
