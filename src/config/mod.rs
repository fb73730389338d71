//! Configuration management for Sofia gateway
//!
//! Values come from the environment first, then the optional TOML file, then
//! defaults. The result is built once at startup and passed down explicitly.

pub mod file;

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use crate::intent::DEFAULT_PROFILE_ID;
use crate::speech::AudioEncoding;
use crate::{Error, Result};

use file::SofiaConfigFile;

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 5000;

/// Default TTS request timeout
pub const DEFAULT_TTS_TIMEOUT: Duration = Duration::from_secs(15);

/// Default synthesis language
pub const DEFAULT_LANGUAGE: &str = "es-ES";

/// Google voice used with the default language when none is configured
pub const DEFAULT_GOOGLE_VOICE: &str = "es-ES-Standard-A";

/// Sofia gateway configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Routing profile reference (embedded id or file path)
    pub profile: String,

    /// HTTP server configuration
    pub server: ServerConfig,

    /// Text-to-speech configuration
    pub tts: TtsConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to listen on
    pub port: u16,

    /// Directory with the widget page; the embedded page is served otherwise
    pub static_dir: Option<PathBuf>,

    /// Global requests per minute, unlimited when unset
    pub rate_limit_per_minute: Option<u32>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            static_dir: None,
            rate_limit_per_minute: None,
        }
    }
}

/// Which TTS service to call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TtsProviderKind {
    #[default]
    Google,
    ElevenLabs,
    Polly,
}

impl std::str::FromStr for TtsProviderKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "google" | "google-tts" | "gcp" => Ok(Self::Google),
            "elevenlabs" | "eleven" => Ok(Self::ElevenLabs),
            "polly" | "aws-polly" | "aws" => Ok(Self::Polly),
            other => Err(Error::Config(format!("unknown TTS provider: {other}"))),
        }
    }
}

/// Text-to-speech configuration, passed through verbatim to the provider
#[derive(Debug, Clone)]
pub struct TtsConfig {
    pub provider: TtsProviderKind,

    /// Google Cloud API key (from `GOOGLE_TTS_API_KEY`)
    pub google_api_key: Option<SecretString>,

    /// `ElevenLabs` API key (from `ELEVENLABS_API_KEY`)
    pub elevenlabs_api_key: Option<SecretString>,

    /// AWS credentials for Polly (from the standard `AWS_*` variables)
    pub aws_access_key_id: Option<SecretString>,
    pub aws_secret_access_key: Option<SecretString>,
    pub aws_session_token: Option<SecretString>,
    pub aws_region: Option<String>,

    /// Language code (Google and Polly)
    pub language_code: String,

    /// Voice name (Google), voice id (`ElevenLabs`, Polly)
    pub voice: Option<String>,

    /// Model id (`ElevenLabs`) or engine (Polly: `standard`, `neural`)
    pub model: Option<String>,

    pub audio_encoding: AudioEncoding,

    /// Speaking rate multiplier (Google only)
    pub speaking_rate: f64,

    /// Per-request timeout
    pub timeout: Duration,

    /// Endpoint override
    pub base_url: Option<String>,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            provider: TtsProviderKind::default(),
            google_api_key: None,
            elevenlabs_api_key: None,
            aws_access_key_id: None,
            aws_secret_access_key: None,
            aws_session_token: None,
            aws_region: None,
            language_code: DEFAULT_LANGUAGE.to_string(),
            voice: Some(DEFAULT_GOOGLE_VOICE.to_string()),
            model: None,
            audio_encoding: AudioEncoding::Mp3,
            speaking_rate: 1.0,
            timeout: DEFAULT_TTS_TIMEOUT,
            base_url: None,
        }
    }
}

impl TtsConfig {
    /// Whether the selected provider has credentials
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        match self.provider {
            TtsProviderKind::Google => self.google_api_key.is_some(),
            TtsProviderKind::ElevenLabs => self.elevenlabs_api_key.is_some(),
            TtsProviderKind::Polly => {
                self.aws_access_key_id.is_some()
                    && self.aws_secret_access_key.is_some()
                    && self.aws_region.is_some()
            }
        }
    }
}

impl Config {
    /// Load configuration from the environment and the config file
    ///
    /// # Errors
    ///
    /// Returns error if a value is present but invalid
    pub fn load() -> Result<Self> {
        let fc = file::load_config_file();
        Self::from_sources(fc, |key| std::env::var(key).ok())
    }

    /// Build configuration from a parsed config file and an environment lookup
    ///
    /// # Errors
    ///
    /// Returns error if a value is present but invalid
    pub fn from_sources<F>(fc: SofiaConfigFile, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Treat empty variables as unset
        let var = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let profile = var("SOFIA_PROFILE")
            .or(fc.profile)
            .unwrap_or_else(|| DEFAULT_PROFILE_ID.to_string());

        // Server config (env > toml > default)
        let server = ServerConfig {
            port: match ["SOFIA_PORT", "PORT"]
                .into_iter()
                .find_map(|key| var(key).map(|value| (key, value)))
            {
                Some((key, port)) => parse(key, &port)?,
                None => fc.server.port.unwrap_or(DEFAULT_PORT),
            },
            static_dir: var("SOFIA_STATIC_DIR")
                .or(fc.server.static_dir)
                .map(PathBuf::from),
            rate_limit_per_minute: match var("SOFIA_RATE_LIMIT") {
                Some(limit) => Some(parse("SOFIA_RATE_LIMIT", &limit)?),
                None => fc.server.rate_limit_per_minute,
            },
        };

        // TTS config (env > toml > default)
        let defaults = TtsConfig::default();
        let tts_file = fc.tts;
        let provider = var("SOFIA_TTS_PROVIDER")
            .or(tts_file.provider)
            .map(|p| p.parse::<TtsProviderKind>())
            .transpose()?
            .unwrap_or(defaults.provider);

        let audio_encoding = var("SOFIA_TTS_ENCODING")
            .or(tts_file.audio_encoding)
            .map(|e| e.parse::<AudioEncoding>())
            .transpose()?
            .unwrap_or(defaults.audio_encoding);

        let speaking_rate = match var("SOFIA_TTS_RATE") {
            Some(rate) => parse("SOFIA_TTS_RATE", &rate)?,
            None => tts_file.speaking_rate.unwrap_or(defaults.speaking_rate),
        };

        let timeout = match var("SOFIA_TTS_TIMEOUT") {
            Some(secs) => Duration::from_secs(parse("SOFIA_TTS_TIMEOUT", &secs)?),
            None => tts_file
                .timeout_secs
                .map_or(defaults.timeout, Duration::from_secs),
        };

        let language_code = var("SOFIA_TTS_LANGUAGE")
            .or(tts_file.language_code)
            .unwrap_or(defaults.language_code);

        let tts = TtsConfig {
            provider,
            google_api_key: var("GOOGLE_TTS_API_KEY")
                .or_else(|| var("GOOGLE_API_KEY"))
                .or(tts_file.google_api_key)
                .map(SecretString::from),
            elevenlabs_api_key: var("ELEVENLABS_API_KEY")
                .or(tts_file.elevenlabs_api_key)
                .map(SecretString::from),
            aws_access_key_id: var("AWS_ACCESS_KEY_ID")
                .or(tts_file.aws_access_key_id)
                .map(SecretString::from),
            aws_secret_access_key: var("AWS_SECRET_ACCESS_KEY")
                .or(tts_file.aws_secret_access_key)
                .map(SecretString::from),
            aws_session_token: var("AWS_SESSION_TOKEN").map(SecretString::from),
            aws_region: var("AWS_REGION")
                .or_else(|| var("AWS_DEFAULT_REGION"))
                .or(tts_file.aws_region),
            voice: var("SOFIA_TTS_VOICE")
                .or(tts_file.voice)
                .or_else(|| default_voice(provider, &language_code)),
            language_code,
            model: var("SOFIA_TTS_MODEL").or(tts_file.model),
            audio_encoding,
            speaking_rate,
            timeout,
            base_url: var("SOFIA_TTS_BASE_URL").or(tts_file.base_url),
        };

        if !tts.is_configured() {
            tracing::warn!(
                provider = ?tts.provider,
                "TTS credentials not configured - /api/speak will fail"
            );
        }

        Ok(Self {
            profile,
            server,
            tts,
        })
    }
}

/// Voice filled in when none is configured
///
/// Only the Google default language gets one; otherwise the provider picks a
/// voice for the language on its own.
fn default_voice(provider: TtsProviderKind, language_code: &str) -> Option<String> {
    (provider == TtsProviderKind::Google && language_code == DEFAULT_LANGUAGE)
        .then(|| DEFAULT_GOOGLE_VOICE.to_string())
}

fn parse<T>(key: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| Error::Config(format!("invalid {key} '{value}': {e}")))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_sources(SofiaConfigFile::default(), env(&[])).unwrap();
        assert_eq!(config.profile, "academia");
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert!(config.server.static_dir.is_none());
        assert_eq!(config.tts.provider, TtsProviderKind::Google);
        assert_eq!(config.tts.language_code, "es-ES");
        assert_eq!(config.tts.timeout, DEFAULT_TTS_TIMEOUT);
        assert!(!config.tts.is_configured());
    }

    #[test]
    fn test_env_overrides_file() {
        let mut fc = SofiaConfigFile::default();
        fc.profile = Some("soporte".to_string());
        fc.server.port = Some(9000);
        fc.tts.language_code = Some("es-MX".to_string());

        let config = Config::from_sources(
            fc,
            env(&[
                ("SOFIA_PORT", "8080"),
                ("GOOGLE_TTS_API_KEY", "secret-key"),
            ]),
        )
        .unwrap();

        assert_eq!(config.profile, "soporte");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.tts.language_code, "es-MX");
        assert_eq!(
            config.tts.google_api_key.as_ref().unwrap().expose_secret(),
            "secret-key"
        );
        assert!(config.tts.is_configured());
    }

    #[test]
    fn test_empty_env_is_unset() {
        let config =
            Config::from_sources(SofiaConfigFile::default(), env(&[("GOOGLE_TTS_API_KEY", "")]))
                .unwrap();
        assert!(config.tts.google_api_key.is_none());
    }

    #[test]
    fn test_elevenlabs_has_no_default_voice() {
        let config = Config::from_sources(
            SofiaConfigFile::default(),
            env(&[("SOFIA_TTS_PROVIDER", "elevenlabs"), ("ELEVENLABS_API_KEY", "k")]),
        )
        .unwrap();
        assert_eq!(config.tts.provider, TtsProviderKind::ElevenLabs);
        assert!(config.tts.voice.is_none());
        assert!(config.tts.is_configured());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = Config::from_sources(SofiaConfigFile::default(), env(&[("SOFIA_PORT", "abc")]))
            .unwrap_err();
        assert!(err.to_string().contains("SOFIA_PORT"));

        let err = Config::from_sources(
            SofiaConfigFile::default(),
            env(&[("SOFIA_TTS_PROVIDER", "watson")]),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_port_error_names_source_variable() {
        let err = Config::from_sources(SofiaConfigFile::default(), env(&[("PORT", "http")]))
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("invalid PORT"), "{message}");
        assert!(!message.contains("SOFIA_PORT"), "{message}");

        let config =
            Config::from_sources(SofiaConfigFile::default(), env(&[("PORT", "7000")])).unwrap();
        assert_eq!(config.server.port, 7000);
    }

    #[test]
    fn test_language_override_drops_default_voice() {
        let config = Config::from_sources(
            SofiaConfigFile::default(),
            env(&[("SOFIA_TTS_LANGUAGE", "es-MX")]),
        )
        .unwrap();
        assert_eq!(config.tts.language_code, "es-MX");
        assert!(config.tts.voice.is_none());

        let config = Config::from_sources(
            SofiaConfigFile::default(),
            env(&[("SOFIA_TTS_LANGUAGE", "en-US"), ("SOFIA_TTS_VOICE", "en-US-Neural2-C")]),
        )
        .unwrap();
        assert_eq!(config.tts.voice.as_deref(), Some("en-US-Neural2-C"));

        let config = Config::from_sources(SofiaConfigFile::default(), env(&[])).unwrap();
        assert_eq!(config.tts.voice.as_deref(), Some(DEFAULT_GOOGLE_VOICE));
    }

    #[test]
    fn test_polly_needs_keys_and_region() {
        let keys = [
            ("SOFIA_TTS_PROVIDER", "polly"),
            ("AWS_ACCESS_KEY_ID", "AKIDEXAMPLE"),
            ("AWS_SECRET_ACCESS_KEY", "secret"),
        ];
        let config = Config::from_sources(SofiaConfigFile::default(), env(&keys)).unwrap();
        assert_eq!(config.tts.provider, TtsProviderKind::Polly);
        assert!(config.tts.voice.is_none());
        assert!(!config.tts.is_configured());

        let mut with_region = keys.to_vec();
        with_region.push(("AWS_DEFAULT_REGION", "eu-west-1"));
        let config = Config::from_sources(SofiaConfigFile::default(), env(&with_region)).unwrap();
        assert_eq!(config.tts.aws_region.as_deref(), Some("eu-west-1"));
        assert!(config.tts.is_configured());
    }

    #[test]
    fn test_timeout_from_file() {
        let mut fc = SofiaConfigFile::default();
        fc.tts.timeout_secs = Some(3);
        let config = Config::from_sources(fc, env(&[])).unwrap();
        assert_eq!(config.tts.timeout, Duration::from_secs(3));
    }
}
