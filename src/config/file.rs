//! TOML configuration file loading
//!
//! Supports `~/.config/sofia/config.toml` (or `$SOFIA_CONFIG`) as a
//! persistent config source. All fields are optional; the file is a partial
//! overlay on top of defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct SofiaConfigFile {
    /// Routing profile: embedded id or path to a profile file
    #[serde(default)]
    pub profile: Option<String>,

    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerFileConfig,

    /// Text-to-speech configuration
    #[serde(default)]
    pub tts: TtsFileConfig,
}

/// HTTP server configuration
#[derive(Debug, Default, Deserialize)]
pub struct ServerFileConfig {
    /// Port to listen on
    pub port: Option<u16>,

    /// Directory holding the widget page
    pub static_dir: Option<String>,

    /// Global request limit per minute
    pub rate_limit_per_minute: Option<u32>,
}

/// Text-to-speech configuration
#[derive(Debug, Default, Deserialize)]
pub struct TtsFileConfig {
    /// "google", "elevenlabs" or "polly"
    pub provider: Option<String>,
    pub google_api_key: Option<String>,
    pub elevenlabs_api_key: Option<String>,
    pub aws_access_key_id: Option<String>,
    pub aws_secret_access_key: Option<String>,
    pub aws_region: Option<String>,
    /// BCP-47 language code (e.g. "es-ES")
    pub language_code: Option<String>,
    /// Provider voice name or id
    pub voice: Option<String>,
    /// Provider model (ElevenLabs) or engine (Polly)
    pub model: Option<String>,
    /// "MP3", "OGG_OPUS" or "LINEAR16"
    pub audio_encoding: Option<String>,
    pub speaking_rate: Option<f64>,
    pub timeout_secs: Option<u64>,
    /// Override the provider endpoint
    pub base_url: Option<String>,
}

/// Load the TOML config file from the standard path
///
/// Returns `SofiaConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_config_file() -> SofiaConfigFile {
    let Some(path) = config_file_path() else {
        return SofiaConfigFile::default();
    };

    load_from(&path)
}

/// Load a config file from an explicit path, with the same fallbacks
pub fn load_from(path: &Path) -> SofiaConfigFile {
    if !path.exists() {
        return SofiaConfigFile::default();
    }

    match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                SofiaConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            SofiaConfigFile::default()
        }
    }
}

/// Return the config file path: `$SOFIA_CONFIG` or `~/.config/sofia/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("SOFIA_CONFIG") {
        return Some(PathBuf::from(path));
    }

    directories::BaseDirs::new().map(|d| d.config_dir().join("sofia").join("config.toml"))
}
