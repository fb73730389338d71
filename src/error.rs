//! Error types for Sofia gateway

use thiserror::Error;

/// Result type alias for Sofia operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in Sofia gateway
#[derive(Debug, Error)]
pub enum Error {
    /// Empty or missing required request field
    #[error("invalid request: {0}")]
    InvalidRequest(&'static str),

    /// Speech provider credentials are absent
    #[error("{0} is not configured")]
    ProviderUnconfigured(&'static str),

    /// Speech provider returned an error status or the call failed in transit
    #[error("{provider} error{}: {message}", .status.map_or_else(String::new, |s| format!(" {s}")))]
    ProviderFailure {
        provider: &'static str,
        status: Option<u16>,
        message: String,
    },

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Routing profile not found
    #[error("profile not found: {0}")]
    ProfileNotFound(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Short machine-readable label used in logs
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "invalid_request",
            Self::ProviderUnconfigured(_) => "provider_unconfigured",
            Self::ProviderFailure { .. } => "provider_failure",
            Self::Config(_)
            | Self::ProfileNotFound(_)
            | Self::Io(_)
            | Self::Serialization(_)
            | Self::Toml(_) => "unhandled",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_failure_display_with_status() {
        let err = Error::ProviderFailure {
            provider: "google-tts",
            status: Some(403),
            message: "API key not valid".to_string(),
        };
        assert_eq!(err.to_string(), "google-tts error 403: API key not valid");
        assert_eq!(err.kind(), "provider_failure");
    }

    #[test]
    fn test_provider_failure_display_without_status() {
        let err = Error::ProviderFailure {
            provider: "elevenlabs",
            status: None,
            message: "connection refused".to_string(),
        };
        assert_eq!(err.to_string(), "elevenlabs error: connection refused");
    }

    #[test]
    fn test_unconfigured_is_distinct_from_failure() {
        let err = Error::ProviderUnconfigured("google-tts");
        assert_eq!(err.kind(), "provider_unconfigured");
        assert_eq!(err.to_string(), "google-tts is not configured");
    }
}
