//! Error types for personabot.

/// Top-level error type for the bot.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),

    #[error("Format error: {0}")]
    Format(#[from] FormatError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required configuration: {key}. {hint}")]
    MissingRequired { key: String, hint: String },

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from the personality-analysis service.
///
/// `Service` carries only the status code and message the service returned,
/// so callers cannot tell quota exhaustion apart from malformed input.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("Analysis service returned {code}: {message}")]
    Service { code: u16, message: String },

    #[error("Analysis request failed: {0}")]
    RequestFailed(String),

    #[error("Analysis authentication failed: {reason}")]
    AuthFailed { reason: String },

    #[error("Invalid response from analysis service: {reason}")]
    InvalidResponse { reason: String },
}

impl AnalysisError {
    /// Status code to report for this fault; transport-level faults have none.
    pub fn code(&self) -> Option<u16> {
        match self {
            Self::Service { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// Errors from the social platform (inbox, user content, replies).
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("Platform API error {code}: {message}")]
    Api { code: String, message: String },

    #[error("Platform request failed: {0}")]
    RequestFailed(String),

    #[error("Platform authentication failed: {reason}")]
    AuthFailed { reason: String },

    #[error("Invalid response from platform: {reason}")]
    InvalidResponse { reason: String },
}

/// Errors raised while turning an analysis into narrative text.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FormatError {
    #[error("Need at least 3 {section} to rank, found {found}")]
    InsufficientEntries { section: &'static str, found: usize },

    #[error("No phrase for '{id}' in the {table} table")]
    MissingPhrase { table: &'static str, id: String },
}

/// Result type alias for the bot.
pub type Result<T> = std::result::Result<T, Error>;
