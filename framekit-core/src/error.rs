//! Error types for framekit
//!
//! Decoders never surface errors through this type: open, seek and read
//! outcomes are reported as `bool` / `Option`. `VideoError` covers the
//! session boundary (total open failure), configuration and source
//! resolution.

use thiserror::Error;

/// Main error type for framekit operations
#[derive(Error, Debug)]
pub enum VideoError {
    /// Neither backend could open the source
    #[error("Cannot open decoder for source {source_uri}: {reason}")]
    OpenFailed {
        /// Resolved source the decoder was built for
        source_uri: String,
        /// Reason for the failure
        reason: String,
    },

    /// Invalid configuration provided
    #[error("Invalid configuration: {message}")]
    InvalidConfiguration {
        /// Error message
        message: String,
    },

    /// Decoder kind exists but is not available in this build
    #[error("Decoder '{kind}' is not supported in current build")]
    UnsupportedDecoder {
        /// Decoder kind name
        kind: String,
    },

    /// No constructor registered for a backend the selected decoder needs
    #[error("Backend '{backend}' is not registered")]
    BackendNotRegistered {
        /// Backend name
        backend: String,
    },

    /// Local source does not exist
    #[error("Video file does not exist: {path}")]
    SourceNotFound {
        /// Path that was looked up
        path: String,
    },

    /// Source scheme is known but not supported
    #[error("Unsupported source: {scheme}")]
    UnsupportedSource {
        /// Scheme or source kind
        scheme: String,
    },

    /// Unknown decoder name in configuration
    #[error("Unknown decoder: {name}")]
    UnknownDecoder {
        /// Name that failed to parse
        name: String,
    },

    /// I/O operation failed
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error
        #[from]
        source: std::io::Error,
    },

    /// Configuration document could not be parsed
    #[error("Configuration parse error: {source}")]
    Json {
        /// Underlying parse error
        #[from]
        source: serde_json::Error,
    },
}

/// Result type alias for framekit operations
pub type VideoResult<T> = Result<T, VideoError>;

impl VideoError {
    /// Get error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            VideoError::OpenFailed { .. } => "OPEN_FAILED",
            VideoError::InvalidConfiguration { .. } => "INVALID_CONFIGURATION",
            VideoError::UnsupportedDecoder { .. } => "UNSUPPORTED_DECODER",
            VideoError::BackendNotRegistered { .. } => "BACKEND_NOT_REGISTERED",
            VideoError::SourceNotFound { .. } => "SOURCE_NOT_FOUND",
            VideoError::UnsupportedSource { .. } => "UNSUPPORTED_SOURCE",
            VideoError::UnknownDecoder { .. } => "UNKNOWN_DECODER",
            VideoError::Io { .. } => "IO_ERROR",
            VideoError::Json { .. } => "CONFIG_PARSE_ERROR",
        }
    }

    /// Check if error is recoverable
    ///
    /// An open failure may succeed on retry (a stream that was not yet
    /// live, a file still being written); configuration mistakes won't.
    pub fn is_recoverable(&self) -> bool {
        match self {
            VideoError::OpenFailed { .. } => true,
            VideoError::Io { .. } => true,
            VideoError::SourceNotFound { .. } => false,
            VideoError::InvalidConfiguration { .. } => false,
            VideoError::UnsupportedDecoder { .. } => false,
            VideoError::BackendNotRegistered { .. } => false,
            _ => false,
        }
    }

    /// Get error category
    pub fn category(&self) -> ErrorCategory {
        match self {
            VideoError::OpenFailed { .. } => ErrorCategory::Decoder,
            VideoError::InvalidConfiguration { .. } => ErrorCategory::Configuration,
            VideoError::UnsupportedDecoder { .. } => ErrorCategory::Configuration,
            VideoError::BackendNotRegistered { .. } => ErrorCategory::Configuration,
            VideoError::UnknownDecoder { .. } => ErrorCategory::Configuration,
            VideoError::Json { .. } => ErrorCategory::Configuration,
            VideoError::SourceNotFound { .. } => ErrorCategory::Source,
            VideoError::UnsupportedSource { .. } => ErrorCategory::Source,
            VideoError::Io { .. } => ErrorCategory::System,
        }
    }
}

/// Error categories for classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// System-level errors (I/O, permissions, etc.)
    System,
    /// Configuration and parameter errors
    Configuration,
    /// Source location and resolution errors
    Source,
    /// Backend open failures
    Decoder,
}
