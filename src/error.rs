//! # Error Handling
//!
//! One error type, [`StudioError`], covers every failure the studio can hit. Each
//! variant carries an [`ErrorContext`] with a timestamp, severity and an optional
//! recovery suggestion that front-ends can show verbatim.
//!
//! ## Error Classes
//!
//! - Remote failures (`Remote`, `Network`, `MissingCredentials`): shown inline, the
//!   user may retry
//! - Storage tier failures (`Storage`, `QuotaExceeded`): absorbed by the tier chain,
//!   which falls through to the next tier
//! - Codec failures (`Codec`): absorbed by compression, which returns its input
//! - Input problems (`Validation`, `Config`)
//!
//! None of these end a session.
//!
//! ## Usage
//!
//! ```rust
//! use try_on_studio::error::{StudioError, Retryable, HasRecoverySuggestion};
//!
//! let error = StudioError::remote("gemini", "no candidates returned")
//!     .with_recovery_suggestion("Try a different photo or prompt");
//!
//! assert!(error.is_retryable());
//! assert_eq!(error.recovery_suggestion(), Some("Try a different photo or prompt"));
//! ```

use std::{error::Error as StdError, fmt, time::SystemTime};

use crate::storage::TierKind;

/// Severity levels for errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// The user can fix the cause and retry in place
    Warning,
    /// The operation failed but the session continues
    Error,
}

/// Metadata about when and where an error occurred
#[derive(Debug, Clone)]
pub struct ErrorContext {
    /// When the error occurred
    pub timestamp: SystemTime,
    /// The operation being performed when the error occurred
    pub operation: Option<String>,
    /// Additional context about the error
    pub context: Option<String>,
    /// Suggested recovery action
    pub recovery_suggestion: Option<String>,
    /// Error severity level
    pub severity: ErrorSeverity,
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self {
            timestamp: SystemTime::now(),
            operation: None,
            context: None,
            recovery_suggestion: None,
            severity: ErrorSeverity::Error,
        }
    }
}

impl ErrorContext {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Base error type for the studio
#[derive(Debug)]
pub enum StudioError {
    /// Configuration validation errors
    Config {
        field: String,
        value: String,
        reason: String,
        context: ErrorContext,
    },
    /// A storage tier could not read or write
    Storage {
        tier: TierKind,
        operation: String,
        reason: String,
        context: ErrorContext,
    },
    /// A string tier refused a write because it would exceed its quota
    QuotaExceeded {
        tier: TierKind,
        needed: usize,
        limit: usize,
        context: ErrorContext,
    },
    /// Image decode/encode failures
    Codec {
        operation: String,
        reason: String,
        context: ErrorContext,
    },
    /// A remote service answered with an error
    Remote {
        service: String,
        reason: String,
        context: ErrorContext,
    },
    /// A remote service has no API key configured
    MissingCredentials {
        service: String,
        env_var: String,
        context: ErrorContext,
    },
    /// Transport-level failures talking to a remote service
    Network {
        operation: String,
        source: Option<Box<dyn StdError + Send + Sync>>,
        context: ErrorContext,
    },
    /// I/O errors
    Io {
        operation: String,
        path: Option<String>,
        source: std::io::Error,
        context: ErrorContext,
    },
    /// Validation errors on user input
    Validation {
        field: String,
        constraint: String,
        value: String,
        context: ErrorContext,
    },
    /// External library errors
    External {
        library: String,
        source: Box<dyn StdError + Send + Sync>,
        context: ErrorContext,
    },
}

impl StudioError {
    /// Create a configuration error
    pub fn config(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Config {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
            context: ErrorContext::new(),
        }
    }

    /// Create a storage tier error
    pub fn storage(tier: TierKind, operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Storage {
            tier,
            operation: operation.into(),
            reason: reason.into(),
            context: ErrorContext::new(),
        }
    }

    /// Create a quota error
    pub fn quota_exceeded(tier: TierKind, needed: usize, limit: usize) -> Self {
        Self::QuotaExceeded {
            tier,
            needed,
            limit,
            context: ErrorContext::new(),
        }
    }

    /// Create a codec error
    pub fn codec(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Codec {
            operation: operation.into(),
            reason: reason.into(),
            context: ErrorContext::new(),
        }
    }

    /// Create a remote service error
    pub fn remote(service: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Remote {
            service: service.into(),
            reason: reason.into(),
            context: ErrorContext::new(),
        }
    }

    /// Create a missing credentials error
    pub fn missing_credentials(service: impl Into<String>, env_var: impl Into<String>) -> Self {
        let env_var = env_var.into();
        Self::MissingCredentials {
            service: service.into(),
            context: ErrorContext {
                recovery_suggestion: Some(format!("Set {} and restart", env_var)),
                ..ErrorContext::new()
            },
            env_var,
        }
    }

    /// Create a network error
    pub fn network(
        operation: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::Network {
            operation: operation.into(),
            source: Some(Box::new(source)),
            context: ErrorContext::new(),
        }
    }

    /// Create an I/O error
    pub fn io(operation: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            path: None,
            source,
            context: ErrorContext::new(),
        }
    }

    /// Create an I/O error tied to a path
    pub fn io_at(
        operation: impl Into<String>,
        path: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        Self::Io {
            operation: operation.into(),
            path: Some(path.into()),
            source,
            context: ErrorContext::new(),
        }
    }

    /// Create a validation error
    pub fn validation(
        field: impl Into<String>,
        constraint: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::Validation {
            field: field.into(),
            constraint: constraint.into(),
            value: value.into(),
            context: ErrorContext::new(),
        }
    }

    /// Create an external library error
    pub fn external(
        library: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::External {
            library: library.into(),
            source: Box::new(source),
            context: ErrorContext::new(),
        }
    }

    /// Add context to the error
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context_mut().context = Some(context.into());
        self
    }

    /// Add operation context
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.context_mut().operation = Some(operation.into());
        self
    }

    /// Add recovery suggestion
    pub fn with_recovery_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.context_mut().recovery_suggestion = Some(suggestion.into());
        self
    }

    /// Set severity
    pub fn with_severity(mut self, severity: ErrorSeverity) -> Self {
        self.context_mut().severity = severity;
        self
    }

    /// Get the error context
    pub fn context(&self) -> &ErrorContext {
        match self {
            Self::Config { context, .. } => context,
            Self::Storage { context, .. } => context,
            Self::QuotaExceeded { context, .. } => context,
            Self::Codec { context, .. } => context,
            Self::Remote { context, .. } => context,
            Self::MissingCredentials { context, .. } => context,
            Self::Network { context, .. } => context,
            Self::Io { context, .. } => context,
            Self::Validation { context, .. } => context,
            Self::External { context, .. } => context,
        }
    }

    fn context_mut(&mut self) -> &mut ErrorContext {
        match self {
            Self::Config { context, .. } => context,
            Self::Storage { context, .. } => context,
            Self::QuotaExceeded { context, .. } => context,
            Self::Codec { context, .. } => context,
            Self::Remote { context, .. } => context,
            Self::MissingCredentials { context, .. } => context,
            Self::Network { context, .. } => context,
            Self::Io { context, .. } => context,
            Self::Validation { context, .. } => context,
            Self::External { context, .. } => context,
        }
    }

    /// Get the error category as a string
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config { .. } => "config",
            Self::Storage { .. } => "storage",
            Self::QuotaExceeded { .. } => "quota",
            Self::Codec { .. } => "codec",
            Self::Remote { .. } => "remote",
            Self::MissingCredentials { .. } => "credentials",
            Self::Network { .. } => "network",
            Self::Io { .. } => "io",
            Self::Validation { .. } => "validation",
            Self::External { .. } => "external",
        }
    }
}

impl fmt::Display for StudioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StudioError::Config {
                field,
                value,
                reason,
                ..
            } => {
                write!(
                    f,
                    "Configuration error in '{}': {} (value: {})",
                    field, reason, value
                )
            }
            StudioError::Storage {
                tier,
                operation,
                reason,
                ..
            } => {
                write!(f, "{} storage failed during {}: {}", tier, operation, reason)
            }
            StudioError::QuotaExceeded {
                tier,
                needed,
                limit,
                ..
            } => {
                write!(
                    f,
                    "{} storage quota exceeded: {} bytes needed, limit is {}",
                    tier, needed, limit
                )
            }
            StudioError::Codec {
                operation, reason, ..
            } => {
                write!(f, "Image {} failed: {}", operation, reason)
            }
            StudioError::Remote {
                service, reason, ..
            } => {
                write!(f, "{} request failed: {}", service, reason)
            }
            StudioError::MissingCredentials {
                service, env_var, ..
            } => {
                write!(f, "Missing {} API key. Set {}.", service, env_var)
            }
            StudioError::Network {
                operation, source, ..
            } => match source {
                Some(source) => write!(f, "Network error during {}: {}", operation, source),
                None => write!(f, "Network error during {}", operation),
            },
            StudioError::Io {
                operation,
                path,
                source,
                ..
            } => {
                if let Some(path) = path {
                    write!(
                        f,
                        "I/O error during {} on '{}': {}",
                        operation, path, source
                    )
                } else {
                    write!(f, "I/O error during {}: {}", operation, source)
                }
            }
            StudioError::Validation {
                field,
                constraint,
                value,
                ..
            } => {
                write!(
                    f,
                    "Validation failed for '{}': {} (value: {})",
                    field, constraint, value
                )
            }
            StudioError::External {
                library, source, ..
            } => {
                write!(f, "External library error in {}: {}", library, source)
            }
        }
    }
}

impl StdError for StudioError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::External { source, .. } => Some(source.as_ref()),
            Self::Network {
                source: Some(source),
                ..
            } => Some(source.as_ref()),
            _ => None,
        }
    }
}

/// Result type alias using our custom error type
pub type StudioResult<T> = Result<T, StudioError>;

/// Errors the user can sensibly retry by hand. The library itself never retries.
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

impl Retryable for StudioError {
    fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Remote { .. } | Self::Network { .. } | Self::Io { .. }
        )
    }
}

/// Trait for errors with severity levels
pub trait HasSeverity {
    fn severity(&self) -> ErrorSeverity;
}

impl HasSeverity for StudioError {
    fn severity(&self) -> ErrorSeverity {
        self.context().severity
    }
}

/// Trait for errors that provide recovery suggestions
pub trait HasRecoverySuggestion {
    fn recovery_suggestion(&self) -> Option<&str>;
}

impl HasRecoverySuggestion for StudioError {
    fn recovery_suggestion(&self) -> Option<&str> {
        self.context().recovery_suggestion.as_deref()
    }
}

impl From<std::io::Error> for StudioError {
    fn from(error: std::io::Error) -> Self {
        Self::io("unknown", error)
    }
}

impl From<serde_json::Error> for StudioError {
    fn from(error: serde_json::Error) -> Self {
        Self::external("serde_json", error)
    }
}

impl From<base64::DecodeError> for StudioError {
    fn from(error: base64::DecodeError) -> Self {
        Self::codec("base64 decode", error.to_string())
    }
}

impl From<image::ImageError> for StudioError {
    fn from(error: image::ImageError) -> Self {
        Self::codec("transcode", error.to_string())
    }
}

impl From<tryon_scale::cpu::ScaleError> for StudioError {
    fn from(error: tryon_scale::cpu::ScaleError) -> Self {
        Self::codec("resize", error.to_string())
    }
}

impl From<reqwest::Error> for StudioError {
    fn from(error: reqwest::Error) -> Self {
        let operation = match error.url() {
            Some(url) => format!("request to {}", url.host_str().unwrap_or("remote")),
            None => "request".to_string(),
        };
        Self::network(operation, error)
    }
}
