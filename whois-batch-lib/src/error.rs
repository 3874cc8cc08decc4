//! Error handling for batch WHOIS runs.
//!
//! Only setup problems, export failures and cancellation surface as errors.
//! Anything that goes wrong for an individual domain is turned into a
//! [`Verdict`](crate::Verdict) by the classifier instead.

use std::fmt;

/// Main error type for whois-batch operations.
#[derive(Debug, Clone)]
pub enum WhoisBatchError {
    /// Configuration errors (missing suffixes, invalid thread count, bad config file, etc.)
    ConfigError { message: String },

    /// File I/O errors when reading the name list or config files
    FileError { path: String, message: String },

    /// Failure while writing one of the export files
    ExportError { path: String, message: String },

    /// The run was interrupted before every work item completed
    Cancelled { completed: usize, total: usize },

    /// Generic internal errors that don't fit other categories
    Internal { message: String },
}

impl WhoisBatchError {
    /// Create a new configuration error.
    pub fn config<M: Into<String>>(message: M) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create a new file error.
    pub fn file_error<P: Into<String>, M: Into<String>>(path: P, message: M) -> Self {
        Self::FileError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a new export error.
    pub fn export<P: Into<String>, M: Into<String>>(path: P, message: M) -> Self {
        Self::ExportError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a new cancellation error.
    pub fn cancelled(completed: usize, total: usize) -> Self {
        Self::Cancelled { completed, total }
    }

    /// Create a new internal error.
    pub fn internal<M: Into<String>>(message: M) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether this error is the result of a user interrupt.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// Whether this error happened before any work was started.
    ///
    /// The CLI prints a usage hint for these.
    pub fn is_setup_error(&self) -> bool {
        matches!(self, Self::ConfigError { .. } | Self::FileError { .. })
    }
}

impl fmt::Display for WhoisBatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigError { message } => {
                write!(f, "Configuration error: {}", message)
            }
            Self::FileError { path, message } => {
                write!(f, "File error at '{}': {}", path, message)
            }
            Self::ExportError { path, message } => {
                write!(f, "Export to '{}' failed: {}", path, message)
            }
            Self::Cancelled { completed, total } => {
                write!(f, "Interrupted by user after {} of {} checks", completed, total)
            }
            Self::Internal { message } => {
                write!(f, "Internal error: {}", message)
            }
        }
    }
}

impl std::error::Error for WhoisBatchError {}

impl From<std::io::Error> for WhoisBatchError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal {
            message: format!("I/O error: {}", err),
        }
    }
}

impl From<serde_json::Error> for WhoisBatchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal {
            message: format!("JSON serialization failed: {}", err),
        }
    }
}

impl From<toml::de::Error> for WhoisBatchError {
    fn from(err: toml::de::Error) -> Self {
        Self::ConfigError {
            message: format!("Failed to parse TOML configuration: {}", err),
        }
    }
}
