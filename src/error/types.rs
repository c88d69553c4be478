//! Custom error types with exit codes

use thiserror::Error;

/// Main error type for tfdeclare operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DeclareError {
    /// Configuration Error - bad literal, malformed attributes or unknown input
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// A required collection input was not supplied by any source
    #[error("Missing input: you must supply '{input}' for {collection}")]
    MissingInput { collection: String, input: String },

    /// The field validator rejected a value
    #[error("Validation error: '{input}': {message}")]
    Validation { input: String, message: String },

    /// Attribute interpolation requested on a kind that never produces references
    #[error("{kind}s do not provide attribute interpolation through attribute access: '{attribute}'")]
    Interpolation { kind: String, attribute: String },

    /// Programmer Error - the framework is being extended incorrectly
    #[error("Programmer error: {message}")]
    Programmer { message: String },

    /// Hook Error - a post-build hook failed
    #[error("Hook error for '{category}': {message}")]
    Hook { category: String, message: String },

    /// Filesystem Error - file operation failed
    #[error("Filesystem error: {message}")]
    Filesystem { message: String },
}

impl DeclareError {
    /// Get the appropriate exit code for this error type
    #[must_use]
    #[inline]
    pub const fn exit_code(&self) -> i32 {
        match *self {
            Self::Configuration { .. } | Self::MissingInput { .. } | Self::Validation { .. } => 1,
            Self::Interpolation { .. } | Self::Programmer { .. } => 2,
            Self::Hook { .. } => 3,
            Self::Filesystem { .. } => 5,
        }
    }

    /// Create a configuration error
    #[inline]
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a programmer error
    #[inline]
    pub fn programmer<S: Into<String>>(message: S) -> Self {
        Self::Programmer {
            message: message.into(),
        }
    }

    /// Create a validation error for a named input
    #[inline]
    pub fn validation<N: Into<String>, S: Into<String>>(input: N, message: S) -> Self {
        Self::Validation {
            input: input.into(),
            message: message.into(),
        }
    }

    /// Create a hook error
    #[inline]
    pub fn hook<C: Into<String>, S: Into<String>>(category: C, message: S) -> Self {
        Self::Hook {
            category: category.into(),
            message: message.into(),
        }
    }

    /// Create a filesystem error
    #[inline]
    pub fn filesystem<S: Into<String>>(message: S) -> Self {
        Self::Filesystem {
            message: message.into(),
        }
    }
}

/// Result alias used by the declaration and compilation core
pub type DeclareResult<T> = Result<T, DeclareError>;
