//! Unified error handling for respacker
//!
//! Fatal conditions (an unsaved document, a descriptor name collision, failed
//! writes) surface as [`Error`] values. Recoverable conditions are logged and
//! collected as warnings by the export pipeline instead.

use std::path::PathBuf;
use thiserror::Error;

/// Unified error type for all respacker operations
#[derive(Error, Debug)]
pub enum Error {
    // ==================== I/O Errors ====================

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    // ==================== Scene Errors ====================

    /// The scene document has never been saved, so there is no directory to export next to
    #[error("Scene document is not saved")]
    UnsavedDocument,

    /// Scene document could not be decoded
    #[error("Invalid scene document: {message}")]
    InvalidScene {
        message: String,
    },

    /// Object lookup failed
    #[error("Object not found: {name}")]
    ObjectNotFound {
        name: String,
    },

    /// Mesh data lookup failed
    #[error("Mesh data not found: {name}")]
    MeshNotFound {
        name: String,
    },

    /// Custom property exists but cannot be used as a plain value
    #[error("Malformed property '{key}' on '{object}': {message}")]
    MalformedProperty {
        object: String,
        key: String,
        message: String,
    },

    /// Custom property is absent
    #[error("Missing property '{key}' on '{object}'")]
    MissingProperty {
        object: String,
        key: String,
    },

    // ==================== Export Errors ====================

    /// Two sources sanitize to the same output file
    #[error("Name collision: '{first}' and '{second}' both map to {path}")]
    NameCollision {
        first: String,
        second: String,
        path: PathBuf,
    },

    /// Descriptor text could not be parsed
    #[error("Invalid descriptor at line {line}: {message}")]
    InvalidDescriptor {
        line: usize,
        message: String,
    },

    // ==================== Configuration Errors ====================

    /// Invalid configuration
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        message: String,
    },

    // ==================== General Errors ====================

    /// Custom error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

/// Result type using the unified Error
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an error with additional context
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Error::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Create an invalid scene error
    pub fn invalid_scene(message: impl Into<String>) -> Self {
        Error::InvalidScene {
            message: message.into(),
        }
    }

    /// Create an invalid configuration error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Error::InvalidConfig {
            message: message.into(),
        }
    }
}

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<Error>,
{
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.into().with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.into().with_context(f()))
    }
}
