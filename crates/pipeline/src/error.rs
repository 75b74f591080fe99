//! Error types for the event pipeline

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Pipeline-specific error types
#[derive(Error, Debug)]
pub enum EventsError {
    #[error("Required dependency not available: {name}")]
    DependencyMissing { name: String },

    #[error("Invalid configuration: {message}")]
    Configuration { message: String },

    #[error("Cannot access '{}': {source}", path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Transform '{name}': {message}")]
    TransformSpec { name: String, message: String },

    #[error("Schema error in {context}: {message}")]
    Schema { context: String, message: String },

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl EventsError {
    pub fn config(message: impl Into<String>) -> Self {
        EventsError::Configuration {
            message: message.into(),
        }
    }

    pub fn file_access(path: impl AsRef<Path>, source: io::Error) -> Self {
        EventsError::FileAccess {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// A path that was required to exist but does not.
    pub fn not_found(path: impl AsRef<Path>) -> Self {
        Self::file_access(
            path,
            io::Error::new(io::ErrorKind::NotFound, "no such file or directory"),
        )
    }

    pub fn transform(name: impl Into<String>, message: impl Into<String>) -> Self {
        EventsError::TransformSpec {
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn schema(context: impl Into<String>, message: impl Into<String>) -> Self {
        EventsError::Schema {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Map a `csv` error raised while reading or writing `path`.
    ///
    /// I/O failures become [`EventsError::FileAccess`]; malformed content
    /// becomes [`EventsError::Schema`].
    pub fn from_csv(path: impl AsRef<Path>, err: csv::Error) -> Self {
        let path = path.as_ref();
        if !err.is_io_error() {
            return Self::schema(path.display().to_string(), err.to_string());
        }
        match err.into_kind() {
            csv::ErrorKind::Io(source) => Self::file_access(path, source),
            other => Self::schema(path.display().to_string(), format!("{:?}", other)),
        }
    }
}

/// Result type for pipeline operations
pub type EventsResult<T> = Result<T, EventsError>;
