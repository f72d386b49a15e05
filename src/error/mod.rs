mod connection_error;

use thiserror::Error;

pub use connection_error::{ConnectionError, SourceLocation};

#[derive(Error, Debug)]
pub enum SchemaCheckError {
    #[error("Parse error in {origin} at {location}: {message}")]
    Parse {
        origin: String,
        location: SourceLocation,
        message: String,
    },

    #[error("Database connection error: {0}")]
    Connection(#[from] ConnectionError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Schema file not found: {0}")]
    SchemaFileNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SchemaCheckError {
    pub fn parse(origin: impl Into<String>, location: SourceLocation, message: impl Into<String>) -> Self {
        SchemaCheckError::Parse {
            origin: origin.into(),
            location,
            message: message.into(),
        }
    }

    pub fn is_fatal_for_run(&self) -> bool {
        matches!(self, SchemaCheckError::Connection(_) | SchemaCheckError::Io(_))
    }
}

pub type Result<T> = std::result::Result<T, SchemaCheckError>;
