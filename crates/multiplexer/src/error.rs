//! Multiplexer error types

use thiserror::Error;

/// Errors raised while building a multiplexer from configuration
#[derive(Debug, Error)]
pub enum MultiplexerError {
    /// Sink creation error
    #[error("failed to create sink '{name}': {message}")]
    SinkCreation { name: String, message: String },
}

impl MultiplexerError {
    /// Create a sink creation error
    pub fn sink_creation(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkCreation {
            name: name.into(),
            message: message.into(),
        }
    }
}
