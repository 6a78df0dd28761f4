//! Error types for CLI operations.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// One or more records could not be delivered
    #[error("{failed} of {total} records failed to deliver")]
    Delivery { failed: u64, total: u64 },
}

impl CliError {
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    pub fn delivery(failed: u64, total: u64) -> Self {
        Self::Delivery { failed, total }
    }
}
