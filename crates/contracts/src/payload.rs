//! TagPayload - record handed to tag-poster sinks

use serde::{Deserialize, Serialize};

/// `{ "message": ... }` record posted under a tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagPayload {
    pub message: String,
}

impl TagPayload {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
