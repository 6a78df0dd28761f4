//! MultiplexerConfig - Config Loader output
//!
//! Declarative description of a multiplexer and its sinks.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::Severity;

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MultiplexerConfig {
    /// Destination tag for tag-poster sinks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_name: Option<String>,

    /// Severity threshold propagated to sinks
    #[serde(default)]
    pub level: Severity,

    /// Program name propagated to sinks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progname: Option<String>,

    /// strftime layout propagated to sinks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datetime_format: Option<String>,

    /// Sinks, in delivery order
    #[serde(default)]
    pub sinks: Vec<SinkConfig>,
}

/// Sink output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Sink name
    pub name: String,

    /// Sink type
    pub sink_type: SinkType,

    /// Type-specific parameters
    #[serde(default)]
    pub params: HashMap<String, String>,
}

/// Sink type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkType {
    /// Text logger on stdout/stderr
    Console,
    /// Text logger appending to a file
    File,
    /// Bridge into `tracing`
    Tracing,
    /// Tag poster over UDP
    Forward,
}

impl SinkType {
    pub fn as_str(self) -> &'static str {
        match self {
            SinkType::Console => "console",
            SinkType::File => "file",
            SinkType::Tracing => "tracing",
            SinkType::Forward => "forward",
        }
    }
}
