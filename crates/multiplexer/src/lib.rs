//! # Multiplexer
//!
//! Logging fan-out module.
//!
//! Responsibilities:
//! - Present one logger facade over a fixed list of sinks
//! - Propagate attribute changes to every sink that declares them
//! - Fall back to tag posting for sinks that cannot log structurally
//! - Best-effort flush/close of file-backed sinks

pub mod error;
pub mod factory;
pub mod logger;
pub mod metrics;
pub mod multiplexer;
pub mod sinks;

pub use contracts::{
    Capabilities, Capability, LazyMessage, LogDevice, LogSink, Severity, SharedSink, TagPayload,
};
pub use error::MultiplexerError;
pub use factory::{create_multiplexer, create_sink};
pub use logger::Logger;
pub use metrics::SinkMetrics;
pub use multiplexer::{Multiplexer, MultiplexerOptions, SinkSet, NO_TAG};
pub use sinks::{FileDevice, ForwardSink, StreamDevice, TextLogger, TracingSink};
