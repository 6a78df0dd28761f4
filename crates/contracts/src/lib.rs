//! # Contracts
//!
//! Frozen interface contracts shared by every logmux crate.
//! Business crates depend on this crate only; reverse dependencies are prohibited.
//!
//! ## Capability Model
//! - Sinks declare what they support through [`Capabilities`]
//! - The multiplexer reads that declaration once and never probes again
//! - Leveled-logger sinks may expose a [`LogDevice`], tag posters never do

mod clock;
mod config;
mod delivery;
mod device;
mod error;
mod formatter;
mod payload;
mod severity;
mod sink;

pub use clock::{Clock, FixedClock, SharedClock, SystemClock};
pub use config::*;
pub use delivery::DeliverySnapshot;
pub use device::{DeviceKind, LogDevice};
pub use error::*;
pub use formatter::{
    is_valid_datetime_format, DefaultFormatter, Formatter, SharedFormatter,
    DEFAULT_DATETIME_FORMAT,
};
pub use payload::TagPayload;
pub use severity::Severity;
pub use sink::*;
