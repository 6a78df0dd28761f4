//! LogDevice - the resource behind a leveled-logger sink

use serde::{Deserialize, Serialize};
use std::io;

/// What backs a device.
///
/// Close-time policy: only file-backed devices are closed; stream devices
/// (console, shared pipes) are flushed and left open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    /// Owned file handle
    File,
    /// Shared stream such as stdout/stderr
    Stream,
}

impl DeviceKind {
    /// Whether the owning sink is closed when the multiplexer closes
    pub fn closes_on_shutdown(self) -> bool {
        matches!(self, DeviceKind::File)
    }
}

/// Log device trait
pub trait LogDevice: Send {
    /// Declared backing kind
    fn kind(&self) -> DeviceKind;

    /// Write bytes verbatim
    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Whether [`LogDevice::flush`] does anything
    fn supports_flush(&self) -> bool {
        true
    }

    /// Flush buffered bytes
    fn flush(&mut self) -> io::Result<()>;

    /// Release the underlying resource
    fn close(&mut self) -> io::Result<()>;
}
