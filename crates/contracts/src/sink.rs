//! LogSink trait - multiplexer output interface
//!
//! A sink implements any subset of the leveled-logger surface, or only the
//! tag-poster surface, and says which through [`LogSink::capabilities`].

use std::fmt;
use std::sync::{Arc, Mutex};

use crate::{ContractError, LogDevice, Severity, SharedFormatter, TagPayload};

/// Deferred message, evaluated by each sink that decides to log
pub type LazyMessage<'a> = &'a dyn Fn() -> String;

/// Shared sink handle
///
/// Sinks are owned elsewhere; the multiplexer only keeps a handle.
pub type SharedSink = Arc<Mutex<dyn LogSink>>;

/// Wrap a sink into a [`SharedSink`]
pub fn shared<S: LogSink + 'static>(sink: S) -> SharedSink {
    Arc::new(Mutex::new(sink))
}

/// A single sink capability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Settable severity threshold
    Level,
    /// Settable program name
    Progname,
    /// Settable timestamp layout
    DatetimeFormat,
    /// Settable message formatter
    Formatter,
    /// Structured `add(severity, message, progname, block)`
    Add,
    /// Raw unformatted write
    Write,
    /// `post(tag, payload)`
    Post,
}

impl Capability {
    const fn bit(self) -> u8 {
        1 << (self as u8)
    }

    pub fn name(self) -> &'static str {
        match self {
            Capability::Level => "level",
            Capability::Progname => "progname",
            Capability::DatetimeFormat => "datetime_format",
            Capability::Formatter => "formatter",
            Capability::Add => "add",
            Capability::Write => "write",
            Capability::Post => "post",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Set of capabilities declared by a sink
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Capabilities(u8);

impl Capabilities {
    pub const NONE: Self = Self(0);

    /// Full leveled-logger surface
    pub const LEVELED_LOGGER: Self = Self::NONE
        .with(Capability::Level)
        .with(Capability::Progname)
        .with(Capability::DatetimeFormat)
        .with(Capability::Formatter)
        .with(Capability::Add)
        .with(Capability::Write);

    /// Tag poster only
    pub const TAG_POSTER: Self = Self::NONE.with(Capability::Post);

    pub const fn with(self, capability: Capability) -> Self {
        Self(self.0 | capability.bit())
    }

    pub const fn without(self, capability: Capability) -> Self {
        Self(self.0 & !capability.bit())
    }

    pub const fn contains(self, capability: Capability) -> bool {
        self.0 & capability.bit() != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Declared capabilities in declaration order
    pub fn iter(self) -> impl Iterator<Item = Capability> {
        [
            Capability::Level,
            Capability::Progname,
            Capability::DatetimeFormat,
            Capability::Formatter,
            Capability::Add,
            Capability::Write,
            Capability::Post,
        ]
        .into_iter()
        .filter(move |c| self.contains(*c))
    }
}

impl FromIterator<Capability> for Capabilities {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        iter.into_iter().fold(Self::NONE, Self::with)
    }
}

impl fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Log sink trait
///
/// Only the methods matching declared capabilities are ever called by the
/// multiplexer. Setters default to no-ops, operations default to
/// [`ContractError::Unsupported`].
pub trait LogSink: Send {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Declared capabilities, read once when the sink is registered
    fn capabilities(&self) -> Capabilities;

    fn set_level(&mut self, _level: Severity) {}

    fn set_progname(&mut self, _progname: Option<&str>) {}

    fn set_datetime_format(&mut self, _format: Option<&str>) {}

    fn set_formatter(&mut self, _formatter: Option<SharedFormatter>) {}

    /// Structured log call
    ///
    /// `block` is only evaluated if the sink decides to log and `message` is absent.
    ///
    /// # Errors
    /// Returns the sink's own write failure
    fn add(
        &mut self,
        _severity: Severity,
        _message: Option<&str>,
        _progname: Option<&str>,
        _block: Option<LazyMessage<'_>>,
    ) -> Result<bool, ContractError> {
        Err(ContractError::unsupported(self.name(), Capability::Add))
    }

    /// Raw write, no formatting
    ///
    /// # Errors
    /// Returns the sink's own write failure
    fn write(&mut self, _msg: &str) -> Result<(), ContractError> {
        Err(ContractError::unsupported(self.name(), Capability::Write))
    }

    /// Post a record under a tag
    ///
    /// # Errors
    /// Returns the sink's own transport failure
    fn post(&mut self, _tag: &str, _payload: &TagPayload) -> Result<(), ContractError> {
        Err(ContractError::unsupported(self.name(), Capability::Post))
    }

    /// Underlying device, if any
    fn device(&mut self) -> Option<&mut (dyn LogDevice + 'static)> {
        None
    }

    /// Close sink
    fn close(&mut self) -> Result<(), ContractError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_capabilities() {
        assert!(Capabilities::LEVELED_LOGGER.contains(Capability::Add));
        assert!(Capabilities::LEVELED_LOGGER.contains(Capability::Formatter));
        assert!(!Capabilities::LEVELED_LOGGER.contains(Capability::Post));
        assert_eq!(
            Capabilities::TAG_POSTER.iter().collect::<Vec<_>>(),
            vec![Capability::Post]
        );
        assert!(Capabilities::NONE.is_empty());
    }

    #[test]
    fn test_capabilities_from_iter() {
        let caps: Capabilities = [Capability::Level, Capability::Add].into_iter().collect();
        assert!(caps.contains(Capability::Level));
        assert!(!caps.contains(Capability::Progname));
        assert_eq!(caps.without(Capability::Level).iter().count(), 1);
    }

    struct Bare;

    impl LogSink for Bare {
        fn name(&self) -> &str {
            "bare"
        }

        fn capabilities(&self) -> Capabilities {
            Capabilities::NONE
        }
    }

    #[test]
    fn test_undeclared_operations_are_unsupported() {
        let mut sink = Bare;
        let err = sink.post("tag", &TagPayload::new("x")).unwrap_err();
        assert!(matches!(
            err,
            ContractError::Unsupported {
                capability: Capability::Post,
                ..
            }
        ));
        assert!(sink.device().is_none());
        assert!(sink.close().is_ok());
    }
}
