//! TracingSink - forwards records as tracing events

use contracts::{Capabilities, Capability, ContractError, LazyMessage, LogSink, Severity};
use tracing::{debug, error, info, warn};

use super::resolve_message;

/// Sink that re-emits records through `tracing`
///
/// Declares level, progname, `add` and raw write. Formatting is left to the
/// installed subscriber, so no formatter or datetime attributes.
pub struct TracingSink {
    name: String,
    level: Severity,
    progname: Option<String>,
}

impl TracingSink {
    /// Create a new TracingSink with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            level: Severity::Debug,
            progname: None,
        }
    }

    pub fn level(&self) -> Severity {
        self.level
    }

    pub fn progname(&self) -> Option<&str> {
        self.progname.as_deref()
    }
}

impl LogSink for TracingSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::NONE
            .with(Capability::Level)
            .with(Capability::Progname)
            .with(Capability::Add)
            .with(Capability::Write)
    }

    fn set_level(&mut self, level: Severity) {
        self.level = level;
    }

    fn set_progname(&mut self, progname: Option<&str>) {
        self.progname = progname.map(str::to_owned);
    }

    fn add(
        &mut self,
        severity: Severity,
        message: Option<&str>,
        progname: Option<&str>,
        block: Option<LazyMessage<'_>>,
    ) -> Result<bool, ContractError> {
        if severity < self.level {
            return Ok(true);
        }

        let (message, progname) =
            resolve_message(message, progname, block, self.progname.as_deref());
        let progname = progname.unwrap_or_default();

        match severity {
            Severity::Debug => debug!(sink = %self.name, progname, "{message}"),
            Severity::Info => info!(sink = %self.name, progname, "{message}"),
            Severity::Warn => warn!(sink = %self.name, progname, "{message}"),
            Severity::Error | Severity::Fatal | Severity::Unknown => {
                error!(sink = %self.name, progname, severity = severity.label(), "{message}")
            }
        }
        Ok(true)
    }

    fn write(&mut self, msg: &str) -> Result<(), ContractError> {
        info!(sink = %self.name, raw = true, "{}", msg.trim_end());
        Ok(())
    }
}
