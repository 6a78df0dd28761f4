//! Logger - severity-named conveniences layered on `add`

use contracts::{ContractError, LazyMessage, Severity};

use crate::multiplexer::Multiplexer;

/// Leveled logger surface
///
/// Implementors provide [`Logger::add`] and [`Logger::level`]; everything else
/// is derived. Conveniences never filter: the decision belongs to `add`.
pub trait Logger {
    fn level(&self) -> Severity;

    /// # Errors
    /// Returns the first delivery failure
    fn add(
        &self,
        severity: Severity,
        message: Option<&str>,
        progname: Option<&str>,
        block: Option<LazyMessage<'_>>,
    ) -> Result<bool, ContractError>;

    /// Whether `severity` passes this logger's own threshold
    fn is_enabled(&self, severity: Severity) -> bool {
        severity >= self.level()
    }

    fn log(&self, severity: Severity, message: &str) -> Result<bool, ContractError> {
        self.add(severity, Some(message), None, None)
    }

    /// Log with a message computed only by sinks that accept it
    fn log_with(&self, severity: Severity, block: LazyMessage<'_>) -> Result<bool, ContractError> {
        self.add(severity, None, None, Some(block))
    }

    fn debug(&self, message: &str) -> Result<bool, ContractError> {
        self.log(Severity::Debug, message)
    }

    fn info(&self, message: &str) -> Result<bool, ContractError> {
        self.log(Severity::Info, message)
    }

    fn warn(&self, message: &str) -> Result<bool, ContractError> {
        self.log(Severity::Warn, message)
    }

    fn error(&self, message: &str) -> Result<bool, ContractError> {
        self.log(Severity::Error, message)
    }

    fn fatal(&self, message: &str) -> Result<bool, ContractError> {
        self.log(Severity::Fatal, message)
    }

    fn unknown(&self, message: &str) -> Result<bool, ContractError> {
        self.log(Severity::Unknown, message)
    }
}

impl Logger for Multiplexer {
    fn level(&self) -> Severity {
        Multiplexer::level(self)
    }

    fn add(
        &self,
        severity: Severity,
        message: Option<&str>,
        progname: Option<&str>,
        block: Option<LazyMessage<'_>>,
    ) -> Result<bool, ContractError> {
        Multiplexer::add(self, severity, message, progname, block)
    }
}
