//! Formatter contract and the default line layout
//!
//! A formatter turns `(severity label, time, progname, message)` into the
//! exact text handed to a device or a tag poster.

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local};
use std::fmt::Write;
use std::sync::Arc;

/// Timestamp layout used when no `datetime_format` is configured.
pub const DEFAULT_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Whether chrono accepts every specifier in `layout`
pub fn is_valid_datetime_format(layout: &str) -> bool {
    !StrftimeItems::new(layout).any(|item| matches!(item, Item::Error))
}

/// Message formatter
///
/// Implemented for every matching closure, so
/// `Arc::new(|sev: &str, _t: &DateTime<Local>, _p: Option<&str>, msg: &str| format!("{sev} {msg}\n"))`
/// is a valid formatter.
pub trait Formatter: Send + Sync {
    fn format(
        &self,
        severity: &str,
        time: &DateTime<Local>,
        progname: Option<&str>,
        message: &str,
    ) -> String;
}

/// Shared formatter handle, propagated to sinks as-is
pub type SharedFormatter = Arc<dyn Formatter>;

impl<F> Formatter for F
where
    F: Fn(&str, &DateTime<Local>, Option<&str>, &str) -> String + Send + Sync,
{
    fn format(
        &self,
        severity: &str,
        time: &DateTime<Local>,
        progname: Option<&str>,
        message: &str,
    ) -> String {
        self(severity, time, progname, message)
    }
}

/// Default formatter
///
/// Produces `S, [time #pid] SEVERITY -- progname: message\n`, where `S` is the
/// first letter of the severity label and the label is right-aligned to 5 columns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefaultFormatter {
    datetime_format: Option<String>,
}

impl DefaultFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn datetime_format(&self) -> Option<&str> {
        self.datetime_format.as_deref()
    }

    pub fn set_datetime_format(&mut self, format: Option<&str>) {
        self.datetime_format = format.map(str::to_owned);
    }

    /// Render `time`, falling back to [`DEFAULT_DATETIME_FORMAT`] when the
    /// configured layout is rejected by chrono
    fn format_datetime(&self, time: &DateTime<Local>) -> String {
        let layout = self
            .datetime_format
            .as_deref()
            .unwrap_or(DEFAULT_DATETIME_FORMAT);

        let mut out = String::new();
        if write!(out, "{}", time.format(layout)).is_err() {
            out.clear();
            let _ = write!(out, "{}", time.format(DEFAULT_DATETIME_FORMAT));
        }
        out
    }
}

impl Formatter for DefaultFormatter {
    fn format(
        &self,
        severity: &str,
        time: &DateTime<Local>,
        progname: Option<&str>,
        message: &str,
    ) -> String {
        let initial = severity.chars().next().unwrap_or(' ');
        format!(
            "{}, [{} #{}] {:>5} -- {}: {}\n",
            initial,
            self.format_datetime(time),
            std::process::id(),
            severity,
            progname.unwrap_or_default(),
            message
        )
    }
}
