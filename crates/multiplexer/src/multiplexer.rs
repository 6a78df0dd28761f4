//! Multiplexer - one logger facade over many sinks

use std::borrow::Cow;
use std::fmt;
use std::sync::{Arc, MutexGuard};

use tracing::{debug, instrument, warn};

use contracts::{
    Capabilities, Capability, ContractError, DefaultFormatter, DeliverySnapshot, Formatter,
    LazyMessage, LogSink, Severity, SharedClock, SharedFormatter, SharedSink, SystemClock,
    TagPayload,
};

use crate::metrics::SinkMetrics;

/// Tag used for tag-poster sinks when no `tag_name` was given
pub const NO_TAG: &str = "none";

/// Construction options
#[derive(Debug, Clone, Default)]
pub struct MultiplexerOptions {
    /// Destination tag for tag-poster sinks
    pub tag_name: Option<String>,
}

impl MultiplexerOptions {
    pub fn with_tag_name(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: Some(tag_name.into()),
        }
    }
}

/// Ordered sink input, possibly with absent entries
///
/// Built from a single sink, an optional sink, or a vector of either.
#[derive(Default)]
pub struct SinkSet(Vec<Option<SharedSink>>);

impl From<SharedSink> for SinkSet {
    fn from(sink: SharedSink) -> Self {
        Self(vec![Some(sink)])
    }
}

impl From<Option<SharedSink>> for SinkSet {
    fn from(sink: Option<SharedSink>) -> Self {
        Self(vec![sink])
    }
}

impl From<Vec<SharedSink>> for SinkSet {
    fn from(sinks: Vec<SharedSink>) -> Self {
        Self(sinks.into_iter().map(Some).collect())
    }
}

impl From<Vec<Option<SharedSink>>> for SinkSet {
    fn from(sinks: Vec<Option<SharedSink>>) -> Self {
        Self(sinks)
    }
}

impl FromIterator<SharedSink> for SinkSet {
    fn from_iter<I: IntoIterator<Item = SharedSink>>(iter: I) -> Self {
        Self(iter.into_iter().map(Some).collect())
    }
}

/// A registered sink with its capabilities resolved once
struct SinkSlot {
    name: String,
    capabilities: Capabilities,
    sink: SharedSink,
    metrics: SinkMetrics,
}

impl SinkSlot {
    fn register(sink: SharedSink) -> Self {
        let (name, capabilities) = {
            let guard = lock_sink(&sink);
            (guard.name().to_string(), guard.capabilities())
        };
        debug!(sink = %name, capabilities = ?capabilities, "Sink registered");
        Self {
            name,
            capabilities,
            sink,
            metrics: SinkMetrics::new(),
        }
    }

    fn supports(&self, capability: Capability) -> bool {
        self.capabilities.contains(capability)
    }

    fn lock(&self) -> MutexGuard<'_, dyn LogSink + 'static> {
        lock_sink(&self.sink)
    }

    fn track<T>(
        &self,
        result: Result<T, ContractError>,
        delivered: fn(&SinkMetrics),
    ) -> Result<T, ContractError> {
        match result {
            Ok(value) => {
                delivered(&self.metrics);
                Ok(value)
            }
            Err(e) => {
                self.metrics.inc_failed();
                debug!(sink = %self.name, error = %e, "Delivery failed");
                Err(e)
            }
        }
    }
}

fn lock_sink(sink: &SharedSink) -> MutexGuard<'_, dyn LogSink + 'static> {
    sink.lock().unwrap_or_else(|poisoned| {
        warn!("Sink lock poisoned, recovering");
        poisoned.into_inner()
    })
}

/// Logging multiplexer
///
/// Forwards every call to each sink in construction order. Attribute setters
/// store locally first, then reach every sink declaring the attribute.
/// A failing sink aborts the call; later sinks are not visited.
pub struct Multiplexer {
    slots: Vec<SinkSlot>,
    tag_name: Option<String>,
    level: Severity,
    progname: Option<String>,
    datetime_format: Option<String>,
    formatter: Option<SharedFormatter>,
    default_formatter: DefaultFormatter,
    clock: SharedClock,
}

impl Multiplexer {
    /// Create a multiplexer over `sinks`
    ///
    /// Absent entries are dropped; `tag_name` is taken out of `options`.
    pub fn new(sinks: impl Into<SinkSet>, mut options: MultiplexerOptions) -> Self {
        let SinkSet(entries) = sinks.into();
        let total = entries.len();
        let slots: Vec<SinkSlot> = entries
            .into_iter()
            .flatten()
            .map(SinkSlot::register)
            .collect();

        if slots.len() < total {
            debug!(absent = total - slots.len(), "Skipping absent sink entries");
        }

        Self {
            slots,
            tag_name: options.tag_name.take(),
            level: Severity::Info,
            progname: None,
            datetime_format: None,
            formatter: None,
            default_formatter: DefaultFormatter::new(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the clock used on the fallback formatting path
    pub fn with_clock(mut self, clock: SharedClock) -> Self {
        self.clock = clock;
        self
    }

    pub fn level(&self) -> Severity {
        self.level
    }

    pub fn set_level(&mut self, level: Severity) {
        self.level = level;
        self.propagate(Capability::Level, |sink| sink.set_level(level));
    }

    pub fn progname(&self) -> Option<&str> {
        self.progname.as_deref()
    }

    pub fn set_progname(&mut self, progname: Option<&str>) {
        self.progname = progname.map(str::to_owned);
        self.propagate(Capability::Progname, |sink| sink.set_progname(progname));
    }

    pub fn datetime_format(&self) -> Option<&str> {
        self.datetime_format.as_deref()
    }

    pub fn set_datetime_format(&mut self, format: Option<&str>) {
        self.datetime_format = format.map(str::to_owned);
        self.propagate(Capability::DatetimeFormat, |sink| {
            sink.set_datetime_format(format)
        });
    }

    pub fn formatter(&self) -> Option<&SharedFormatter> {
        self.formatter.as_ref()
    }

    pub fn set_formatter(&mut self, formatter: Option<SharedFormatter>) {
        self.formatter = formatter.clone();
        self.propagate(Capability::Formatter, |sink| {
            sink.set_formatter(formatter.clone())
        });
    }

    pub fn tag_name(&self) -> Option<&str> {
        self.tag_name.as_deref()
    }

    pub fn default_formatter(&self) -> &DefaultFormatter {
        &self.default_formatter
    }

    /// Registered sinks, in delivery order
    pub fn sinks(&self) -> impl Iterator<Item = &SharedSink> {
        self.slots.iter().map(|slot| &slot.sink)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Delivery counters per sink, in delivery order
    pub fn metrics(&self) -> Vec<(String, DeliverySnapshot)> {
        self.slots
            .iter()
            .map(|slot| (slot.name.clone(), slot.metrics.snapshot()))
            .collect()
    }

    /// Generic logging entry point
    ///
    /// Sinks declaring `add` receive the call unchanged, including `block`,
    /// which each of them may evaluate on its own. Tag posters receive the
    /// default formatter's rendering under `tag_name` (or [`NO_TAG`]).
    ///
    /// # Errors
    /// Returns the first sink failure; remaining sinks are not visited.
    pub fn add(
        &self,
        severity: Severity,
        message: Option<&str>,
        progname: Option<&str>,
        block: Option<LazyMessage<'_>>,
    ) -> Result<bool, ContractError> {
        for slot in &self.slots {
            if slot.supports(Capability::Add) {
                let result = slot.lock().add(severity, message, progname, block);
                slot.track(result, SinkMetrics::inc_delegated)?;
            } else if slot.supports(Capability::Post) {
                // default layout only, never the propagated formatter
                let text = fallback_message(message, block);
                let formatted = self.default_formatter.format(
                    severity.label(),
                    &self.clock.now(),
                    progname,
                    &text,
                );
                let result = slot.lock().post(self.tag(), &TagPayload::new(formatted));
                slot.track(result, SinkMetrics::inc_posted)?;
            } else {
                slot.metrics.inc_skipped();
            }
        }
        Ok(true)
    }

    /// Raw dump of `msg` to every sink, without formatting
    ///
    /// # Errors
    /// Returns the first sink failure; remaining sinks are not visited.
    pub fn write(&self, msg: &str) -> Result<(), ContractError> {
        for slot in &self.slots {
            if slot.supports(Capability::Write) {
                let result = slot.lock().write(msg);
                slot.track(result, SinkMetrics::inc_delegated)?;
            } else if slot.supports(Capability::Post) {
                let result = slot.lock().post(self.tag(), &TagPayload::new(msg));
                slot.track(result, SinkMetrics::inc_posted)?;
            } else {
                slot.metrics.inc_skipped();
            }
        }
        Ok(())
    }

    /// Flush every device and close file-backed sinks
    ///
    /// Stream devices are flushed but left open; sinks without a device are
    /// untouched. Failures are logged and do not stop the remaining sinks.
    #[instrument(name = "multiplexer_close", skip(self), fields(sinks = self.slots.len()))]
    pub fn close(&self) {
        for slot in &self.slots {
            let mut sink = slot.lock();
            let Some(device) = sink.device() else {
                continue;
            };

            let kind = device.kind();
            if device.supports_flush() {
                if let Err(e) = device.flush() {
                    warn!(sink = %slot.name, error = %e, "Flush failed on close");
                }
            }

            if kind.closes_on_shutdown() {
                match sink.close() {
                    Ok(()) => debug!(sink = %slot.name, "Sink closed"),
                    Err(e) => warn!(sink = %slot.name, error = %e, "Close failed"),
                }
            }
        }
    }

    fn tag(&self) -> &str {
        self.tag_name.as_deref().unwrap_or(NO_TAG)
    }

    fn propagate(
        &self,
        capability: Capability,
        mut apply: impl FnMut(&mut (dyn LogSink + 'static)),
    ) {
        for slot in self.slots.iter().filter(|slot| slot.supports(capability)) {
            apply(&mut *slot.lock());
        }
    }
}

/// Message text for the fallback path: the message, else the block's output
///
/// With neither, the record text is empty. Rendering always goes through the
/// multiplexer's own `default_formatter`; a formatter installed with
/// [`Multiplexer::set_formatter`] only reaches sinks declaring that attribute.
fn fallback_message<'a>(message: Option<&'a str>, block: Option<LazyMessage<'_>>) -> Cow<'a, str> {
    match (message, block) {
        (Some(message), _) => Cow::Borrowed(message),
        (None, Some(block)) => Cow::Owned(block()),
        (None, None) => Cow::Borrowed(""),
    }
}

impl fmt::Debug for Multiplexer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Multiplexer")
            .field(
                "sinks",
                &self.slots.iter().map(|s| s.name.as_str()).collect::<Vec<_>>(),
            )
            .field("tag_name", &self.tag_name)
            .field("level", &self.level)
            .field("progname", &self.progname)
            .field("datetime_format", &self.datetime_format)
            .field("formatter", &self.formatter.is_some())
            .finish()
    }
}
