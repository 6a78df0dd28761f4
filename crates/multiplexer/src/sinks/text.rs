//! TextLogger - leveled logger writing formatted lines to a device

use std::path::Path;
use std::sync::Arc;

use contracts::{
    Capabilities, ContractError, DefaultFormatter, Formatter, LazyMessage, LogDevice, LogSink,
    Severity, SharedClock, SharedFormatter, SystemClock,
};
use tracing::debug;

use super::device::{FileDevice, StreamDevice};
use super::resolve_message;

/// Leveled logger over a [`LogDevice`]
///
/// Declares the full leveled-logger surface. Lines are rendered by the
/// configured formatter, else by its own [`DefaultFormatter`], which follows
/// `datetime_format`.
pub struct TextLogger {
    name: String,
    level: Severity,
    progname: Option<String>,
    formatter: Option<SharedFormatter>,
    default_formatter: DefaultFormatter,
    clock: SharedClock,
    device: Option<Box<dyn LogDevice>>,
}

impl TextLogger {
    /// Create a logger over `device`, logging everything from `Debug` up
    pub fn new(name: impl Into<String>, device: impl LogDevice + 'static) -> Self {
        Self {
            name: name.into(),
            level: Severity::Debug,
            progname: None,
            formatter: None,
            default_formatter: DefaultFormatter::new(),
            clock: Arc::new(SystemClock),
            device: Some(Box::new(device)),
        }
    }

    pub fn stdout(name: impl Into<String>) -> Self {
        Self::new(name, StreamDevice::stdout())
    }

    pub fn stderr(name: impl Into<String>) -> Self {
        Self::new(name, StreamDevice::stderr())
    }

    /// Append to `path`, creating it if needed
    pub fn file(name: impl Into<String>, path: impl AsRef<Path>) -> std::io::Result<Self> {
        Ok(Self::new(name, FileDevice::open(path)?))
    }

    /// Logger without a device; accepts every call and writes nothing
    pub fn detached(name: impl Into<String>) -> Self {
        Self {
            device: None,
            ..Self::new(name, StreamDevice::new(std::io::sink()))
        }
    }

    pub fn with_clock(mut self, clock: SharedClock) -> Self {
        self.clock = clock;
        self
    }

    pub fn level(&self) -> Severity {
        self.level
    }

    pub fn progname(&self) -> Option<&str> {
        self.progname.as_deref()
    }

    pub fn datetime_format(&self) -> Option<&str> {
        self.default_formatter.datetime_format()
    }

    pub fn has_formatter(&self) -> bool {
        self.formatter.is_some()
    }

    fn format_message(&self, severity: Severity, progname: Option<&str>, message: &str) -> String {
        let now = self.clock.now();
        match &self.formatter {
            Some(formatter) => formatter.format(severity.label(), &now, progname, message),
            None => self
                .default_formatter
                .format(severity.label(), &now, progname, message),
        }
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), ContractError> {
        let Some(device) = self.device.as_mut() else {
            return Ok(());
        };
        device
            .write_all(bytes)
            .map_err(|e| ContractError::sink_write(&self.name, e.to_string()))
    }
}

impl LogSink for TextLogger {
    fn name(&self) -> &str {
        &self.name
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::LEVELED_LOGGER
    }

    fn set_level(&mut self, level: Severity) {
        self.level = level;
    }

    fn set_progname(&mut self, progname: Option<&str>) {
        self.progname = progname.map(str::to_owned);
    }

    fn set_datetime_format(&mut self, format: Option<&str>) {
        self.default_formatter.set_datetime_format(format);
    }

    fn set_formatter(&mut self, formatter: Option<SharedFormatter>) {
        self.formatter = formatter;
    }

    fn add(
        &mut self,
        severity: Severity,
        message: Option<&str>,
        progname: Option<&str>,
        block: Option<LazyMessage<'_>>,
    ) -> Result<bool, ContractError> {
        if self.device.is_none() || severity < self.level {
            return Ok(true);
        }

        let line = {
            let (message, progname) =
                resolve_message(message, progname, block, self.progname.as_deref());
            self.format_message(severity, progname, &message)
        };
        self.write_bytes(line.as_bytes())?;
        Ok(true)
    }

    fn write(&mut self, msg: &str) -> Result<(), ContractError> {
        self.write_bytes(msg.as_bytes())
    }

    fn device(&mut self) -> Option<&mut (dyn LogDevice + 'static)> {
        self.device.as_deref_mut()
    }

    fn close(&mut self) -> Result<(), ContractError> {
        if let Some(device) = self.device.as_mut() {
            device.close()?;
            debug!(sink = %self.name, "TextLogger device closed");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Local, TimeZone};
    use contracts::FixedClock;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::tempdir;

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl Buffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn sample_time() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()
    }

    fn buffered(name: &str) -> (TextLogger, Buffer) {
        let buffer = Buffer::default();
        let logger = TextLogger::new(name, StreamDevice::new(buffer.clone()))
            .with_clock(Arc::new(FixedClock(sample_time())));
        (logger, buffer)
    }

    #[test]
    fn test_add_uses_default_layout() {
        let (mut logger, buffer) = buffered("console");
        logger.set_progname(Some("app"));

        logger.add(Severity::Info, Some("ready"), None, None).unwrap();

        let expected = format!(
            "I, [2024-01-02T03:04:05.000000 #{}]  INFO -- app: ready\n",
            std::process::id()
        );
        assert_eq!(buffer.contents(), expected);
    }

    #[test]
    fn test_add_below_threshold_writes_nothing() {
        let (mut logger, buffer) = buffered("console");
        logger.set_level(Severity::Warn);

        assert!(logger.add(Severity::Info, Some("quiet"), None, None).unwrap());
        assert!(buffer.contents().is_empty());
    }

    #[test]
    fn test_progname_becomes_message_without_message_or_block() {
        let (mut logger, buffer) = buffered("console");
        logger.set_progname(Some("svc"));

        logger
            .add(Severity::Warn, None, Some("from progname"), None)
            .unwrap();

        assert!(buffer.contents().ends_with("WARN -- svc: from progname\n"));
    }

    #[test]
    fn test_datetime_format_and_formatter() {
        let (mut logger, buffer) = buffered("console");
        logger.set_datetime_format(Some("%d/%m"));
        logger.add(Severity::Error, Some("one"), None, None).unwrap();
        assert!(buffer.contents().starts_with("E, [02/01 #"));
        assert_eq!(logger.datetime_format(), Some("%d/%m"));

        let formatter: SharedFormatter =
            Arc::new(|sev: &str, _: &DateTime<Local>, prog: Option<&str>, msg: &str| {
                format!("{sev}|{}|{msg}\n", prog.unwrap_or("-"))
            });
        logger.set_formatter(Some(formatter));
        logger.add(Severity::Fatal, Some("two"), None, None).unwrap();
        assert!(buffer.contents().ends_with("FATAL|-|two\n"));
        assert!(logger.has_formatter());
    }

    #[test]
    fn test_raw_write_is_unformatted() {
        let (mut logger, buffer) = buffered("console");
        logger.write("raw bytes").unwrap();
        assert_eq!(buffer.contents(), "raw bytes");
    }

    #[test]
    fn test_detached_logger_accepts_everything() {
        let mut logger = TextLogger::detached("nowhere");
        assert!(logger.add(Severity::Fatal, Some("x"), None, None).unwrap());
        assert!(logger.write("y").is_ok());
        assert!(logger.device().is_none());
    }

    #[test]
    fn test_file_logger_close() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.log");
        let mut logger = TextLogger::file("file", &path).unwrap();

        logger.add(Severity::Info, Some("persisted"), None, None).unwrap();
        logger.close().unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.ends_with("INFO -- : persisted\n"));
        assert!(logger.add(Severity::Info, Some("late"), None, None).is_err());
    }
}
