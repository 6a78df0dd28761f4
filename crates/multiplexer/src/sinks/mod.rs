//! Sink implementations
//!
//! Contains TextLogger (with its devices), TracingSink, and ForwardSink.

mod device;
mod forward;
mod log;
mod text;

pub use self::device::{FileDevice, StreamDevice};
pub use self::forward::{ForwardFormat, ForwardSink, ForwardSinkConfig};
pub use self::log::TracingSink;
pub use self::text::TextLogger;

use std::borrow::Cow;

use contracts::LazyMessage;

/// Resolve `(message, progname)` the way leveled loggers do
///
/// An explicit message wins, then the block's output. With neither, the
/// progname argument becomes the message and `default_progname` takes its place.
pub(crate) fn resolve_message<'a>(
    message: Option<&'a str>,
    progname: Option<&'a str>,
    block: Option<LazyMessage<'_>>,
    default_progname: Option<&'a str>,
) -> (Cow<'a, str>, Option<&'a str>) {
    match (message, block) {
        (Some(message), _) => (Cow::Borrowed(message), progname.or(default_progname)),
        (None, Some(block)) => (Cow::Owned(block()), progname.or(default_progname)),
        (None, None) => (
            Cow::Borrowed(progname.unwrap_or_default()),
            default_progname,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_explicit_message() {
        let (message, progname) = resolve_message(Some("m"), None, None, Some("app"));
        assert_eq!(message, "m");
        assert_eq!(progname, Some("app"));
    }

    #[test]
    fn test_resolve_block_message() {
        let block = || "lazy".to_string();
        let (message, progname) = resolve_message(None, Some("job"), Some(&block), Some("app"));
        assert_eq!(message, "lazy");
        assert_eq!(progname, Some("job"));
    }

    #[test]
    fn test_resolve_progname_as_message() {
        let (message, progname) = resolve_message(None, Some("only text"), None, Some("app"));
        assert_eq!(message, "only text");
        assert_eq!(progname, Some("app"));
    }
}
