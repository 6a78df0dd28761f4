//! Factory - build sinks and multiplexers from configuration

use std::path::PathBuf;

use tracing::{info, instrument};

use contracts::{shared, MultiplexerConfig, SharedSink, SinkConfig, SinkType};

use crate::error::MultiplexerError;
use crate::multiplexer::{Multiplexer, MultiplexerOptions};
use crate::sinks::{ForwardSink, TextLogger, TracingSink};

/// Create a sink from configuration
#[instrument(
    name = "multiplexer_create_sink",
    skip(config),
    fields(sink = %config.name, sink_type = ?config.sink_type)
)]
pub fn create_sink(config: &SinkConfig) -> Result<SharedSink, MultiplexerError> {
    match config.sink_type {
        SinkType::Console => {
            let sink = match config.params.get("stream").map(String::as_str) {
                Some("stdout") | None => TextLogger::stdout(&config.name),
                Some("stderr") => TextLogger::stderr(&config.name),
                Some(other) => {
                    return Err(MultiplexerError::sink_creation(
                        &config.name,
                        format!("unknown stream '{other}'"),
                    ))
                }
            };
            Ok(shared(sink))
        }
        SinkType::File => {
            let path = config.params.get("path").map(PathBuf::from).ok_or_else(|| {
                MultiplexerError::sink_creation(&config.name, "missing 'path' parameter")
            })?;
            let sink = TextLogger::file(&config.name, &path)
                .map_err(|e| MultiplexerError::sink_creation(&config.name, e.to_string()))?;
            Ok(shared(sink))
        }
        SinkType::Tracing => Ok(shared(TracingSink::new(&config.name))),
        SinkType::Forward => {
            let sink = ForwardSink::from_params(&config.name, &config.params)
                .map_err(|e| MultiplexerError::sink_creation(&config.name, e.to_string()))?;
            Ok(shared(sink))
        }
    }
}

/// Build a multiplexer and apply the configured attributes
///
/// Attributes go through the regular setters, so they reach every capable sink.
#[instrument(
    name = "multiplexer_create",
    skip(config),
    fields(sink_count = config.sinks.len())
)]
pub fn create_multiplexer(config: &MultiplexerConfig) -> Result<Multiplexer, MultiplexerError> {
    let sinks = config
        .sinks
        .iter()
        .map(create_sink)
        .collect::<Result<Vec<_>, _>>()?;

    let options = MultiplexerOptions {
        tag_name: config.tag_name.clone(),
    };
    let mut multiplexer = Multiplexer::new(sinks, options);

    multiplexer.set_level(config.level);
    if config.progname.is_some() {
        multiplexer.set_progname(config.progname.as_deref());
    }
    if config.datetime_format.is_some() {
        multiplexer.set_datetime_format(config.datetime_format.as_deref());
    }

    info!(
        sinks = multiplexer.len(),
        tag = multiplexer.tag_name().unwrap_or(crate::NO_TAG),
        level = %multiplexer.level(),
        "Multiplexer created"
    );
    Ok(multiplexer)
}
