//! Config validation
//!
//! Rules:
//! - sink names are non-empty and unique
//! - each sink type has its required params
//! - tag_name, when present, is non-empty
//! - datetime_format, when present, only uses known strftime specifiers

use std::collections::HashSet;
use std::net::SocketAddr;

use contracts::{
    is_valid_datetime_format, ContractError, MultiplexerConfig, SinkConfig, SinkType,
};

/// Validate a parsed config, returning the first error found
pub fn validate(config: &MultiplexerConfig) -> Result<(), ContractError> {
    validate_tag_name(config)?;
    validate_datetime_format(config)?;
    validate_sink_names(config)?;
    for (idx, sink) in config.sinks.iter().enumerate() {
        validate_sink_params(idx, sink)?;
    }
    Ok(())
}

fn validate_tag_name(config: &MultiplexerConfig) -> Result<(), ContractError> {
    match config.tag_name.as_deref() {
        Some(tag) if tag.trim().is_empty() => Err(ContractError::config_validation(
            "tag_name",
            "tag_name cannot be empty",
        )),
        _ => Ok(()),
    }
}

fn validate_datetime_format(config: &MultiplexerConfig) -> Result<(), ContractError> {
    match config.datetime_format.as_deref() {
        Some(layout) if !is_valid_datetime_format(layout) => {
            Err(ContractError::config_validation(
                "datetime_format",
                format!("unsupported strftime layout '{layout}'"),
            ))
        }
        _ => Ok(()),
    }
}

fn validate_sink_names(config: &MultiplexerConfig) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for (idx, sink) in config.sinks.iter().enumerate() {
        if sink.name.is_empty() {
            return Err(ContractError::config_validation(
                format!("sinks[{idx}].name"),
                "sink name cannot be empty",
            ));
        }
        if !seen.insert(sink.name.as_str()) {
            return Err(ContractError::config_validation(
                format!("sinks[name={}]", sink.name),
                "duplicate sink name",
            ));
        }
    }
    Ok(())
}

fn validate_sink_params(idx: usize, sink: &SinkConfig) -> Result<(), ContractError> {
    let field = |key: &str| format!("sinks[{idx}].params.{key}");
    let param = |key: &str| sink.params.get(key).map(String::as_str);

    match sink.sink_type {
        SinkType::Console => match param("stream") {
            None | Some("stdout") | Some("stderr") => Ok(()),
            Some(other) => Err(ContractError::config_validation(
                field("stream"),
                format!("stream must be 'stdout' or 'stderr', got '{other}'"),
            )),
        },
        SinkType::File => match param("path") {
            Some(path) if !path.is_empty() => Ok(()),
            _ => Err(ContractError::config_validation(
                field("path"),
                "file sink requires a non-empty 'path'",
            )),
        },
        SinkType::Tracing => Ok(()),
        SinkType::Forward => {
            let addr = param("addr").ok_or_else(|| {
                ContractError::config_validation(field("addr"), "forward sink requires 'addr'")
            })?;
            addr.parse::<SocketAddr>().map_err(|e| {
                ContractError::config_validation(
                    field("addr"),
                    format!("invalid address '{addr}': {e}"),
                )
            })?;
            match param("format") {
                None | Some("json") | Some("bincode") => {}
                Some(other) => {
                    return Err(ContractError::config_validation(
                        field("format"),
                        format!("unknown format '{other}'"),
                    ))
                }
            }
            if let Some(size) = param("max_packet_size") {
                match size.parse::<usize>() {
                    Ok(n) if n > 0 => {}
                    _ => {
                        return Err(ContractError::config_validation(
                            field("max_packet_size"),
                            format!("max_packet_size must be a positive integer, got '{size}'"),
                        ))
                    }
                }
            }
            Ok(())
        }
    }
}
