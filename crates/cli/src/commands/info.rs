//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::{Capabilities, MultiplexerConfig};
use multiplexer::create_sink;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{info, warn};

use super::load_config;
use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    level: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    tag_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    progname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    datetime_format: Option<String>,
    sinks: Vec<SinkInfo>,
}

#[derive(Serialize)]
struct SinkInfo {
    name: String,
    sink_type: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    params: BTreeMap<String, String>,
    /// Empty when the sink could not be opened
    capabilities: Vec<String>,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    let config = load_config(&args.config)?;
    let info = build_config_info(&config);

    if args.json {
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&info);
    }

    Ok(())
}

fn build_config_info(config: &MultiplexerConfig) -> ConfigInfo {
    let sinks = config
        .sinks
        .iter()
        .map(|s| SinkInfo {
            name: s.name.clone(),
            sink_type: s.sink_type.as_str().to_string(),
            params: s.params.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            capabilities: probe_capabilities(s),
        })
        .collect();

    ConfigInfo {
        level: config.level.to_string(),
        tag_name: config.tag_name.clone(),
        progname: config.progname.clone(),
        datetime_format: config.datetime_format.clone(),
        sinks,
    }
}

/// Open the sink once to read what it declares
fn probe_capabilities(config: &contracts::SinkConfig) -> Vec<String> {
    let capabilities = match create_sink(config) {
        Ok(sink) => {
            let capabilities = match sink.lock() {
                Ok(guard) => guard.capabilities(),
                Err(poisoned) => poisoned.into_inner().capabilities(),
            };
            capabilities
        }
        Err(e) => {
            warn!(sink = %config.name, error = %e, "Cannot open sink");
            Capabilities::NONE
        }
    };
    capabilities.iter().map(|c| c.name().to_string()).collect()
}

fn print_config_info(info: &ConfigInfo) {
    println!("logmux configuration\n");
    println!("  ├─ Level: {}", info.level);
    println!("  ├─ Tag: {}", info.tag_name.as_deref().unwrap_or("none"));
    println!("  ├─ Progname: {}", info.progname.as_deref().unwrap_or("-"));
    println!(
        "  └─ Datetime format: {}",
        info.datetime_format.as_deref().unwrap_or("(default)")
    );

    println!("\nSinks ({})", info.sinks.len());
    for (i, sink) in info.sinks.iter().enumerate() {
        let prefix = if i == info.sinks.len() - 1 { "└─" } else { "├─" };
        let capabilities = if sink.capabilities.is_empty() {
            "unavailable".to_string()
        } else {
            sink.capabilities.join(", ")
        };
        println!("  {} {} ({}) [{}]", prefix, sink.name, sink.sink_type, capabilities);
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{SinkConfig, SinkType};
    use std::collections::HashMap;

    #[test]
    fn test_build_config_info_lists_capabilities() {
        let config = MultiplexerConfig {
            tag_name: Some("app".to_string()),
            sinks: vec![
                SinkConfig {
                    name: "trace".to_string(),
                    sink_type: SinkType::Tracing,
                    params: HashMap::new(),
                },
                SinkConfig {
                    name: "fluent".to_string(),
                    sink_type: SinkType::Forward,
                    params: HashMap::from([("addr".to_string(), "127.0.0.1:24224".to_string())]),
                },
            ],
            ..Default::default()
        };

        let info = build_config_info(&config);
        assert_eq!(info.level, "INFO");
        assert_eq!(info.sinks[0].sink_type, "tracing");
        assert!(info.sinks[0].capabilities.contains(&"add".to_string()));
        assert_eq!(info.sinks[1].capabilities, vec!["post".to_string()]);
        assert_eq!(info.sinks[1].params["addr"], "127.0.0.1:24224");
    }
}
