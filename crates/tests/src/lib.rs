//! # Integration Tests
//!
//! End-to-end scenarios: configuration text through the loader and factory
//! into real sinks.

#[cfg(test)]
mod e2e_tests {
    use std::net::UdpSocket;
    use std::path::Path;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use chrono::{Local, TimeZone};
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{
        shared, Capabilities, Capability, ContractError, DeliverySnapshot, FixedClock, LogSink,
        Severity,
    };
    use multiplexer::{create_multiplexer, Logger, Multiplexer, MultiplexerOptions, NO_TAG};
    use observability::DeliveryAggregator;
    use tempfile::tempdir;

    fn collector() -> UdpSocket {
        let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
        socket
            .set_read_timeout(Some(Duration::from_secs(2)))
            .unwrap();
        socket
    }

    fn recv_json(socket: &UdpSocket) -> serde_json::Value {
        let mut buf = [0u8; 4096];
        let len = socket.recv(&mut buf).unwrap();
        serde_json::from_slice(&buf[..len]).unwrap()
    }

    fn file_and_forward_config(log: &Path, collector: &UdpSocket, tag: Option<&str>) -> String {
        let tag_line = tag
            .map(|t| format!("tag_name = \"{t}\"\n"))
            .unwrap_or_default();
        format!(
            r#"{tag_line}level = "info"
progname = "web"

[[sinks]]
name = "file"
sink_type = "file"
params = {{ path = "{}" }}

[[sinks]]
name = "fluent"
sink_type = "forward"
params = {{ addr = "{}", format = "json" }}
"#,
            log.display(),
            collector.local_addr().unwrap()
        )
    }

    fn build(content: &str) -> Multiplexer {
        let config = ConfigLoader::load_from_str(content, ConfigFormat::Toml).unwrap();
        create_multiplexer(&config).unwrap()
    }

    /// Config -> factory -> file + forward: one call reaches both
    #[test]
    fn test_e2e_file_and_forward() {
        let dir = tempdir().unwrap();
        let log = dir.path().join("logs").join("app.log");
        let collector = collector();

        let mux = build(&file_and_forward_config(&log, &collector, Some("app.web")));
        assert_eq!(mux.len(), 2);

        mux.info("request served").unwrap();
        mux.debug("below file threshold").unwrap();

        // forward sink gets both: it has no level of its own
        let first = recv_json(&collector);
        assert_eq!(first["tag"], "app.web");
        let message = first["record"]["message"].as_str().unwrap();
        assert!(message.starts_with("I, ["));
        assert!(message.ends_with(" INFO -- : request served\n"));

        let second = recv_json(&collector);
        assert!(second["record"]["message"]
            .as_str()
            .unwrap()
            .contains("DEBUG -- : below file threshold"));

        mux.close();
        let content = std::fs::read_to_string(&log).unwrap();
        assert_eq!(content.lines().count(), 1);
        assert!(content.ends_with(" INFO -- web: request served\n"));

        let metrics: Vec<(String, DeliverySnapshot)> = mux.metrics();
        assert_eq!(metrics[0].0, "file");
        assert_eq!(metrics[0].1.delegated, 2);
        assert_eq!(metrics[1].1.posted, 2);
    }

    /// Without a tag, tag posters receive records under `none`
    #[test]
    fn test_e2e_forward_without_tag_uses_none() {
        let dir = tempdir().unwrap();
        let collector = collector();
        let mux = build(&file_and_forward_config(
            &dir.path().join("app.log"),
            &collector,
            None,
        ));

        mux.write("raw payload").unwrap();

        let envelope = recv_json(&collector);
        assert_eq!(envelope["tag"], NO_TAG);
        assert_eq!(envelope["record"]["message"], "raw payload");
        mux.close();
    }

    /// Setters reach the file logger; tag posters ignore them
    #[test]
    fn test_e2e_setters_after_construction() {
        let dir = tempdir().unwrap();
        let log = dir.path().join("app.log");
        let collector = collector();
        let mut mux = build(&file_and_forward_config(&log, &collector, Some("app")));

        mux.set_level(Severity::Error);
        mux.set_progname(Some("worker"));
        mux.set_datetime_format(Some("%Y"));

        mux.warn("dropped by file").unwrap();
        mux.error("kept").unwrap();
        mux.close();

        let content = std::fs::read_to_string(&log).unwrap();
        assert_eq!(content.lines().count(), 1);
        let year = Local::now().format("%Y").to_string();
        assert!(content.starts_with(&format!("E, [{year} #")));
        assert!(content.ends_with("ERROR -- worker: kept\n"));

        // fallback rendering keeps the default layout
        let _ = recv_json(&collector);
        let kept = recv_json(&collector);
        let message = kept["record"]["message"].as_str().unwrap();
        assert!(!message.starts_with(&format!("E, [{year} #")));
        assert!(message.ends_with("ERROR -- : kept\n"));
    }

    /// A collaborator declaring only `write` sees raw writes and nothing else
    #[test]
    fn test_e2e_custom_sink_alongside_configured_ones() {
        #[derive(Default)]
        struct RawOnly {
            lines: Arc<Mutex<Vec<String>>>,
        }

        impl LogSink for RawOnly {
            fn name(&self) -> &str {
                "raw"
            }

            fn capabilities(&self) -> Capabilities {
                Capabilities::NONE.with(Capability::Write)
            }

            fn write(&mut self, msg: &str) -> Result<(), ContractError> {
                self.lines.lock().unwrap().push(msg.to_string());
                Ok(())
            }
        }

        let raw = RawOnly::default();
        let lines = raw.lines.clone();
        let time = Local.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        let mut mux = Multiplexer::new(
            vec![None, Some(shared(raw)), None],
            MultiplexerOptions::with_tag_name("unused"),
        )
        .with_clock(Arc::new(FixedClock(time)));

        assert_eq!(mux.len(), 1);
        mux.set_level(Severity::Debug);
        mux.fatal("not delivered").unwrap();
        mux.write("delivered").unwrap();
        mux.close();

        assert_eq!(*lines.lock().unwrap(), vec!["delivered".to_string()]);
        assert_eq!(mux.metrics()[0].1.skipped, 1);
        assert_eq!(mux.metrics()[0].1.delegated, 1);
    }

    /// Delivery counters feed the observability summary
    #[test]
    fn test_e2e_delivery_summary() {
        let dir = tempdir().unwrap();
        let config = format!(
            r#"{{
                "sinks": [
                    {{ "name": "file", "sink_type": "file", "params": {{ "path": "{}" }} }},
                    {{ "name": "trace", "sink_type": "tracing" }}
                ]
            }}"#,
            dir.path().join("app.log").display()
        );
        let config = ConfigLoader::load_from_str(&config, ConfigFormat::Json).unwrap();
        let mux = create_multiplexer(&config).unwrap();

        let mut aggregator = DeliveryAggregator::new();
        for msg in ["a", "b", "c"] {
            let ok = mux.info(msg).is_ok();
            aggregator.record_call(0.1, ok);
        }
        mux.close();
        let late = mux.info("after close").is_ok();
        aggregator.record_call(0.1, late);

        for (sink, snapshot) in mux.metrics() {
            aggregator.update(&sink, snapshot);
        }
        let summary = aggregator.summary();
        assert_eq!(summary.calls, 4);
        assert_eq!(summary.failed_calls, 1);
        // the closed file fails first, so the tracing sink never sees the last call
        assert_eq!(summary.per_sink["file"].failed, 1);
        assert_eq!(summary.per_sink["trace"].delegated, 3);
        assert!(summary.to_string().contains("Per sink:"));
    }

    /// Invalid configuration never reaches the factory
    #[test]
    fn test_e2e_invalid_config_rejected() {
        let content = r#"
[[sinks]]
name = "fluent"
sink_type = "forward"
params = { addr = "not-an-address" }
"#;
        let err = ConfigLoader::load_from_str(content, ConfigFormat::Toml).unwrap_err();
        assert!(matches!(err, ContractError::ConfigValidation { .. }));
    }
}
