//! ForwardSink - tag poster shipping records over UDP

use contracts::{Capabilities, ContractError, LogSink, SharedClock, SystemClock, TagPayload};
use serde::Serialize;
use std::collections::HashMap;
use std::net::{SocketAddr, UdpSocket};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Serialization format for network transmission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ForwardFormat {
    /// JSON (human-readable, larger)
    #[default]
    Json,
    /// Bincode (binary, compact)
    Bincode,
}

/// Configuration for ForwardSink
#[derive(Debug, Clone)]
pub struct ForwardSinkConfig {
    /// Collector address
    pub addr: SocketAddr,
    /// Serialization format
    pub format: ForwardFormat,
    /// Max datagram size (UDP typically 65507 for IPv4)
    pub max_packet_size: usize,
}

impl ForwardSinkConfig {
    /// Create config from params map
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, String> {
        let addr_str = params
            .get("addr")
            .ok_or_else(|| "missing 'addr' parameter".to_string())?;

        let addr: SocketAddr = addr_str
            .parse()
            .map_err(|e| format!("invalid address '{}': {}", addr_str, e))?;

        let format = match params.get("format").map(String::as_str) {
            Some("bincode") => ForwardFormat::Bincode,
            Some("json") | None => ForwardFormat::Json,
            Some(other) => return Err(format!("unknown format '{}'", other)),
        };

        let max_packet_size = match params.get("max_packet_size") {
            Some(s) => s
                .parse()
                .map_err(|e| format!("invalid max_packet_size '{}': {}", s, e))?,
            None => 65000,
        };

        Ok(Self {
            addr,
            format,
            max_packet_size,
        })
    }
}

/// Wire envelope: `{tag, time, record}`
#[derive(Debug, Serialize)]
struct Envelope<'a> {
    tag: &'a str,
    /// Unix time, seconds
    time: i64,
    record: &'a TagPayload,
}

/// Tag poster sending one datagram per record
///
/// Declares only `post`: no attributes, no structured `add`, no device.
pub struct ForwardSink {
    name: String,
    config: ForwardSinkConfig,
    socket: Option<UdpSocket>,
    clock: SharedClock,
}

impl ForwardSink {
    /// Create a new ForwardSink connected to `config.addr`
    #[instrument(name = "forward_sink_new", skip(name, config), fields(target = %config.addr))]
    pub fn new(name: impl Into<String>, config: ForwardSinkConfig) -> std::io::Result<Self> {
        let name = name.into();
        let bind_addr: SocketAddr = if config.addr.is_ipv4() {
            ([0u8; 4], 0).into()
        } else {
            ([0u16; 8], 0).into()
        };
        let socket = UdpSocket::bind(bind_addr)?;
        socket.connect(config.addr)?;

        debug!(sink = %name, target = %config.addr, "ForwardSink connected");

        Ok(Self {
            name,
            config,
            socket: Some(socket),
            clock: Arc::new(SystemClock),
        })
    }

    /// Create from params (for factory)
    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> Result<Self, ContractError> {
        let name = name.into();
        let config = ForwardSinkConfig::from_params(params)
            .map_err(|e| ContractError::config_validation(format!("sinks[{name}].params"), e))?;

        Self::new(name.clone(), config)
            .map_err(|e| ContractError::sink_connection(name, e.to_string()))
    }

    pub fn with_clock(mut self, clock: SharedClock) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &ForwardSinkConfig {
        &self.config
    }

    fn encode(&self, tag: &str, payload: &TagPayload) -> Result<Vec<u8>, ContractError> {
        let envelope = Envelope {
            tag,
            time: self.clock.now().timestamp(),
            record: payload,
        };
        let data = match self.config.format {
            ForwardFormat::Json => serde_json::to_vec(&envelope).map_err(|e| e.to_string()),
            ForwardFormat::Bincode => bincode::serialize(&envelope).map_err(|e| e.to_string()),
        }
        .map_err(|e| ContractError::sink_write(&self.name, e))?;

        if data.len() > self.config.max_packet_size {
            return Err(ContractError::sink_write(
                &self.name,
                format!(
                    "record of {} bytes exceeds max_packet_size {}",
                    data.len(),
                    self.config.max_packet_size
                ),
            ));
        }
        Ok(data)
    }

    fn socket(&self) -> Result<&UdpSocket, ContractError> {
        self.socket
            .as_ref()
            .ok_or_else(|| ContractError::sink_connection(&self.name, "socket closed"))
    }
}

impl LogSink for ForwardSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::TAG_POSTER
    }

    fn post(&mut self, tag: &str, payload: &TagPayload) -> Result<(), ContractError> {
        let data = self.encode(tag, payload)?;
        let sent = self
            .socket()?
            .send(&data)
            .map_err(|e| ContractError::sink_connection(&self.name, e.to_string()))?;
        debug!(sink = %self.name, tag, bytes = sent, "Posted");
        Ok(())
    }

    fn close(&mut self) -> Result<(), ContractError> {
        self.socket = None;
        debug!(sink = %self.name, "ForwardSink closed");
        Ok(())
    }
}
