//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the sender.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::request::types::{DEFAULT_NEWLINE, DEFAULT_REMOVE_HEADERS};

/// Root configuration for a sender run.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct SenderConfig {
    /// Concurrency budget and transport choice.
    pub dispatch: DispatchConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Raw socket transport limits.
    pub socket: SocketConfig,

    /// How pasted requests are parsed.
    pub request: RequestConfig,

    /// HTTP client transport settings.
    pub client: ClientConfig,

    /// Log output.
    pub logging: LoggingConfig,

    /// Metrics exposition.
    pub observability: ObservabilityConfig,
}

/// Which transport issues the requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// Raw TCP (optionally TLS) socket; sends the pasted text verbatim.
    Socket,
    /// One HTTP/1.1 connection per request, GET and POST only.
    Simple,
    /// Pooled HTTP client with proxy and redirect support.
    #[default]
    Client,
}

impl TransportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportKind::Socket => "socket",
            TransportKind::Simple => "simple",
            TransportKind::Client => "client",
        }
    }
}

/// Dispatch configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct DispatchConfig {
    /// Maximum number of requests in flight at once.
    pub concurrency: usize,

    /// Transport used for every job of the batch.
    pub transport: TransportKind,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            concurrency: 7,
            transport: TransportKind::default(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Per-operation timeout (connect, send, each read) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 2 }
    }
}

/// Raw socket limits.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SocketConfig {
    /// Maximum number of bytes accepted back from the peer.
    pub max_recv_bytes: usize,

    /// Size of a single read call.
    pub recv_chunk_bytes: usize,
}

impl Default for SocketConfig {
    fn default() -> Self {
        Self {
            max_recv_bytes: 10 * 1024,
            recv_chunk_bytes: 1280,
        }
    }
}

/// Request parsing configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct RequestConfig {
    /// Line terminator used in the templates.
    pub newline: String,

    /// Header names dropped while parsing (case-insensitive).
    pub remove_headers: Vec<String>,

    /// Use TLS; unset means plain HTTP with a warning.
    pub tls: Option<bool>,

    /// Explicit destination host, bypassing Host header inference.
    pub host: Option<String>,

    /// Explicit destination port.
    pub port: Option<u16>,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            newline: DEFAULT_NEWLINE.to_string(),
            remove_headers: DEFAULT_REMOVE_HEADERS.iter().map(|h| h.to_string()).collect(),
            tls: None,
            host: None,
            port: None,
        }
    }
}

/// HTTP client transport configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ClientConfig {
    /// Proxy `host:port` used for both http and https URLs.
    pub proxy: Option<String>,

    /// Certificate verification. Must stay off.
    pub verify_tls: bool,

    /// Follow redirects (up to 10).
    pub follow_redirects: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            proxy: None,
            verify_tls: false,
            follow_redirects: true,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Level for this crate's targets when `RUST_LOG` is unset.
    pub level: String,

    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Prometheus scrape address; metrics are not exported when unset.
    pub metrics_address: Option<String>,
}
