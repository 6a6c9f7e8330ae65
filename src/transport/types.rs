//! Transport results and error definitions.

use std::time::Duration;

use bytes::Bytes;
use thiserror::Error;

/// Terminal success value of a transport call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status, `None` for transports that do not interpret the reply.
    pub status: Option<u16>,
    /// Response body (for the raw socket: every byte received).
    pub body: Bytes,
    /// Time from issuing the call to its terminal event.
    pub elapsed: Duration,
}

/// Errors that end a transport call.
#[derive(Debug, Error)]
pub enum TransportError {
    /// TCP connection could not be established.
    #[error("connection to {addr} failed: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// TLS setup or handshake failed.
    #[error("TLS error with {host}: {reason}")]
    Tls { host: String, reason: String },

    /// Socket read or write failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No terminal event within the deadline.
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// HTTP protocol or client-level failure.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Server answered with a non-success status (simple transport only).
    #[error("server answered with status {status}")]
    Status { status: u16, body: Bytes },

    /// Method the transport cannot issue.
    #[error("method {0} is not supported by this transport (GET and POST only)")]
    UnsupportedMethod(String),

    /// Parsed request cannot be expressed by this transport.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Transport implementation panicked mid-call.
    #[error("transport panicked while issuing the request")]
    Panicked,
}

impl TransportError {
    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            TransportError::Connect { .. } => "connect",
            TransportError::Tls { .. } => "tls",
            TransportError::Io(_) => "io",
            TransportError::Timeout(_) => "timeout",
            TransportError::Http(_) => "http",
            TransportError::Status { .. } => "status",
            TransportError::UnsupportedMethod(_) => "unsupported_method",
            TransportError::InvalidRequest(_) => "invalid_request",
            TransportError::Panicked => "panicked",
        }
    }
}

/// Result type for transport calls.
pub type TransportResult = Result<TransportResponse, TransportError>;
