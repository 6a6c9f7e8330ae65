//! Transport subsystem.
//!
//! # Data Flow
//! ```text
//! ParsedRequest
//!     → Transport::issue (one call per job)
//!         socket.rs: raw bytes over TCP/TLS, reply returned verbatim
//!         simple.rs: fresh HTTP/1.1 connection, GET/POST only
//!         client.rs: pooled keep-alive HTTP client, proxy, redirects
//!     → exactly one terminal event: TransportResponse or TransportError
//! ```
//!
//! # Design Decisions
//! - The dispatcher only sees the `Transport` trait, never a concrete client
//! - Every call carries a deadline, so a call cannot stay pending forever
//! - An absent body is never sent as an empty one

pub mod client;
pub mod simple;
pub mod socket;
pub mod types;

use std::future::Future;
use std::time::Duration;

pub use crate::config::schema::TransportKind;
pub use client::{ClientSettings, ClientTransport};
pub use simple::SimpleTransport;
pub use socket::{SocketSettings, SocketTransport};
pub use types::{TransportError, TransportResponse, TransportResult};

use crate::config::SenderConfig;
use crate::request::ParsedRequest;

/// Capability that turns a parsed request into exactly one terminal event.
///
/// Implementations must resolve every call, success or failure, and must
/// not resolve it twice.
pub trait Transport: Send + Sync + 'static {
    /// Label used in logs and metrics.
    fn name(&self) -> &'static str;

    /// Issue one request.
    fn issue(&self, request: &ParsedRequest) -> impl Future<Output = TransportResult> + Send;
}

/// Transport chosen at runtime from configuration.
#[derive(Debug)]
pub enum AnyTransport {
    Socket(SocketTransport),
    Simple(SimpleTransport),
    Client(ClientTransport),
}

impl AnyTransport {
    /// Build the configured transport.
    pub fn from_config(config: &SenderConfig) -> Result<Self, TransportError> {
        let timeout = Duration::from_secs(config.timeouts.request_secs);
        let transport = match config.dispatch.transport {
            TransportKind::Socket => AnyTransport::Socket(SocketTransport::new(SocketSettings {
                timeout,
                max_recv_bytes: config.socket.max_recv_bytes,
                recv_chunk_bytes: config.socket.recv_chunk_bytes,
            })?),
            TransportKind::Simple => AnyTransport::Simple(SimpleTransport::new(timeout)?),
            TransportKind::Client => AnyTransport::Client(ClientTransport::new(ClientSettings {
                timeout,
                proxy: config.client.proxy.clone(),
                follow_redirects: config.client.follow_redirects,
                pool_size: config.dispatch.concurrency,
            })?),
        };
        tracing::debug!(transport = transport.name(), timeout = ?timeout, "transport ready");
        Ok(transport)
    }
}

impl Transport for AnyTransport {
    fn name(&self) -> &'static str {
        match self {
            AnyTransport::Socket(t) => t.name(),
            AnyTransport::Simple(t) => t.name(),
            AnyTransport::Client(t) => t.name(),
        }
    }

    async fn issue(&self, request: &ParsedRequest) -> TransportResult {
        match self {
            AnyTransport::Socket(t) => t.issue(request).await,
            AnyTransport::Simple(t) => t.issue(request).await,
            AnyTransport::Client(t) => t.issue(request).await,
        }
    }
}
