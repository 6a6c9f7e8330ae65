//! Raw socket transport.
//!
//! Sends the pasted text byte for byte and returns whatever the peer
//! answers, headers and encoding included. Nothing HTTP-specific happens
//! here, so it also works for non-HTTP line protocols.

use std::time::{Duration, Instant};

use bytes::Bytes;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio_rustls::TlsConnector;
use tracing::{debug, warn};

use crate::net::{self, tls};
use crate::request::ParsedRequest;
use crate::resilience::timeouts::with_deadline;
use crate::transport::types::{TransportError, TransportResponse, TransportResult};
use crate::transport::Transport;

/// Limits for one socket exchange.
#[derive(Debug, Clone)]
pub struct SocketSettings {
    /// Deadline for the connect and the send, and idle deadline for each read.
    pub timeout: Duration,
    /// Stop reading once this many bytes were received.
    pub max_recv_bytes: usize,
    /// Size of each read call.
    pub recv_chunk_bytes: usize,
}

impl Default for SocketSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(2),
            max_recv_bytes: 10 * 1024,
            recv_chunk_bytes: 1280,
        }
    }
}

pub struct SocketTransport {
    settings: SocketSettings,
    tls: TlsConnector,
}

impl std::fmt::Debug for SocketTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SocketTransport")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl SocketTransport {
    pub fn new(settings: SocketSettings) -> Result<Self, TransportError> {
        Ok(Self {
            settings,
            tls: tls::insecure_connector()?,
        })
    }

    pub fn settings(&self) -> &SocketSettings {
        &self.settings
    }

    /// Send `payload` to `host:port` and collect the reply.
    ///
    /// Reading stops at EOF, at `max_recv_bytes`, or when a read stays idle
    /// for `timeout`. An idle read ends the exchange normally, so a peer that
    /// never answers yields an empty body. Only the connect and the send
    /// report [`TransportError::Timeout`].
    pub async fn send(
        &self,
        host: &str,
        port: u16,
        use_tls: bool,
        payload: &[u8],
    ) -> TransportResult {
        let started = Instant::now();
        let timeout = self.settings.timeout;
        let connector = use_tls.then_some(&self.tls);
        let mut stream = with_deadline(timeout, net::connect(host, port, connector)).await?;

        match tokio::time::timeout(timeout, stream.write_all(payload)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                // the peer may have answered and closed already; read what is there
                warn!(host, port, error = %e, "socket closed while sending");
            }
            Err(_) => {
                warn!(host, port, bytes = payload.len(), "peer stopped reading, send timed out");
                return Err(TransportError::Timeout(timeout));
            }
        }

        let max = self.settings.max_recv_bytes;
        let mut chunk = vec![0u8; self.settings.recv_chunk_bytes.max(1)];
        let mut received = Vec::with_capacity(chunk.len());

        while received.len() < max {
            let want = chunk.len().min(max - received.len());
            match tokio::time::timeout(timeout, stream.read(&mut chunk[..want])).await {
                Ok(Ok(0)) => break,
                Ok(Ok(n)) => received.extend_from_slice(&chunk[..n]),
                Ok(Err(e)) if received.is_empty() => return Err(TransportError::Io(e)),
                Ok(Err(e)) => {
                    warn!(host, port, error = %e, received = received.len(), "error while reading");
                    break;
                }
                Err(_) => {
                    debug!(host, port, received = received.len(), "read idle, ending exchange");
                    break;
                }
            }
        }

        let _ = tokio::time::timeout(timeout, stream.shutdown()).await;

        Ok(TransportResponse {
            status: None,
            body: Bytes::from(received),
            elapsed: started.elapsed(),
        })
    }
}

impl Transport for SocketTransport {
    fn name(&self) -> &'static str {
        "socket"
    }

    async fn issue(&self, request: &ParsedRequest) -> TransportResult {
        self.send(
            request.host(),
            request.port(),
            request.tls(),
            request.raw().as_bytes(),
        )
        .await
    }
}
