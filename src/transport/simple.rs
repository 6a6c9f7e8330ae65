//! Simple HTTP transport.
//!
//! One fresh HTTP/1.1 connection per request, driven by hyper's low-level
//! client. Only GET and POST are issued, redirects are not followed and a
//! non-2xx status is reported as a failure.

use std::time::{Duration, Instant};

use bytes::Bytes;
use http_body_util::{BodyExt, Either, Empty, Full};
use hyper::header::{CONTENT_LENGTH, HOST};
use hyper::{Method, Request};
use hyper_util::rt::TokioIo;
use tokio_rustls::TlsConnector;
use tracing::debug;

use crate::net::{self, tls};
use crate::request::ParsedRequest;
use crate::resilience::timeouts::with_deadline;
use crate::transport::types::{TransportError, TransportResponse, TransportResult};
use crate::transport::Transport;

type RequestBody = Either<Full<Bytes>, Empty<Bytes>>;

pub struct SimpleTransport {
    timeout: Duration,
    tls: TlsConnector,
}

impl std::fmt::Debug for SimpleTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimpleTransport")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl SimpleTransport {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        Ok(Self {
            timeout,
            tls: tls::insecure_connector()?,
        })
    }

    async fn exchange(&self, method: Method, request: &ParsedRequest) -> TransportResult {
        let started = Instant::now();
        let connector = request.tls().then_some(&self.tls);
        let stream = net::connect(request.host(), request.port(), connector).await?;

        let (mut sender, conn) = hyper::client::conn::http1::handshake(TokioIo::new(stream))
            .await
            .map_err(http_error)?;

        // Drive the connection in the background.
        tokio::spawn(async move {
            if let Err(e) = conn.await {
                debug!(error = %e, "connection ended with error");
            }
        });

        let http_request = build_request(method, request)?;
        let response = sender.send_request(http_request).await.map_err(http_error)?;
        let status = response.status();
        let body = response
            .into_body()
            .collect()
            .await
            .map_err(http_error)?
            .to_bytes();

        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(TransportResponse {
            status: Some(status.as_u16()),
            body,
            elapsed: started.elapsed(),
        })
    }
}

impl Transport for SimpleTransport {
    fn name(&self) -> &'static str {
        "simple"
    }

    async fn issue(&self, request: &ParsedRequest) -> TransportResult {
        let method = match request.method() {
            "GET" => Method::GET,
            "POST" => Method::POST,
            other => return Err(TransportError::UnsupportedMethod(other.to_string())),
        };
        with_deadline(self.timeout, self.exchange(method, request)).await
    }
}

fn build_request(
    method: Method,
    request: &ParsedRequest,
) -> Result<Request<RequestBody>, TransportError> {
    let mut builder = Request::builder().method(method).uri(request.path());
    for (name, value) in request.headers() {
        builder = builder.header(name.as_str(), value.as_str());
    }
    if request.header("host").is_none() {
        builder = builder.header(HOST, request.authority());
    }
    if let (Some(body), None) = (request.body(), request.header("content-length")) {
        // hyper omits the length of an empty body unless it is set here
        builder = builder.header(CONTENT_LENGTH, body.len());
    }

    let body = match request.body() {
        Some(body) => Either::Left(Full::new(Bytes::copy_from_slice(body.as_bytes()))),
        None => Either::Right(Empty::new()),
    };

    builder
        .body(body)
        .map_err(|e| TransportError::InvalidRequest(e.to_string()))
}

fn http_error(e: hyper::Error) -> TransportError {
    TransportError::Http(e.to_string())
}
