//! Pooled HTTP client transport.
//!
//! # Responsibilities
//! - Issue any method through a shared `reqwest::Client`
//! - Reuse persistent connections across jobs (pool sized to the budget)
//! - Route through an optional proxy, follow redirects when configured
//!
//! # Design Decisions
//! - Certificates are never verified
//! - Any status code is a successful terminal event
//! - Env proxies are ignored unless a proxy is configured explicitly

use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_LENGTH};
use reqwest::{redirect, Method};
use url::Url;

use crate::request::ParsedRequest;
use crate::transport::types::{TransportError, TransportResponse, TransportResult};
use crate::transport::Transport;

const MAX_REDIRECTS: usize = 10;

/// Settings for [`ClientTransport`].
#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// Total deadline per request, redirects included.
    pub timeout: Duration,
    /// Proxy `host:port`, used for both http and https.
    pub proxy: Option<String>,
    pub follow_redirects: bool,
    /// Idle persistent connections kept per host.
    pub pool_size: usize,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(2),
            proxy: None,
            follow_redirects: true,
            pool_size: 7,
        }
    }
}

#[derive(Debug)]
pub struct ClientTransport {
    client: reqwest::Client,
    timeout: Duration,
}

impl ClientTransport {
    pub fn new(settings: ClientSettings) -> Result<Self, TransportError> {
        let redirect_policy = if settings.follow_redirects {
            redirect::Policy::limited(MAX_REDIRECTS)
        } else {
            redirect::Policy::none()
        };

        let mut builder = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .timeout(settings.timeout)
            .connect_timeout(settings.timeout)
            .pool_max_idle_per_host(settings.pool_size)
            .redirect(redirect_policy);

        builder = match &settings.proxy {
            Some(proxy) => {
                let proxy = reqwest::Proxy::all(format!("http://{proxy}"))
                    .map_err(|e| TransportError::InvalidRequest(format!("proxy {proxy:?}: {e}")))?;
                builder.proxy(proxy)
            }
            None => builder.no_proxy(),
        };

        let client = builder
            .build()
            .map_err(|e| TransportError::Http(e.to_string()))?;

        Ok(Self {
            client,
            timeout: settings.timeout,
        })
    }

    fn map_error(&self, e: reqwest::Error) -> TransportError {
        if e.is_timeout() {
            TransportError::Timeout(self.timeout)
        } else {
            TransportError::Http(e.to_string())
        }
    }
}

impl Transport for ClientTransport {
    fn name(&self) -> &'static str {
        "client"
    }

    async fn issue(&self, request: &ParsedRequest) -> TransportResult {
        let started = Instant::now();
        let method = Method::from_bytes(request.method().as_bytes())
            .map_err(|_| TransportError::InvalidRequest(format!("method {:?}", request.method())))?;
        let url = Url::parse(request.url())
            .map_err(|e| TransportError::InvalidRequest(format!("url {:?}: {e}", request.url())))?;
        let headers = header_map(request)?;

        let mut builder = self.client.request(method, url).headers(headers);
        if let Some(body) = request.body() {
            builder = builder.body(body.to_owned());
        }

        let response = builder.send().await.map_err(|e| self.map_error(e))?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(|e| self.map_error(e))?;

        Ok(TransportResponse {
            status: Some(status),
            body,
            elapsed: started.elapsed(),
        })
    }
}

fn header_map(request: &ParsedRequest) -> Result<HeaderMap, TransportError> {
    let mut headers = HeaderMap::with_capacity(request.headers().len());
    for (name, value) in request.headers() {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| TransportError::InvalidRequest(format!("header name {name:?}: {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| TransportError::InvalidRequest(format!("header value {value:?}: {e}")))?;
        headers.append(name, value);
    }
    if let (Some(body), false) = (request.body(), headers.contains_key(CONTENT_LENGTH)) {
        headers.insert(CONTENT_LENGTH, HeaderValue::from(body.len()));
    }
    Ok(headers)
}
