//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (concurrency > 0, timeouts > 0, sane buffers)
//! - Refuse certificate verification, which this tool never performs
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: SenderConfig → Result<(), Vec<ValidationError>>
//! - Runs after CLI overrides are applied, before anything is sent

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::SenderConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &SenderConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.dispatch.concurrency == 0 {
        errors.push(ValidationError::new("dispatch.concurrency", "must be at least 1"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be at least 1"));
    }
    if config.socket.max_recv_bytes == 0 {
        errors.push(ValidationError::new("socket.max_recv_bytes", "must be at least 1"));
    }
    if config.socket.recv_chunk_bytes == 0 {
        errors.push(ValidationError::new("socket.recv_chunk_bytes", "must be at least 1"));
    } else if config.socket.recv_chunk_bytes > config.socket.max_recv_bytes {
        errors.push(ValidationError::new(
            "socket.recv_chunk_bytes",
            format!("must not exceed socket.max_recv_bytes ({})", config.socket.max_recv_bytes),
        ));
    }
    if config.request.newline.is_empty() {
        errors.push(ValidationError::new("request.newline", "must not be empty"));
    }
    if config.request.port == Some(0) {
        errors.push(ValidationError::new("request.port", "must not be 0"));
    }
    if matches!(config.request.host.as_deref(), Some("")) {
        errors.push(ValidationError::new("request.host", "must not be empty"));
    }
    if config.client.verify_tls {
        errors.push(ValidationError::new(
            "client.verify_tls",
            "certificate verification is not supported",
        ));
    }
    if let Some(proxy) = &config.client.proxy {
        if !is_host_port(proxy) {
            errors.push(ValidationError::new(
                "client.proxy",
                format!("expected host:port, got {proxy:?}"),
            ));
        }
    }
    if let Some(addr) = &config.observability.metrics_address {
        if addr.parse::<SocketAddr>().is_err() {
            errors.push(ValidationError::new(
                "observability.metrics_address",
                format!("not a socket address: {addr:?}"),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_host_port(value: &str) -> bool {
    match value.rsplit_once(':') {
        Some((host, port)) => !host.is_empty() && port.parse::<u16>().is_ok_and(|p| p != 0),
        None => false,
    }
}
