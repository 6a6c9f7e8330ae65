//! Lenient parser for pasted HTTP requests.
//!
//! # Responsibilities
//! - Split head from body on the first doubled newline
//! - Recover method, target and protocol from the request line
//! - Drop deny-listed headers, keeping the order of the rest
//! - Infer host and port from the Host header when none were given
//!
//! # Design Decisions
//! - Inference only runs when both host and port are absent, so a partial
//!   override is never silently replaced by the header
//! - The first Host header wins
//! - A missing body and an empty body both parse to `None`

use tracing::{debug, warn};

use crate::request::types::{MalformedRequest, ParsedRequest, DEFAULT_REMOVE_HEADERS};

/// Port implied by the scheme.
pub fn default_port(tls: bool) -> u16 {
    if tls {
        443
    } else {
        80
    }
}

/// Build the absolute URL for a destination, omitting a scheme-default port.
pub fn build_url(tls: bool, host: &str, port: u16, path: &str) -> String {
    let scheme = if tls { "https" } else { "http" };
    let host = if host.contains(':') {
        format!("[{host}]")
    } else {
        host.to_string()
    };
    if port == default_port(tls) {
        format!("{scheme}://{host}{path}")
    } else {
        format!("{scheme}://{host}:{port}{path}")
    }
}

/// Parse a pasted request.
///
/// `tls = None` falls back to plain HTTP with a warning. `remove_headers =
/// None` uses [`DEFAULT_REMOVE_HEADERS`]. `newline` is the terminator the
/// text was written with; the head/body separator is two of them.
pub fn parse(
    raw: &str,
    tls: Option<bool>,
    host: Option<&str>,
    port: Option<u16>,
    remove_headers: Option<&[String]>,
    newline: &str,
) -> Result<ParsedRequest, MalformedRequest> {
    let separator = newline.repeat(2);
    let (head, body) = match raw.split_once(separator.as_str()) {
        Some((head, body)) => (head, (!body.is_empty()).then(|| body.to_string())),
        None => {
            debug!("request has no body");
            (raw, None)
        }
    };

    let mut lines = head.split(newline);
    let request_line = lines
        .next()
        .filter(|line| !line.is_empty())
        .ok_or(MalformedRequest::MissingRequestLine)?;
    let (method, target, protocol) = split_request_line(request_line)?;

    let tls = tls.unwrap_or_else(|| {
        warn!("TLS not specified, defaulting to plain HTTP");
        false
    });

    let denied: Vec<String> = match remove_headers {
        Some(names) => names.iter().map(|n| n.to_ascii_lowercase()).collect(),
        None => DEFAULT_REMOVE_HEADERS.iter().map(|n| n.to_string()).collect(),
    };

    let infer_destination = host.is_none() && port.is_none();
    let mut inferred = None;
    let mut headers = Vec::new();

    for line in lines {
        // only the last line of a head without a body can be empty
        if line.is_empty() {
            continue;
        }
        let (name, value) = line
            .split_once(": ")
            .ok_or_else(|| MalformedRequest::InvalidHeaderLine(line.to_string()))?;

        if infer_destination && inferred.is_none() && name.eq_ignore_ascii_case("host") {
            inferred = Some(split_host_header(value, tls)?);
        }

        if denied.iter().any(|d| name.eq_ignore_ascii_case(d)) {
            debug!(header = %name, "dropping denied header");
        } else {
            headers.push((name.to_string(), value.to_string()));
        }
    }

    let (host, port) = match (host, port, inferred) {
        (_, _, Some(destination)) => destination,
        (Some(host), Some(port), None) => (host.to_string(), port),
        (Some(host), None, None) => (host.to_string(), default_port(tls)),
        _ => return Err(MalformedRequest::MissingHost),
    };

    let url = build_url(tls, &host, port, target);

    Ok(ParsedRequest {
        raw: raw.to_string(),
        newline: newline.to_string(),
        method: method.to_ascii_uppercase(),
        path: target.to_string(),
        protocol: protocol.to_string(),
        headers,
        body,
        host,
        port,
        tls,
        url,
    })
}

/// Split `METHOD TARGET VERSION` on the first and the last space.
fn split_request_line(line: &str) -> Result<(&str, &str, &str), MalformedRequest> {
    let invalid = || MalformedRequest::InvalidRequestLine(line.to_string());

    let (method, rest) = line.split_once(' ').ok_or_else(invalid)?;
    let (target, protocol) = rest.rsplit_once(' ').ok_or_else(invalid)?;
    if method.is_empty() || protocol.is_empty() {
        return Err(invalid());
    }
    if !target.starts_with('/') {
        return Err(MalformedRequest::PathNotAbsolute(target.to_string()));
    }
    Ok((method, target, protocol))
}

/// Split a Host header value into host and port.
fn split_host_header(value: &str, tls: bool) -> Result<(String, u16), MalformedRequest> {
    let invalid = || MalformedRequest::InvalidHostHeader(value.to_string());
    let trimmed = value.trim();

    let (host, port) = match trimmed.strip_prefix('[') {
        // bracketed IPv6 literal
        Some(rest) => {
            let (host, tail) = rest.split_once(']').ok_or_else(invalid)?;
            match tail {
                "" => (host, None),
                tail => (host, Some(tail.strip_prefix(':').ok_or_else(invalid)?)),
            }
        }
        None => match trimmed.split_once(':') {
            Some((host, port)) => (host, Some(port)),
            None => (trimmed, None),
        },
    };

    if host.is_empty() {
        return Err(invalid());
    }
    let port = match port {
        Some(port) => port.parse::<u16>().map_err(|_| invalid())?,
        None => default_port(tls),
    };
    Ok((host.to_string(), port))
}
