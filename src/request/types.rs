//! Request descriptor and parse error definitions.

use std::fmt;
use thiserror::Error;

/// Header names dropped during parsing when the caller passes no list.
///
/// The transports recompute or refuse these.
pub const DEFAULT_REMOVE_HEADERS: &[&str] = &[
    "content-length",
    "accept-encoding",
    "keep-alive",
    "connection",
];

/// Line terminator assumed for pasted requests.
pub const DEFAULT_NEWLINE: &str = "\n";

/// Errors raised while parsing a raw request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedRequest {
    /// Input was empty.
    #[error("request is empty")]
    MissingRequestLine,

    /// First line is not a `METHOD TARGET VERSION` triple.
    #[error("request line is not `METHOD TARGET VERSION`: {0:?}")]
    InvalidRequestLine(String),

    /// Request target does not start with `/`.
    #[error("request target must start with '/': {0:?}")]
    PathNotAbsolute(String),

    /// A header line has no `": "` separator.
    #[error("header line has no \": \" separator: {0:?}")]
    InvalidHeaderLine(String),

    /// The Host header could not be split into host and port.
    #[error("invalid Host header value: {0:?}")]
    InvalidHostHeader(String),

    /// Neither an explicit host nor a Host header was found.
    #[error("no destination: pass a host explicitly or include a Host header")]
    MissingHost,
}

/// A request recovered from pasted text.
///
/// Built once per corpus element by [`crate::request::parse`] and never
/// mutated afterwards. `path` always starts with `/`, `headers` never holds
/// a denied name and `url` agrees with `tls`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRequest {
    pub(crate) raw: String,
    pub(crate) newline: String,
    pub(crate) method: String,
    pub(crate) path: String,
    pub(crate) protocol: String,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) body: Option<String>,
    pub(crate) host: String,
    pub(crate) port: u16,
    pub(crate) tls: bool,
    pub(crate) url: String,
}

impl ParsedRequest {
    /// The unmodified input text, as sent by the raw socket transport.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn newline(&self) -> &str {
        &self.newline
    }

    /// Uppercased method token.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Request target, always starting with `/`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Trailing request-line token, e.g. `HTTP/1.1`.
    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    /// Kept headers in their original order.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// First header with the given name, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Body text; `None` when the request had no body at all.
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn tls(&self) -> bool {
        self.tls
    }

    /// Absolute URL for transports that address by URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// `host:port` authority, with IPv6 hosts bracketed.
    pub fn authority(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    /// Render the request back to raw text using its own newline.
    ///
    /// Denied headers are not restored, so the output is what the HTTP
    /// transports would put on the wire rather than the original input.
    pub fn to_raw(&self) -> String {
        let nl = self.newline.as_str();
        let mut out = format!("{} {} {}", self.method, self.path, self.protocol);
        for (name, value) in &self.headers {
            out.push_str(nl);
            out.push_str(name);
            out.push_str(": ");
            out.push_str(value);
        }
        out.push_str(nl);
        out.push_str(nl);
        if let Some(body) = &self.body {
            out.push_str(body);
        }
        out
    }
}

impl fmt::Display for ParsedRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Host: {}", self.host)?;
        writeln!(f, "Port: {}", self.port)?;
        writeln!(f, "TLS: {}", self.tls)?;
        writeln!(f, "Newline: {:?}", self.newline)?;
        writeln!(f, "Method: {}", self.method)?;
        writeln!(f, "URL: {}", self.url)?;
        writeln!(f, "Headers: {:?}", self.headers)?;
        writeln!(f, "Body: {:?}", self.body)
    }
}
