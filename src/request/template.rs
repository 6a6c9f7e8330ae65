//! Request templates and injection points.

use crate::config::RequestConfig;
use crate::request::corpus::Corpus;
use crate::request::parser;
use crate::request::types::{MalformedRequest, ParsedRequest, DEFAULT_NEWLINE};

/// One pasted request plus the settings needed to parse it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTemplate {
    raw: String,
    newline: String,
    tls: Option<bool>,
    host: Option<String>,
    port: Option<u16>,
    remove_headers: Option<Vec<String>>,
}

impl RequestTemplate {
    /// Template with `\n` line endings, TLS unresolved and no overrides.
    pub fn new(raw: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            newline: DEFAULT_NEWLINE.to_string(),
            tls: None,
            host: None,
            port: None,
            remove_headers: None,
        }
    }

    /// Template carrying the request settings from configuration.
    pub fn from_config(raw: impl Into<String>, config: &RequestConfig) -> Self {
        Self {
            raw: raw.into(),
            newline: config.newline.clone(),
            tls: config.tls,
            host: config.host.clone(),
            port: config.port,
            remove_headers: Some(config.remove_headers.clone()),
        }
    }

    pub fn with_newline(mut self, newline: impl Into<String>) -> Self {
        self.newline = newline.into();
        self
    }

    pub fn with_tls(mut self, tls: bool) -> Self {
        self.tls = Some(tls);
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_remove_headers(mut self, names: Vec<String>) -> Self {
        self.remove_headers = Some(names);
        self
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Same settings, different text.
    pub fn with_raw(&self, raw: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            ..self.clone()
        }
    }

    /// Parse into a [`ParsedRequest`].
    pub fn parse(&self) -> Result<ParsedRequest, MalformedRequest> {
        parser::parse(
            &self.raw,
            self.tls,
            self.host.as_deref(),
            self.port,
            self.remove_headers.as_deref(),
            &self.newline,
        )
    }
}

/// Where a corpus value is spliced into a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Injection {
    /// Text before and after the injection point.
    Split { start: String, end: String },
    /// Template without an injection point; every value yields the same text.
    Constant(String),
}

impl Injection {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self::Split {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Split `text` at the first occurrence of `marker`.
    ///
    /// A second marker, when present, closes the injection point and the
    /// text between the two is discarded, so `a§default§b` becomes
    /// `a` + value + `b`.
    pub fn from_marked(text: &str, marker: &str) -> Self {
        if marker.is_empty() {
            return Self::Constant(text.to_string());
        }
        match text.split_once(marker) {
            Some((start, rest)) => {
                let end = rest.split_once(marker).map_or(rest, |(_, end)| end);
                Self::new(start, end)
            }
            None => Self::Constant(text.to_string()),
        }
    }

    /// Render the template text for one value.
    pub fn render(&self, value: &str) -> String {
        match self {
            Self::Split { start, end } => {
                let mut out = String::with_capacity(start.len() + value.len() + end.len());
                out.push_str(start);
                out.push_str(value);
                out.push_str(end);
                out
            }
            Self::Constant(text) => text.clone(),
        }
    }

    pub fn has_injection_point(&self) -> bool {
        matches!(self, Self::Split { .. })
    }
}

/// Render and parse one request per corpus value, in corpus order.
///
/// Lazy: each value is spliced into `injection` and parsed with the settings
/// of `settings` only when the iterator is advanced.
pub fn render_jobs<'a>(
    injection: &'a Injection,
    corpus: &'a Corpus,
    settings: &'a RequestTemplate,
) -> impl Iterator<Item = Result<ParsedRequest, MalformedRequest>> + 'a {
    corpus
        .values()
        .map(move |value| settings.with_raw(injection.render(&value)).parse())
}

#[cfg(test)]
mod tests {
    use super::*;

    const START: &str = "GET / HTTP/1.1\nHost: www.example.org\nUser-Agent: Firefox/63.";
    const END: &str = "\nAccept: */*\nConnection: close\n\n";

    #[test]
    fn render_splices_value() {
        let injection = Injection::new(START, END);
        let text = injection.render("1");
        assert!(text.contains("User-Agent: Firefox/63.1\n"));

        let req = RequestTemplate::new(text).with_tls(false).parse().unwrap();
        assert_eq!(req.header("user-agent"), Some("Firefox/63.1"));
        assert_eq!(req.header("connection"), None);
    }

    #[test]
    fn marker_splits_template() {
        let injection = Injection::from_marked("GET /?id=§ HTTP/1.1", "§");
        assert_eq!(injection, Injection::new("GET /?id=", " HTTP/1.1"));
        assert_eq!(injection.render("42"), "GET /?id=42 HTTP/1.1");
    }

    #[test]
    fn paired_markers_discard_default() {
        let injection = Injection::from_marked("GET /?id=§7§ HTTP/1.1", "§");
        assert_eq!(injection.render("42"), "GET /?id=42 HTTP/1.1");
    }

    #[test]
    fn missing_marker_is_constant() {
        let injection = Injection::from_marked("GET / HTTP/1.1", "§");
        assert!(!injection.has_injection_point());
        assert_eq!(injection.render("x"), "GET / HTTP/1.1");
    }

    #[test]
    fn overrides_flow_into_parse() {
        let req = RequestTemplate::new("GET /a HTTP/1.1\r\nHost: ignored\r\n\r\n")
            .with_newline("\r\n")
            .with_tls(true)
            .with_host("127.0.0.1")
            .with_port(8443)
            .parse()
            .unwrap();
        assert_eq!(req.url(), "https://127.0.0.1:8443/a");
    }

    #[test]
    fn from_config_uses_configured_deny_list() {
        let config = RequestConfig {
            remove_headers: vec!["x-secret".into()],
            tls: Some(false),
            ..RequestConfig::default()
        };
        let raw = "GET / HTTP/1.1\nHost: h\nX-Secret: 1\nConnection: close\n\n";
        let req = RequestTemplate::from_config(raw, &config).parse().unwrap();
        assert_eq!(req.header("x-secret"), None);
        assert_eq!(req.header("connection"), Some("close"));
    }

    #[test]
    fn render_jobs_parses_each_value_in_order() {
        let injection = Injection::from_marked("GET § HTTP/1.1\nHost: h\n\n", "§");
        let corpus = Corpus::Values(vec!["/a".into(), "b".into(), "/d".into()]);
        let settings = RequestTemplate::new("").with_tls(false);

        let jobs: Vec<_> = render_jobs(&injection, &corpus, &settings).collect();
        assert_eq!(jobs.len(), 3);
        assert_eq!(jobs[0].as_ref().unwrap().url(), "http://h/a");
        assert_eq!(
            jobs[1].as_ref().unwrap_err(),
            &MalformedRequest::PathNotAbsolute("b".into())
        );
        assert_eq!(jobs[2].as_ref().unwrap().path(), "/d");
    }
}
