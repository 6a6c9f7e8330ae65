//! raw-sender
//!
//! Replays a pasted HTTP request once per corpus value.
//!
//! # Architecture Overview
//!
//! ```text
//!   template file ──▶ Injection (start │ value │ end)
//!                          │
//!   corpus (a..b | file) ──┤ render + parse per value
//!                          ▼
//!                   ParsedRequest stream
//!                          │
//!                          ▼
//!                ┌──────────────────────┐
//!                │      Dispatcher      │   at most N in flight
//!                │  budget ─▶ transport │   socket | simple | client
//!                └──────────┬───────────┘
//!                           ▼
//!                  ReportSink (stdout)   [RESULT] lines or JSON
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use raw_sender::config::{load_config, validate_config, ConfigError, SenderConfig, TransportKind};
use raw_sender::dispatch::Dispatcher;
use raw_sender::lifecycle::{spawn_interrupt_handler, StopSignal};
use raw_sender::observability::{init_logging, init_metrics};
use raw_sender::report::ReportSink;
use raw_sender::request::{render_jobs, Corpus, Injection, RequestTemplate};
use raw_sender::transport::{AnyTransport, Transport};

#[derive(Parser, Debug)]
#[command(name = "raw-sender")]
#[command(about = "Send a pasted HTTP request once per corpus value", long_about = None)]
struct Cli {
    /// File holding the raw request text
    #[arg(short, long)]
    template: PathBuf,

    /// Token marking the injection point in the template
    #[arg(short, long, default_value = "§")]
    marker: String,

    /// Integer range `a..b`, or a file with one value per line
    #[arg(short, long, default_value = "0..2")]
    corpus: String,

    #[arg(long, value_enum)]
    transport: Option<TransportKind>,

    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Maximum requests in flight
    #[arg(short = 'n', long)]
    concurrency: Option<usize>,

    /// Connect with TLS
    #[arg(long)]
    tls: bool,

    /// Destination host (default: taken from the Host header)
    #[arg(long)]
    host: Option<String>,

    #[arg(long)]
    port: Option<u16>,

    /// The template uses CRLF line endings
    #[arg(long)]
    crlf: bool,

    /// Proxy `host:port` for the client transport
    #[arg(long)]
    proxy: Option<String>,

    /// Print results as JSON lines
    #[arg(long)]
    json: bool,

    /// Bytes of each response shown in the preview
    #[arg(long, default_value_t = 60)]
    preview: usize,

    /// Parse the first request, print it and exit
    #[arg(long)]
    dry_run: bool,
}

impl Cli {
    fn apply(&self, config: &mut SenderConfig) {
        if let Some(transport) = self.transport {
            config.dispatch.transport = transport;
        }
        if let Some(concurrency) = self.concurrency {
            config.dispatch.concurrency = concurrency;
        }
        if self.tls {
            config.request.tls = Some(true);
        }
        if let Some(host) = &self.host {
            config.request.host = Some(host.clone());
        }
        if let Some(port) = self.port {
            config.request.port = Some(port);
        }
        if self.crlf {
            config.request.newline = "\r\n".to_string();
        }
        if let Some(proxy) = &self.proxy {
            config.client.proxy = Some(proxy.clone());
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => SenderConfig::default(),
    };
    cli.apply(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;

    init_logging(&config.logging);

    if let Some(addr) = &config.observability.metrics_address {
        match addr.parse::<SocketAddr>() {
            Ok(addr) => init_metrics(addr),
            Err(e) => {
                tracing::error!(metrics_address = %addr, error = %e, "invalid metrics address")
            }
        }
    }

    if config.request.tls.is_none() {
        tracing::warn!("TLS not specified, defaulting to plain HTTP");
        config.request.tls = Some(false);
    }

    let text = std::fs::read_to_string(&cli.template)?;
    let injection = Injection::from_marked(&text, &cli.marker);
    if !injection.has_injection_point() {
        tracing::warn!(
            marker = %cli.marker,
            "template has no injection point, every request is identical"
        );
    }

    let corpus = match Corpus::parse_range(&cli.corpus) {
        Some(corpus) => corpus,
        None => Corpus::from_lines(&std::fs::read_to_string(&cli.corpus)?),
    };
    let settings = RequestTemplate::from_config("", &config.request);

    if cli.dry_run {
        let value = corpus.values().next().unwrap_or_default();
        let parsed = settings.with_raw(injection.render(&value)).parse()?;
        println!("{parsed}");
        return Ok(());
    }

    let transport = Arc::new(AnyTransport::from_config(&config)?);
    tracing::info!(
        transport = transport.name(),
        concurrency = config.dispatch.concurrency,
        values = corpus.len(),
        "configuration loaded"
    );

    let stop = StopSignal::new();
    spawn_interrupt_handler(stop.clone());

    let dispatcher =
        Dispatcher::new(transport, config.dispatch.concurrency).with_stop(stop.subscribe());
    let sink = ReportSink::new(std::io::stdout(), cli.json, cli.preview);
    let summary = dispatcher
        .run_batch(render_jobs(&injection, &corpus, &settings), sink)
        .await;

    tracing::info!(
        batch_id = %summary.batch_id,
        succeeded = summary.succeeded,
        failed = summary.failed,
        "finished"
    );
    Ok(())
}
