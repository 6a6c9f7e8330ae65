//! Raw HTTP request replay library.
//!
//! Parses pasted HTTP requests and sends one per corpus value through a
//! pluggable transport, with a fixed number of requests in flight.

pub mod config;
pub mod dispatch;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod report;
pub mod request;
pub mod resilience;
pub mod transport;

pub use config::schema::SenderConfig;
pub use dispatch::{run_batch, BatchSummary, DispatchError, Dispatcher, ResultSink};
pub use lifecycle::StopSignal;
pub use request::{parse, Corpus, Injection, MalformedRequest, ParsedRequest, RequestTemplate};
pub use transport::{AnyTransport, Transport, TransportError, TransportResponse};
