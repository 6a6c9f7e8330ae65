//! Raw request subsystem.
//!
//! # Data Flow
//! ```text
//! template text (START + value + END)
//!     → template.rs (RequestTemplate: raw text + newline + tls/host/port overrides)
//!     → parser.rs (request line, headers, body, destination inference)
//!     → ParsedRequest (immutable, one per corpus element)
//!     → dispatch subsystem
//! ```
//!
//! # Design Decisions
//! - Parsing is position based and lenient; it is not an RFC parser
//! - Templates are re-rendered and re-parsed for every corpus value
//! - Absent body and empty body are different things
//! - A fixed deny-list of headers is dropped while parsing

pub mod corpus;
pub mod parser;
pub mod template;
pub mod types;

pub use corpus::Corpus;
pub use parser::{build_url, default_port, parse};
pub use template::{render_jobs, Injection, RequestTemplate};
pub use types::{MalformedRequest, ParsedRequest, DEFAULT_NEWLINE, DEFAULT_REMOVE_HEADERS};
