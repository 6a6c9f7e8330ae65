//! Network plumbing subsystem.
//!
//! # Data Flow
//! ```text
//! ParsedRequest (host, port, tls)
//!     → connection.rs (TCP connect, connection ID)
//!     → tls.rs (optional TLS wrap, any certificate accepted)
//!     → MaybeTlsStream handed to the socket or simple transport
//! ```
//!
//! # Design Decisions
//! - One connector type for plain and TLS so transports stay agnostic
//! - Certificate verification is off; targets are test systems

pub mod connection;
pub mod tls;

pub use connection::{connect, ConnectionId, MaybeTlsStream};
