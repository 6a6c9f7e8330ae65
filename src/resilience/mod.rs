//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Transport call:
//!     → timeouts.rs (enforce connect/exchange deadline)
//!     → Elapsed deadline becomes the call's terminal failure
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every network call has a deadline
//! - Failed requests are never retried

pub mod timeouts;
