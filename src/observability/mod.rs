//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! parser, dispatcher, transports produce:
//!     → logging.rs (structured log events, stderr)
//!     → metrics.rs (counters, gauge, histogram)
//!
//! Consumers:
//!     → terminal or log aggregation
//!     → Prometheus scrape (optional)
//! ```
//!
//! # Design Decisions
//! - Every batch carries a UUID `batch_id` through its log events
//! - Metrics are cheap when no exporter is installed

pub mod logging;
pub mod metrics;

pub use self::logging::init_logging;
pub use self::metrics::init_metrics;
