//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     Ctrl-C → StopSignal::trigger
//!
//! Stop (shutdown.rs):
//!     trigger → dispatcher stops enumerating → in-flight jobs finish
//!             → batch completes with done == added
//! ```
//!
//! # Design Decisions
//! - No mid-flight cancellation: a stop only prevents new jobs from starting

pub mod shutdown;
pub mod signals;

pub use shutdown::StopSignal;
pub use signals::spawn_interrupt_handler;
