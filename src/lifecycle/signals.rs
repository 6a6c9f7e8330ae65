//! OS signal handling.
//!
//! # Responsibilities
//! - Listen for Ctrl-C (SIGINT)
//! - Translate it into a [`StopSignal`] trigger
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - A second Ctrl-C exits immediately without waiting for in-flight jobs

use tokio::task::JoinHandle;
use tracing::{error, warn};

use crate::lifecycle::shutdown::StopSignal;

/// Spawn a task that triggers `stop` on the first Ctrl-C.
pub fn spawn_interrupt_handler(stop: StopSignal) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for Ctrl-C");
            return;
        }
        warn!("interrupt received, finishing in-flight requests");
        stop.trigger();

        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("second interrupt, exiting now");
            std::process::exit(130);
        }
    })
}
