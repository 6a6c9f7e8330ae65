//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap transport calls with a deadline
//! - Map an elapsed timer to `TransportError::Timeout`
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Timeout errors are distinct from other errors
//! - A timed-out call is a terminal event like any other failure

use std::future::Future;
use std::time::Duration;

use crate::transport::TransportError;

/// Run `fut` with a deadline of `limit`.
pub async fn with_deadline<F, T>(limit: Duration, fut: F) -> Result<T, TransportError>
where
    F: Future<Output = Result<T, TransportError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(TransportError::Timeout(limit)),
    }
}
