//! # Timeout Utilities
//!
//! Async timeout wrappers. The protocol core itself never imposes
//! deadlines; callers bound an operation by wrapping it here, and expiry
//! cancels the wrapped future by dropping it.

use crate::error::{ProtocolError, Result};
use std::future::Future;
use std::time::Duration;

/// Default timeout for connection-level operations.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Run `future` under a deadline, mapping expiry to
/// [`ProtocolError::Timeout`]. On expiry the future is dropped, so whatever
/// cleanup it carries (pending-exchange guards, gate permits) runs.
pub async fn with_timeout_error<T, F>(future: F, duration: Duration) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(duration, future).await {
        Ok(result) => result,
        Err(_) => Err(ProtocolError::Timeout),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn completes_inside_deadline() {
        let result = with_timeout_error(async { Ok(7) }, Duration::from_secs(1)).await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test]
    async fn expiry_maps_to_timeout_error() {
        let result: Result<()> = with_timeout_error(
            async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(())
            },
            Duration::from_millis(10),
        )
        .await;
        assert!(matches!(result, Err(ProtocolError::Timeout)));
    }
}
