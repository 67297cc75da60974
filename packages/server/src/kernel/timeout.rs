use std::future::Future;
use std::time::Duration;

use anyhow::{anyhow, Result};

/// Bound an outbound call. Elapsing is reported as an ordinary error so
/// callers treat a hung dependency the same as a failing one.
pub async fn with_timeout<T, F>(duration: Duration, operation: &'static str, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(duration, fut).await {
        Ok(result) => result,
        Err(_) => Err(anyhow!("{} timed out after {:?}", operation, duration)),
    }
}
