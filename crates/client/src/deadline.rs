//! Explicit per-call deadlines.
//!
//! A hung request otherwise never settles. Expiry is reported as
//! [`ApiError::Timeout`], which callers treat as a transport failure.

use std::future::Future;
use std::time::Duration;

use crate::error::ApiError;

/// Run `call`, failing with [`ApiError::Timeout`] once `limit` elapses.
pub async fn within<T, F>(limit: Duration, call: F) -> Result<T, ApiError>
where
    F: Future<Output = Result<T, ApiError>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(ApiError::Timeout(limit)),
    }
}
