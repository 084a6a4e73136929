//! Shared HTTP client construction and retry policy.
//!
//! Every outbound call in the crate goes through [`send_with_retry`]: one
//! bounded-timeout attempt, then a single retry after a short backoff when
//! the failure looks transient.

use std::time::Duration;

use log::warn;
use reqwest::{Client, RequestBuilder, Response};

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const RETRY_BACKOFF: Duration = Duration::from_millis(500);

/// Build the crate's HTTP client with a bounded timeout.
pub fn build_client(timeout_secs: u64) -> Client {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent("Mozilla/5.0 (compatible; SnackSyncBot/1.0)")
        .build()
        .expect("Failed to create HTTP client")
}

/// Send a request, retrying once when the first attempt times out, fails to
/// connect, or comes back with a 5xx status. Bodies with streams cannot be
/// cloned; those requests are sent exactly once.
pub async fn send_with_retry(request: RequestBuilder) -> Result<Response, reqwest::Error> {
    let retry = request.try_clone();
    match request.send().await {
        Ok(response) if response.status().is_server_error() => match retry {
            Some(second) => {
                warn!(
                    "Request returned status {}, retrying once",
                    response.status()
                );
                tokio::time::sleep(RETRY_BACKOFF).await;
                second.send().await
            }
            None => Ok(response),
        },
        Ok(response) => Ok(response),
        Err(err) if err.is_timeout() || err.is_connect() => match retry {
            Some(second) => {
                warn!("Request failed ({err}), retrying once");
                tokio::time::sleep(RETRY_BACKOFF).await;
                second.send().await
            }
            None => Err(err),
        },
        Err(err) => Err(err),
    }
}
