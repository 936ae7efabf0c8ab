//! HTTP plumbing shared by the upstream clients: error classification,
//! single-attempt requests and the retry policy.

mod classify;
mod client;
mod error;
mod ndjson;
mod retry;

pub use classify::{Classification, FetchContext, classify};
pub use client::HttpClient;
pub use error::{FetchError, Upstream};
pub use retry::{Cancelled, MAX_RETRIES, RETRY_DELAY_MS, RetryPolicy};
