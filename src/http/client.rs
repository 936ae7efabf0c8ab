//! Single-attempt GET requests with typed error classification.

use futures_util::stream::{self, BoxStream, StreamExt};
use log::debug;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use super::classify::{Classification, FetchContext, classify};
use super::error::FetchError;
use super::ndjson::decode_lines;
use crate::domain::Validate;

/// HTTP client shared by the upstream clients.
///
/// Every call issues exactly one request; retrying is left to
/// [`RetryPolicy`](super::RetryPolicy).
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Creates a new HTTP client wrapping the given reqwest Client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Performs a GET request and decodes the JSON response.
    ///
    /// Returns `Ok(None)` when the classifier reads the response as an empty
    /// result (reviews 404).
    #[tracing::instrument(skip(self, url), fields(url = %url))]
    pub async fn get_json<T>(
        &self,
        url: Url,
        context: FetchContext<'_>,
    ) -> Result<Option<T>, FetchError>
    where
        T: DeserializeOwned + Validate,
    {
        debug!("GET JSON from {}...", url);
        let upstream = context.upstream();

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::transport(upstream, &e))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::transport(upstream, &e))?;

        match classify(status, &String::from_utf8_lossy(&body), context) {
            Classification::Success => {}
            Classification::EmptyResult => {
                debug!("{} answered {}, treating as empty", upstream, status);
                return Ok(None);
            }
            Classification::Failure(e) => {
                debug!("{} answered {}: {}", upstream, status, e);
                return Err(e);
            }
        }

        let result: T =
            serde_json::from_slice(&body).map_err(|e| FetchError::MalformedResponse {
                upstream,
                status,
                message: format!("Failed to parse JSON response: {}", e),
            })?;

        result
            .validate()
            .map_err(|e| FetchError::MalformedResponse {
                upstream,
                status,
                message: e.to_string(),
            })?;

        Ok(Some(result))
    }

    /// Opens a newline-delimited JSON stream.
    ///
    /// Status classification happens before the stream is returned; records
    /// are decoded lazily as the body arrives.
    #[tracing::instrument(skip(self, url), fields(url = %url))]
    pub async fn get_ndjson_stream<T>(
        &self,
        url: Url,
        context: FetchContext<'_>,
    ) -> Result<BoxStream<'static, Result<T, FetchError>>, FetchError>
    where
        T: DeserializeOwned + Validate + Send + 'static,
    {
        debug!("GET NDJSON stream from {}...", url);
        let upstream = context.upstream();

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::transport(upstream, &e))?;

        let status = response.status();
        if status.is_success() {
            return Ok(decode_lines(upstream, status, response.bytes_stream()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::transport(upstream, &e))?;

        match classify(status, &body, context) {
            Classification::Failure(e) => Err(e),
            Classification::EmptyResult | Classification::Success => Ok(stream::empty().boxed()),
        }
    }
}
