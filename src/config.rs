//! Gateway configuration and construction of the upstream clients.
//!
//! Configuration values only describe where the upstreams live and how
//! patiently to talk to them; the clients are built from them here.

use std::time::Duration;

use anyhow::{Context, Result};
use log::debug;
use reqwest::{Client, Url};

use crate::application::MovieAggregator;
use crate::client::{MoviesInfoClient, ReviewsClient};
use crate::http::{HttpClient, RetryPolicy};

pub const DEFAULT_MOVIE_INFO_URL: &str = "http://localhost:8080/v1/movieinfos";
pub const DEFAULT_REVIEWS_URL: &str = "http://localhost:8081/v1/reviews";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

const USER_AGENT: &str = concat!("movies-service/", env!("MOVIES_SERVICE_VERSION"));

/// Where the upstream services live and how requests to them behave.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayConfig {
    pub movie_info_url: Url,
    pub reviews_url: Url,
    pub request_timeout: Duration,
    pub retry: RetryPolicy,
}

impl GatewayConfig {
    /// Parses both base URLs; everything else takes its default.
    pub fn new(movie_info_url: &str, reviews_url: &str) -> Result<Self> {
        Ok(Self {
            movie_info_url: parse_base_url(movie_info_url)?,
            reviews_url: parse_base_url(reviews_url)?,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            retry: RetryPolicy::default(),
        })
    }

    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Build the aggregator and both clients over one shared connection pool.
    pub fn build_aggregator(&self) -> Result<MovieAggregator<MoviesInfoClient, ReviewsClient>> {
        let http_client = build_http_client(self.request_timeout)?;
        let movie_info = MoviesInfoClient::new(http_client.clone(), self.movie_info_url.clone())?;
        let reviews = ReviewsClient::new(http_client, self.reviews_url.clone())?;
        Ok(MovieAggregator::new(movie_info, reviews, self.retry))
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).with_context(|| format!("Invalid upstream URL: {}", raw))?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        anyhow::bail!("Upstream URL must be an http(s) URL: {}", raw);
    }
    Ok(url)
}

/// Build an HTTP client with the gateway user agent and a request timeout
pub fn build_http_client(timeout: Duration) -> Result<HttpClient> {
    let client = Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .context("Failed to build HTTP client")?;

    debug!("HTTP client configured with {:?} timeout", timeout);
    Ok(HttpClient::new(client))
}
