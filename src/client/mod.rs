//! Typed clients for the two upstream services.
//!
//! Each call issues a single request. Retrying is the caller's business, see
//! [`RetryPolicy`](crate::http::RetryPolicy).

mod movie_info;
mod reviews;

use anyhow::Result;
use async_trait::async_trait;
use futures_util::stream::BoxStream;
use reqwest::Url;

use crate::domain::{MovieInfo, Review};
use crate::http::FetchError;

pub use movie_info::MoviesInfoClient;
pub use reviews::ReviewsClient;

/// Lazy, possibly unbounded sequence of movie infos.
pub type MovieInfoStream = BoxStream<'static, Result<MovieInfo, FetchError>>;

/// Source of movie metadata.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MovieInfoSource: Send + Sync {
    /// Fetch the movie info for `movie_id`.
    async fn fetch_movie_info(&self, movie_id: &str) -> Result<MovieInfo, FetchError>;

    /// Open the stream of all movie infos.
    async fn stream_movie_infos(&self) -> Result<MovieInfoStream, FetchError>;
}

/// Source of movie reviews.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReviewSource: Send + Sync {
    /// Fetch every review of `movie_id`; a movie without reviews gives an empty list.
    async fn fetch_reviews(&self, movie_id: &str) -> Result<Vec<Review>, FetchError>;
}

/// Checks that a configured base URL can take extra path segments.
pub(crate) fn ensure_base_url(base_url: &Url) -> Result<()> {
    if base_url.cannot_be_a_base() {
        anyhow::bail!("Invalid upstream base URL: {}", base_url);
    }
    Ok(())
}

/// Appends one escaped path segment to `base`.
pub(crate) fn with_segment(base: &Url, segment: &str) -> Url {
    let mut url = base.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().push(segment);
    }
    url
}

/// Appends one escaped query pair to `base`.
pub(crate) fn with_query(base: &Url, key: &str, value: &str) -> Url {
    let mut url = base.clone();
    url.query_pairs_mut().append_pair(key, value);
    url
}
