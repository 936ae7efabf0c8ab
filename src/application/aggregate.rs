//! Aggregate use case - joins movie info and reviews into one record.
//!
//! Movie info is fetched first. Reviews are only requested once it resolved,
//! so a missing or failing movie never costs a reviews call.

use log::{debug, info};
use tokio_util::sync::CancellationToken;

use crate::client::{MovieInfoSource, MovieInfoStream, ReviewSource};
use crate::domain::AggregatedMovie;
use crate::http::{FetchError, RetryPolicy};

/// Fetches a movie and its reviews from the two upstream services.
pub struct MovieAggregator<M: MovieInfoSource, R: ReviewSource> {
    movie_info: M,
    reviews: R,
    retry: RetryPolicy,
}

impl<M: MovieInfoSource, R: ReviewSource> MovieAggregator<M, R> {
    pub fn new(movie_info: M, reviews: R, retry: RetryPolicy) -> Self {
        Self {
            movie_info,
            reviews,
            retry,
        }
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Fetch `movie_id` with its reviews.
    pub async fn get_aggregated_movie(
        &self,
        movie_id: &str,
    ) -> Result<AggregatedMovie, FetchError> {
        self.get_aggregated_movie_with_cancel(movie_id, &CancellationToken::new())
            .await
    }

    /// Same as [`get_aggregated_movie`](Self::get_aggregated_movie), but the
    /// request stops as soon as `cancel` fires, even mid-fetch.
    #[tracing::instrument(skip(self, cancel))]
    pub async fn get_aggregated_movie_with_cancel(
        &self,
        movie_id: &str,
        cancel: &CancellationToken,
    ) -> Result<AggregatedMovie, FetchError> {
        let movie_info = self
            .retry
            .run(
                "Fetching movie info",
                cancel,
                FetchError::is_retryable,
                || self.movie_info.fetch_movie_info(movie_id),
            )
            .await?;

        let reviews = self
            .retry
            .run(
                "Fetching reviews",
                cancel,
                FetchError::is_retryable,
                || self.reviews.fetch_reviews(movie_id),
            )
            .await?;

        info!(
            "Aggregated movie {} with {} reviews",
            movie_id,
            reviews.len()
        );
        Ok(AggregatedMovie::new(movie_info, reviews))
    }

    /// Open the movie-info stream, retrying while the upstream answers 5xx.
    #[tracing::instrument(skip(self, cancel))]
    pub async fn stream_movie_infos(
        &self,
        cancel: &CancellationToken,
    ) -> Result<MovieInfoStream, FetchError> {
        debug!("Subscribing to the movie info stream");
        self.retry
            .run(
                "Opening movie info stream",
                cancel,
                FetchError::is_retryable,
                || self.movie_info.stream_movie_infos(),
            )
            .await
    }
}
