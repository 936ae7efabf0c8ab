//! Client for the reviews service.

use anyhow::Result;
use async_trait::async_trait;
use log::debug;
use reqwest::Url;

use super::{ReviewSource, ensure_base_url, with_query};
use crate::domain::Review;
use crate::http::{FetchContext, FetchError, HttpClient};

/// Query parameter the reviews service filters on.
const MOVIE_ID_PARAM: &str = "movieInfoId";

/// Talks to `GET {base}?movieInfoId={movieId}`.
#[derive(Clone)]
pub struct ReviewsClient {
    http_client: HttpClient,
    base_url: Url,
}

impl ReviewsClient {
    pub fn new(http_client: HttpClient, base_url: Url) -> Result<Self> {
        ensure_base_url(&base_url)?;
        Ok(Self {
            http_client,
            base_url,
        })
    }
}

#[async_trait]
impl ReviewSource for ReviewsClient {
    #[tracing::instrument(skip(self))]
    async fn fetch_reviews(&self, movie_id: &str) -> Result<Vec<Review>, FetchError> {
        let url = with_query(&self.base_url, MOVIE_ID_PARAM, movie_id);
        debug!("Fetching reviews from {}...", url);

        let reviews = self
            .http_client
            .get_json::<Vec<Review>>(url, FetchContext::Reviews)
            .await?
            .unwrap_or_default();

        debug!("Found {} reviews for movie {}", reviews.len(), movie_id);
        Ok(reviews)
    }
}
