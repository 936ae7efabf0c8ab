//! Client for the movie-info service.

use anyhow::Result;
use async_trait::async_trait;
use log::debug;
use reqwest::Url;

use super::{MovieInfoSource, MovieInfoStream, ensure_base_url, with_segment};
use crate::domain::MovieInfo;
use crate::http::{FetchContext, FetchError, HttpClient};

/// Talks to `GET {base}/{movieId}` and `GET {base}/stream`.
#[derive(Clone)]
pub struct MoviesInfoClient {
    http_client: HttpClient,
    base_url: Url,
}

impl MoviesInfoClient {
    pub fn new(http_client: HttpClient, base_url: Url) -> Result<Self> {
        ensure_base_url(&base_url)?;
        Ok(Self {
            http_client,
            base_url,
        })
    }
}

#[async_trait]
impl MovieInfoSource for MoviesInfoClient {
    #[tracing::instrument(skip(self))]
    async fn fetch_movie_info(&self, movie_id: &str) -> Result<MovieInfo, FetchError> {
        let url = with_segment(&self.base_url, movie_id);
        debug!("Fetching movie info from {}...", url);

        let context = FetchContext::MovieInfo { movie_id };
        self.http_client
            .get_json::<MovieInfo>(url, context)
            .await?
            .ok_or_else(|| FetchError::movie_not_found(movie_id))
    }

    #[tracing::instrument(skip(self))]
    async fn stream_movie_infos(&self) -> Result<MovieInfoStream, FetchError> {
        let url = with_segment(&self.base_url, "stream");
        debug!("Opening movie info stream at {}...", url);

        self.http_client
            .get_ndjson_stream::<MovieInfo>(url, FetchContext::MovieInfoStream)
            .await
    }
}
