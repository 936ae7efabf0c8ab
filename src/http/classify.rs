//! Maps upstream HTTP statuses to typed outcomes.
//!
//! Pure and deterministic: the same status, body and context always give the
//! same [`Classification`].

use reqwest::StatusCode;

use super::error::{FetchError, Upstream};

/// Which fetch produced the response. Decides how a 404 is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchContext<'a> {
    /// `GET {base}/{movie_id}` on the movie-info service
    MovieInfo { movie_id: &'a str },
    /// `GET {base}/stream` on the movie-info service
    MovieInfoStream,
    /// `GET {base}?movieInfoId=..` on the reviews service
    Reviews,
}

impl FetchContext<'_> {
    pub fn upstream(&self) -> Upstream {
        match self {
            FetchContext::MovieInfo { .. } | FetchContext::MovieInfoStream => Upstream::MovieInfo,
            FetchContext::Reviews => Upstream::Reviews,
        }
    }
}

/// Result of looking at an upstream status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// 2xx: decode the body
    Success,
    /// Reviews 404: the movie simply has no reviews
    EmptyResult,
    Failure(FetchError),
}

/// Closed set of status ranges the classifier distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatusBucket {
    Success,
    NotFound,
    ClientError,
    ServerError,
    Unexpected,
}

impl From<StatusCode> for StatusBucket {
    fn from(status: StatusCode) -> Self {
        match status {
            s if s.is_success() => StatusBucket::Success,
            StatusCode::NOT_FOUND => StatusBucket::NotFound,
            s if s.is_client_error() => StatusBucket::ClientError,
            s if s.is_server_error() => StatusBucket::ServerError,
            _ => StatusBucket::Unexpected,
        }
    }
}

/// Classifies an upstream response status together with its body text.
pub fn classify(status: StatusCode, body: &str, context: FetchContext<'_>) -> Classification {
    let upstream = context.upstream();

    match (StatusBucket::from(status), context) {
        (StatusBucket::Success, _) => Classification::Success,
        (StatusBucket::NotFound, FetchContext::Reviews) => Classification::EmptyResult,
        (StatusBucket::NotFound, FetchContext::MovieInfo { movie_id }) => {
            Classification::Failure(FetchError::movie_not_found(movie_id))
        }
        (StatusBucket::NotFound, FetchContext::MovieInfoStream) => {
            Classification::Failure(FetchError::NotFound {
                status,
                message: body.to_string(),
            })
        }
        (StatusBucket::ClientError, _) => Classification::Failure(FetchError::InvalidRequest {
            status,
            message: body.to_string(),
        }),
        (StatusBucket::ServerError, _) => {
            Classification::Failure(FetchError::UpstreamUnavailable {
                upstream,
                status,
                message: body.to_string(),
            })
        }
        (StatusBucket::Unexpected, _) => {
            Classification::Failure(FetchError::MalformedResponse {
                upstream,
                status,
                message: format!("unexpected HTTP status {}", status.as_u16()),
            })
        }
    }
}
