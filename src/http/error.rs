//! Typed failures produced by the upstream clients.

use reqwest::StatusCode;
use std::fmt;
use thiserror::Error;

use super::retry::Cancelled;

/// Upstream service a request was sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Upstream {
    MovieInfo,
    Reviews,
}

impl fmt::Display for Upstream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Upstream::MovieInfo => write!(f, "MoviesInfoService"),
            Upstream::Reviews => write!(f, "ReviewsService"),
        }
    }
}

/// Every way a fetch from an upstream service can fail.
///
/// The `message` of `NotFound`, `InvalidRequest` and `UpstreamUnavailable`
/// holds the upstream text verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The requested movie does not exist upstream (HTTP 404)
    #[error("{message}")]
    NotFound { status: StatusCode, message: String },

    /// The upstream rejected the request (any other 4xx)
    #[error("{message}")]
    InvalidRequest { status: StatusCode, message: String },

    /// The upstream failed or could not be reached (5xx, transport errors)
    #[error("Server exception in {upstream} : {message}")]
    UpstreamUnavailable {
        upstream: Upstream,
        status: StatusCode,
        message: String,
    },

    /// The upstream answered with a body or status we cannot use
    #[error("Malformed response from {upstream} : {message}")]
    MalformedResponse {
        upstream: Upstream,
        status: StatusCode,
        message: String,
    },

    /// The caller gave up before the upstream answered
    #[error("{operation} cancelled")]
    Cancelled { operation: String },
}

impl FetchError {
    /// Only server-side failures are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, FetchError::UpstreamUnavailable { .. })
    }

    /// 404 for a single movie lookup.
    pub fn movie_not_found(movie_id: &str) -> Self {
        FetchError::NotFound {
            status: StatusCode::NOT_FOUND,
            message: format!(
                "There is no MovieInfo available for the passed in Id : {}",
                movie_id
            ),
        }
    }

    /// Status reported by the upstream (502 when none was received, 503 when
    /// the caller cancelled first).
    pub fn upstream_status(&self) -> StatusCode {
        match self {
            FetchError::NotFound { status, .. }
            | FetchError::InvalidRequest { status, .. }
            | FetchError::UpstreamUnavailable { status, .. }
            | FetchError::MalformedResponse { status, .. } => *status,
            FetchError::Cancelled { .. } => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Status a listener in front of the gateway should answer with.
    pub fn response_status(&self) -> StatusCode {
        match self {
            FetchError::NotFound { status, .. } | FetchError::InvalidRequest { status, .. } => {
                *status
            }
            FetchError::UpstreamUnavailable { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            FetchError::MalformedResponse { .. } => StatusCode::BAD_GATEWAY,
            FetchError::Cancelled { .. } => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            FetchError::NotFound { message, .. }
            | FetchError::InvalidRequest { message, .. }
            | FetchError::UpstreamUnavailable { message, .. }
            | FetchError::MalformedResponse { message, .. } => message,
            FetchError::Cancelled { operation } => operation,
        }
    }

    /// Maps a reqwest failure that happened before a usable status was read.
    pub(crate) fn transport(upstream: Upstream, error: &reqwest::Error) -> Self {
        if error.is_decode() {
            return FetchError::MalformedResponse {
                upstream,
                status: error.status().unwrap_or(StatusCode::OK),
                message: error.to_string(),
            };
        }
        FetchError::UpstreamUnavailable {
            upstream,
            status: StatusCode::BAD_GATEWAY,
            message: error.to_string(),
        }
    }
}

impl From<Cancelled> for FetchError {
    fn from(cancelled: Cancelled) -> Self {
        FetchError::Cancelled {
            operation: cancelled.operation,
        }
    }
}
