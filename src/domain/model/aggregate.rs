use serde::{Deserialize, Serialize};

use super::movie::MovieInfo;
use super::review::Review;

/// Movie info merged with every review found for it.
///
/// Only built after the movie info resolved. `reviews` may be empty.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedMovie {
    pub movie_info: MovieInfo,
    pub reviews: Vec<Review>,
}

impl AggregatedMovie {
    pub fn new(movie_info: MovieInfo, reviews: Vec<Review>) -> Self {
        Self {
            movie_info,
            reviews,
        }
    }
}
