use serde::{Deserialize, Serialize};

use super::validation::{Validate, ValidationError};

/// A single review as served by the reviews service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Review {
    #[serde(rename = "reviewId")]
    pub id: String,
    #[serde(rename = "movieInfoId")]
    pub movie_id: i64,
    #[serde(default)]
    pub comment: String,
    pub rating: f64,
}

impl Validate for Review {
    fn validate(&self) -> Result<(), ValidationError> {
        if !self.rating.is_finite() || self.rating < 0.0 {
            return Err(ValidationError::InvalidRating {
                id: self.id.clone(),
                rating: self.rating.to_string(),
            });
        }
        Ok(())
    }
}
