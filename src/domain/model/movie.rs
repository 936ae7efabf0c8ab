use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::validation::{Validate, ValidationError};

/// Movie metadata as served by the movie-info service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MovieInfo {
    #[serde(rename = "movieInfoId")]
    pub id: String,
    #[serde(rename = "name")]
    pub title: String,
    #[serde(rename = "year")]
    pub release_year: u32,
    #[serde(default)]
    pub cast: Vec<String>,
    /// Calendar date in `YYYY-MM-DD` form on the wire
    #[serde(rename = "releaseDate")]
    pub release_date: NaiveDate,
}

impl Validate for MovieInfo {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::BlankTitle {
                id: self.id.clone(),
            });
        }
        if self.release_year == 0 {
            return Err(ValidationError::NonPositiveYear {
                id: self.id.clone(),
            });
        }
        if let Some(position) = self.cast.iter().position(|name| name.trim().is_empty()) {
            return Err(ValidationError::BlankCastMember {
                id: self.id.clone(),
                position,
            });
        }
        Ok(())
    }
}
