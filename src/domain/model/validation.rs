use thiserror::Error;

/// A decoded upstream record that breaks one of the record invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("movie info {id} has a blank name")]
    BlankTitle { id: String },
    #[error("movie info {id} has a non-positive year")]
    NonPositiveYear { id: String },
    #[error("movie info {id} lists a blank cast member at position {position}")]
    BlankCastMember { id: String, position: usize },
    #[error("review {id} has an invalid rating {rating}")]
    InvalidRating { id: String, rating: String },
}

/// Records that can check their own invariants after decoding.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

impl<T: Validate> Validate for Vec<T> {
    fn validate(&self) -> Result<(), ValidationError> {
        self.iter().try_for_each(Validate::validate)
    }
}
