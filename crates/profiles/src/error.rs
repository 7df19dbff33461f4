//! Error types for the profiles crate.
//!
//! Every way a caller-supplied record can be rejected lives here. These are
//! structural errors: they surface at `add_profile` time and the record never
//! reaches the corpus.

use thiserror::Error;

/// Errors raised while validating records or appending to the corpus.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProfileError {
    /// A required attribute was absent (or null) in the record
    #[error("Malformed record: missing required field `{field}`")]
    MissingField { field: String },

    /// An attribute was present but outside its domain or of the wrong type
    #[error("Malformed record: invalid value for `{field}`: {value}")]
    InvalidValue { field: String, value: String },

    /// `created_at` is later than `updated_at`
    #[error("Malformed record: created_at ({created_at}) is after updated_at ({updated_at})")]
    TimestampOrder {
        created_at: String,
        updated_at: String,
    },

    /// The profile id is already present in the corpus (or earlier in the batch)
    #[error("Duplicate profile id: {id}")]
    DuplicateProfile { id: String },

    /// A record could not be decoded from JSON at all
    #[error("Record is not a JSON object: {0}")]
    NotAnObject(String),
}

impl ProfileError {
    /// Returns true for the `MalformedRecord` family of errors.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            ProfileError::MissingField { .. }
                | ProfileError::InvalidValue { .. }
                | ProfileError::TimestampOrder { .. }
                | ProfileError::NotAnObject(_)
        )
    }

    pub(crate) fn invalid(field: &str, value: impl ToString) -> Self {
        ProfileError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
        }
    }
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, ProfileError>;
