use thiserror::Error;

/// Failures surfaced synchronously by the
/// task store. Unknown ids are not errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid calendar date {input:?}: expected YYYY-MM-DD")]
pub struct DateParseError {
    pub input: String,
}

impl From<DateParseError> for StoreError {
    fn from(err: DateParseError) -> Self {
        StoreError::InvalidInput(err.to_string())
    }
}
