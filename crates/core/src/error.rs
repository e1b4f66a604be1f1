/// Errors raised while building entities from raw tracking records.
///
/// Search misses are not errors: lookups return `None` and log a warning.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Missing required field '{field}' on {entity} record")]
    MissingField {
        entity: &'static str,
        field: &'static str,
    },

    #[error("Invalid field '{field}' on {entity} record: {reason}")]
    InvalidField {
        entity: &'static str,
        field: &'static str,
        reason: String,
    },

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

/// Convenience alias for fallible core operations.
pub type CoreResult<T> = Result<T, CoreError>;
