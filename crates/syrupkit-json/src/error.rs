use syrupkit_value::ValueError;

/// Errors converting between syrup values and JSON.
#[derive(Debug, thiserror::Error)]
pub enum JsonError {
    /// JSON numbers cannot carry NaN or infinities.
    #[error("non-finite float {0} has no JSON representation")]
    NonFiniteFloat(f64),

    /// A `$`-sentinel object did not have the expected shape.
    #[error("invalid {sentinel} object: {reason}")]
    InvalidSentinel {
        sentinel: &'static str,
        reason: String,
    },

    /// The JSON describes a set or dictionary with duplicates.
    #[error(transparent)]
    Value(#[from] ValueError),

    /// The input is not valid JSON.
    #[error("invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

impl JsonError {
    pub(crate) fn sentinel(sentinel: &'static str, reason: impl Into<String>) -> Self {
        JsonError::InvalidSentinel {
            sentinel,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, JsonError>;
