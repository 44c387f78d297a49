use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DrawError {
    /// Rejected before any draw work starts. `field` names the offending input.
    #[error("Invalid input `{field}`: {reason}")]
    InvalidInput { field: String, reason: String },

    /// Only raised when the options ask for `ShortfallPolicy::Reject`.
    #[error(
        "Club separation shortfall: {violations} unresolved violation(s), achieved minimum {achieved}"
    )]
    ConstraintShortfall { violations: usize, achieved: usize },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

impl DrawError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        DrawError::InvalidInput { field: field.into(), reason: reason.into() }
    }

    /// Field name for validation failures, `None` for everything else.
    pub fn field(&self) -> Option<&str> {
        match self {
            DrawError::InvalidInput { field, .. } => Some(field),
            _ => None,
        }
    }

    /// A shortfall can be retried with another seed or relaxed separation;
    /// bad input cannot.
    pub fn is_recoverable(&self) -> bool {
        match self {
            DrawError::ConstraintShortfall { .. } => true,
            DrawError::InvalidInput { .. } => false,
            DrawError::Serialization(_) => false,
            DrawError::Deserialization(_) => false,
        }
    }
}

impl From<serde_json::Error> for DrawError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_data() || err.is_syntax() || err.is_eof() {
            DrawError::Deserialization(err.to_string())
        } else {
            DrawError::Serialization(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, DrawError>;
