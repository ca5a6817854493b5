use thiserror::Error;

/// Error taxonomy for the search service.
///
/// `Validation` is always caller-fixable and names the offending field.
/// `Datastore` wraps the failing operation name only; raw query text and
/// connection details stay out of the payload.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error("datastore operation '{operation}' failed")]
    Datastore {
        operation: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl SearchError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn datastore(operation: &'static str, source: impl Into<anyhow::Error>) -> Self {
        Self::Datastore {
            operation,
            source: source.into(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}
