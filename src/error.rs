use std::time::Duration;
use thiserror::Error;
use validator::ValidationErrors;

use crate::services::RegistryError;

/// Errors that can occur while matching a listing
///
/// An empty result is not an error; see `MatchStatus`.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("Invalid listing: {0}")]
    Validation(String),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Registry did not answer within {0:?}")]
    RegistryTimeout(Duration),
}

impl From<ValidationErrors> for MatchError {
    fn from(errors: ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| match &error.message {
                    Some(message) => message.to_string(),
                    None => format!("{} is invalid ({})", field, error.code),
                })
            })
            .collect();
        messages.sort();
        messages.dedup();

        MatchError::Validation(messages.join("; "))
    }
}

impl MatchError {
    /// Short machine-readable kind, used in error responses
    pub fn kind(&self) -> &'static str {
        match self {
            MatchError::Validation(_) => "validation_failed",
            MatchError::Registry(_) => "registry_unavailable",
            MatchError::RegistryTimeout(_) => "registry_timeout",
        }
    }
}
