use thiserror::Error;

use crate::validation::ValidationReport;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid input: {0}")]
    Validation(ValidationReport),

    #[error("Not available at the {0} step")]
    WrongStep(&'static str),

    #[error("Invalid OTP. Try {hint}.")]
    InvalidOtp { hint: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected country list payload")]
    UnexpectedCountryPayload,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
