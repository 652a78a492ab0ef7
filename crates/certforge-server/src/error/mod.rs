use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("issuer decoding error: {0}")]
    IssuerDecode(String),

    #[error("PKI error: {0}")]
    Pki(#[from] certforge_pki::PkiError),

    #[error("secret store error: {0}")]
    Store(String),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Maps errors to transport responses
///
/// Response bodies are intentionally empty: failure detail is written to the
/// diagnostic log only and never reaches the caller.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::BadRequest(ref e) => {
                tracing::warn!("Rejecting batch request: {e}");
                StatusCode::BAD_REQUEST
            }
            ref e => {
                tracing::error!("Batch processing failed: {e}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        status.into_response()
    }
}

pub type Result<T, E = AppError> = core::result::Result<T, E>;
