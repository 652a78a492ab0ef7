use axum::{routing::post, Router};
use utoipa::OpenApi;

use crate::{handlers::certificate::generate_certificates, state::AppState};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::certificate::generate_certificates,
    ),
    tags(
        (name = "Certificates", description = "Batch certificate issuance APIs")
    ),
)]
pub struct CertificateApi;

pub fn create_router() -> Router<AppState> {
    Router::new().route("/api/certificates", post(generate_certificates))
}
