//! Batch certificate issuance handler

use axum::{extract::State, response::Json};

use crate::{
    error::Result,
    models::certificate::{CertificateResult, CertificatesRequest},
    services::batch,
    state::AppState,
};

/// Issue a batch of certificates and persist their artifacts
///
/// Certificates are generated concurrently; the response lists one result
/// per requested certificate, in request order. Any processing failure after
/// validation yields an empty 500 response.
#[utoipa::path(
    post,
    path = "/api/certificates",
    request_body = CertificatesRequest,
    responses(
        (status = 200, description = "All certificates issued", body = Vec<CertificateResult>),
        (status = 400, description = "Missing vault URL or empty item list"),
        (status = 500, description = "Issuer decoding or certificate processing failed")
    ),
    tag = "Certificates"
)]
pub async fn generate_certificates(
    State(state): State<AppState>,
    Json(request): Json<CertificatesRequest>,
) -> Result<Json<Vec<CertificateResult>>> {
    tracing::info!(
        "Processing certificate batch of {} item(s)",
        request.certificates_properties.len()
    );
    let results = batch::process_batch(request, state.issuance.clone(), state.store.clone()).await?;
    Ok(Json(results))
}
