mod certificate;
mod health;

use axum::Router;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::state::AppState;

pub fn create_routes(state: AppState) -> Router {
    let mut doc = certificate::CertificateApi::openapi();
    doc.merge(health::HealthApi::openapi());

    Router::new()
        .merge(health::create_router())
        .merge(certificate::create_router())
        .layer(CorsLayer::permissive())
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", doc))
}
