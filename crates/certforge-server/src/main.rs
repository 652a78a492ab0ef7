mod error;
mod handlers;
mod logging;
mod models;
mod routes;
mod services;
mod settings;
mod state;

use std::sync::Arc;

use settings::Settings;
use state::AppState;

use crate::{
    logging::init_tracing_to_file,
    services::{issuance::PkiIssuer, vault::VaultClient},
};

#[tokio::main]
async fn main() {
    init_tracing_to_file();
    let settings = Settings::load("config/services.toml").unwrap();

    let issuance = PkiIssuer::new(settings.pki.clone());
    let store = VaultClient::new(&settings.vault).unwrap();
    let state = AppState::new(Arc::new(issuance), Arc::new(store));

    let router = routes::create_routes(state);
    let addr = format!("0.0.0.0:{}", settings.http.port);
    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();

    tracing::info!("Certforge server started on port {}", settings.http.port);
    tracing::info!(
        "Swagger UI available at: http://localhost:{}/swagger-ui",
        settings.http.port
    );
    axum::serve(listener, router).await.unwrap();
}
