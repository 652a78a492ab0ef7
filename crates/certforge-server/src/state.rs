use std::sync::Arc;

use crate::services::{issuance::CertificateIssuer, vault::SecretStore};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub issuance: Arc<dyn CertificateIssuer>,
    pub store: Arc<dyn SecretStore>,
}

impl AppState {
    pub fn new(issuance: Arc<dyn CertificateIssuer>, store: Arc<dyn SecretStore>) -> Self {
        Self { issuance, store }
    }
}
