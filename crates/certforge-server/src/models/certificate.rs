//! Batch certificate request and response models

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One requested certificate within a batch
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CertificateProperties {
    /// Distinguished-name string, e.g. "CN=example.com, O=Example"
    pub subject_name: String,

    /// Validity period in days
    pub valid_days: i32,

    /// Secret store name for the PFX bundle; empty skips PFX persistence
    #[serde(default)]
    pub certificate_name: String,

    /// Secret store name for the PEM material; empty skips PEM persistence
    #[serde(default)]
    pub secret_name: String,
}

/// A batch of certificate requests
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CertificatesRequest {
    /// Requested certificates, processed concurrently, reported in order
    #[serde(default)]
    pub certificates_properties: Vec<CertificateProperties>,

    /// Base64-encoded PFX of the issuing certificate; empty means every
    /// certificate is self-signed
    #[serde(default)]
    pub issuer_base64_pfx: String,

    /// Base URL of the secret store instance to persist artifacts into
    #[serde(default)]
    pub vault_base_url: String,
}

/// Outcome of processing one requested certificate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum BatchOutcome {
    Success,
    Failure,
}

/// Result for one requested certificate, in request order
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CertificateResult {
    /// Base64-encoded PFX of the issued certificate
    pub pfx: String,
    /// Processing outcome
    pub result: BatchOutcome,
}
