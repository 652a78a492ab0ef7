//! Secret store capability
//!
//! Persists certificate artifacts into a remote vault over its REST API.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use crate::{
    error::{AppError, Result},
    settings::VaultCfg,
};

/// Persists named secret artifacts into a secret store instance
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Upload a base64-encoded PFX bundle under `name`
    async fn upload_pfx(&self, vault_base_url: &str, name: &str, pfx_base64: &str) -> Result<()>;

    /// Upload PEM key/certificate material under `name`
    async fn upload_pem(&self, vault_base_url: &str, name: &str, pem: &str) -> Result<()>;
}

/// Secret store client speaking the vault secrets REST API
pub struct VaultClient {
    http: reqwest::Client,
    api_version: String,
}

impl VaultClient {
    pub fn new(config: &VaultCfg) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build vault client: {e}")))?;
        Ok(Self {
            http,
            api_version: config.api_version.clone(),
        })
    }

    async fn put_secret(
        &self,
        vault_base_url: &str,
        name: &str,
        value: &str,
        content_type: &str,
    ) -> Result<()> {
        let url = format!(
            "{}/secrets/{}?api-version={}",
            vault_base_url.trim_end_matches('/'),
            name,
            self.api_version
        );

        let response = self
            .http
            .put(&url)
            .json(&json!({
                "value": value,
                "contentType": content_type,
            }))
            .send()
            .await
            .map_err(|e| AppError::Store(format!("Upload of '{name}' failed: {e}")))?;

        if !response.status().is_success() {
            return Err(AppError::Store(format!(
                "Upload of '{name}' rejected with status {}",
                response.status()
            )));
        }

        tracing::debug!("Stored secret '{name}' in {vault_base_url}");
        Ok(())
    }
}

#[async_trait]
impl SecretStore for VaultClient {
    async fn upload_pfx(&self, vault_base_url: &str, name: &str, pfx_base64: &str) -> Result<()> {
        self.put_secret(vault_base_url, name, pfx_base64, "application/x-pkcs12")
            .await
    }

    async fn upload_pem(&self, vault_base_url: &str, name: &str, pem: &str) -> Result<()> {
        self.put_secret(vault_base_url, name, pem, "application/x-pem-file")
            .await
    }
}
