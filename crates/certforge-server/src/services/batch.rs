//! Batch certificate issuance orchestrator
//!
//! Validates a batch request, decodes the optional shared issuer once, fans
//! out one issuance-and-persist unit per requested certificate, and joins the
//! results back in request order. Once dispatch has started, any single
//! unit's failure collapses the whole batch; callers observe either a full
//! ordered result list or an opaque failure.

use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use certforge_pki::IssuerBundle;
use futures::future::join_all;

use crate::{
    error::{AppError, Result},
    models::certificate::{BatchOutcome, CertificateProperties, CertificateResult, CertificatesRequest},
    services::{issuance::CertificateIssuer, vault::SecretStore},
};

/// Process a batch of certificate requests
///
/// Returns one result per requested certificate, in request order. Fails
/// without dispatching any work when the request is malformed or the issuer
/// material does not decode.
pub async fn process_batch(
    request: CertificatesRequest,
    issuance: Arc<dyn CertificateIssuer>,
    store: Arc<dyn SecretStore>,
) -> Result<Vec<CertificateResult>> {
    if request.vault_base_url.trim().is_empty() {
        return Err(AppError::BadRequest(
            "vaultBaseUrl must not be empty".to_string(),
        ));
    }
    if request.certificates_properties.is_empty() {
        return Err(AppError::BadRequest(
            "certificatesProperties must not be empty".to_string(),
        ));
    }

    // Decode the shared issuer once, before any unit is dispatched
    let issuer = if request.issuer_base64_pfx.trim().is_empty() {
        None
    } else {
        Some(Arc::new(decode_issuer(&request.issuer_base64_pfx)?))
    };

    let vault_base_url: Arc<str> = request.vault_base_url.into();
    let mut tasks = Vec::with_capacity(request.certificates_properties.len());
    for properties in request.certificates_properties {
        let issuance = issuance.clone();
        let store = store.clone();
        let issuer = issuer.clone();
        let vault_base_url = vault_base_url.clone();
        tasks.push(tokio::spawn(async move {
            process_item(
                &properties,
                &vault_base_url,
                issuer,
                issuance,
                store.as_ref(),
            )
            .await
            .inspect_err(|e| {
                tracing::error!(
                    "Processing of '{}' failed: {e}",
                    properties.subject_name
                );
            })
        }));
    }

    // join_all waits for every unit and yields results in spawn order
    let mut results = Vec::with_capacity(tasks.len());
    for joined in join_all(tasks).await {
        let result =
            joined.map_err(|e| AppError::Internal(format!("Worker task failed: {e}")))??;
        results.push(result);
    }
    Ok(results)
}

/// Issue one certificate, export it, and persist the requested artifacts
///
/// Steps run sequentially; each depends on the previous succeeding. Errors
/// are not caught here, they propagate to the batch join.
async fn process_item(
    properties: &CertificateProperties,
    vault_base_url: &str,
    issuer: Option<Arc<IssuerBundle>>,
    issuance: Arc<dyn CertificateIssuer>,
    store: &dyn SecretStore,
) -> Result<CertificateResult> {
    // Key generation and signing are CPU-bound; run them on the blocking
    // pool so a large batch cannot stall sibling units' uploads
    let (cert, pfx_der) = {
        let issuance = issuance.clone();
        let subject_name = properties.subject_name.clone();
        let valid_days = properties.valid_days;
        tokio::task::spawn_blocking(move || {
            let cert = issuance.issue(&subject_name, valid_days, issuer.as_deref())?;
            let pfx_der = issuance.export_pfx(&cert)?;
            Ok::<_, AppError>((cert, pfx_der))
        })
        .await
        .map_err(|e| AppError::Internal(format!("Issuance task failed: {e}")))??
    };
    let pfx = BASE64.encode(pfx_der);

    if !properties.certificate_name.is_empty() {
        store
            .upload_pfx(vault_base_url, &properties.certificate_name, &pfx)
            .await?;
    }

    if !properties.secret_name.is_empty() {
        let pem = issuance.export_pem(&cert)?;
        store
            .upload_pem(vault_base_url, &properties.secret_name, &pem)
            .await?;
    }

    Ok(CertificateResult {
        pfx,
        result: BatchOutcome::Success,
    })
}

fn decode_issuer(issuer_base64_pfx: &str) -> Result<IssuerBundle> {
    let der = BASE64.decode(issuer_base64_pfx.trim()).map_err(|e| {
        AppError::IssuerDecode(format!("Issuer material is not valid base64: {e}"))
    })?;
    IssuerBundle::from_der(&der, "").map_err(|e| AppError::IssuerDecode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, sync::Mutex, time::Duration};

    use async_trait::async_trait;
    use certforge_pki::{issue_certificate, export_pfx, CertificateSubject, IssuedCertificate};

    use super::*;

    #[derive(Default)]
    struct StubIssuer {
        /// Recorded (subject, issuer certificate DER) per call
        calls: Mutex<Vec<(String, Option<Vec<u8>>)>>,
        fail_subject: Option<String>,
        /// Thread-blocking delay per issuance, in milliseconds
        block_ms: Option<u64>,
    }

    impl StubIssuer {
        fn failing_on(subject: &str) -> Self {
            Self {
                fail_subject: Some(subject.to_string()),
                ..Self::default()
            }
        }

        fn blocking_for(ms: u64) -> Self {
            Self {
                block_ms: Some(ms),
                ..Self::default()
            }
        }

        fn recorded(&self) -> Vec<(String, Option<Vec<u8>>)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl CertificateIssuer for StubIssuer {
        fn issue(
            &self,
            subject_dn: &str,
            _valid_days: i32,
            issuer: Option<&IssuerBundle>,
        ) -> Result<IssuedCertificate> {
            self.calls
                .lock()
                .unwrap()
                .push((subject_dn.to_string(), issuer.map(|b| b.cert_der.clone())));
            if let Some(ms) = self.block_ms {
                std::thread::sleep(Duration::from_millis(ms));
            }
            if self.fail_subject.as_deref() == Some(subject_dn) {
                return Err(AppError::Internal(format!(
                    "issuance refused for {subject_dn}"
                )));
            }
            Ok(IssuedCertificate {
                cert_der: subject_dn.as_bytes().to_vec(),
                cert_pem: format!("cert pem for {subject_dn}"),
                key_der: Vec::new(),
                key_pem: String::new(),
                ca_der: issuer.map(|b| b.cert_der.clone()),
                serial_number: "00".to_string(),
            })
        }

        fn export_pfx(&self, cert: &IssuedCertificate) -> Result<Vec<u8>> {
            Ok(cert.cert_der.clone())
        }

        fn export_pem(&self, cert: &IssuedCertificate) -> Result<String> {
            Ok(cert.cert_pem.clone())
        }
    }

    #[derive(Default)]
    struct StubStore {
        pfx_uploads: Mutex<Vec<(String, String)>>,
        pem_uploads: Mutex<Vec<(String, String)>>,
        /// Artificial per-name upload delays in milliseconds
        delays: HashMap<String, u64>,
        fail_name: Option<String>,
    }

    impl StubStore {
        fn with_delays(delays: &[(&str, u64)]) -> Self {
            Self {
                delays: delays
                    .iter()
                    .map(|(name, ms)| (name.to_string(), *ms))
                    .collect(),
                ..Self::default()
            }
        }

        fn failing_on(name: &str) -> Self {
            Self {
                fail_name: Some(name.to_string()),
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl SecretStore for StubStore {
        async fn upload_pfx(
            &self,
            _vault_base_url: &str,
            name: &str,
            pfx_base64: &str,
        ) -> Result<()> {
            if let Some(ms) = self.delays.get(name) {
                tokio::time::sleep(Duration::from_millis(*ms)).await;
            }
            if self.fail_name.as_deref() == Some(name) {
                return Err(AppError::Store(format!("store refused '{name}'")));
            }
            self.pfx_uploads
                .lock()
                .unwrap()
                .push((name.to_string(), pfx_base64.to_string()));
            Ok(())
        }

        async fn upload_pem(&self, _vault_base_url: &str, name: &str, pem: &str) -> Result<()> {
            if let Some(ms) = self.delays.get(name) {
                tokio::time::sleep(Duration::from_millis(*ms)).await;
            }
            if self.fail_name.as_deref() == Some(name) {
                return Err(AppError::Store(format!("store refused '{name}'")));
            }
            self.pem_uploads
                .lock()
                .unwrap()
                .push((name.to_string(), pem.to_string()));
            Ok(())
        }
    }

    fn item(subject: &str, certificate_name: &str, secret_name: &str) -> CertificateProperties {
        CertificateProperties {
            subject_name: subject.to_string(),
            valid_days: 30,
            certificate_name: certificate_name.to_string(),
            secret_name: secret_name.to_string(),
        }
    }

    fn request(items: Vec<CertificateProperties>) -> CertificatesRequest {
        CertificatesRequest {
            certificates_properties: items,
            issuer_base64_pfx: String::new(),
            vault_base_url: "https://vault.test".to_string(),
        }
    }

    fn issuer_material() -> String {
        let subject = CertificateSubject::parse("CN=Batch Test CA").unwrap();
        let ca = issue_certificate(&subject, 365, true, None).unwrap();
        BASE64.encode(export_pfx(&ca, "", "issuer").unwrap())
    }

    #[tokio::test]
    async fn results_preserve_request_order() {
        let subjects = ["CN=first", "CN=second", "CN=third"];
        // The first item's upload finishes last, the last finishes first
        let store = Arc::new(StubStore::with_delays(&[
            ("cert-0", 40),
            ("cert-1", 20),
            ("cert-2", 0),
        ]));
        let issuance = Arc::new(StubIssuer::default());

        let items = subjects
            .iter()
            .enumerate()
            .map(|(i, subject)| item(subject, &format!("cert-{i}"), ""))
            .collect();

        let results = process_batch(request(items), issuance, store)
            .await
            .unwrap();

        assert_eq!(results.len(), subjects.len());
        for (i, subject) in subjects.iter().enumerate() {
            assert_eq!(results[i].pfx, BASE64.encode(subject.as_bytes()));
            assert_eq!(results[i].result, BatchOutcome::Success);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn blocking_issuance_does_not_stall_sibling_units() {
        // Each issuance blocks its thread for 200ms; run off the async
        // executor they overlap, so the batch finishes well under 3x200ms
        let issuance = Arc::new(StubIssuer::blocking_for(200));
        let store = Arc::new(StubStore::default());

        let req = request(vec![
            item("CN=a", "", ""),
            item("CN=b", "", ""),
            item("CN=c", "", ""),
        ]);
        let started = std::time::Instant::now();
        let results = process_batch(req, issuance, store).await.unwrap();
        let elapsed = started.elapsed();

        assert_eq!(results.len(), 3);
        assert!(
            elapsed < Duration::from_millis(500),
            "batch took {elapsed:?}, units did not overlap"
        );
    }

    #[tokio::test]
    async fn empty_item_list_is_rejected_before_dispatch() {
        let issuance = Arc::new(StubIssuer::default());
        let store = Arc::new(StubStore::default());

        let err = process_batch(request(vec![]), issuance.clone(), store)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::BadRequest(_)));
        assert!(issuance.recorded().is_empty());
    }

    #[tokio::test]
    async fn blank_vault_url_is_rejected_before_dispatch() {
        let issuance = Arc::new(StubIssuer::default());
        let store = Arc::new(StubStore::default());

        let mut req = request(vec![item("CN=a", "", "")]);
        req.vault_base_url = "   ".to_string();
        let err = process_batch(req, issuance.clone(), store).await.unwrap_err();

        assert!(matches!(err, AppError::BadRequest(_)));
        assert!(issuance.recorded().is_empty());
    }

    #[tokio::test]
    async fn supplied_issuer_is_shared_by_every_item() {
        let issuance = Arc::new(StubIssuer::default());
        let store = Arc::new(StubStore::default());

        let mut req = request(vec![
            item("CN=a", "", ""),
            item("CN=b", "", ""),
            item("CN=c", "", ""),
        ]);
        req.issuer_base64_pfx = issuer_material();

        process_batch(req, issuance.clone(), store).await.unwrap();

        let calls = issuance.recorded();
        assert_eq!(calls.len(), 3);
        let first_issuer = calls[0].1.clone().expect("issuer passed to first item");
        for (_, issuer) in &calls {
            assert_eq!(issuer.as_ref(), Some(&first_issuer));
        }
    }

    #[tokio::test]
    async fn absent_issuer_means_self_issuance() {
        let issuance = Arc::new(StubIssuer::default());
        let store = Arc::new(StubStore::default());

        let req = request(vec![item("CN=a", "", ""), item("CN=b", "", "")]);
        process_batch(req, issuance.clone(), store).await.unwrap();

        let calls = issuance.recorded();
        assert_eq!(calls.len(), 2);
        assert!(calls.iter().all(|(_, issuer)| issuer.is_none()));
    }

    #[tokio::test]
    async fn artifact_names_drive_persistence() {
        let issuance = Arc::new(StubIssuer::default());
        let store = Arc::new(StubStore::default());

        let req = request(vec![
            item("CN=no-persist", "", ""),
            item("CN=pfx-only", "bundle", ""),
            item("CN=pem-only", "", "material"),
        ]);
        let results = process_batch(req, issuance, store.clone()).await.unwrap();

        assert!(results.iter().all(|r| r.result == BatchOutcome::Success));

        let pfx_uploads = store.pfx_uploads.lock().unwrap().clone();
        let pem_uploads = store.pem_uploads.lock().unwrap().clone();
        assert_eq!(pfx_uploads.len(), 1);
        assert_eq!(pfx_uploads[0].0, "bundle");
        assert_eq!(pfx_uploads[0].1, BASE64.encode(b"CN=pfx-only"));
        assert_eq!(pem_uploads.len(), 1);
        assert_eq!(pem_uploads[0].0, "material");
        assert_eq!(pem_uploads[0].1, "cert pem for CN=pem-only");
    }

    #[tokio::test]
    async fn single_issuance_failure_collapses_the_batch() {
        let issuance = Arc::new(StubIssuer::failing_on("CN=bad"));
        let store = Arc::new(StubStore::default());

        let req = request(vec![
            item("CN=good-1", "", ""),
            item("CN=bad", "", ""),
            item("CN=good-2", "", ""),
        ]);
        let err = process_batch(req, issuance.clone(), store).await.unwrap_err();

        assert!(matches!(err, AppError::Internal(_)));
        // Sibling items were still dispatched before the failure was observed
        assert_eq!(issuance.recorded().len(), 3);
    }

    #[tokio::test]
    async fn single_upload_failure_collapses_the_batch() {
        let issuance = Arc::new(StubIssuer::default());
        let store = Arc::new(StubStore::failing_on("doomed"));

        let req = request(vec![
            item("CN=ok", "fine", ""),
            item("CN=broken", "doomed", ""),
        ]);
        let err = process_batch(req, issuance, store.clone()).await.unwrap_err();

        assert!(matches!(err, AppError::Store(_)));
        // The sibling's upload completed; its result is simply discarded
        assert_eq!(store.pfx_uploads.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn non_base64_issuer_material_aborts_before_dispatch() {
        let issuance = Arc::new(StubIssuer::default());
        let store = Arc::new(StubStore::default());

        let mut req = request(vec![item("CN=a", "", "")]);
        req.issuer_base64_pfx = "!!! not base64 !!!".to_string();
        let err = process_batch(req, issuance.clone(), store).await.unwrap_err();

        assert!(matches!(err, AppError::IssuerDecode(_)));
        assert!(issuance.recorded().is_empty());
    }

    #[tokio::test]
    async fn structurally_invalid_issuer_material_aborts_before_dispatch() {
        let issuance = Arc::new(StubIssuer::default());
        let store = Arc::new(StubStore::default());

        let mut req = request(vec![item("CN=a", "", "")]);
        req.issuer_base64_pfx = BASE64.encode(b"valid base64, not a PFX");
        let err = process_batch(req, issuance.clone(), store).await.unwrap_err();

        assert!(matches!(err, AppError::IssuerDecode(_)));
        assert!(issuance.recorded().is_empty());
    }
}
