//! Certificate issuance capability
//!
//! Thin seam over `certforge-pki` so the batch orchestrator can be exercised
//! against a stub capability in tests.

use certforge_pki::{
    issue_certificate, CertificateSubject, IssuedCertificate, IssuerBundle,
};

use crate::{error::Result, settings::PkiCfg};

/// Issues certificates and exports them as PFX/PEM artifacts
pub trait CertificateIssuer: Send + Sync {
    /// Issue a certificate for the given subject DN, optionally chain-signed
    /// by `issuer`
    fn issue(
        &self,
        subject_dn: &str,
        valid_days: i32,
        issuer: Option<&IssuerBundle>,
    ) -> Result<IssuedCertificate>;

    /// Export the certificate and its private key as a PKCS#12 container
    fn export_pfx(&self, cert: &IssuedCertificate) -> Result<Vec<u8>>;

    /// Export the certificate and its private key as PEM text
    fn export_pem(&self, cert: &IssuedCertificate) -> Result<String>;
}

/// Production issuance capability backed by `certforge-pki`
pub struct PkiIssuer {
    config: PkiCfg,
}

impl PkiIssuer {
    pub fn new(config: PkiCfg) -> Self {
        Self { config }
    }
}

impl CertificateIssuer for PkiIssuer {
    fn issue(
        &self,
        subject_dn: &str,
        valid_days: i32,
        issuer: Option<&IssuerBundle>,
    ) -> Result<IssuedCertificate> {
        let subject = CertificateSubject::parse(subject_dn)?;
        Ok(issue_certificate(&subject, valid_days, false, issuer)?)
    }

    fn export_pfx(&self, cert: &IssuedCertificate) -> Result<Vec<u8>> {
        Ok(certforge_pki::export_pfx(
            cert,
            &self.config.pfx_password,
            &self.config.pfx_friendly_name,
        )?)
    }

    fn export_pem(&self, cert: &IssuedCertificate) -> Result<String> {
        Ok(certforge_pki::export_pem(cert))
    }
}
