//! PKCS#12 (PFX) packaging and issuer material decoding

use p12::PFX;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{
    cert::types::IssuedCertificate,
    error::{PkiError, Result},
};

/// Decoded issuer material: a certificate and its private key
///
/// Built once per batch from caller-supplied PFX bytes and shared read-only
/// by every concurrent unit of work. The private key is wiped on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct IssuerBundle {
    /// DER encoding of the issuer certificate
    #[zeroize(skip)]
    pub cert_der: Vec<u8>,
    /// PKCS#8 DER encoding of the issuer private key
    pub key_der: Vec<u8>,
}

impl IssuerBundle {
    /// Decode a PKCS#12 container into an issuer bundle
    ///
    /// Extracts the first private key and the first certificate found in
    /// the container.
    pub fn from_der(pfx_der: &[u8], password: &str) -> Result<Self> {
        let pfx = PFX::parse(pfx_der)
            .map_err(|e| PkiError::ImportError(format!("Invalid PFX container: {e}")))?;

        if !pfx.verify_mac(password) {
            return Err(PkiError::ImportError(
                "PFX MAC verification failed".to_string(),
            ));
        }

        let keys = pfx
            .key_bags(password)
            .map_err(|e| PkiError::ImportError(format!("Failed to decrypt key bags: {e}")))?;
        let key_der = keys
            .into_iter()
            .next()
            .ok_or_else(|| PkiError::ImportError("PFX contains no private key".to_string()))?;

        let certs = pfx
            .cert_x509_bags(password)
            .map_err(|e| PkiError::ImportError(format!("Failed to read certificate bags: {e}")))?;
        let cert_der = certs
            .into_iter()
            .next()
            .ok_or_else(|| PkiError::ImportError("PFX contains no certificate".to_string()))?;

        Ok(Self { cert_der, key_der })
    }
}

impl std::fmt::Debug for IssuerBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssuerBundle")
            .field("cert_der_len", &self.cert_der.len())
            .finish()
    }
}

/// Export an issued certificate and its private key as a PKCS#12 container
///
/// The issuing CA certificate is included in the chain when present.
pub fn export_pfx(
    cert: &IssuedCertificate,
    password: &str,
    friendly_name: &str,
) -> Result<Vec<u8>> {
    let pfx = PFX::new(
        &cert.cert_der,
        &cert.key_der,
        cert.ca_der.as_deref(),
        password,
        friendly_name,
    )
    .ok_or_else(|| PkiError::ExportError("Failed to build PFX container".to_string()))?;
    Ok(pfx.to_der())
}

/// Export an issued certificate and its private key as PEM text
pub fn export_pem(cert: &IssuedCertificate) -> String {
    let mut pem = cert.cert_pem.clone();
    if !pem.ends_with('\n') {
        pem.push('\n');
    }
    pem.push_str(&cert.key_pem);
    pem
}
