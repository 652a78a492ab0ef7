//! Certforge PKI - certificate issuance and packaging
//!
//! Generates X.509 leaf and CA certificates with freshly generated key
//! pairs, optionally chain-signed by a caller-supplied issuer, and packages
//! the result as PKCS#12 (PFX) or PEM material.

pub mod cert;
pub mod error;
pub mod pfx;

pub use cert::{issue_certificate, CertificateSubject, IssuedCertificate};
pub use error::{PkiError, Result};
pub use pfx::{export_pem, export_pfx, IssuerBundle};

/// Prelude with the most commonly used types and functions
pub mod prelude {
    pub use crate::{
        cert::{issue_certificate, CertificateSubject, IssuedCertificate},
        error::{PkiError, Result},
        pfx::{export_pem, export_pfx, IssuerBundle},
    };
}
