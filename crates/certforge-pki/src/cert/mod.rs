pub mod issuance;
pub mod types;

pub use issuance::issue_certificate;
pub use types::{CertificateSubject, IssuedCertificate};
