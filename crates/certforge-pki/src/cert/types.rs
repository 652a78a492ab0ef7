use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{PkiError, Result};

/// Certificate subject information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateSubject {
    pub common_name: String,
    pub country: Option<String>,
    pub state: Option<String>,
    pub locality: Option<String>,
    pub organization: Option<String>,
    pub organizational_unit: Option<String>,
    pub email: Option<String>,
    pub domain_components: Vec<String>,
}

impl CertificateSubject {
    /// Create a subject with only a common name
    pub fn new(common_name: impl Into<String>) -> Self {
        Self {
            common_name: common_name.into(),
            country: None,
            state: None,
            locality: None,
            organization: None,
            organizational_unit: None,
            email: None,
            domain_components: Vec::new(),
        }
    }

    /// Parse a distinguished-name string such as `"CN=example.com, O=Example"`
    ///
    /// Recognized keys are CN, C, ST, L, O, OU, E (alias EMAILADDRESS) and
    /// DC (repeatable), case-insensitive. The common name is required.
    ///
    /// Components are split on bare commas; escaped commas inside attribute
    /// values (RFC 4514 quoting) are not supported.
    pub fn parse(dn: &str) -> Result<Self> {
        let mut subject = Self::new(String::new());

        for part in dn.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let (key, value) = part
                .split_once('=')
                .ok_or_else(|| PkiError::ParseError(format!("Invalid DN component: {part}")))?;
            let value = value.trim().to_string();
            match key.trim().to_ascii_uppercase().as_str() {
                "CN" => subject.common_name = value,
                "C" => subject.country = Some(value),
                "ST" => subject.state = Some(value),
                "L" => subject.locality = Some(value),
                "O" => subject.organization = Some(value),
                "OU" => subject.organizational_unit = Some(value),
                "E" | "EMAILADDRESS" => subject.email = Some(value),
                "DC" => subject.domain_components.push(value),
                other => {
                    return Err(PkiError::ParseError(format!(
                        "Unsupported DN attribute: {other}"
                    )))
                }
            }
        }

        if subject.common_name.is_empty() {
            return Err(PkiError::ParseError(format!(
                "Missing common name in subject: {dn}"
            )));
        }

        Ok(subject)
    }
}

impl fmt::Display for CertificateSubject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CN={}", self.common_name)?;
        if let Some(ou) = &self.organizational_unit {
            write!(f, ", OU={ou}")?;
        }
        if let Some(o) = &self.organization {
            write!(f, ", O={o}")?;
        }
        if let Some(l) = &self.locality {
            write!(f, ", L={l}")?;
        }
        if let Some(st) = &self.state {
            write!(f, ", ST={st}")?;
        }
        if let Some(c) = &self.country {
            write!(f, ", C={c}")?;
        }
        if let Some(email) = &self.email {
            write!(f, ", E={email}")?;
        }
        for dc in &self.domain_components {
            write!(f, ", DC={dc}")?;
        }
        Ok(())
    }
}

/// A freshly issued certificate together with its private key
///
/// Instances are transient: they are created, exported and discarded within
/// one unit of work. The private key material is wiped on drop and must not
/// be cached or reused across requests.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct IssuedCertificate {
    /// DER encoding of the certificate
    #[zeroize(skip)]
    pub cert_der: Vec<u8>,
    /// PEM encoding of the certificate
    #[zeroize(skip)]
    pub cert_pem: String,
    /// PKCS#8 DER encoding of the private key
    pub key_der: Vec<u8>,
    /// PKCS#8 PEM encoding of the private key
    pub key_pem: String,
    /// DER encoding of the issuing CA certificate, if chain-signed
    #[zeroize(skip)]
    pub ca_der: Option<Vec<u8>>,
    /// Hex-encoded serial number
    #[zeroize(skip)]
    pub serial_number: String,
}

impl fmt::Debug for IssuedCertificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuedCertificate")
            .field("serial_number", &self.serial_number)
            .field("cert_der_len", &self.cert_der.len())
            .field("chain_signed", &self.ca_der.is_some())
            .finish()
    }
}
