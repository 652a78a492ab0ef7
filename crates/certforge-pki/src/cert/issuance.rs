use rcgen::{
    BasicConstraints, CertificateParams, DistinguishedName, DnType, ExtendedKeyUsagePurpose, IsCa,
    Issuer, KeyPair, KeyUsagePurpose,
};
use rustls_pki_types::CertificateDer;
use time::{Duration, OffsetDateTime};

use super::types::{CertificateSubject, IssuedCertificate};
use crate::{
    error::{PkiError, Result},
    pfx::IssuerBundle,
};

/// Issue a certificate with a freshly generated key pair
///
/// # Arguments
/// * `subject` - Certificate subject information
/// * `validity_days` - Validity period in days, counted from now
/// * `is_ca` - Whether to issue a CA certificate
/// * `issuer` - Issuing CA bundle; `None` creates a self-signed certificate
pub fn issue_certificate(
    subject: &CertificateSubject,
    validity_days: i32,
    is_ca: bool,
    issuer: Option<&IssuerBundle>,
) -> Result<IssuedCertificate> {
    let mut params = CertificateParams::new(vec![subject.common_name.clone()])
        .map_err(|e| PkiError::GenerationError(format!("Failed to create params: {e}")))?;

    params.distinguished_name = build_distinguished_name(subject);

    // Backdate not_before by an hour so the certificate is valid immediately
    let not_before = OffsetDateTime::now_utc() - Duration::hours(1);
    let not_after = OffsetDateTime::now_utc() + Duration::days(validity_days as i64);
    params.not_before = not_before;
    params.not_after = not_after;

    let mut serial_number = [0u8; 16];
    getrandom::fill(&mut serial_number)
        .map_err(|e| PkiError::GenerationError(format!("Failed to generate serial number: {e}")))?;
    params.serial_number = Some(serial_number.to_vec().into());

    if is_ca {
        params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
        params.key_usages = vec![
            KeyUsagePurpose::KeyCertSign,
            KeyUsagePurpose::CrlSign,
            KeyUsagePurpose::DigitalSignature,
        ];
    } else {
        params.is_ca = IsCa::NoCa;
        params.key_usages = vec![
            KeyUsagePurpose::DigitalSignature,
            KeyUsagePurpose::KeyEncipherment,
            KeyUsagePurpose::ContentCommitment,
        ];
        params.extended_key_usages = vec![
            ExtendedKeyUsagePurpose::ServerAuth,
            ExtendedKeyUsagePurpose::ClientAuth,
        ];
    }

    let key_pair = KeyPair::generate()
        .map_err(|e| PkiError::GenerationError(format!("Failed to generate key pair: {e}")))?;

    let (cert, ca_der) = match issuer {
        Some(bundle) => {
            let issuer_key = KeyPair::try_from(bundle.key_der.as_slice()).map_err(|e| {
                PkiError::GenerationError(format!("Failed to load issuer key: {e}"))
            })?;
            let ca_cert = CertificateDer::from(bundle.cert_der.clone());
            let signer = Issuer::from_ca_cert_der(&ca_cert, issuer_key).map_err(|e| {
                PkiError::GenerationError(format!("Failed to load issuer certificate: {e}"))
            })?;
            let cert = params.signed_by(&key_pair, &signer).map_err(|e| {
                PkiError::GenerationError(format!("Failed to sign certificate: {e}"))
            })?;
            (cert, Some(bundle.cert_der.clone()))
        }
        None => {
            let cert = params.self_signed(&key_pair).map_err(|e| {
                PkiError::GenerationError(format!("Failed to create certificate: {e}"))
            })?;
            (cert, None)
        }
    };

    Ok(IssuedCertificate {
        cert_der: cert.der().as_ref().to_vec(),
        cert_pem: cert.pem(),
        key_der: key_pair.serialize_der(),
        key_pem: key_pair.serialize_pem(),
        ca_der,
        serial_number: hex::encode(serial_number),
    })
}

// RFC 5280 attribute types without a rcgen DnType shorthand
const EMAIL_ADDRESS_OID: &[u64] = &[1, 2, 840, 113549, 1, 9, 1];
const DOMAIN_COMPONENT_OID: &[u64] = &[0, 9, 2342, 19200300, 100, 1, 25];

fn build_distinguished_name(subject: &CertificateSubject) -> DistinguishedName {
    let mut dn = DistinguishedName::new();
    dn.push(DnType::CommonName, &subject.common_name);
    if let Some(country) = &subject.country {
        dn.push(DnType::CountryName, country);
    }
    if let Some(state) = &subject.state {
        dn.push(DnType::StateOrProvinceName, state);
    }
    if let Some(locality) = &subject.locality {
        dn.push(DnType::LocalityName, locality);
    }
    if let Some(org) = &subject.organization {
        dn.push(DnType::OrganizationName, org);
    }
    if let Some(ou) = &subject.organizational_unit {
        dn.push(DnType::OrganizationalUnitName, ou);
    }
    if let Some(email) = &subject.email {
        dn.push(DnType::CustomDnType(EMAIL_ADDRESS_OID.to_vec()), email);
    }
    for dc in &subject.domain_components {
        dn.push(DnType::CustomDnType(DOMAIN_COMPONENT_OID.to_vec()), dc);
    }
    dn
}
