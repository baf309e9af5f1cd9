//! Self-signed certificate construction.
//!
//! Deterministic structural assembly of the TBS certificate followed by a
//! single ECDSA signing operation. Issuer and subject are the same name,
//! and the certificate embeds the public half of the key pair that signs
//! it; any failure aborts the run without retrying.

use crate::cert::request::CertificateRequest;
use crate::cert::serial::CertificateSerial;
use crate::crypto::p256::Keypair;
use crate::error::{CertMintError, Result};
use const_oid::db::rfc5280::ID_KP_SERVER_AUTH;
use const_oid::db::rfc5912::ECDSA_WITH_SHA_256;
use const_oid::AssociatedOid;
use der::asn1::{BitString, Ia5String, ObjectIdentifier, OctetString, SetOfVec, Utf8StringRef};
use der::{Decode, Encode};
use p256::ecdsa::signature::Verifier;
use p256::ecdsa::{Signature, VerifyingKey};
use p256::pkcs8::{DecodePublicKey, EncodePublicKey};
use spki::{AlgorithmIdentifierOwned, SubjectPublicKeyInfoOwned};
use std::time::SystemTime;
use x509_cert::attr::AttributeTypeAndValue;
use x509_cert::certificate::{Certificate, Version};
use x509_cert::ext::pkix::name::GeneralName;
use x509_cert::ext::pkix::{
    BasicConstraints, ExtendedKeyUsage, KeyUsage, KeyUsages, SubjectAltName,
};
use x509_cert::ext::Extension;
use x509_cert::name::{RdnSequence, RelativeDistinguishedName};
use x509_cert::time::{Time, Validity};
use x509_cert::TbsCertificate;

/// id-at-organizationName (RFC 5280)
const ORGANIZATION_NAME: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.10");

/// Build a self-signed server certificate.
///
/// The subject carries the request's organization verbatim, the subject
/// alternative name carries exactly the request's DNS name, and the
/// validity window runs from now until the request's expiry instant.
/// Key usage is digital-signature only, extended key usage is
/// server-authentication only, and the certificate is not a CA.
///
/// # Example
///
/// ```
/// use certmint::cert::builder::build_self_signed;
/// use certmint::cert::request::CertificateRequest;
/// use certmint::cert::serial::CertificateSerial;
/// use certmint::crypto::p256::generate_p256_keypair;
///
/// # fn example() -> certmint::error::Result<()> {
/// let request = CertificateRequest::with_expiry_hours("Acme", "localhost", 24)?;
/// let keypair = generate_p256_keypair()?;
/// let serial = CertificateSerial::generate()?;
/// let cert = build_self_signed(&request, &keypair, serial)?;
/// assert_eq!(cert.tbs_certificate.issuer, cert.tbs_certificate.subject);
/// # Ok(())
/// # }
/// ```
pub fn build_self_signed(
    request: &CertificateRequest,
    keypair: &Keypair,
    serial: CertificateSerial,
) -> Result<Certificate> {
    let serial_number = serial.to_x509()?;
    let subject = organization_name(&request.organization)?;
    let issuer = subject.clone(); // Self-signed
    let validity = validity_window(request.not_after)?;
    let spki = subject_public_key_info(keypair)?;
    let signature_algorithm = ecdsa_with_sha256();

    let tbs = TbsCertificate {
        version: Version::V3,
        serial_number,
        signature: signature_algorithm.clone(),
        issuer,
        validity,
        subject,
        subject_public_key_info: spki,
        issuer_unique_id: None,
        subject_unique_id: None,
        extensions: Some(server_extensions(&request.dns_name)?),
    };

    let signature = sign_tbs(&tbs, keypair)?;

    Ok(Certificate {
        tbs_certificate: tbs,
        signature_algorithm,
        signature,
    })
}

/// Verify a certificate's signature against its own embedded public key.
pub fn verify_self_signature(cert: &Certificate) -> Result<()> {
    let spki_der = cert
        .tbs_certificate
        .subject_public_key_info
        .to_der()
        .map_err(|e| CertMintError::Certificate(format!("Failed to encode SPKI: {}", e)))?;
    let public = VerifyingKey::from_public_key_der(&spki_der)
        .map_err(|e| CertMintError::Certificate(format!("Embedded public key rejected: {}", e)))?;

    let tbs_der = cert
        .tbs_certificate
        .to_der()
        .map_err(|e| CertMintError::Certificate(format!("Failed to encode TBS: {}", e)))?;

    let signature_bytes = cert
        .signature
        .as_bytes()
        .ok_or_else(|| CertMintError::Certificate("Signature has unused bits".to_string()))?;
    let signature = Signature::from_der(signature_bytes)
        .map_err(|e| CertMintError::Certificate(format!("Malformed ECDSA signature: {}", e)))?;

    public
        .verify(&tbs_der, &signature)
        .map_err(|e| CertMintError::Certificate(format!("Self-signature does not verify: {}", e)))
}

// Helper functions

fn organization_name(organization: &str) -> Result<RdnSequence> {
    let attr = AttributeTypeAndValue {
        oid: ORGANIZATION_NAME,
        value: Utf8StringRef::new(organization)
            .map_err(|e| {
                CertMintError::CertificateConstruction(format!("Invalid organization: {}", e))
            })?
            .into(),
    };

    let mut attr_set = SetOfVec::new();
    attr_set.insert_ordered(attr).map_err(|e| {
        CertMintError::CertificateConstruction(format!("Failed to add attribute: {}", e))
    })?;

    Ok(RdnSequence(vec![RelativeDistinguishedName::from(attr_set)]))
}

fn validity_window(not_after: SystemTime) -> Result<Validity> {
    let not_before = SystemTime::now();
    if not_after <= not_before {
        return Err(CertMintError::CertificateConstruction(
            "expiry precedes the start of validity".to_string(),
        ));
    }

    Ok(Validity {
        not_before: Time::try_from(not_before).map_err(|e| {
            CertMintError::CertificateConstruction(format!("Invalid NotBefore: {}", e))
        })?,
        not_after: Time::try_from(not_after).map_err(|e| {
            CertMintError::CertificateConstruction(format!("Invalid NotAfter: {}", e))
        })?,
    })
}

fn subject_public_key_info(keypair: &Keypair) -> Result<SubjectPublicKeyInfoOwned> {
    let spki_der = keypair.public.to_public_key_der().map_err(|e| {
        CertMintError::CertificateConstruction(format!("Failed to encode public key: {}", e))
    })?;

    SubjectPublicKeyInfoOwned::from_der(spki_der.as_bytes()).map_err(|e| {
        CertMintError::CertificateConstruction(format!("Failed to decode SPKI: {}", e))
    })
}

fn ecdsa_with_sha256() -> AlgorithmIdentifierOwned {
    // RFC 5758: parameters are absent for ecdsa-with-SHA256
    AlgorithmIdentifierOwned {
        oid: ECDSA_WITH_SHA_256,
        parameters: None,
    }
}

fn server_extensions(dns_name: &str) -> Result<Vec<Extension>> {
    let key_usage = KeyUsage(KeyUsages::DigitalSignature.into());
    let ext_key_usage = ExtendedKeyUsage(vec![ID_KP_SERVER_AUTH]);
    let basic_constraints = BasicConstraints {
        ca: false,
        path_len_constraint: None,
    };
    let dns = Ia5String::new(dns_name)
        .map_err(|e| CertMintError::CertificateConstruction(format!("Invalid DNS name: {}", e)))?;
    let subject_alt_name = SubjectAltName(vec![GeneralName::DnsName(dns)]);

    Ok(vec![
        extension(&key_usage, true)?,
        extension(&ext_key_usage, false)?,
        extension(&basic_constraints, true)?,
        extension(&subject_alt_name, false)?,
    ])
}

fn extension<T: AssociatedOid + Encode>(ext: &T, critical: bool) -> Result<Extension> {
    let value = ext.to_der().map_err(|e| {
        CertMintError::CertificateConstruction(format!("Failed to encode extension: {}", e))
    })?;

    Ok(Extension {
        extn_id: T::OID,
        critical,
        extn_value: OctetString::new(value).map_err(|e| {
            CertMintError::CertificateConstruction(format!("Failed to wrap extension: {}", e))
        })?,
    })
}

fn sign_tbs(tbs: &TbsCertificate, keypair: &Keypair) -> Result<BitString> {
    let tbs_der = tbs
        .to_der()
        .map_err(|e| CertMintError::CertificateConstruction(format!("Failed to encode TBS: {}", e)))?;

    let signature = keypair.sign(&tbs_der);
    let signature_der = signature.to_der();

    BitString::from_bytes(signature_der.as_bytes()).map_err(|e| {
        CertMintError::CertificateConstruction(format!(
            "Failed to create signature bitstring: {}",
            e
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::p256::generate_p256_keypair;
    use std::time::Duration;

    fn issue_one(hours: u32) -> Certificate {
        let request =
            CertificateRequest::with_expiry_hours("Acme", "localhost", hours).unwrap();
        let keypair = generate_p256_keypair().unwrap();
        let serial = CertificateSerial::generate().unwrap();
        build_self_signed(&request, &keypair, serial).unwrap()
    }

    fn find_extension(cert: &Certificate, oid: ObjectIdentifier) -> Extension {
        cert.tbs_certificate
            .extensions
            .as_ref()
            .unwrap()
            .iter()
            .find(|e| e.extn_id == oid)
            .cloned()
            .unwrap_or_else(|| panic!("missing extension {}", oid))
    }

    #[test]
    fn test_issuer_equals_subject() {
        let cert = issue_one(24);
        assert_eq!(cert.tbs_certificate.issuer, cert.tbs_certificate.subject);
    }

    #[test]
    fn test_self_signature_verifies() {
        let cert = issue_one(24);
        assert!(verify_self_signature(&cert).is_ok());
    }

    #[test]
    fn test_signature_does_not_verify_against_foreign_key() {
        let request = CertificateRequest::with_expiry_hours("Acme", "localhost", 24).unwrap();
        let keypair = generate_p256_keypair().unwrap();
        let serial = CertificateSerial::generate().unwrap();
        let mut cert = build_self_signed(&request, &keypair, serial).unwrap();

        // Swap in an unrelated public key; the signature must now fail
        let other = generate_p256_keypair().unwrap();
        cert.tbs_certificate.subject_public_key_info =
            subject_public_key_info(&other).unwrap();

        assert!(verify_self_signature(&cert).is_err());
    }

    #[test]
    fn test_validity_ordering() {
        let cert = issue_one(1);
        let not_before = cert.tbs_certificate.validity.not_before.to_system_time();
        let not_after = cert.tbs_certificate.validity.not_after.to_system_time();
        assert!(not_before < not_after);

        let window = not_after.duration_since(not_before).unwrap();
        assert!(window >= Duration::from_secs(3590));
        assert!(window <= Duration::from_secs(3610));
    }

    #[test]
    fn test_expired_request_is_rejected() {
        let past = SystemTime::now() - Duration::from_secs(60);
        let request = CertificateRequest::new("Acme", "localhost", past);
        let keypair = generate_p256_keypair().unwrap();
        let serial = CertificateSerial::generate().unwrap();

        let result = build_self_signed(&request, &keypair, serial);
        assert!(matches!(
            result,
            Err(CertMintError::CertificateConstruction(_))
        ));
    }

    #[test]
    fn test_san_holds_exactly_the_requested_dns_name() {
        let cert = issue_one(24);
        let ext = find_extension(&cert, SubjectAltName::OID);
        assert!(!ext.critical);

        let san = SubjectAltName::from_der(ext.extn_value.as_bytes()).unwrap();
        assert_eq!(san.0.len(), 1);
        match &san.0[0] {
            GeneralName::DnsName(name) => assert_eq!(name.to_string(), "localhost"),
            other => panic!("unexpected general name {:?}", other),
        }
    }

    #[test]
    fn test_key_usage_is_digital_signature_only() {
        let cert = issue_one(24);
        let ext = find_extension(&cert, KeyUsage::OID);
        assert!(ext.critical);

        let key_usage = KeyUsage::from_der(ext.extn_value.as_bytes()).unwrap();
        assert!(key_usage.digital_signature());
        assert_eq!(key_usage, KeyUsage(KeyUsages::DigitalSignature.into()));
    }

    #[test]
    fn test_extended_key_usage_is_server_auth_only() {
        let cert = issue_one(24);
        let ext = find_extension(&cert, ExtendedKeyUsage::OID);
        assert!(!ext.critical);

        let eku = ExtendedKeyUsage::from_der(ext.extn_value.as_bytes()).unwrap();
        assert_eq!(eku.0, vec![ID_KP_SERVER_AUTH]);
    }

    #[test]
    fn test_not_a_certificate_authority() {
        let cert = issue_one(24);
        let ext = find_extension(&cert, BasicConstraints::OID);
        assert!(ext.critical);

        let bc = BasicConstraints::from_der(ext.extn_value.as_bytes()).unwrap();
        assert!(!bc.ca);
        assert!(bc.path_len_constraint.is_none());
    }

    #[test]
    fn test_serial_is_embedded_verbatim() {
        let request = CertificateRequest::with_expiry_hours("Acme", "localhost", 24).unwrap();
        let keypair = generate_p256_keypair().unwrap();
        let serial = CertificateSerial::generate().unwrap();
        let cert = build_self_signed(&request, &keypair, serial).unwrap();

        assert_eq!(
            cert.tbs_certificate.serial_number.as_bytes(),
            serial.to_der_bytes().as_slice()
        );
    }

    #[test]
    fn test_certificate_der_roundtrip() {
        let cert = issue_one(24);
        let der = cert.to_der().unwrap();
        let decoded = Certificate::from_der(&der).unwrap();
        assert_eq!(decoded, cert);
    }
}
