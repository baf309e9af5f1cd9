//! Certificate loading from PEM files.
//!
//! The TLS collaborators consume the issued artifacts through this module:
//! the server loads its certificate chain and key, the client loads the
//! certificate alone into a trust store.

use crate::error::{CertMintError, Result};
use rustls_pemfile::Item;
use std::io::Cursor;

/// Load the DER bytes of a single certificate from a PEM string.
///
/// # Example
///
/// ```rust,no_run
/// use certmint::cert::loader::load_certificate_from_pem;
///
/// # fn example() -> certmint::error::Result<()> {
/// let pem = std::fs::read_to_string("cert.pem")?;
/// let der = load_certificate_from_pem(&pem)?;
/// # Ok(())
/// # }
/// ```
pub fn load_certificate_from_pem(pem_str: &str) -> Result<Vec<u8>> {
    let mut cursor = Cursor::new(pem_str.as_bytes());

    match rustls_pemfile::read_one(&mut cursor)
        .map_err(|e| CertMintError::Pem(format!("Failed to read PEM: {}", e)))?
    {
        Some(Item::X509Certificate(cert_der)) => Ok(cert_der.to_vec()),
        Some(_) => Err(CertMintError::Pem(
            "PEM file does not contain a certificate".to_string(),
        )),
        None => Err(CertMintError::Pem("Empty PEM file".to_string())),
    }
}

/// Load every certificate from a PEM string (the trust-store case).
pub fn load_certificates_from_pem(pem_str: &str) -> Result<Vec<Vec<u8>>> {
    let mut cursor = Cursor::new(pem_str.as_bytes());
    let mut certificates = Vec::new();

    loop {
        match rustls_pemfile::read_one(&mut cursor)
            .map_err(|e| CertMintError::Pem(format!("Failed to read PEM: {}", e)))?
        {
            Some(Item::X509Certificate(cert_der)) => {
                certificates.push(cert_der.to_vec());
            }
            Some(_) => {
                // Skip non-certificate items
                continue;
            }
            None => break,
        }
    }

    if certificates.is_empty() {
        return Err(CertMintError::Pem(
            "No certificates found in PEM file".to_string(),
        ));
    }

    Ok(certificates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cert::builder::build_self_signed;
    use crate::cert::request::CertificateRequest;
    use crate::cert::serial::CertificateSerial;
    use crate::crypto::p256::generate_p256_keypair;
    use crate::storage::pemfile::EncodedArtifact;
    use der::Encode;

    fn cert_pem() -> String {
        let request = CertificateRequest::with_expiry_hours("Acme", "localhost", 24).unwrap();
        let keypair = generate_p256_keypair().unwrap();
        let serial = CertificateSerial::generate().unwrap();
        let cert = build_self_signed(&request, &keypair, serial).unwrap();
        EncodedArtifact::from_certificate_der(cert.to_der().unwrap())
            .unwrap()
            .encode()
            .unwrap()
    }

    #[test]
    fn test_load_certificate_from_pem() {
        let pem = cert_pem();
        let der = load_certificate_from_pem(&pem).unwrap();
        assert!(!der.is_empty());
    }

    #[test]
    fn test_load_certificate_from_invalid_pem() {
        let result = load_certificate_from_pem("not a valid pem");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_certificates_from_pem_multiple() {
        let combined = format!("{}\n{}", cert_pem(), cert_pem());
        let certs = load_certificates_from_pem(&combined).unwrap();
        assert_eq!(certs.len(), 2);
    }

    #[test]
    fn test_load_certificates_from_empty_pem() {
        let result = load_certificates_from_pem("");
        assert!(result.is_err());
    }
}
