//! ECDSA P-256 key operations.
//!
//! This module provides functions for generating and managing P-256 key
//! pairs, the only curve the issuance pipeline uses.

use crate::error::{CertMintError, Result};
use p256::ecdsa::signature::{Signer, Verifier};
use p256::ecdsa::{Signature, SigningKey, VerifyingKey};
use p256::pkcs8::{EncodePrivateKey, EncodePublicKey};
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};

/// A P-256 key pair consisting of a secret scalar and the matching public point.
#[derive(Debug, Clone)]
pub struct Keypair {
    pub secret: SigningKey,
    pub public: VerifyingKey,
}

impl Keypair {
    /// Create a new key pair from a signing key.
    pub fn from_secret(secret: SigningKey) -> Self {
        let public = *secret.verifying_key();
        Self { secret, public }
    }

    /// Get the public key as an uncompressed SEC1 encoded point (65 bytes).
    pub fn public_sec1_bytes(&self) -> Vec<u8> {
        self.public.to_encoded_point(false).as_bytes().to_vec()
    }

    /// Serialize the private key into PKCS#8 DER form.
    pub fn to_pkcs8_der(&self) -> Result<Vec<u8>> {
        let doc = self
            .secret
            .to_pkcs8_der()
            .map_err(|e| CertMintError::KeySerialization(format!("PKCS#8 marshal failed: {}", e)))?;
        Ok(doc.as_bytes().to_vec())
    }

    /// Serialize the public key into SPKI DER form.
    pub fn public_key_der(&self) -> Result<Vec<u8>> {
        let doc = self.public.to_public_key_der().map_err(|e| {
            CertMintError::KeySerialization(format!("SPKI marshal failed: {}", e))
        })?;
        Ok(doc.as_bytes().to_vec())
    }

    /// Sign a message with ECDSA over SHA-256.
    pub fn sign(&self, message: &[u8]) -> Signature {
        self.secret.sign(message)
    }

    /// Verify a signature.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> Result<()> {
        self.public
            .verify(message, signature)
            .map_err(|e| CertMintError::Certificate(format!("Signature verification failed: {}", e)))
    }
}

/// Generate a new P-256 key pair from the operating system's secure
/// random source.
///
/// # Example
///
/// ```
/// use certmint::crypto::p256::generate_p256_keypair;
///
/// let keypair = generate_p256_keypair().unwrap();
/// assert_eq!(keypair.public_sec1_bytes().len(), 65);
/// ```
pub fn generate_p256_keypair() -> Result<Keypair> {
    keypair_from_rng(&mut OsRng)
}

/// Generate a P-256 key pair from the given random source.
///
/// An entropy read failure is fatal and reported as
/// [`CertMintError::KeyGeneration`]; it is never retried. A candidate scalar
/// outside the curve order is resampled, which is the standard rejection
/// sampling every P-256 key generator performs.
pub fn keypair_from_rng<R: RngCore + CryptoRng>(rng: &mut R) -> Result<Keypair> {
    let mut candidate = p256::FieldBytes::default();
    loop {
        rng.try_fill_bytes(candidate.as_mut_slice())
            .map_err(|e| CertMintError::KeyGeneration(format!("entropy source failed: {}", e)))?;

        match SigningKey::from_bytes(&candidate) {
            Ok(secret) => return Ok(Keypair::from_secret(secret)),
            // Candidate outside [1, n-1]; draw again.
            Err(_) => continue,
        }
    }
}
