//! Certificate serial number generation.
//!
//! Serials are drawn uniformly from [0, 2^128) with the secure random
//! source and converted to the canonical positive DER integer form the
//! X.509 structure expects.

use crate::error::{CertMintError, Result};
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use std::fmt;
use x509_cert::serial_number::SerialNumber;

/// A certificate serial number in [0, 2^128).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CertificateSerial(u128);

impl CertificateSerial {
    /// Draw a fresh serial from the operating system's secure random source.
    pub fn generate() -> Result<Self> {
        Self::from_rng(&mut OsRng)
    }

    /// Draw a fresh serial from the given random source.
    ///
    /// An entropy read failure is reported as
    /// [`CertMintError::SerialGeneration`] and is never retried.
    pub fn from_rng<R: RngCore + CryptoRng>(rng: &mut R) -> Result<Self> {
        let mut bytes = [0u8; 16];
        rng.try_fill_bytes(&mut bytes)
            .map_err(|e| CertMintError::SerialGeneration(format!("entropy source failed: {}", e)))?;
        Ok(Self(u128::from_be_bytes(bytes)))
    }

    /// The serial as an integer.
    pub fn value(&self) -> u128 {
        self.0
    }

    /// Minimal big-endian DER content octets: no redundant leading zeroes,
    /// at least one byte, a 0x00 pad when the top bit is set so the value
    /// stays positive.
    pub fn to_der_bytes(&self) -> Vec<u8> {
        let raw = self.0.to_be_bytes();
        let start = raw.iter().position(|&b| b != 0).unwrap_or(raw.len() - 1);

        let mut out = Vec::with_capacity(17);
        if raw[start] & 0x80 != 0 {
            out.push(0x00);
        }
        out.extend_from_slice(&raw[start..]);
        out
    }

    /// Convert into the X.509 serial number representation.
    pub fn to_x509(&self) -> Result<SerialNumber> {
        SerialNumber::new(&self.to_der_bytes()).map_err(|e| {
            CertMintError::SerialGeneration(format!("serial number rejected: {}", e))
        })
    }
}

impl fmt::Display for CertificateSerial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:x}", self.0)
    }
}
