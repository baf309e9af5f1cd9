//! Error types for the certmint library.
//!
//! This module defines all error types used throughout the library.
//! All errors implement `std::error::Error` and are designed to provide
//! clear, actionable error messages.

use thiserror::Error;

/// The main error type for certmint operations.
///
/// The first six variants map one-to-one onto the issuance pipeline stages;
/// every stage failure is terminal for the run and is never retried
/// automatically. The remaining variants cover the PEM/TLS collaborators.
#[derive(Error, Debug)]
pub enum CertMintError {
    /// Key pair generation failed (entropy source fault)
    #[error("Key generation error: {0}")]
    KeyGeneration(String),

    /// Serial number generation failed (entropy source fault)
    #[error("Serial generation error: {0}")]
    SerialGeneration(String),

    /// Certificate assembly or signing failed
    #[error("Certificate construction error: {0}")]
    CertificateConstruction(String),

    /// Private key could not be marshaled to PKCS#8
    #[error("Key serialization error: {0}")]
    KeySerialization(String),

    /// PEM envelope could not be produced
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Artifact could not be written to disk
    #[error("Persistence error: {0}")]
    Persistence(#[from] std::io::Error),

    /// PEM parsing error
    #[error("PEM error: {0}")]
    Pem(String),

    /// Certificate decoding or validation error
    #[error("Certificate error: {0}")]
    Certificate(String),

    /// TLS handshake or connection error
    #[error("Network error: {0}")]
    Network(String),

    /// Invalid input data
    #[error("Parse error: {0}")]
    Parse(String),
}

/// A specialized Result type for certmint operations.
pub type Result<T> = std::result::Result<T, CertMintError>;
