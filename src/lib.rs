//! certmint: self-signed certificate issuance for TLS
//!
//! This library issues a self-signed ECDSA P-256 X.509 certificate and its
//! matching PKCS#8 private key, persisted as PEM files, and provides the
//! minimal HTTPS server and client that consume them. It enables users to:
//!
//! - Generate a fresh P-256 key pair and a random 128-bit serial number
//! - Build a self-signed server certificate (digital-signature / server-auth
//!   only, not a CA) for a single DNS name
//! - Persist both artifacts with the correct permission bits (certificate
//!   world-readable, key owner-only)
//! - Serve and fetch over TLS 1.3 using only the issued files
//!
//! # Architecture
//!
//! The issuance pipeline is a fixed five-stage sequence (key, serial,
//! certificate, certificate file, key file) driven by [`issuer::Issuer`].
//! Complex operations are composed from smaller, testable functions; all
//! operations return `Result` types with comprehensive error handling - no
//! `unwrap()` or panic. Stage progress is reported through an injected
//! [`issuer::IssueObserver`] so the pipeline itself stays pure.
//!
//! # Example
//!
//! ```rust,no_run
//! use certmint::cert::request::CertificateRequest;
//! use certmint::issuer::{Issuer, NoopObserver};
//! use certmint::error::Result;
//!
//! fn example() -> Result<()> {
//!     let request = CertificateRequest::with_expiry_hours("Acme", "localhost", 0)?;
//!     let issuer = Issuer::with_default_paths();
//!     let receipt = issuer.issue(&request, &NoopObserver)?;
//!     println!("Issued certificate with serial {}", receipt.serial);
//!     Ok(())
//! }
//! ```

pub mod cert;
pub mod crypto;
pub mod error;
pub mod issuer;
pub mod net;
pub mod storage;

// Re-export commonly used types
pub use error::{CertMintError, Result};
