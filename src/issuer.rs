//! The issuance pipeline orchestrator.
//!
//! [`Issuer::issue`] runs the fixed five-stage pipeline: generate key pair,
//! generate serial number, build the self-signed certificate, persist the
//! certificate envelope, persist the key envelope. Each stage runs only if
//! the prior stage succeeded; the first failure ends the run. Stage
//! progress is reported through an injected [`IssueObserver`] so the
//! pipeline itself performs no logging.

use crate::cert::builder::build_self_signed;
use crate::cert::request::CertificateRequest;
use crate::cert::serial::CertificateSerial;
use crate::crypto::p256::keypair_from_rng;
use crate::error::{CertMintError, Result};
use crate::storage::pemfile::EncodedArtifact;
use der::Encode;
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Default certificate output path.
pub const DEFAULT_CERT_PATH: &str = "cert.pem";

/// Default private-key output path.
pub const DEFAULT_KEY_PATH: &str = "private.pem";

/// A completed pipeline transition.
///
/// `KeyPersisted` is the terminal success state; an error return from
/// [`Issuer::issue`] is the absorbing failure state, reachable from any
/// transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    KeyGenerated,
    SerialGenerated,
    CertificateBuilt,
    CertificatePersisted,
    KeyPersisted,
}

/// Receives stage-completion notifications from one issuance run.
pub trait IssueObserver {
    fn stage_completed(&self, stage: Stage, detail: &str);
}

/// Observer that discards all notifications.
pub struct NoopObserver;

impl IssueObserver for NoopObserver {
    fn stage_completed(&self, _stage: Stage, _detail: &str) {}
}

/// Observer that forwards stage completions to `tracing`.
pub struct TracingObserver;

impl IssueObserver for TracingObserver {
    fn stage_completed(&self, stage: Stage, detail: &str) {
        tracing::info!(?stage, detail, "issuance stage completed");
    }
}

/// Summary of a successful issuance run.
#[derive(Debug, Clone)]
pub struct IssueReceipt {
    pub serial: CertificateSerial,
    pub not_after: SystemTime,
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
}

/// The issuance pipeline bound to its two output paths.
pub struct Issuer {
    cert_path: PathBuf,
    key_path: PathBuf,
}

impl Issuer {
    /// Create an issuer writing to the given paths.
    pub fn new(cert_path: impl Into<PathBuf>, key_path: impl Into<PathBuf>) -> Self {
        Self {
            cert_path: cert_path.into(),
            key_path: key_path.into(),
        }
    }

    /// Create an issuer writing to `cert.pem` and `private.pem` in the
    /// current directory.
    pub fn with_default_paths() -> Self {
        Self::new(DEFAULT_CERT_PATH, DEFAULT_KEY_PATH)
    }

    /// The certificate output path.
    pub fn cert_path(&self) -> &Path {
        &self.cert_path
    }

    /// The private-key output path.
    pub fn key_path(&self) -> &Path {
        &self.key_path
    }

    /// Run one issuance with the operating system's secure random source.
    ///
    /// Key material and serial number are freshly randomized on every
    /// call, so repeated calls overwrite the output files with different
    /// contents. No stage is retried and no cleanup is attempted on
    /// failure: a failed run may leave a stale certificate file without a
    /// matching key file (or vice versa), so callers must treat the pair
    /// as valid only when this returns `Ok`.
    pub fn issue(
        &self,
        request: &CertificateRequest,
        observer: &dyn IssueObserver,
    ) -> Result<IssueReceipt> {
        self.issue_with_rng(request, observer, &mut OsRng)
    }

    /// Run one issuance with the given random source.
    pub fn issue_with_rng<R: RngCore + CryptoRng>(
        &self,
        request: &CertificateRequest,
        observer: &dyn IssueObserver,
        rng: &mut R,
    ) -> Result<IssueReceipt> {
        let keypair = keypair_from_rng(rng)?;
        observer.stage_completed(Stage::KeyGenerated, &hex::encode(keypair.public_sec1_bytes()));

        let serial = CertificateSerial::from_rng(rng)?;
        observer.stage_completed(Stage::SerialGenerated, &serial.to_string());

        let certificate = build_self_signed(request, &keypair, serial)?;
        let cert_der = certificate.to_der().map_err(|e| {
            CertMintError::Encoding(format!("Failed to encode certificate: {}", e))
        })?;
        observer.stage_completed(Stage::CertificateBuilt, &request.dns_name);

        EncodedArtifact::from_certificate_der(cert_der)?.write_to(&self.cert_path)?;
        observer.stage_completed(
            Stage::CertificatePersisted,
            &self.cert_path.display().to_string(),
        );

        let key_der = keypair.to_pkcs8_der()?;
        EncodedArtifact::from_private_key_der(key_der)?.write_to(&self.key_path)?;
        observer.stage_completed(Stage::KeyPersisted, &self.key_path.display().to_string());

        Ok(IssueReceipt {
            serial,
            not_after: request.not_after,
            cert_path: self.cert_path.clone(),
            key_path: self.key_path.clone(),
        })
    }
}
