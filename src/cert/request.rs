//! The certificate issuance request.

use crate::error::{CertMintError, Result};
use std::time::{Duration, SystemTime};

/// Validity window used when the caller asks for no explicit expiry:
/// 99 years, the "good for roughly a century" default.
const DEFAULT_VALIDITY: Duration = Duration::from_secs(99 * 365 * 24 * 60 * 60);

/// The declared intent of one issuance run.
///
/// Immutable input to the certificate builder: the subject organization,
/// exactly one DNS name, and the absolute instant the certificate expires.
/// The validity window always starts at build time.
#[derive(Debug, Clone)]
pub struct CertificateRequest {
    pub organization: String,
    pub dns_name: String,
    pub not_after: SystemTime,
}

impl CertificateRequest {
    /// Create a request with an absolute expiry instant.
    pub fn new(
        organization: impl Into<String>,
        dns_name: impl Into<String>,
        not_after: SystemTime,
    ) -> Self {
        Self {
            organization: organization.into(),
            dns_name: dns_name.into(),
            not_after,
        }
    }

    /// Create a request expiring `hours` from now; `0` means the 99-year
    /// default window.
    ///
    /// # Example
    ///
    /// ```
    /// use certmint::cert::request::CertificateRequest;
    ///
    /// let request = CertificateRequest::with_expiry_hours("Acme", "localhost", 1).unwrap();
    /// assert_eq!(request.dns_name, "localhost");
    /// ```
    pub fn with_expiry_hours(
        organization: impl Into<String>,
        dns_name: impl Into<String>,
        hours: u32,
    ) -> Result<Self> {
        let validity = if hours > 0 {
            Duration::from_secs(u64::from(hours) * 3600)
        } else {
            DEFAULT_VALIDITY
        };

        let not_after = SystemTime::now()
            .checked_add(validity)
            .ok_or_else(|| CertMintError::Parse("expiry overflows the system clock".to_string()))?;

        Ok(Self::new(organization, dns_name, not_after))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_expiry_hours() {
        let before = SystemTime::now() + Duration::from_secs(3590);
        let request = CertificateRequest::with_expiry_hours("Acme", "localhost", 1).unwrap();
        let after = SystemTime::now() + Duration::from_secs(3610);

        assert!(request.not_after > before);
        assert!(request.not_after < after);
    }

    #[test]
    fn test_zero_hours_means_a_century() {
        let request = CertificateRequest::with_expiry_hours("Acme", "localhost", 0).unwrap();

        let years = request
            .not_after
            .duration_since(SystemTime::now())
            .unwrap()
            .as_secs()
            / (365 * 24 * 60 * 60);
        assert_eq!(years, 98); // just under the full 99 years
    }

    #[test]
    fn test_fields_are_copied_verbatim() {
        let request =
            CertificateRequest::with_expiry_hours("ECMA Corporation", "example.org", 12).unwrap();
        assert_eq!(request.organization, "ECMA Corporation");
        assert_eq!(request.dns_name, "example.org");
    }
}
