//! HTTPS demo client that trusts the issued certificate.
//!
//! Instead of the system trust store, the client is handed the PEM text of
//! the certificate the server presents and trusts exactly that. A server
//! holding any other certificate fails verification.

use crate::cert::loader::load_certificates_from_pem;
use crate::error::{CertMintError, Result};
use http_body_util::{BodyExt, Empty};
use hyper::body::Bytes;
use hyper::{Request, Uri};
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use rustls::pki_types::CertificateDer;
use rustls::ClientConfig;
use std::str::FromStr;
use std::sync::Arc;

/// TLS configuration for the HTTPS client.
pub struct TlsConfig {
    /// Rustls client configuration
    pub client_config: Arc<ClientConfig>,
}

/// Build a client configuration trusting the certificates in `ca_pem`.
///
/// `ca_pem` is the PEM text written by the issuance pipeline; every
/// `CERTIFICATE` block in it is added to the trust anchors.
pub fn build_client_config(ca_pem: &str) -> Result<TlsConfig> {
    let trusted = load_certificates_from_pem(ca_pem)?;

    // Install default crypto provider if not already set
    let _ = rustls::crypto::ring::default_provider().install_default();

    let mut root_store = rustls::RootCertStore::empty();
    for der in trusted {
        root_store.add(CertificateDer::from(der)).map_err(|e| {
            CertMintError::Certificate(format!("Failed to add trusted cert: {:?}", e))
        })?;
    }

    let config = ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth();

    Ok(TlsConfig {
        client_config: Arc::new(config),
    })
}

/// HTTP response structure.
#[derive(Debug)]
pub struct HttpResponse {
    /// HTTP status code
    pub status_code: u16,
    /// Response headers
    pub headers: Vec<(String, String)>,
    /// Response body
    pub body: Vec<u8>,
}

/// Perform an HTTPS GET against a server trusted via `config`.
///
/// # Example
///
/// ```rust,no_run
/// use certmint::net::client::{build_client_config, https_get};
///
/// # async fn example() -> certmint::error::Result<()> {
/// let ca_pem = std::fs::read_to_string("cert.pem")?;
/// let config = build_client_config(&ca_pem)?;
///
/// let response = https_get("https://localhost:8888/client/?client_id=12345", config).await?;
/// println!("Status: {}", response.status_code);
/// # Ok(())
/// # }
/// ```
pub async fn https_get(url: &str, config: TlsConfig) -> Result<HttpResponse> {
    let uri =
        Uri::from_str(url).map_err(|e| CertMintError::Parse(format!("Invalid URL: {}", e)))?;

    if uri.scheme_str() != Some("https") {
        return Err(CertMintError::Network(
            "Only HTTPS URLs are supported".to_string(),
        ));
    }

    let https = hyper_rustls::HttpsConnectorBuilder::new()
        .with_tls_config((*config.client_config).clone())
        .https_only()
        .enable_http1()
        .build();

    let client: Client<_, Empty<Bytes>> = Client::builder(TokioExecutor::new()).build(https);

    let req = Request::builder()
        .uri(uri)
        .method("GET")
        .body(Empty::new())
        .map_err(|e| CertMintError::Network(format!("Failed to build request: {}", e)))?;

    let res = client
        .request(req)
        .await
        .map_err(|e| CertMintError::Network(format!("Request failed: {}", e)))?;

    let status_code = res.status().as_u16();

    let headers: Vec<(String, String)> = res
        .headers()
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("<binary>").to_string()))
        .collect();

    let body = res
        .into_body()
        .collect()
        .await
        .map_err(|e| CertMintError::Network(format!("Failed to read response body: {}", e)))?
        .to_bytes()
        .to_vec();

    Ok(HttpResponse {
        status_code,
        headers,
        body,
    })
}
