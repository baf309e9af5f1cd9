//! HTTPS demo server backed by the issued certificate and key.
//!
//! The server speaks TLS 1.3 only and answers plain-text responses on
//! `/client/`, echoing the `client_id` query parameter back to the caller.

use crate::error::{CertMintError, Result};
use http_body_util::Full;
use hyper::body::{Bytes, Incoming};
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::ServerConfig;
use std::convert::Infallible;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_rustls::TlsAcceptor;

/// Build a TLS 1.3 server configuration from PEM files on disk.
///
/// `cert_path` must hold at least one `CERTIFICATE` block and `key_path`
/// a `PRIVATE KEY` block, as written by the issuance pipeline.
pub fn build_server_config(cert_path: &Path, key_path: &Path) -> Result<Arc<ServerConfig>> {
    let certs = load_cert_chain(cert_path)?;
    let key = load_private_key(key_path)?;

    // Install default crypto provider if not already set
    let _ = rustls::crypto::ring::default_provider().install_default();

    let config = ServerConfig::builder_with_protocol_versions(&[&rustls::version::TLS13])
        .with_no_client_auth()
        .with_single_cert(certs, key)
        .map_err(|e| {
            CertMintError::Network(format!("Failed to build server config: {}", e))
        })?;

    Ok(Arc::new(config))
}

fn load_cert_chain(path: &Path) -> Result<Vec<CertificateDer<'static>>> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let certs = rustls_pemfile::certs(&mut reader)
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| {
            CertMintError::Pem(format!("Failed to parse certificate chain: {}", e))
        })?;

    if certs.is_empty() {
        return Err(CertMintError::Pem(format!(
            "No certificate found in {}",
            path.display()
        )));
    }

    Ok(certs)
}

fn load_private_key(path: &Path) -> Result<PrivateKeyDer<'static>> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    rustls_pemfile::private_key(&mut reader)
        .map_err(|e| CertMintError::Pem(format!("Failed to parse private key: {}", e)))?
        .ok_or_else(|| {
            CertMintError::Pem(format!("No private key found in {}", path.display()))
        })
}

/// Accept TLS connections on `addr` and serve HTTP/1.1 forever.
///
/// Each accepted socket is handshaken and served on its own task, so a
/// failed handshake never takes the listener down.
pub async fn serve(addr: &str, config: Arc<ServerConfig>) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| CertMintError::Network(format!("Failed to bind {}: {}", addr, e)))?;
    let acceptor = TlsAcceptor::from(config);
    tracing::info!(addr, "listening for HTTPS connections");

    loop {
        let (stream, peer) = listener
            .accept()
            .await
            .map_err(|e| CertMintError::Network(format!("Accept failed: {}", e)))?;
        let acceptor = acceptor.clone();

        tokio::spawn(async move {
            let tls = match acceptor.accept(stream).await {
                Ok(tls) => tls,
                Err(e) => {
                    tracing::warn!(%peer, error = %e, "TLS handshake failed");
                    return;
                }
            };

            if let Err(e) = hyper::server::conn::http1::Builder::new()
                .serve_connection(TokioIo::new(tls), service_fn(handle_request))
                .await
            {
                tracing::warn!(%peer, error = %e, "connection closed with error");
            }
        });
    }
}

async fn handle_request(
    req: Request<Incoming>,
) -> std::result::Result<Response<Full<Bytes>>, Infallible> {
    if !req.uri().path().starts_with("/client/") {
        let mut response = Response::new(Full::new(Bytes::new()));
        *response.status_mut() = StatusCode::NOT_FOUND;
        return Ok(response);
    }

    let client_id = client_id_from_query(req.uri().query());
    tracing::info!(client_id, "serving client request");

    let body = format!(
        "Secure communication over HTTPS with client id: {}",
        client_id
    );
    let mut response = Response::new(Full::new(Bytes::from(body)));
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
    Ok(response)
}

fn client_id_from_query(query: Option<&str>) -> &str {
    query
        .unwrap_or("")
        .split('&')
        .find_map(|pair| pair.strip_prefix("client_id="))
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cert::request::CertificateRequest;
    use crate::issuer::{Issuer, NoopObserver};

    #[test]
    fn test_client_id_extraction() {
        assert_eq!(client_id_from_query(Some("client_id=12345")), "12345");
        assert_eq!(client_id_from_query(Some("a=b&client_id=xyz")), "xyz");
        assert_eq!(client_id_from_query(Some("a=b")), "");
        assert_eq!(client_id_from_query(None), "");
    }

    #[test]
    fn test_server_config_from_issued_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let issuer = Issuer::new(dir.path().join("cert.pem"), dir.path().join("private.pem"));
        let request = CertificateRequest::with_expiry_hours("Acme", "localhost", 1).unwrap();
        let receipt = issuer.issue(&request, &NoopObserver).unwrap();

        let config = build_server_config(&receipt.cert_path, &receipt.key_path);
        assert!(config.is_ok());
    }

    #[test]
    fn test_server_config_rejects_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let result = build_server_config(
            &dir.path().join("missing.pem"),
            &dir.path().join("missing-key.pem"),
        );
        assert!(matches!(result, Err(CertMintError::Persistence(_))));
    }

    #[test]
    fn test_server_config_rejects_swapped_files() {
        let dir = tempfile::tempdir().unwrap();
        let issuer = Issuer::new(dir.path().join("cert.pem"), dir.path().join("private.pem"));
        let request = CertificateRequest::with_expiry_hours("Acme", "localhost", 1).unwrap();
        let receipt = issuer.issue(&request, &NoopObserver).unwrap();

        // Key file where the certificate is expected yields an empty chain
        let result = build_server_config(&receipt.key_path, &receipt.cert_path);
        assert!(result.is_err());
    }
}
