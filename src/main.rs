//! certmint CLI application.
//!
//! This binary issues a self-signed ECDSA P-256 certificate and can run a
//! TLS 1.3 demo server and client against the issued artifacts.

use certmint::cert::request::CertificateRequest;
use certmint::error::Result;
use certmint::issuer::{Issuer, TracingObserver, DEFAULT_CERT_PATH, DEFAULT_KEY_PATH};
use certmint::net::client::{build_client_config, https_get};
use certmint::net::server::{build_server_config, serve};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "certmint")]
#[command(about = "Self-signed certificate issuance with a TLS 1.3 demo server and client", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Issue a self-signed certificate and private key
    Issue {
        /// Subject organization name
        #[arg(long, default_value = "ECMA Corporation")]
        org: String,

        /// DNS name the certificate is valid for
        #[arg(long, default_value = "localhost")]
        dns_name: String,

        /// Validity in hours (0 means roughly a century)
        #[arg(long, default_value = "0")]
        expire: u32,

        /// Output certificate file
        #[arg(long, default_value = DEFAULT_CERT_PATH)]
        cert_out: PathBuf,

        /// Output private key file
        #[arg(long, default_value = DEFAULT_KEY_PATH)]
        key_out: PathBuf,
    },

    /// Serve HTTPS with a previously issued certificate
    Serve {
        /// Address to bind
        #[arg(long, default_value = "localhost")]
        addr: String,

        /// Port to bind
        #[arg(long, default_value = "8888")]
        port: u16,

        /// Certificate file
        #[arg(long, default_value = DEFAULT_CERT_PATH)]
        cert_pem: PathBuf,

        /// Private key file
        #[arg(long, default_value = DEFAULT_KEY_PATH)]
        private_pem: PathBuf,
    },

    /// Fetch from the demo server, trusting only the issued certificate
    Fetch {
        /// Server address
        #[arg(long, default_value = "localhost")]
        addr: String,

        /// Server port
        #[arg(long, default_value = "8888")]
        port: u16,

        /// Certificate file to trust
        #[arg(long, default_value = DEFAULT_CERT_PATH)]
        cert_pem: PathBuf,

        /// Client id echoed back by the server
        #[arg(long, default_value = "12345")]
        client_id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Issue {
            org,
            dns_name,
            expire,
            cert_out,
            key_out,
        } => handle_issue(&org, &dns_name, expire, cert_out, key_out),
        Commands::Serve {
            addr,
            port,
            cert_pem,
            private_pem,
        } => handle_serve(&addr, port, &cert_pem, &private_pem).await,
        Commands::Fetch {
            addr,
            port,
            cert_pem,
            client_id,
        } => handle_fetch(&addr, port, &cert_pem, &client_id).await,
    }
}

fn handle_issue(
    org: &str,
    dns_name: &str,
    expire: u32,
    cert_out: PathBuf,
    key_out: PathBuf,
) -> Result<()> {
    let request = CertificateRequest::with_expiry_hours(org, dns_name, expire)?;
    let issuer = Issuer::new(cert_out, key_out);

    let receipt = issuer.issue(&request, &TracingObserver)?;

    let not_after: DateTime<Utc> = receipt.not_after.into();
    println!("Issued certificate for {} ({})", dns_name, org);
    println!("Serial:      {}", receipt.serial);
    println!("Valid until: {}", not_after.format("%Y-%m-%d %H:%M:%S UTC"));
    println!("Certificate: {}", receipt.cert_path.display());
    println!("Private key: {}", receipt.key_path.display());

    Ok(())
}

async fn handle_serve(
    addr: &str,
    port: u16,
    cert_pem: &std::path::Path,
    private_pem: &std::path::Path,
) -> Result<()> {
    let config = build_server_config(cert_pem, private_pem)?;
    serve(&format!("{}:{}", addr, port), config).await
}

async fn handle_fetch(
    addr: &str,
    port: u16,
    cert_pem: &std::path::Path,
    client_id: &str,
) -> Result<()> {
    let ca_pem = fs::read_to_string(cert_pem)?;
    let config = build_client_config(&ca_pem)?;

    let url = format!(
        "https://{}:{}/client/?client_id={}",
        addr, port, client_id
    );
    let response = https_get(&url, config).await?;

    println!("Status: {}", response.status_code);
    println!("{}", String::from_utf8_lossy(&response.body));

    Ok(())
}
