//! TLS 1.3 demo collaborators built on the issued artifacts.
//!
//! `server` terminates TLS with the issued certificate and key; `client`
//! trusts exactly that certificate and fetches over HTTPS.

pub mod client;
pub mod server;
