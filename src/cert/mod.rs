//! Certificate issuance module.
//!
//! This module holds the middle stages of the pipeline: the immutable
//! issuance request, the random serial number, the self-signed certificate
//! builder, and the PEM loader used by the TLS collaborators.

pub mod builder;
pub mod loader;
pub mod request;
pub mod serial;
