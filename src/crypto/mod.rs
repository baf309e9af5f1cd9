//! Cryptographic operations module.
//!
//! This module provides the cryptographic primitives for certmint:
//!
//! - ECDSA P-256 key pair generation and management
//! - Signing and verification over the fixed curve
//! - PKCS#8 and SPKI serialization of key material
//!
//! Exactly one curve and one signature scheme are supported (ECDSA P-256
//! with SHA-256), so there is no algorithm registry.

pub mod p256;
