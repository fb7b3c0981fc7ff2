//! Cryptographic services module
//!
//! - AES-256-GCM encryption of credential payloads
//! - SHA-256 verification digests
//! - Secure token generation

mod encryption;

pub use encryption::CryptoService;
