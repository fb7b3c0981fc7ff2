//! Cryptographic Provider Port
//!
//! Authenticated encryption of credential payloads. Implementations live in
//! `ihub-infrastructure`.

use crate::error::{Error, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Cryptographic provider port
///
/// Ciphertexts are opaque strings. Decryption fails closed: any malformed
/// or tampered input is an error, never partial plaintext.
pub trait CryptoProvider: Send + Sync {
    /// Encrypt a UTF-8 plaintext
    fn encrypt(&self, plaintext: &str) -> Result<String>;

    /// Decrypt a value produced by [`CryptoProvider::encrypt`]
    fn decrypt(&self, ciphertext: &str) -> Result<String>;

    /// One-way digest for verification
    fn hash(&self, data: &str) -> String;

    /// True if `value` has the shape of a ciphertext produced by this
    /// provider (it may still fail to decrypt)
    fn is_ciphertext(&self, value: &str) -> bool;
}

/// JSON helpers available on every crypto provider
pub trait CryptoProviderExt {
    /// Serialize `value` to JSON and encrypt it
    fn encrypt_object<T: Serialize + ?Sized>(&self, value: &T) -> Result<String>;

    /// Decrypt and deserialize a JSON payload
    fn decrypt_object<T: DeserializeOwned>(&self, ciphertext: &str) -> Result<T>;
}

impl<P: CryptoProvider + ?Sized> CryptoProviderExt for P {
    fn encrypt_object<T: Serialize + ?Sized>(&self, value: &T) -> Result<String> {
        let json = serde_json::to_string(value)?;
        self.encrypt(&json)
    }

    fn decrypt_object<T: DeserializeOwned>(&self, ciphertext: &str) -> Result<T> {
        let json = self.decrypt(ciphertext)?;
        serde_json::from_str(&json)
            .map_err(|e| Error::crypto(format!("Decrypted payload is not valid JSON: {e}")))
    }
}
