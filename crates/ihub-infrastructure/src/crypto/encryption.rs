//! Credential encryption service using AES-256-GCM
//!
//! Ciphertexts are three lowercase hex segments joined by `:`:
//! `nonce:tag:cipherbytes`. Nonces are 16 random bytes, so the cipher is
//! instantiated with a 128-bit nonce rather than the usual 96-bit one.

use crate::config::CryptoConfig;
use crate::constants::{
    AES_GCM_KEY_SIZE, AES_GCM_NONCE_SIZE, AES_GCM_TAG_SIZE, CIPHERTEXT_SEPARATOR,
    CREDENTIALS_AAD, LEGACY_ENCRYPTION_KEY_ENV,
};
use crate::error_ext::ErrorContext;
use aes_gcm::aead::consts::U16;
use aes_gcm::aead::{AeadCore, AeadInPlace, KeyInit, OsRng, rand_core::RngCore};
use aes_gcm::aes::Aes256;
use aes_gcm::{AesGcm, Nonce, Tag};
use ihub_domain::error::{Error, Result};
use ihub_domain::ports::CryptoProvider;
use sha2::{Digest, Sha256};
use tracing::warn;

/// AES-256-GCM with a 128-bit nonce
type Aes256Gcm16 = AesGcm<Aes256, U16>;

/// Encryption/decryption service
///
/// Implements the `CryptoProvider` port from ihub-domain.
#[derive(Clone)]
pub struct CryptoService {
    cipher: Aes256Gcm16,
    ephemeral: bool,
}

impl CryptoService {
    /// Create a crypto service from a raw 32-byte key
    pub fn new(master_key: &[u8]) -> Result<Self> {
        if master_key.len() != AES_GCM_KEY_SIZE {
            return Err(Error::crypto(format!(
                "Invalid encryption key size: expected {AES_GCM_KEY_SIZE} bytes, got {}",
                master_key.len()
            )));
        }
        let cipher = Aes256Gcm16::new_from_slice(master_key)
            .map_err(|_| Error::crypto("Failed to initialize cipher"))?;
        Ok(Self {
            cipher,
            ephemeral: false,
        })
    }

    /// Create a crypto service from a 64-character hex key
    pub fn from_hex_key(hex_key: &str) -> Result<Self> {
        let key = hex::decode(hex_key.trim()).crypto_context("Encryption key is not valid hex")?;
        Self::new(&key)
    }

    /// Create a crypto service from configuration
    ///
    /// Falls back to the legacy `ENCRYPTION_KEY` variable, then to a freshly
    /// generated key.
    pub fn from_config(config: &CryptoConfig) -> Result<Self> {
        let configured = config
            .encryption_key
            .clone()
            .or_else(|| std::env::var(LEGACY_ENCRYPTION_KEY_ENV).ok())
            .filter(|key| !key.trim().is_empty());

        match configured {
            Some(hex_key) => Self::from_hex_key(&hex_key),
            None => {
                warn!(
                    "No encryption key configured; generated an ephemeral key. \
                     Credentials encrypted now will be unreadable after a restart \
                     and by any other instance. Set crypto.encryption_key or ENCRYPTION_KEY."
                );
                let mut service = Self::new(&Self::generate_master_key())?;
                service.ephemeral = true;
                Ok(service)
            }
        }
    }

    /// Generate a random 32-byte key
    pub fn generate_master_key() -> Vec<u8> {
        let mut key = vec![0u8; AES_GCM_KEY_SIZE];
        OsRng.fill_bytes(&mut key);
        key
    }

    /// True if the key was generated at start-up rather than configured
    pub fn is_ephemeral(&self) -> bool {
        self.ephemeral
    }

    /// Encrypt a UTF-8 plaintext into `nonce:tag:cipher` hex form
    pub fn encrypt(&self, plaintext: &str) -> Result<String> {
        let nonce = Aes256Gcm16::generate_nonce(&mut OsRng);
        let mut buffer = plaintext.as_bytes().to_vec();
        let tag = self
            .cipher
            .encrypt_in_place_detached(&nonce, CREDENTIALS_AAD, &mut buffer)
            .map_err(|e| Error::crypto(format!("Encryption failed: {e}")))?;

        Ok(format!(
            "{}{CIPHERTEXT_SEPARATOR}{}{CIPHERTEXT_SEPARATOR}{}",
            hex::encode(nonce),
            hex::encode(tag),
            hex::encode(buffer)
        ))
    }

    /// Decrypt a value produced by [`CryptoService::encrypt`]
    pub fn decrypt(&self, ciphertext: &str) -> Result<String> {
        let (nonce, tag, mut buffer) = Self::split_ciphertext(ciphertext)?;

        self.cipher
            .decrypt_in_place_detached(
                Nonce::<U16>::from_slice(&nonce),
                CREDENTIALS_AAD,
                &mut buffer,
                Tag::<U16>::from_slice(&tag),
            )
            .map_err(|_| Error::crypto("Decryption failed: authentication tag mismatch"))?;

        String::from_utf8(buffer).crypto_context("Decrypted payload is not valid UTF-8")
    }

    /// True if `value` is three hex segments with a 16-byte nonce and tag
    pub fn is_ciphertext(value: &str) -> bool {
        Self::split_ciphertext(value).is_ok()
    }

    /// Compute SHA-256 hash of data as hex string
    pub fn sha256_hex(data: &[u8]) -> String {
        hex::encode(Sha256::digest(data))
    }

    /// Random hex token of `len` bytes
    pub fn generate_token(len: usize) -> String {
        let mut bytes = vec![0u8; len];
        OsRng.fill_bytes(&mut bytes);
        hex::encode(bytes)
    }

    fn split_ciphertext(value: &str) -> Result<(Vec<u8>, Vec<u8>, Vec<u8>)> {
        let mut parts = value.split(CIPHERTEXT_SEPARATOR);
        let (Some(nonce), Some(tag), Some(cipher), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(Error::crypto(
                "Invalid ciphertext format: expected nonce:tag:cipher",
            ));
        };

        let nonce = hex::decode(nonce).crypto_context("Invalid ciphertext nonce")?;
        let tag = hex::decode(tag).crypto_context("Invalid ciphertext tag")?;
        let cipher = hex::decode(cipher).crypto_context("Invalid ciphertext body")?;

        if nonce.len() != AES_GCM_NONCE_SIZE {
            return Err(Error::crypto(format!(
                "Invalid nonce length: expected {AES_GCM_NONCE_SIZE} bytes, got {}",
                nonce.len()
            )));
        }
        if tag.len() != AES_GCM_TAG_SIZE {
            return Err(Error::crypto(format!(
                "Invalid tag length: expected {AES_GCM_TAG_SIZE} bytes, got {}",
                tag.len()
            )));
        }
        Ok((nonce, tag, cipher))
    }
}

impl CryptoProvider for CryptoService {
    fn encrypt(&self, plaintext: &str) -> Result<String> {
        CryptoService::encrypt(self, plaintext)
    }

    fn decrypt(&self, ciphertext: &str) -> Result<String> {
        CryptoService::decrypt(self, ciphertext)
    }

    fn hash(&self, data: &str) -> String {
        Self::sha256_hex(data.as_bytes())
    }

    fn is_ciphertext(&self, value: &str) -> bool {
        Self::is_ciphertext(value)
    }
}

impl std::fmt::Debug for CryptoService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CryptoService")
            .field("algorithm", &"aes-256-gcm")
            .field("ephemeral", &self.ephemeral)
            .finish_non_exhaustive()
    }
}
