//! Credential entries embedded in a provider record
//!
//! Entries are keyed by `<type>_<userId|default>` inside the owning provider.
//! The public id of an entry prefixes that key with the provider id:
//! `<providerId>_<type>_<userId|default>`.

use crate::constants::{CREDENTIAL_KEY_SEPARATOR, DEFAULT_CREDENTIAL_OWNER};
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Stored credential entry
///
/// `data` holds either a `nonce:tag:cipher` hex ciphertext or, for records
/// written before encryption was introduced, a plain value. Plain values are
/// tolerated on read and replaced with ciphertext on the next write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialEntry {
    /// Credential type (e.g. "oauth", "api_key")
    #[serde(rename = "type")]
    pub credential_type: String,
    /// Encrypted payload (or legacy plain value)
    pub data: String,
    /// Owning user, if the credential is user-scoped
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Expiry instant
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    /// Creation instant
    pub created_at: DateTime<Utc>,
    /// Last update or rotation instant
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl CredentialEntry {
    /// True if the entry has an expiry at or before `now`
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }
}

/// Keyed credential mapping stored inside a provider record
///
/// Updates follow whole-record read-modify-write semantics: callers load the
/// provider, change one entry and save the provider back. Two concurrent
/// writers on the same provider can lose one of the updates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CredentialMap(BTreeMap<String, CredentialEntry>);

impl CredentialMap {
    /// Build the entry key for a credential type and optional owner
    pub fn key_for(credential_type: &str, user_id: Option<&str>) -> String {
        format!(
            "{credential_type}{CREDENTIAL_KEY_SEPARATOR}{}",
            user_id.unwrap_or(DEFAULT_CREDENTIAL_OWNER)
        )
    }

    /// Look up an entry by key
    pub fn get(&self, key: &str) -> Option<&CredentialEntry> {
        self.0.get(key)
    }

    /// Mutable lookup by key
    pub fn get_mut(&mut self, key: &str) -> Option<&mut CredentialEntry> {
        self.0.get_mut(key)
    }

    /// Insert or replace an entry, returning the previous one
    pub fn insert<K: Into<String>>(
        &mut self,
        key: K,
        entry: CredentialEntry,
    ) -> Option<CredentialEntry> {
        self.0.insert(key.into(), entry)
    }

    /// Remove an entry
    pub fn remove(&mut self, key: &str) -> Option<CredentialEntry> {
        self.0.remove(key)
    }

    /// Iterate entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &CredentialEntry)> {
        self.0.iter()
    }

    /// Iterate entries mutably in key order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&String, &mut CredentialEntry)> {
        self.0.iter_mut()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no entry is stored
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Public credential identifier: `<providerId>_<entryKey>`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CredentialId {
    provider_id: String,
    key: String,
}

impl CredentialId {
    /// Build an id from its provider and entry key
    pub fn new<P: Into<String>, K: Into<String>>(provider_id: P, key: K) -> Self {
        Self {
            provider_id: provider_id.into(),
            key: key.into(),
        }
    }

    /// Parse an id; the provider id is everything before the first `_`
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.split_once(CREDENTIAL_KEY_SEPARATOR) {
            Some((provider_id, key)) if !provider_id.is_empty() && !key.is_empty() => {
                Ok(Self::new(provider_id, key))
            }
            _ => Err(Error::invalid_argument(format!(
                "Invalid credential ID: {raw}"
            ))),
        }
    }

    /// Reject provider ids that credential ids could not be parsed back into
    pub fn validate_provider_id(provider_id: &str) -> Result<()> {
        if provider_id.is_empty() || provider_id.contains(CREDENTIAL_KEY_SEPARATOR) {
            return Err(Error::invalid_argument(format!(
                "Invalid provider ID '{provider_id}': must be non-empty and must not contain '{CREDENTIAL_KEY_SEPARATOR}'"
            )));
        }
        Ok(())
    }

    /// Owning provider
    pub fn provider_id(&self) -> &str {
        &self.provider_id
    }

    /// Entry key inside the provider's credential mapping
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl fmt::Display for CredentialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{CREDENTIAL_KEY_SEPARATOR}{}", self.provider_id, self.key)
    }
}

impl TryFrom<String> for CredentialId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<CredentialId> for String {
    fn from(id: CredentialId) -> Self {
        id.to_string()
    }
}

/// Decrypted view of a credential entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    /// Public id
    pub id: CredentialId,
    /// Owning provider
    pub provider_id: String,
    /// Credential type
    #[serde(rename = "type")]
    pub credential_type: String,
    /// Owning user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Decrypted payload
    pub data: Map<String, Value>,
    /// Expiry instant
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    /// Creation instant
    pub created_at: DateTime<Utc>,
    /// Last update or rotation instant
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Result of rotating a single credential entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RotationStatus {
    /// Entry was re-encrypted with the current key
    Rotated,
    /// Entry could not be decoded or re-encrypted and was left untouched
    Failed,
}

/// Per-entry rotation outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RotationOutcome {
    /// Public id of the entry
    pub id: CredentialId,
    /// Whether the entry was rotated
    pub status: RotationStatus,
    /// Failure message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RotationOutcome {
    /// Successful rotation
    pub fn rotated(id: CredentialId) -> Self {
        Self {
            id,
            status: RotationStatus::Rotated,
            error: None,
        }
    }

    /// Failed rotation
    pub fn failed<S: Into<String>>(id: CredentialId, error: S) -> Self {
        Self {
            id,
            status: RotationStatus::Failed,
            error: Some(error.into()),
        }
    }
}

/// Shape of the single "default" credential slot used by the legacy
/// registry accessors
///
/// Secret fields are expected to be encrypted by the caller already.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyCredential {
    /// OAuth client id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    /// Encrypted OAuth client secret
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret_enc: Option<String>,
    /// Encrypted refresh token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token_enc: Option<String>,
    /// Encrypted access token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token_enc: Option<String>,
    /// Extra provider-specific fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<Map<String, Value>>,
}
