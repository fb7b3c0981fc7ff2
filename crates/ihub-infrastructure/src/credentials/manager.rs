//! Credential manager
//!
//! CRUD, expiry checks and key rotation for credential entries embedded in
//! provider records. Every mutation is a whole-record read-modify-write:
//! two concurrent writers on the same provider can lose one update. Callers
//! that need stronger guarantees must serialize writes per provider.

use chrono::{DateTime, Utc};
use ihub_domain::constants::RAW_CREDENTIAL_FIELD;
use ihub_domain::entities::{
    Credential, CredentialEntry, CredentialId, CredentialMap, ProviderRecord, RotationOutcome,
};
use ihub_domain::error::{Error, Result};
use ihub_domain::ports::{Clock, CryptoProvider, CryptoProviderExt, ProviderStore};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Input for a new credential
#[derive(Debug, Clone, PartialEq)]
pub struct NewCredential {
    /// Credential type (e.g. "oauth", "api_key")
    pub credential_type: String,
    /// Secret payload, encrypted before storage
    pub data: Map<String, Value>,
    /// Owning user
    pub user_id: Option<String>,
    /// Expiry instant
    pub expires_at: Option<DateTime<Utc>>,
}

impl NewCredential {
    /// Unscoped, non-expiring credential
    pub fn new<S: Into<String>>(credential_type: S, data: Map<String, Value>) -> Self {
        Self {
            credential_type: credential_type.into(),
            data,
            user_id: None,
            expires_at: None,
        }
    }

    /// Scope the credential to a user
    #[must_use]
    pub fn for_user<S: Into<String>>(mut self, user_id: S) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Set an expiry
    #[must_use]
    pub fn expiring_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }
}

/// Partial update of a credential entry
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CredentialUpdate {
    /// Replacement payload
    pub data: Option<Map<String, Value>>,
    /// Replacement expiry
    pub expires_at: Option<DateTime<Utc>>,
}

/// Manages encrypted credentials stored inside provider records
pub struct CredentialManager {
    store: Arc<dyn ProviderStore>,
    crypto: Arc<dyn CryptoProvider>,
    clock: Arc<dyn Clock>,
}

impl CredentialManager {
    /// Create a manager
    pub fn new(
        store: Arc<dyn ProviderStore>,
        crypto: Arc<dyn CryptoProvider>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            crypto,
            clock,
        }
    }

    /// Encrypt and store a credential under `type_(userId|default)`
    ///
    /// An existing entry under the same key is replaced. Provider ids
    /// containing `_` are rejected since the resulting credential id could
    /// not be resolved.
    pub async fn create_credential(
        &self,
        provider_id: &str,
        input: NewCredential,
    ) -> Result<Credential> {
        CredentialId::validate_provider_id(provider_id)?;
        let mut record = self.require_provider(provider_id).await?;
        let now = self.clock.now();

        let key = CredentialMap::key_for(&input.credential_type, input.user_id.as_deref());
        let entry = CredentialEntry {
            credential_type: input.credential_type,
            data: self.crypto.encrypt_object(&input.data)?,
            user_id: input.user_id,
            expires_at: input.expires_at,
            created_at: now,
            updated_at: None,
        };
        let view = to_view(provider_id, &key, &entry, input.data);

        record.credentials.insert(key, entry);
        record.touch(now);
        self.store.save_provider(&record).await?;

        info!(provider_id, credential_id = %view.id, "Created credential");
        Ok(view)
    }

    /// Decrypted credentials of a provider, optionally for one user
    ///
    /// A missing provider yields an empty list. A ciphertext that fails to
    /// decrypt fails the whole call.
    pub async fn get_credentials(
        &self,
        provider_id: &str,
        user_id: Option<&str>,
    ) -> Result<Vec<Credential>> {
        let Some(record) = self.store.find_provider(provider_id).await? else {
            return Ok(Vec::new());
        };

        record
            .credentials
            .iter()
            .filter(|(_, entry)| user_id.is_none_or(|user| entry.user_id.as_deref() == Some(user)))
            .map(|(key, entry)| {
                let data = self.decode_data(&entry.data)?;
                Ok(to_view(provider_id, key, entry, data))
            })
            .collect()
    }

    /// One decrypted credential, `None` when the provider or entry is missing
    pub async fn get_credential(&self, credential_id: &str) -> Result<Option<Credential>> {
        let Ok(id) = CredentialId::parse(credential_id) else {
            return Ok(None);
        };
        let Some(record) = self.store.find_provider(id.provider_id()).await? else {
            return Ok(None);
        };
        let Some(entry) = record.credentials.get(id.key()) else {
            return Ok(None);
        };

        let data = self.decode_data(&entry.data)?;
        Ok(Some(to_view(id.provider_id(), id.key(), entry, data)))
    }

    /// Replace the payload and/or expiry of a credential
    ///
    /// A legacy plain payload is re-encrypted even when no new data is given.
    pub async fn update_credential(
        &self,
        credential_id: &str,
        update: CredentialUpdate,
    ) -> Result<Credential> {
        let id = CredentialId::parse(credential_id)?;
        let mut record = self.require_provider(id.provider_id()).await?;
        let now = self.clock.now();

        let entry = record
            .credentials
            .get_mut(id.key())
            .ok_or_else(|| Error::not_found(format!("Credential {id}")))?;

        let data = match update.data {
            Some(data) => {
                entry.data = self.crypto.encrypt_object(&data)?;
                data
            }
            None => {
                let data = self.decode_data(&entry.data)?;
                if !self.crypto.is_ciphertext(&entry.data) {
                    entry.data = self.crypto.encrypt_object(&data)?;
                }
                data
            }
        };
        if let Some(expires_at) = update.expires_at {
            entry.expires_at = Some(expires_at);
        }
        entry.updated_at = Some(now);
        let view = to_view(id.provider_id(), id.key(), entry, data);

        record.touch(now);
        self.store.save_provider(&record).await?;

        debug!(credential_id = %id, "Updated credential");
        Ok(view)
    }

    /// Remove a credential
    pub async fn delete_credential(&self, credential_id: &str) -> Result<()> {
        let id = CredentialId::parse(credential_id)?;
        let mut record = self.require_provider(id.provider_id()).await?;

        if record.credentials.remove(id.key()).is_none() {
            return Err(Error::not_found(format!("Credential {id}")));
        }
        record.touch(self.clock.now());
        self.store.save_provider(&record).await?;

        info!(credential_id = %id, "Deleted credential");
        Ok(())
    }

    /// True if any credential of the provider expires at or before now
    pub async fn check_expired_credentials(&self, provider_id: &str) -> Result<bool> {
        let Some(record) = self.store.find_provider(provider_id).await? else {
            return Ok(false);
        };
        Ok(has_expired_entry(&record, self.clock.now()))
    }

    /// Re-encrypt every credential of a provider with the current key
    ///
    /// Entries are isolated: one that cannot be decoded or re-encrypted is
    /// reported as failed and keeps its previous data. The record is saved
    /// once, after every entry has been processed.
    pub async fn rotate_credentials(&self, provider_id: &str) -> Result<Vec<RotationOutcome>> {
        let mut record = self.require_provider(provider_id).await?;
        let now = self.clock.now();

        let mut outcomes = Vec::with_capacity(record.credentials.len());
        for (key, entry) in record.credentials.iter_mut() {
            let id = CredentialId::new(provider_id, key.as_str());
            let rotated = self
                .decode_data(&entry.data)
                .and_then(|data| self.crypto.encrypt_object(&data));
            match rotated {
                Ok(ciphertext) => {
                    entry.data = ciphertext;
                    entry.updated_at = Some(now);
                    outcomes.push(RotationOutcome::rotated(id));
                }
                Err(e) => {
                    warn!(credential_id = %id, error = %e, "Credential rotation failed");
                    outcomes.push(RotationOutcome::failed(id, e.to_string()));
                }
            }
        }

        record.touch(now);
        self.store.save_provider(&record).await?;

        info!(
            provider_id,
            total = outcomes.len(),
            "Rotated provider credentials"
        );
        Ok(outcomes)
    }

    /// Decode a stored payload
    ///
    /// Ciphertexts go through strict decryption and may fail. Anything else
    /// is a legacy plain value: a JSON object is used as is, any other
    /// value is wrapped as `{"raw": value}`.
    pub fn decode_data(&self, stored: &str) -> Result<Map<String, Value>> {
        let plaintext = stored_plaintext(self.crypto.as_ref(), stored)?;
        Ok(parse_or_wrap(&plaintext))
    }

    async fn require_provider(&self, provider_id: &str) -> Result<ProviderRecord> {
        self.store
            .find_provider(provider_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("Provider {provider_id}")))
    }
}

/// True if any entry of the record has expired at `now`
pub fn has_expired_entry(record: &ProviderRecord, now: DateTime<Utc>) -> bool {
    record
        .credentials
        .iter()
        .any(|(_, entry)| entry.is_expired(now))
}

/// Plaintext of a stored credential payload
///
/// Values in ciphertext form are decrypted and may fail. Legacy plain
/// values are returned unchanged.
pub(crate) fn stored_plaintext(crypto: &dyn CryptoProvider, stored: &str) -> Result<String> {
    if crypto.is_ciphertext(stored) {
        crypto.decrypt(stored)
    } else {
        Ok(stored.to_string())
    }
}

fn parse_or_wrap(value: &str) -> Map<String, Value> {
    match serde_json::from_str::<Value>(value) {
        Ok(Value::Object(map)) => map,
        _ => {
            let mut wrapped = Map::new();
            wrapped.insert(RAW_CREDENTIAL_FIELD.to_string(), Value::from(value));
            wrapped
        }
    }
}

fn to_view(
    provider_id: &str,
    key: &str,
    entry: &CredentialEntry,
    data: Map<String, Value>,
) -> Credential {
    Credential {
        id: CredentialId::new(provider_id, key),
        provider_id: provider_id.to_string(),
        credential_type: entry.credential_type.clone(),
        user_id: entry.user_id.clone(),
        data,
        expires_at: entry.expires_at,
        created_at: entry.created_at,
        updated_at: entry.updated_at,
    }
}

impl std::fmt::Debug for CredentialManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialManager").finish_non_exhaustive()
    }
}
