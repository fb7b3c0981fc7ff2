//! Credential management
//!
//! | Type | Description |
//! |------|-------------|
//! | [`CredentialManager`] | Per-entry CRUD, expiry checks, rotation |
//! | [`CredentialRotationService`] | Batch rotation across providers |

mod manager;
mod rotation;

pub(crate) use manager::stored_plaintext;
pub use manager::{CredentialManager, CredentialUpdate, NewCredential, has_expired_entry};
pub use rotation::{CredentialRotationService, RotationReport, RotationSummary};
