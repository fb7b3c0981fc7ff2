//! Infrastructure layer constants
//!
//! Contains constants that are part of the infrastructure implementation.
//! Routing and credential semantics are defined in `ihub_domain::constants`.

// ============================================================================
// CONFIGURATION CONSTANTS
// ============================================================================

/// Default configuration file name
pub const DEFAULT_CONFIG_FILENAME: &str = "ihub.toml";

/// Default configuration directory name
pub const DEFAULT_CONFIG_DIR: &str = "ihub";

/// Environment variable prefix for configuration
pub const CONFIG_ENV_PREFIX: &str = "IHUB";

/// Separator between nested keys in environment variables
pub const CONFIG_ENV_SEPARATOR: &str = "__";

// ============================================================================
// LOGGING CONSTANTS
// ============================================================================

/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Environment variable that overrides the log filter
pub const LOG_FILTER_ENV: &str = "IHUB_LOG";

/// File stem used for rolling log files when none is configured
pub const DEFAULT_LOG_FILE_STEM: &str = "ihub";

// ============================================================================
// CRYPTO CONSTANTS
// ============================================================================

/// AES-256 key size in bytes
pub const AES_GCM_KEY_SIZE: usize = 32;

/// Nonce size in bytes
pub const AES_GCM_NONCE_SIZE: usize = 16;

/// Authentication tag size in bytes
pub const AES_GCM_TAG_SIZE: usize = 16;

/// Associated data binding ciphertexts to the credential use case
pub const CREDENTIALS_AAD: &[u8] = b"integration-credentials";

/// Separator between the hex segments of a ciphertext
pub const CIPHERTEXT_SEPARATOR: char = ':';

/// Legacy environment variable holding the encryption key
pub const LEGACY_ENCRYPTION_KEY_ENV: &str = "ENCRYPTION_KEY";

/// Default length of generated tokens in bytes
pub const DEFAULT_TOKEN_BYTES: usize = 32;

// ============================================================================
// EVENT METADATA KEYS
// ============================================================================

/// Metadata key holding a failure message
pub const EVENT_META_ERROR: &str = "error";

/// Metadata key holding the error source chain
pub const EVENT_META_CAUSES: &str = "causes";

/// Metadata key holding the request capability
pub const EVENT_META_CAPABILITY: &str = "capability";

/// Metadata key holding the request id
pub const EVENT_META_REQUEST_ID: &str = "requestId";
