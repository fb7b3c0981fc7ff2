//! Domain layer constants
//!
//! Values that define routing and credential semantics. Infrastructure
//! defaults (file names, env prefixes) live in `ihub_infrastructure::constants`.

// ============================================================================
// HEALTH & SCORING CONSTANTS
// ============================================================================

/// How long a computed provider health stays valid (seconds)
pub const HEALTH_CACHE_TTL_SECS: u64 = 60;

/// Sliding window used to count recent failures (seconds)
pub const ERROR_WINDOW_SECS: u64 = 3600;

/// More failures than this inside the window marks a provider degraded
pub const DEGRADED_ERROR_THRESHOLD: u64 = 5;

/// More failures than this inside the window marks a provider unhealthy
pub const UNHEALTHY_ERROR_THRESHOLD: u64 = 10;

/// Score multiplier for healthy providers
pub const HEALTHY_MULTIPLIER: f64 = 1.0;

/// Score multiplier for degraded providers
pub const DEGRADED_MULTIPLIER: f64 = 0.7;

/// Score multiplier for unhealthy providers
pub const UNHEALTHY_MULTIPLIER: f64 = 0.3;

/// Score reduction per recent failure
pub const ERROR_PENALTY_STEP: f64 = 0.05;

/// Lower bound of the error penalty factor
pub const ERROR_PENALTY_FLOOR: f64 = 0.5;

/// Weight used when a provider has no usable routing configuration
pub const DEFAULT_PROVIDER_WEIGHT: f64 = 1.0;

/// Default number of providers used by parallel fan-out
pub const DEFAULT_PARALLEL_COUNT: usize = 2;

// ============================================================================
// CREDENTIAL CONSTANTS
// ============================================================================

/// Separator between the parts of a credential key or id
pub const CREDENTIAL_KEY_SEPARATOR: char = '_';

/// Owner segment used when a credential is not bound to a user
pub const DEFAULT_CREDENTIAL_OWNER: &str = "default";

/// Slot used by the legacy single-credential accessors
pub const LEGACY_CREDENTIAL_SLOT: &str = "default";

/// Key under which undecodable legacy values are wrapped
pub const RAW_CREDENTIAL_FIELD: &str = "raw";

/// Provider type assigned when a provider is first created by upsert
pub const UNKNOWN_PROVIDER_TYPE: &str = "unknown";
