//! Error handling types

use thiserror::Error;

/// Result type alias for operations that can fail
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the Integration Hub
#[derive(Error, Debug)]
pub enum Error {
    /// Resource not found error
    #[error("Not found: {resource}")]
    NotFound {
        /// The resource that was not found
        resource: String,
    },

    /// Invalid argument provided to a function
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the invalid argument
        message: String,
    },

    /// No registered adapter supports the requested capability and operation
    #[error("No provider supports {capability}:{operation}")]
    Unsupported {
        /// Requested capability
        capability: String,
        /// Requested operation
        operation: String,
    },

    /// Candidates existed but none survived ranking
    #[error("No healthy provider supports {capability}:{operation}")]
    NoHealthyProvider {
        /// Requested capability
        capability: String,
        /// Requested operation
        operation: String,
    },

    /// Every ranked candidate failed during sequential failover
    ///
    /// Carries the last error encountered, not an aggregate.
    #[error("All {attempted} providers failed, last error: {last}")]
    AllProvidersFailed {
        /// Number of candidates that were tried
        attempted: usize,
        /// The error raised by the last candidate
        #[source]
        last: Box<Error>,
    },

    /// Every dispatched provider failed during parallel fan-out
    #[error("All {attempted} providers failed in parallel execution: {}", .errors.join("; "))]
    AllProvidersFailedParallel {
        /// Number of providers dispatched
        attempted: usize,
        /// One message per failed dispatch, in dispatch order
        errors: Vec<String>,
    },

    /// Encryption, decryption or key handling failure
    #[error("Crypto error: {message}")]
    Crypto {
        /// Description of the crypto failure
        message: String,
    },

    /// Error raised by the persistence port
    #[error("Persistence error: {message}")]
    Persistence {
        /// Description of the persistence failure
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Error raised by a provider adapter while executing a request
    #[error("Provider '{provider_id}' failed: {message}")]
    Provider {
        /// Adapter that raised the error
        provider_id: String,
        /// Description of the failure
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration-related error
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// JSON parsing or serialization error
    #[error("JSON parsing error: {source}")]
    Json {
        /// The underlying JSON error
        #[from]
        source: serde_json::Error,
    },
}

// Basic error creation methods
impl Error {
    /// Create a not found error
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Create an invalid argument error
    pub fn invalid_argument<S: Into<String>>(message: S) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a crypto error
    pub fn crypto<S: Into<String>>(message: S) -> Self {
        Self::Crypto {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
            source: None,
        }
    }
}

// Routing error creation methods
impl Error {
    /// Create an unsupported-operation error
    pub fn unsupported<C: ToString, O: Into<String>>(capability: &C, operation: O) -> Self {
        Self::Unsupported {
            capability: capability.to_string(),
            operation: operation.into(),
        }
    }

    /// Create a no-healthy-provider error
    pub fn no_healthy_provider<C: ToString, O: Into<String>>(capability: &C, operation: O) -> Self {
        Self::NoHealthyProvider {
            capability: capability.to_string(),
            operation: operation.into(),
        }
    }

    /// Create an adapter failure
    pub fn provider<I: Into<String>, S: Into<String>>(provider_id: I, message: S) -> Self {
        Self::Provider {
            provider_id: provider_id.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Create an adapter failure with source
    pub fn provider_with_source<I, S, E>(provider_id: I, message: S, source: E) -> Self
    where
        I: Into<String>,
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Provider {
            provider_id: provider_id.into(),
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

// Persistence error creation methods
impl Error {
    /// Create a persistence error
    pub fn persistence<S: Into<String>>(message: S) -> Self {
        Self::Persistence {
            message: message.into(),
            source: None,
        }
    }

    /// Create a persistence error with source
    pub fn persistence_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Persistence {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

// Inspection helpers
impl Error {
    /// True when nothing registered could handle the request
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported { .. })
    }

    /// True for missing providers or credentials
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// True for crypto failures
    pub fn is_crypto(&self) -> bool {
        matches!(self, Self::Crypto { .. })
    }

    /// The concrete error of the last failover candidate, if this is a
    /// sequential failover failure
    pub fn last_error(&self) -> Option<&Error> {
        match self {
            Self::AllProvidersFailed { last, .. } => Some(last),
            _ => None,
        }
    }
}
