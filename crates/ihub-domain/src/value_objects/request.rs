//! Integration request and response types

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::Error;

/// Coarse category of operations a provider may support
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    /// Statistics and reporting
    Analytics,
    /// Media or listing upload
    Upload,
    /// Content management
    Content,
    /// Comment moderation and replies
    Comments,
    /// Direct messaging
    Messaging,
    /// Anything not covered above
    #[serde(untagged)]
    Custom(String),
}

impl Capability {
    /// Canonical lowercase name
    pub fn as_str(&self) -> &str {
        match self {
            Self::Analytics => "analytics",
            Self::Upload => "upload",
            Self::Content => "content",
            Self::Comments => "comments",
            Self::Messaging => "messaging",
            Self::Custom(name) => name,
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Capability {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        if normalized.is_empty() {
            return Err(Error::invalid_argument("Capability cannot be empty"));
        }
        Ok(match normalized.as_str() {
            "analytics" => Self::Analytics,
            "upload" => Self::Upload,
            "content" => Self::Content,
            "comments" => Self::Comments,
            "messaging" => Self::Messaging,
            _ => Self::Custom(normalized),
        })
    }
}

/// Request routed to a provider adapter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrationRequest {
    /// Request identifier, propagated into event metadata
    pub id: String,
    /// Capability the operation belongs to
    pub capability: Capability,
    /// Operation name
    pub operation: String,
    /// Operation payload
    #[serde(default)]
    pub payload: Map<String, Value>,
}

impl IntegrationRequest {
    /// Create a request with a random id and an empty payload
    pub fn new<O: Into<String>>(capability: Capability, operation: O) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            capability,
            operation: operation.into(),
            payload: Map::new(),
        }
    }

    /// Set the request id
    #[must_use]
    pub fn with_id<S: Into<String>>(mut self, id: S) -> Self {
        self.id = id.into();
        self
    }

    /// Set the payload
    #[must_use]
    pub fn with_payload(mut self, payload: Map<String, Value>) -> Self {
        self.payload = payload;
        self
    }
}

/// Response returned by a provider adapter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrationResponse {
    /// Provider that produced the response
    pub provider: String,
    /// Operation that was executed
    pub operation: String,
    /// Provider-specific data
    pub data: Value,
}

impl IntegrationResponse {
    /// Create a response
    pub fn new<P: Into<String>, O: Into<String>>(provider: P, operation: O, data: Value) -> Self {
        Self {
            provider: provider.into(),
            operation: operation.into(),
            data,
        }
    }
}
