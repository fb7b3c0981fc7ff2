//! # Integration Hub - Domain Layer
//!
//! Core types and boundary contracts for routing operations across
//! interchangeable external-service providers.
//!
//! ## Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`entities`] | Persisted shapes: provider records, credential entries, integration events |
//! | [`value_objects`] | Ephemeral types: requests, responses, health, scores |
//! | [`ports`] | Traits implemented by adapters and infrastructure |
//! | [`error`] | Domain error type and `Result` alias |
//! | [`constants`] | Routing and credential constants |
//!
//! This crate has no knowledge of storage engines, HTTP or cryptography
//! libraries. Infrastructure depends on it, never the other way around.

pub mod constants;
pub mod entities;
pub mod error;
pub mod ports;
pub mod value_objects;

pub use error::{Error, Result};
