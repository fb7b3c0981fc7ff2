//! Integration event logging

mod logger;

pub use logger::{EventDetails, IntegrationEventLogger};
