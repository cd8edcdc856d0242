//! In-memory persistence gateway for the clinic triage core.
//!
//! This crate provides an in-memory implementation of the `PersistenceGateway`
//! trait from `clinic-storage`, using papaya lock-free HashMaps for reads.
//! With a snapshot path configured, every successful mutation is written
//! through to a JSON file, and the file is reloaded on open.
//!
//! # Example
//!
//! ```ignore
//! use clinic_db_memory::{GatewayConfig, create_gateway};
//!
//! let gateway = create_gateway(&GatewayConfig::snapshot("clinic.json")).await?;
//! let id = gateway.create_patient(&patient).await?;
//! ```

pub mod factory;
mod gateway_impl;
pub mod snapshot;
pub mod storage;

// Re-export the gateway trait for convenience
pub use clinic_storage::{DynGateway, PersistenceGateway, StorageError, StorageResult};

pub use factory::{GatewayConfig, StorageBackend, create_gateway};
pub use snapshot::Snapshot;
pub use storage::InMemoryGateway;

/// Creates a new volatile in-memory gateway.
pub fn create_volatile_gateway() -> DynGateway {
    std::sync::Arc::new(InMemoryGateway::new())
}
