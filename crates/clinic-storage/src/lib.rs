//! # clinic-storage
//!
//! Persistence contract for the clinic triage core.
//!
//! This crate defines the trait and types the durable store must provide.
//! It does not contain any implementations - those are provided by separate crates.
//!
//! ## Overview
//!
//! The main trait is [`PersistenceGateway`], the single source of truth for:
//! - Patients (create, read, list, delete with cascading appointments)
//! - Appointments (create, status updates, scheduled listing)
//! - Consultations (create, close an appointment with its consultation, reporting)
//!
//! ## Example
//!
//! ```ignore
//! use clinic_storage::{PersistenceGateway, StorageError};
//! use clinic_core::{Patient, PatientId};
//!
//! async fn lookup(
//!     gateway: &dyn PersistenceGateway,
//!     id: PatientId,
//! ) -> Result<Patient, StorageError> {
//!     gateway
//!         .get_patient(id)
//!         .await?
//!         .ok_or_else(|| StorageError::not_found("Patient", id))
//! }
//! ```

mod error;
mod traits;
mod types;

pub use error::{ErrorCategory, StorageError};
pub use traits::PersistenceGateway;
pub use types::{ConsultationRecord, NewAppointment, NewConsultation};

/// Type alias for a storage result.
pub type StorageResult<T> = Result<T, StorageError>;

/// Type alias for a shareable gateway trait object.
pub type DynGateway = std::sync::Arc<dyn PersistenceGateway>;
