//! In-memory scheduling and lookup layer for the clinic.
//!
//! [`PatientRegistry`] mirrors patient records by identifier.
//! [`TriageScheduler`] hands out the most urgent pending appointment, dropping
//! entries that went stale since they were queued. [`Clinic`] owns one of
//! each together with a [`PersistenceGateway`](clinic_storage::PersistenceGateway)
//! and keeps them in step with the store.

pub mod clinic;
pub mod registry;
pub mod scheduler;
pub mod tracked;

pub use clinic::{Claim, Clinic, ScheduleEntry};
pub use registry::PatientRegistry;
pub use scheduler::TriageScheduler;
pub use tracked::{SharedAppointment, TrackedAppointment, TriageState};
