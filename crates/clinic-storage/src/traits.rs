//! The persistence gateway trait.

use async_trait::async_trait;
use clinic_core::{
    Appointment, AppointmentId, AppointmentStatus, ConsultationId, Patient, PatientId,
};

use crate::error::StorageError;
use crate::types::{ConsultationRecord, NewAppointment, NewConsultation};

/// Durable CRUD for patients, appointments and consultations.
///
/// The gateway owns the single source of truth. In-memory structures are
/// written only after the corresponding gateway call succeeded, so every
/// structural error surfaces here first. Implementations must be
/// thread-safe (`Send + Sync`).
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    // ==================== Patients ====================

    /// Persists a new patient.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::DuplicateKey` if the identifier is already taken.
    async fn create_patient(&self, patient: &Patient) -> Result<PatientId, StorageError>;

    /// Reads a patient by identifier. Returns `None` if it does not exist.
    async fn get_patient(&self, id: PatientId) -> Result<Option<Patient>, StorageError>;

    /// Lists every stored patient, unfiltered.
    async fn list_patients(&self) -> Result<Vec<Patient>, StorageError>;

    /// Deletes a patient and every appointment that belongs to it.
    ///
    /// Returns whether the patient existed.
    async fn delete_patient(&self, id: PatientId) -> Result<bool, StorageError>;

    // ==================== Appointments ====================

    /// Persists a new appointment with status `scheduled` and returns its
    /// store-assigned identifier.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::UnknownPatient` if the patient does not exist.
    async fn create_appointment(
        &self,
        appointment: &NewAppointment,
    ) -> Result<AppointmentId, StorageError>;

    /// Reads an appointment by identifier. Returns `None` if it does not exist.
    async fn get_appointment(&self, id: AppointmentId)
    -> Result<Option<Appointment>, StorageError>;

    /// Sets the status of an appointment.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the appointment does not exist.
    async fn set_appointment_status(
        &self,
        id: AppointmentId,
        status: AppointmentStatus,
    ) -> Result<(), StorageError>;

    /// Lists appointments still `scheduled`, ordered by priority then time
    /// (then identifier).
    async fn list_scheduled_appointments(&self) -> Result<Vec<Appointment>, StorageError>;

    // ==================== Consultations ====================

    /// Records a consultation for an appointment.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the appointment does not exist and
    /// `StorageError::AlreadyCompleted` if it is no longer scheduled.
    async fn create_consultation(
        &self,
        consultation: &NewConsultation,
    ) -> Result<ConsultationId, StorageError>;

    /// Records the consultation and marks its appointment `completed` as one
    /// write. Either both changes are stored or neither is.
    ///
    /// # Errors
    ///
    /// Same as [`create_consultation`](Self::create_consultation).
    async fn close_appointment(
        &self,
        consultation: &NewConsultation,
    ) -> Result<ConsultationId, StorageError>;

    /// Lists consultations joined with their patient, in creation order.
    ///
    /// Consultations whose appointment or patient has since been deleted are
    /// omitted.
    async fn list_consultations(&self) -> Result<Vec<ConsultationRecord>, StorageError>;

    // ==================== Metadata ====================

    /// Returns the name of this backend.
    fn backend_name(&self) -> &'static str;
}
