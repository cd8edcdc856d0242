//! Request and record types exchanged with the persistence gateway.

use clinic_core::{
    AppointmentId, AppointmentTime, Consultation, PatientId, Priority,
};
use serde::{Deserialize, Serialize};

/// Fields required to create an appointment. The store assigns the identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAppointment {
    pub patient_id: PatientId,
    pub scheduled_at: AppointmentTime,
    pub priority: Priority,
}

impl NewAppointment {
    #[must_use]
    pub fn new(patient_id: PatientId, scheduled_at: AppointmentTime, priority: Priority) -> Self {
        Self {
            patient_id,
            scheduled_at,
            priority,
        }
    }
}

/// Fields required to record a consultation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewConsultation {
    pub appointment_id: AppointmentId,
    pub diagnosis: String,
    pub cost: f64,
    pub notes: String,
}

impl NewConsultation {
    #[must_use]
    pub fn new(
        appointment_id: AppointmentId,
        diagnosis: impl Into<String>,
        cost: f64,
        notes: impl Into<String>,
    ) -> Self {
        Self {
            appointment_id,
            diagnosis: diagnosis.into(),
            cost,
            notes: notes.into(),
        }
    }
}

/// A consultation joined with the patient it was held for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsultationRecord {
    #[serde(flatten)]
    pub consultation: Consultation,
    pub patient_id: PatientId,
    pub patient_name: String,
}
