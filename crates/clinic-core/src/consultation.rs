use serde::{Deserialize, Serialize};

use crate::id::{AppointmentId, ConsultationId};

/// Outcome recorded when a doctor completes an appointment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Consultation {
    pub id: ConsultationId,
    pub appointment_id: AppointmentId,
    pub diagnosis: String,
    pub cost: f64,
    #[serde(default)]
    pub notes: String,
}
