pub mod appointment;
pub mod consultation;
pub mod error;
pub mod id;
pub mod patient;
pub mod time;

pub use appointment::{Appointment, AppointmentStatus, Priority, TriageKey};
pub use consultation::Consultation;
pub use error::{CoreError, ErrorCategory, Result};
pub use id::{AppointmentId, ConsultationId, PatientId};
pub use patient::Patient;
pub use time::AppointmentTime;
