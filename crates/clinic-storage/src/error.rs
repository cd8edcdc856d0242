//! Storage error types for the persistence gateway.

use std::fmt;

use clinic_core::{AppointmentId, PatientId};

/// Errors that can occur during storage operations.
///
/// Lookup misses on read paths are reported as `Ok(None)`, not as `NotFound`.
/// `NotFound` is reserved for mutations that target a missing row.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A patient with the same identifier already exists.
    #[error("Patient already exists: {patient_id}")]
    DuplicateKey {
        /// The colliding patient identifier.
        patient_id: PatientId,
    },

    /// An appointment referenced a patient the store does not know.
    #[error("Unknown patient: {patient_id}")]
    UnknownPatient {
        /// The missing patient identifier.
        patient_id: PatientId,
    },

    /// A consultation targeted an appointment that is no longer scheduled.
    #[error("Appointment already completed: {appointment_id}")]
    AlreadyCompleted {
        /// The completed appointment identifier.
        appointment_id: AppointmentId,
    },

    /// A mutation targeted a record that does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of record ("Patient", "Appointment", ...).
        entity: String,
        /// The identifier that was not found.
        id: String,
    },

    /// The store contents could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The backing file could not be read or written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An internal storage error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl StorageError {
    /// Creates a new `DuplicateKey` error.
    #[must_use]
    pub fn duplicate_key(patient_id: PatientId) -> Self {
        Self::DuplicateKey { patient_id }
    }

    /// Creates a new `UnknownPatient` error.
    #[must_use]
    pub fn unknown_patient(patient_id: PatientId) -> Self {
        Self::UnknownPatient { patient_id }
    }

    /// Creates a new `AlreadyCompleted` error.
    #[must_use]
    pub fn already_completed(appointment_id: AppointmentId) -> Self {
        Self::AlreadyCompleted { appointment_id }
    }

    /// Creates a new `NotFound` error.
    #[must_use]
    pub fn not_found(entity: impl Into<String>, id: impl fmt::Display) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns `true` if this is a duplicate key error.
    #[must_use]
    pub fn is_duplicate_key(&self) -> bool {
        matches!(self, Self::DuplicateKey { .. })
    }

    /// Returns `true` if this is an unknown patient error.
    #[must_use]
    pub fn is_unknown_patient(&self) -> bool {
        matches!(self, Self::UnknownPatient { .. })
    }

    /// Returns `true` if the appointment was already completed.
    #[must_use]
    pub fn is_already_completed(&self) -> bool {
        matches!(self, Self::AlreadyCompleted { .. })
    }

    /// Returns `true` if this is a not found error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns the error category for logging/monitoring purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::DuplicateKey { .. } | Self::AlreadyCompleted { .. } => ErrorCategory::Conflict,
            Self::UnknownPatient { .. } => ErrorCategory::Integrity,
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::Serialization(_) => ErrorCategory::Serialization,
            Self::Io(_) => ErrorCategory::Infrastructure,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }
}

/// Categories of storage errors for logging and monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Record not found.
    NotFound,
    /// Identifier collision.
    Conflict,
    /// Foreign-key violation.
    Integrity,
    /// Encoding/decoding failure.
    Serialization,
    /// File or device error.
    Infrastructure,
    /// Internal error.
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not_found"),
            Self::Conflict => write!(f, "conflict"),
            Self::Integrity => write!(f, "integrity"),
            Self::Serialization => write!(f, "serialization"),
            Self::Infrastructure => write!(f, "infrastructure"),
            Self::Internal => write!(f, "internal"),
        }
    }
}
