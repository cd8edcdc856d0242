use serde::{Deserialize, Serialize};

use crate::id::PatientId;

/// A registered patient.
///
/// The identifier is immutable once assigned. Demographic fields are already
/// validated by the time a `Patient` is constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    pub id: PatientId,
    pub name: String,
    pub age: u32,
    pub gender: String,
    pub contact: String,
    #[serde(default)]
    pub medical_history: String,
}

impl Patient {
    pub fn new(
        id: PatientId,
        name: impl Into<String>,
        age: u32,
        gender: impl Into<String>,
        contact: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            age,
            gender: gender.into(),
            contact: contact.into(),
            medical_history: String::new(),
        }
    }

    pub fn with_medical_history(mut self, history: impl Into<String>) -> Self {
        self.medical_history = history.into();
        self
    }
}
