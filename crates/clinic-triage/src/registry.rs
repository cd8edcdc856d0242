use clinic_core::{Patient, PatientId};
use indexmap::IndexMap;

/// Identifier-indexed mirror of the patients held by the store.
///
/// Entries are kept in insertion order so enumeration can report the most
/// recently inserted patient first. The registry is not authoritative: callers
/// persist a patient before inserting it here, and duplicate identifiers are
/// rejected by the store, not by the registry.
#[derive(Debug, Default, Clone)]
pub struct PatientRegistry {
    patients: IndexMap<PatientId, Patient>,
}

impl PatientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a patient. Re-inserting an identifier replaces the record and
    /// makes it the most recent entry.
    pub fn insert(&mut self, patient: Patient) {
        self.patients.shift_remove(&patient.id);
        self.patients.insert(patient.id, patient);
    }

    pub fn search(&self, id: PatientId) -> Option<&Patient> {
        self.patients.get(&id)
    }

    /// Removes the patient. Appointments are not touched.
    pub fn delete(&mut self, id: PatientId) -> bool {
        self.patients.shift_remove(&id).is_some()
    }

    /// First patient with this contact number, most recent first.
    pub fn find_by_contact(&self, contact: &str) -> Option<&Patient> {
        self.iter().find(|p| p.contact == contact)
    }

    /// Patients from most recently inserted to least.
    pub fn iter(&self) -> impl Iterator<Item = &Patient> {
        self.patients.values().rev()
    }

    pub fn all_patients(&self) -> Vec<Patient> {
        self.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.patients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patients.is_empty()
    }
}

impl FromIterator<Patient> for PatientRegistry {
    fn from_iter<I: IntoIterator<Item = Patient>>(iter: I) -> Self {
        let mut registry = Self::new();
        for patient in iter {
            registry.insert(patient);
        }
        registry
    }
}
