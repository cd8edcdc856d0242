//! Implementation of the PersistenceGateway trait for InMemoryGateway.
//!
//! Every mutation takes the write lock, applies its change to the maps and
//! then commits, handing `commit` the inverse change to apply if the snapshot
//! write fails.

use async_trait::async_trait;

use clinic_core::{
    Appointment, AppointmentId, AppointmentStatus, Consultation, ConsultationId, Patient,
    PatientId,
};
use clinic_storage::{
    ConsultationRecord, NewAppointment, NewConsultation, PersistenceGateway, StorageError,
};

use crate::storage::InMemoryGateway;

impl InMemoryGateway {
    /// Inserts a consultation for a scheduled appointment. Returns the new
    /// consultation and the appointment as it was before. Callers hold the
    /// write lock.
    fn insert_consultation(
        &self,
        request: &NewConsultation,
    ) -> Result<(Consultation, Appointment), StorageError> {
        let appointment = self
            .appointments
            .pin()
            .get(&request.appointment_id)
            .cloned()
            .ok_or_else(|| StorageError::not_found("Appointment", request.appointment_id))?;
        if !appointment.is_scheduled() {
            return Err(StorageError::already_completed(appointment.id));
        }

        let consultation = Consultation {
            id: self.next_consultation_id(),
            appointment_id: request.appointment_id,
            diagnosis: request.diagnosis.clone(),
            cost: request.cost,
            notes: request.notes.clone(),
        };
        self.consultations
            .pin()
            .insert(consultation.id, consultation.clone());
        Ok((consultation, appointment))
    }
}

#[async_trait]
impl PersistenceGateway for InMemoryGateway {
    async fn create_patient(&self, patient: &Patient) -> Result<PatientId, StorageError> {
        let _writes = self.lock_writes().await;

        // Use block scope to ensure guard is dropped before await
        {
            let guard = self.patients.pin();
            if guard.contains_key(&patient.id) {
                return Err(StorageError::duplicate_key(patient.id));
            }
            guard.insert(patient.id, patient.clone());
        }

        let id = patient.id;
        self.commit(move |store| {
            store.patients.pin().remove(&id);
        })
        .await?;
        tracing::debug!(patient_id = %id, "patient stored");
        Ok(id)
    }

    async fn get_patient(&self, id: PatientId) -> Result<Option<Patient>, StorageError> {
        Ok(self.patients.pin().get(&id).cloned())
    }

    async fn list_patients(&self) -> Result<Vec<Patient>, StorageError> {
        let mut patients: Vec<Patient> = self.patients.pin().values().cloned().collect();
        patients.sort_by_key(|p| p.id);
        Ok(patients)
    }

    async fn delete_patient(&self, id: PatientId) -> Result<bool, StorageError> {
        let _writes = self.lock_writes().await;

        let (patient, cascaded) = {
            let Some(patient) = self.patients.pin().remove(&id).cloned() else {
                return Ok(false);
            };
            let appointments = self.appointments.pin();
            let owned: Vec<Appointment> = appointments
                .values()
                .filter(|a| a.patient_id == id)
                .cloned()
                .collect();
            for appointment in &owned {
                appointments.remove(&appointment.id);
            }
            (patient, owned)
        };

        let count = cascaded.len();
        self.commit(move |store| {
            store.patients.pin().insert(patient.id, patient);
            let appointments = store.appointments.pin();
            for appointment in cascaded {
                appointments.insert(appointment.id, appointment);
            }
        })
        .await?;
        tracing::debug!(patient_id = %id, cascaded = count, "patient deleted");
        Ok(true)
    }

    async fn create_appointment(
        &self,
        appointment: &NewAppointment,
    ) -> Result<AppointmentId, StorageError> {
        let _writes = self.lock_writes().await;

        if !self.patients.pin().contains_key(&appointment.patient_id) {
            return Err(StorageError::unknown_patient(appointment.patient_id));
        }

        let id = self.next_appointment_id();
        let stored = Appointment::new(
            id,
            appointment.patient_id,
            appointment.scheduled_at,
            appointment.priority,
        );
        self.appointments.pin().insert(id, stored);

        self.commit(move |store| {
            store.appointments.pin().remove(&id);
            store.rewind_appointment_id(id);
        })
        .await?;
        tracing::debug!(appointment_id = %id, patient_id = %appointment.patient_id, "appointment stored");
        Ok(id)
    }

    async fn get_appointment(
        &self,
        id: AppointmentId,
    ) -> Result<Option<Appointment>, StorageError> {
        Ok(self.appointments.pin().get(&id).cloned())
    }

    async fn set_appointment_status(
        &self,
        id: AppointmentId,
        status: AppointmentStatus,
    ) -> Result<(), StorageError> {
        let _writes = self.lock_writes().await;

        let previous = {
            let guard = self.appointments.pin();
            let current = guard
                .get(&id)
                .cloned()
                .ok_or_else(|| StorageError::not_found("Appointment", id))?;
            guard.insert(id, current.clone().with_status(status));
            current
        };

        self.commit(move |store| {
            store.appointments.pin().insert(previous.id, previous);
        })
        .await
    }

    async fn list_scheduled_appointments(&self) -> Result<Vec<Appointment>, StorageError> {
        let mut scheduled: Vec<Appointment> = self
            .appointments
            .pin()
            .values()
            .filter(|a| a.is_scheduled())
            .cloned()
            .collect();
        scheduled.sort_by_key(Appointment::triage_key);
        Ok(scheduled)
    }

    async fn create_consultation(
        &self,
        consultation: &NewConsultation,
    ) -> Result<ConsultationId, StorageError> {
        let _writes = self.lock_writes().await;

        let (stored, _) = self.insert_consultation(consultation)?;
        let id = stored.id;
        self.commit(move |store| {
            store.consultations.pin().remove(&id);
            store.rewind_consultation_id(id);
        })
        .await?;
        Ok(id)
    }

    async fn close_appointment(
        &self,
        consultation: &NewConsultation,
    ) -> Result<ConsultationId, StorageError> {
        let _writes = self.lock_writes().await;

        let (stored, previous) = self.insert_consultation(consultation)?;
        let id = stored.id;
        self.appointments.pin().insert(
            previous.id,
            previous.clone().with_status(AppointmentStatus::Completed),
        );

        self.commit(move |store| {
            store.consultations.pin().remove(&id);
            store.rewind_consultation_id(id);
            store.appointments.pin().insert(previous.id, previous);
        })
        .await?;
        tracing::debug!(
            appointment_id = %consultation.appointment_id,
            consultation_id = %id,
            "appointment closed"
        );
        Ok(id)
    }

    async fn list_consultations(&self) -> Result<Vec<ConsultationRecord>, StorageError> {
        let mut consultations: Vec<Consultation> =
            self.consultations.pin().values().cloned().collect();
        consultations.sort_by_key(|c| c.id);

        let appointments = self.appointments.pin();
        let patients = self.patients.pin();
        let records = consultations
            .into_iter()
            .filter_map(|consultation| {
                let appointment = appointments.get(&consultation.appointment_id)?;
                let patient = patients.get(&appointment.patient_id)?;
                Some(ConsultationRecord {
                    patient_id: patient.id,
                    patient_name: patient.name.clone(),
                    consultation,
                })
            })
            .collect();
        Ok(records)
    }

    fn backend_name(&self) -> &'static str {
        if self.is_durable() {
            "memory+snapshot"
        } else {
            "memory"
        }
    }
}
