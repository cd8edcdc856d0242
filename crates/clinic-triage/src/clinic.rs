//! The clinic service: store-first mutations mirrored into the registry and
//! the triage queue.

use std::sync::Arc;

use clinic_core::{
    Appointment, AppointmentId, AppointmentStatus, AppointmentTime, ConsultationId, Patient,
    PatientId, Priority,
};
use clinic_storage::{
    ConsultationRecord, DynGateway, NewAppointment, NewConsultation, StorageResult,
};
use papaya::HashMap as PapayaHashMap;
use tokio::sync::{Mutex, RwLock};

use crate::registry::PatientRegistry;
use crate::scheduler::TriageScheduler;
use crate::tracked::{SharedAppointment, TrackedAppointment, TriageState};

/// An appointment handed out by [`Clinic::claim_next`].
///
/// Nobody else can claim it while this value exists. Pass it to
/// [`Clinic::complete`] or [`Clinic::release`].
#[derive(Debug)]
#[must_use = "a claimed appointment must be completed or released"]
pub struct Claim {
    appointment: SharedAppointment,
}

impl Claim {
    pub fn id(&self) -> AppointmentId {
        self.appointment.id()
    }

    pub fn patient_id(&self) -> PatientId {
        self.appointment.patient_id()
    }

    pub fn appointment(&self) -> Appointment {
        self.appointment.snapshot()
    }

    /// `true` once the claimed appointment's patient was removed. Completing
    /// such a claim fails with `NotFound`.
    pub fn is_withdrawn(&self) -> bool {
        self.appointment.is_withdrawn()
    }
}

/// A scheduled appointment with the patient's name for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleEntry {
    pub appointment: Appointment,
    pub patient_name: Option<String>,
}

/// One clinic's working set: a gateway plus the in-memory registry and
/// triage queue mirrored from it.
///
/// Every mutation goes to the gateway first and is mirrored in memory only if
/// the gateway accepted it. The registry sits behind a readers-writer lock.
/// The queue sits behind a mutex that both `peek_next` and `claim_next` take,
/// because peeking also drops stale heads.
///
/// Registering, removing and scheduling hold `writes` across the gateway call
/// and the in-memory update, so a removal never runs between an insert's
/// store write and its mirror.
pub struct Clinic {
    gateway: DynGateway,
    writes: Mutex<()>,
    registry: RwLock<PatientRegistry>,
    scheduler: Mutex<TriageScheduler>,
    /// Status cells of appointments that are still scheduled in the store,
    /// so completions and cascades can reach entries inside the queue.
    tracked: PapayaHashMap<AppointmentId, SharedAppointment>,
}

impl std::fmt::Debug for Clinic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Clinic")
            .field("backend", &self.gateway.backend_name())
            .field("tracked", &self.tracked.len())
            .finish_non_exhaustive()
    }
}

impl Clinic {
    /// Loads every patient and every scheduled appointment from the gateway.
    pub async fn open(gateway: DynGateway) -> StorageResult<Self> {
        let patients = gateway.list_patients().await?;
        let appointments = gateway.list_scheduled_appointments().await?;

        let registry: PatientRegistry = patients.into_iter().collect();
        let tracked = PapayaHashMap::new();
        let mut scheduler = TriageScheduler::new();
        {
            let guard = tracked.pin();
            for appointment in appointments.iter().filter(|a| a.is_scheduled()) {
                let cell = TrackedAppointment::new(appointment);
                guard.insert(appointment.id, Arc::clone(&cell));
                scheduler.push(cell);
            }
        }

        tracing::info!(
            backend = gateway.backend_name(),
            patients = registry.len(),
            appointments = scheduler.len(),
            "clinic state loaded"
        );

        Ok(Self {
            gateway,
            writes: Mutex::new(()),
            registry: RwLock::new(registry),
            scheduler: Mutex::new(scheduler),
            tracked,
        })
    }

    pub fn gateway(&self) -> &DynGateway {
        &self.gateway
    }

    // ==================== Patients ====================

    /// Persists the patient, then adds it to the registry.
    pub async fn register_patient(&self, patient: Patient) -> StorageResult<PatientId> {
        let _writes = self.writes.lock().await;
        let id = self.gateway.create_patient(&patient).await?;
        self.registry.write().await.insert(patient);
        tracing::info!(patient_id = %id, "patient registered");
        Ok(id)
    }

    pub async fn find_patient(&self, id: PatientId) -> Option<Patient> {
        self.registry.read().await.search(id).cloned()
    }

    pub async fn find_patient_by_contact(&self, contact: &str) -> Option<Patient> {
        self.registry.read().await.find_by_contact(contact).cloned()
    }

    /// All patients, most recently registered first.
    pub async fn patients(&self) -> Vec<Patient> {
        self.registry.read().await.all_patients()
    }

    /// Deletes the patient from the store (cascading to its appointments),
    /// then from the registry, and withdraws its queued appointments.
    ///
    /// Returns whether the patient was known to either.
    pub async fn remove_patient(&self, id: PatientId) -> StorageResult<bool> {
        let _writes = self.writes.lock().await;
        let stored = self.gateway.delete_patient(id).await?;
        let cached = self.registry.write().await.delete(id);
        let withdrawn = self.withdraw_appointments_of(id);
        tracing::info!(patient_id = %id, stored, cached, withdrawn, "patient removed");
        Ok(stored || cached)
    }

    fn withdraw_appointments_of(&self, patient_id: PatientId) -> usize {
        let guard = self.tracked.pin();
        let owned: Vec<AppointmentId> = guard
            .iter()
            .filter(|(_, cell)| cell.patient_id() == patient_id)
            .map(|(id, _)| *id)
            .collect();
        for id in &owned {
            if let Some(cell) = guard.remove(id) {
                cell.withdraw();
            }
        }
        owned.len()
    }

    // ==================== Appointments ====================

    /// Persists a new appointment, then queues it.
    pub async fn schedule_appointment(
        &self,
        patient_id: PatientId,
        scheduled_at: AppointmentTime,
        priority: Priority,
    ) -> StorageResult<Appointment> {
        let _writes = self.writes.lock().await;
        let request = NewAppointment::new(patient_id, scheduled_at, priority);
        let id = self.gateway.create_appointment(&request).await?;

        let appointment = Appointment::new(id, patient_id, scheduled_at, priority);
        let cell = TrackedAppointment::new(&appointment);
        self.tracked.pin().insert(id, Arc::clone(&cell));
        self.scheduler.lock().await.push(cell);

        tracing::info!(
            appointment_id = %id,
            patient_id = %patient_id,
            priority = %priority,
            "appointment scheduled"
        );
        Ok(appointment)
    }

    /// The appointment `claim_next` would hand out, without claiming it.
    pub async fn peek_next(&self) -> Option<Appointment> {
        self.scheduler.lock().await.peek().map(|cell| cell.snapshot())
    }

    /// Claims the most urgent pending appointment. `None` means the queue
    /// holds no pending work.
    pub async fn claim_next(&self) -> Option<Claim> {
        let appointment = self.scheduler.lock().await.pop()?;
        Some(Claim { appointment })
    }

    /// Puts an unfinished claim back into the queue.
    pub async fn release(&self, claim: Claim) -> bool {
        if !claim.appointment.release() {
            return false;
        }
        tracing::debug!(appointment_id = %claim.id(), "claim released");
        self.scheduler.lock().await.push(claim.appointment);
        true
    }

    /// Records the consultation and marks the appointment completed in one
    /// store write, then in memory.
    ///
    /// If the store rejects the write nothing was recorded. The claim goes back
    /// into the queue unless the store reports the appointment as gone or
    /// already completed, in which case it is dropped.
    pub async fn complete(
        &self,
        claim: Claim,
        diagnosis: impl Into<String>,
        cost: f64,
        notes: impl Into<String>,
    ) -> StorageResult<ConsultationId> {
        let consultation = NewConsultation::new(claim.id(), diagnosis, cost, notes);
        match self.gateway.close_appointment(&consultation).await {
            Ok(consultation_id) => {
                claim.appointment.finish();
                self.tracked.pin().remove(&claim.id());
                tracing::info!(
                    appointment_id = %claim.id(),
                    consultation_id = %consultation_id,
                    "appointment completed"
                );
                Ok(consultation_id)
            }
            Err(e) if e.is_already_completed() || e.is_not_found() => {
                tracing::warn!(
                    appointment_id = %claim.id(),
                    category = %e.category(),
                    "completion rejected, dropping claim: {e}"
                );
                if e.is_not_found() {
                    claim.appointment.withdraw();
                } else {
                    claim.appointment.finish();
                }
                self.tracked.pin().remove(&claim.id());
                Err(e)
            }
            Err(e) => {
                tracing::warn!(
                    appointment_id = %claim.id(),
                    category = %e.category(),
                    "completion failed, releasing claim: {e}"
                );
                self.release(claim).await;
                Err(e)
            }
        }
    }

    /// Marks an appointment completed without going through the queue.
    ///
    /// Returns `false`, writing nothing, while another caller holds a claim
    /// on it. Its queue entry stays resident and is dropped once it reaches
    /// the head.
    pub async fn complete_appointment(&self, id: AppointmentId) -> StorageResult<bool> {
        let cell = self.tracked.pin().get(&id).cloned();
        let reserved = match &cell {
            Some(cell) if cell.try_complete() => true,
            Some(cell) if cell.state() == TriageState::Claimed => {
                tracing::debug!(appointment_id = %id, "appointment is claimed, not completing");
                return Ok(false);
            }
            _ => false,
        };

        if let Err(e) = self
            .gateway
            .set_appointment_status(id, AppointmentStatus::Completed)
            .await
        {
            if let Some(cell) = cell.filter(|cell| reserved && cell.reopen()) {
                // A peek may have dropped the entry while it looked completed.
                self.scheduler.lock().await.push(cell);
            }
            return Err(e);
        }

        self.tracked.pin().remove(&id);
        tracing::info!(appointment_id = %id, "appointment completed outside the queue");
        Ok(true)
    }

    /// Scheduled appointments as recorded by the store, in triage order.
    pub async fn scheduled_appointments(&self) -> StorageResult<Vec<ScheduleEntry>> {
        let appointments = self.gateway.list_scheduled_appointments().await?;
        let registry = self.registry.read().await;
        Ok(appointments
            .into_iter()
            .map(|appointment| ScheduleEntry {
                patient_name: registry
                    .search(appointment.patient_id)
                    .map(|p| p.name.clone()),
                appointment,
            })
            .collect())
    }

    /// Number of queued appointments still pending.
    pub async fn pending_count(&self) -> usize {
        self.scheduler.lock().await.pending_len()
    }

    // ==================== Consultations ====================

    pub async fn consultations(&self) -> StorageResult<Vec<ConsultationRecord>> {
        self.gateway.list_consultations().await
    }
}
