use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use clinic_core::{Appointment, AppointmentId, Consultation, ConsultationId, Patient, PatientId};
use clinic_storage::StorageResult;
use papaya::HashMap as PapayaHashMap;
use tokio::sync::{Mutex, MutexGuard};

use crate::snapshot::{Snapshot, SnapshotFile};

/// In-memory persistence gateway using papaya lock-free HashMaps.
///
/// This gateway provides:
/// - Lock-free concurrent reads via papaya::HashMap
/// - Mutations serialized by a single async mutex, so cascades and snapshot
///   writes always observe a consistent table set
/// - Monotonic identifier counters for appointments and consultations
/// - Optional write-through to a JSON snapshot file
#[derive(Debug)]
pub struct InMemoryGateway {
    pub(crate) patients: PapayaHashMap<PatientId, Patient>,
    pub(crate) appointments: PapayaHashMap<AppointmentId, Appointment>,
    pub(crate) consultations: PapayaHashMap<ConsultationId, Consultation>,
    appointment_counter: AtomicU64,
    consultation_counter: AtomicU64,
    write_lock: Mutex<()>,
    snapshot_file: Option<SnapshotFile>,
}

impl InMemoryGateway {
    /// Creates a new volatile gateway.
    pub fn new() -> Self {
        Self {
            patients: PapayaHashMap::new(),
            appointments: PapayaHashMap::new(),
            consultations: PapayaHashMap::new(),
            appointment_counter: AtomicU64::new(1),
            consultation_counter: AtomicU64::new(1),
            write_lock: Mutex::new(()),
            snapshot_file: None,
        }
    }

    /// Opens a snapshot-backed gateway, loading the file if it exists.
    pub async fn open(path: impl Into<PathBuf>) -> StorageResult<Self> {
        let file = SnapshotFile::new(path.into());
        let mut gateway = match file.load().await? {
            Some(snapshot) => Self::from_snapshot(snapshot),
            None => Self::new(),
        };
        tracing::info!(
            path = %file.path().display(),
            patients = gateway.patients.len(),
            appointments = gateway.appointments.len(),
            "opened clinic snapshot"
        );
        gateway.snapshot_file = Some(file);
        Ok(gateway)
    }

    /// Builds a volatile gateway from snapshot contents.
    ///
    /// Counters never go backwards past identifiers already present.
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let gateway = Self::new();

        let max_appointment = snapshot.appointments.iter().map(|a| a.id.get()).max().unwrap_or(0);
        let max_consultation = snapshot.consultations.iter().map(|c| c.id.get()).max().unwrap_or(0);
        gateway
            .appointment_counter
            .store(snapshot.next_appointment_id.max(max_appointment + 1), Ordering::SeqCst);
        gateway
            .consultation_counter
            .store(snapshot.next_consultation_id.max(max_consultation + 1), Ordering::SeqCst);

        {
            let patients = gateway.patients.pin();
            for patient in snapshot.patients {
                patients.insert(patient.id, patient);
            }
            let appointments = gateway.appointments.pin();
            for appointment in snapshot.appointments {
                appointments.insert(appointment.id, appointment);
            }
            let consultations = gateway.consultations.pin();
            for consultation in snapshot.consultations {
                consultations.insert(consultation.id, consultation);
            }
        }

        gateway
    }

    /// Captures the full store contents, each table sorted by identifier.
    pub fn snapshot(&self) -> Snapshot {
        let mut patients: Vec<Patient> = self.patients.pin().values().cloned().collect();
        patients.sort_by_key(|p| p.id);
        let mut appointments: Vec<Appointment> =
            self.appointments.pin().values().cloned().collect();
        appointments.sort_by_key(|a| a.id);
        let mut consultations: Vec<Consultation> =
            self.consultations.pin().values().cloned().collect();
        consultations.sort_by_key(|c| c.id);

        Snapshot {
            patients,
            appointments,
            consultations,
            next_appointment_id: self.appointment_counter.load(Ordering::SeqCst),
            next_consultation_id: self.consultation_counter.load(Ordering::SeqCst),
        }
    }

    /// Returns `true` when mutations are written through to disk.
    pub fn is_durable(&self) -> bool {
        self.snapshot_file.is_some()
    }

    pub(crate) async fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().await
    }

    pub(crate) fn next_appointment_id(&self) -> AppointmentId {
        AppointmentId(self.appointment_counter.fetch_add(1, Ordering::SeqCst))
    }

    pub(crate) fn next_consultation_id(&self) -> ConsultationId {
        ConsultationId(self.consultation_counter.fetch_add(1, Ordering::SeqCst))
    }

    pub(crate) fn rewind_appointment_id(&self, id: AppointmentId) {
        self.appointment_counter.store(id.get(), Ordering::SeqCst);
    }

    pub(crate) fn rewind_consultation_id(&self, id: ConsultationId) {
        self.consultation_counter.store(id.get(), Ordering::SeqCst);
    }

    /// Persists a mutation already applied to the maps. If the snapshot
    /// cannot be written, `undo` restores the previous state so the maps never
    /// hold a change the caller was told failed. Callers hold the write lock.
    pub(crate) async fn commit<F>(&self, undo: F) -> StorageResult<()>
    where
        F: FnOnce(&Self) + Send,
    {
        if let Err(e) = self.persist().await {
            undo(self);
            return Err(e);
        }
        Ok(())
    }

    /// Writes the snapshot if this gateway is durable. Callers hold the write lock.
    async fn persist(&self) -> StorageResult<()> {
        let Some(file) = &self.snapshot_file else {
            return Ok(());
        };
        let snapshot = self.snapshot();
        if let Err(e) = file.save(&snapshot).await {
            tracing::warn!(
                path = %file.path().display(),
                category = %e.category(),
                "failed to write clinic snapshot: {e}"
            );
            return Err(e);
        }
        Ok(())
    }
}

impl Default for InMemoryGateway {
    fn default() -> Self {
        Self::new()
    }
}
