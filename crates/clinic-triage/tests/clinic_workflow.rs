use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use clinic_core::{
    Appointment, AppointmentId, AppointmentStatus, AppointmentTime, ConsultationId, Patient,
    PatientId, Priority,
};
use clinic_db_memory::InMemoryGateway;
use clinic_storage::{
    ConsultationRecord, DynGateway, NewAppointment, NewConsultation, PersistenceGateway,
    StorageError,
};
use clinic_triage::Clinic;
use time::PrimitiveDateTime;
use time::macros::datetime;
use tokio::sync::Notify;

fn patient(id: u32, name: &str) -> Patient {
    Patient::new(PatientId(id), name, 52, "F", "0912345678").with_medical_history("none")
}

fn at(datetime: PrimitiveDateTime) -> AppointmentTime {
    AppointmentTime::new(datetime)
}

async fn empty_clinic() -> Clinic {
    Clinic::open(Arc::new(InMemoryGateway::new())).await.unwrap()
}

#[tokio::test]
async fn startup_loads_all_patients_and_only_scheduled_appointments() {
    let gateway = Arc::new(InMemoryGateway::new());
    gateway.create_patient(&patient(1001, "Alice")).await.unwrap();
    gateway.create_patient(&patient(1002, "Bob")).await.unwrap();
    let done = gateway
        .create_appointment(&NewAppointment::new(
            PatientId(1001),
            at(datetime!(2024-05-01 07:00)),
            Priority::CRITICAL,
        ))
        .await
        .unwrap();
    let pending = gateway
        .create_appointment(&NewAppointment::new(
            PatientId(1002),
            at(datetime!(2024-05-01 09:00)),
            Priority::NORMAL,
        ))
        .await
        .unwrap();
    gateway
        .set_appointment_status(done, AppointmentStatus::Completed)
        .await
        .unwrap();

    let clinic = Clinic::open(gateway).await.unwrap();

    assert_eq!(clinic.patients().await.len(), 2);
    assert_eq!(clinic.pending_count().await, 1);
    assert_eq!(clinic.peek_next().await.unwrap().id, pending);
}

#[tokio::test]
async fn registry_round_trip_through_the_clinic() {
    let clinic = empty_clinic().await;
    let alice = patient(1001, "Alice");

    clinic.register_patient(alice.clone()).await.unwrap();
    assert_eq!(clinic.find_patient(PatientId(1001)).await, Some(alice));

    assert!(clinic.remove_patient(PatientId(1001)).await.unwrap());
    assert_eq!(clinic.find_patient(PatientId(1001)).await, None);
    assert!(clinic.patients().await.iter().all(|p| p.id != PatientId(1001)));
    assert!(
        clinic
            .gateway()
            .get_patient(PatientId(1001))
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn duplicate_patient_leaves_registry_untouched() {
    let clinic = empty_clinic().await;
    clinic.register_patient(patient(1001, "Alice")).await.unwrap();

    let err = clinic
        .register_patient(patient(1001, "Mallory"))
        .await
        .unwrap_err();

    assert!(err.is_duplicate_key());
    assert_eq!(clinic.find_patient(PatientId(1001)).await.unwrap().name, "Alice");
    assert_eq!(clinic.patients().await.len(), 1);
}

#[tokio::test]
async fn appointment_for_unknown_patient_is_not_queued() {
    let clinic = empty_clinic().await;

    let err = clinic
        .schedule_appointment(PatientId(4242), at(datetime!(2024-05-01 09:00)), Priority::URGENT)
        .await
        .unwrap_err();

    assert!(err.is_unknown_patient());
    assert!(clinic.peek_next().await.is_none());
}

#[tokio::test]
async fn claims_follow_priority_then_time_then_identifier() {
    let clinic = empty_clinic().await;
    clinic.register_patient(patient(1001, "Alice")).await.unwrap();

    let a = clinic
        .schedule_appointment(PatientId(1001), at(datetime!(2024-05-01 10:00)), Priority(2))
        .await
        .unwrap();
    let b = clinic
        .schedule_appointment(PatientId(1001), at(datetime!(2024-05-01 09:00)), Priority(1))
        .await
        .unwrap();
    let c = clinic
        .schedule_appointment(PatientId(1001), at(datetime!(2024-05-01 09:00)), Priority(1))
        .await
        .unwrap();
    assert!(c.id > b.id);

    let mut order = Vec::new();
    while let Some(claim) = clinic.claim_next().await {
        order.push(claim.id());
    }
    assert_eq!(order, vec![b.id, c.id, a.id]);
}

#[tokio::test]
async fn completing_a_claim_records_the_consultation() {
    let clinic = empty_clinic().await;
    clinic.register_patient(patient(1001, "Alice")).await.unwrap();
    let appt = clinic
        .schedule_appointment(PatientId(1001), at(datetime!(2024-05-01 09:00)), Priority::URGENT)
        .await
        .unwrap();

    let claim = clinic.claim_next().await.unwrap();
    assert_eq!(claim.appointment(), appt);
    assert!(clinic.peek_next().await.is_none());

    clinic.complete(claim, "Influenza", 35.5, "fluids").await.unwrap();

    let stored = clinic.gateway().get_appointment(appt.id).await.unwrap().unwrap();
    assert_eq!(stored.status, AppointmentStatus::Completed);
    let consultations = clinic.consultations().await.unwrap();
    assert_eq!(consultations.len(), 1);
    assert_eq!(consultations[0].patient_name, "Alice");
    assert_eq!(consultations[0].consultation.diagnosis, "Influenza");
    assert!(clinic.scheduled_appointments().await.unwrap().is_empty());
}

#[tokio::test]
async fn externally_completed_appointment_is_never_claimed() {
    let clinic = empty_clinic().await;
    clinic.register_patient(patient(1001, "Alice")).await.unwrap();
    let d = clinic
        .schedule_appointment(PatientId(1001), at(datetime!(2024-05-01 08:00)), Priority(3))
        .await
        .unwrap();

    assert!(clinic.complete_appointment(d.id).await.unwrap());

    assert!(clinic.peek_next().await.is_none());
    assert!(clinic.claim_next().await.is_none());
}

#[tokio::test]
async fn removing_a_patient_withdraws_queued_appointments() {
    let clinic = empty_clinic().await;
    clinic.register_patient(patient(1001, "Alice")).await.unwrap();
    clinic.register_patient(patient(1002, "Bob")).await.unwrap();
    clinic
        .schedule_appointment(PatientId(1001), at(datetime!(2024-05-01 08:00)), Priority(1))
        .await
        .unwrap();
    let bob = clinic
        .schedule_appointment(PatientId(1002), at(datetime!(2024-05-01 09:00)), Priority(3))
        .await
        .unwrap();

    clinic.remove_patient(PatientId(1001)).await.unwrap();

    assert_eq!(clinic.peek_next().await.unwrap().id, bob.id);
    assert_eq!(clinic.claim_next().await.unwrap().id(), bob.id);
    assert!(clinic.claim_next().await.is_none());
}

#[tokio::test]
async fn released_claim_is_handed_out_again() {
    let clinic = empty_clinic().await;
    clinic.register_patient(patient(1001, "Alice")).await.unwrap();
    let appt = clinic
        .schedule_appointment(PatientId(1001), at(datetime!(2024-05-01 08:00)), Priority(2))
        .await
        .unwrap();

    let claim = clinic.claim_next().await.unwrap();
    assert!(clinic.release(claim).await);

    assert_eq!(clinic.peek_next().await.unwrap().id, appt.id);
    assert_eq!(clinic.claim_next().await.unwrap().id(), appt.id);
}

#[tokio::test]
async fn schedule_view_joins_patient_names() {
    let clinic = empty_clinic().await;
    clinic.register_patient(patient(1001, "Alice")).await.unwrap();
    clinic.register_patient(patient(1002, "Bob")).await.unwrap();
    clinic
        .schedule_appointment(PatientId(1002), at(datetime!(2024-05-01 10:00)), Priority(3))
        .await
        .unwrap();
    clinic
        .schedule_appointment(PatientId(1001), at(datetime!(2024-05-01 11:00)), Priority(1))
        .await
        .unwrap();

    let names: Vec<Option<String>> = clinic
        .scheduled_appointments()
        .await
        .unwrap()
        .into_iter()
        .map(|entry| entry.patient_name)
        .collect();
    assert_eq!(names, vec![Some("Alice".to_string()), Some("Bob".to_string())]);
}

#[tokio::test]
async fn find_by_contact_uses_the_registry() {
    let clinic = empty_clinic().await;
    let mut bob = patient(1002, "Bob");
    bob.contact = "0798765432".to_string();
    clinic.register_patient(patient(1001, "Alice")).await.unwrap();
    clinic.register_patient(bob.clone()).await.unwrap();

    assert_eq!(clinic.find_patient_by_contact("0798765432").await, Some(bob));
    assert!(clinic.find_patient_by_contact("0700000000").await.is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_claims_never_hand_out_an_appointment_twice() {
    let clinic = Arc::new(empty_clinic().await);
    clinic.register_patient(patient(1001, "Alice")).await.unwrap();
    for i in 0..60u32 {
        clinic
            .schedule_appointment(
                PatientId(1001),
                at(datetime!(2024-05-01 08:00)),
                Priority(i % 3 + 1),
            )
            .await
            .unwrap();
    }

    let mut workers = Vec::new();
    for _ in 0..8 {
        let clinic = Arc::clone(&clinic);
        workers.push(tokio::spawn(async move {
            let mut claimed = Vec::new();
            while let Some(claim) = clinic.claim_next().await {
                claimed.push(claim.id());
                tokio::task::yield_now().await;
            }
            claimed
        }));
    }

    let mut all: Vec<AppointmentId> = Vec::new();
    for worker in workers {
        all.extend(worker.await.unwrap());
    }
    let total = all.len();
    all.sort();
    all.dedup();
    assert_eq!(total, 60);
    assert_eq!(all.len(), 60);
}

#[tokio::test]
async fn external_completion_leaves_a_claimed_appointment_alone() {
    let clinic = empty_clinic().await;
    clinic.register_patient(patient(1001, "Alice")).await.unwrap();
    let appt = clinic
        .schedule_appointment(PatientId(1001), at(datetime!(2024-05-01 08:00)), Priority(1))
        .await
        .unwrap();

    let claim = clinic.claim_next().await.unwrap();
    assert!(!clinic.complete_appointment(appt.id).await.unwrap());
    let stored = clinic.gateway().get_appointment(appt.id).await.unwrap().unwrap();
    assert_eq!(stored.status, AppointmentStatus::Scheduled);

    clinic.complete(claim, "Asthma", 15.0, "").await.unwrap();
    assert_eq!(clinic.consultations().await.unwrap().len(), 1);
    assert!(clinic.claim_next().await.is_none());
}

#[tokio::test]
async fn completion_of_an_appointment_closed_in_the_store_is_rejected() {
    let clinic = empty_clinic().await;
    clinic.register_patient(patient(1001, "Alice")).await.unwrap();
    let appt = clinic
        .schedule_appointment(PatientId(1001), at(datetime!(2024-05-01 08:00)), Priority(1))
        .await
        .unwrap();

    let claim = clinic.claim_next().await.unwrap();
    clinic
        .gateway()
        .set_appointment_status(appt.id, AppointmentStatus::Completed)
        .await
        .unwrap();

    let err = clinic.complete(claim, "Asthma", 15.0, "").await.unwrap_err();
    assert!(err.is_already_completed());
    assert!(clinic.consultations().await.unwrap().is_empty());
    assert!(clinic.claim_next().await.is_none());
}

#[tokio::test]
async fn claim_on_a_removed_patient_reports_withdrawn() {
    let clinic = empty_clinic().await;
    clinic.register_patient(patient(1001, "Alice")).await.unwrap();
    clinic
        .schedule_appointment(PatientId(1001), at(datetime!(2024-05-01 08:00)), Priority(1))
        .await
        .unwrap();

    let claim = clinic.claim_next().await.unwrap();
    assert!(!claim.is_withdrawn());
    clinic.remove_patient(PatientId(1001)).await.unwrap();
    assert!(claim.is_withdrawn());

    let err = clinic.complete(claim, "Asthma", 15.0, "").await.unwrap_err();
    assert!(err.is_not_found());
    assert!(clinic.claim_next().await.is_none());
}

/// Delegates to an in-memory gateway. Can be told to reject completion
/// writes, or to pause inside `create_appointment` once the row is stored.
#[derive(Default)]
struct ScriptedGateway {
    inner: InMemoryGateway,
    fail_completions: AtomicBool,
    hold_appointments: AtomicBool,
    appointment_stored: Notify,
    resume: Notify,
}

impl ScriptedGateway {
    fn reject_completions(&self, reject: bool) {
        self.fail_completions.store(reject, Ordering::SeqCst);
    }

    fn check_completions(&self) -> Result<(), StorageError> {
        if self.fail_completions.load(Ordering::SeqCst) {
            return Err(StorageError::internal("completion rejected"));
        }
        Ok(())
    }
}

#[async_trait]
impl PersistenceGateway for ScriptedGateway {
    async fn create_patient(&self, patient: &Patient) -> Result<PatientId, StorageError> {
        self.inner.create_patient(patient).await
    }

    async fn get_patient(&self, id: PatientId) -> Result<Option<Patient>, StorageError> {
        self.inner.get_patient(id).await
    }

    async fn list_patients(&self) -> Result<Vec<Patient>, StorageError> {
        self.inner.list_patients().await
    }

    async fn delete_patient(&self, id: PatientId) -> Result<bool, StorageError> {
        self.inner.delete_patient(id).await
    }

    async fn create_appointment(
        &self,
        appointment: &NewAppointment,
    ) -> Result<AppointmentId, StorageError> {
        let id = self.inner.create_appointment(appointment).await?;
        if self.hold_appointments.load(Ordering::SeqCst) {
            self.appointment_stored.notify_one();
            self.resume.notified().await;
        }
        Ok(id)
    }

    async fn get_appointment(
        &self,
        id: AppointmentId,
    ) -> Result<Option<Appointment>, StorageError> {
        self.inner.get_appointment(id).await
    }

    async fn set_appointment_status(
        &self,
        id: AppointmentId,
        status: AppointmentStatus,
    ) -> Result<(), StorageError> {
        self.check_completions()?;
        self.inner.set_appointment_status(id, status).await
    }

    async fn list_scheduled_appointments(&self) -> Result<Vec<Appointment>, StorageError> {
        self.inner.list_scheduled_appointments().await
    }

    async fn create_consultation(
        &self,
        consultation: &NewConsultation,
    ) -> Result<ConsultationId, StorageError> {
        self.inner.create_consultation(consultation).await
    }

    async fn close_appointment(
        &self,
        consultation: &NewConsultation,
    ) -> Result<ConsultationId, StorageError> {
        self.check_completions()?;
        self.inner.close_appointment(consultation).await
    }

    async fn list_consultations(&self) -> Result<Vec<ConsultationRecord>, StorageError> {
        self.inner.list_consultations().await
    }

    fn backend_name(&self) -> &'static str {
        "scripted"
    }
}

async fn scripted_clinic() -> (Arc<ScriptedGateway>, Clinic) {
    let scripted = Arc::new(ScriptedGateway::default());
    let gateway: DynGateway = scripted.clone();
    let clinic = Clinic::open(gateway).await.unwrap();
    (scripted, clinic)
}

#[tokio::test]
async fn failed_completion_releases_the_claim() {
    let (scripted, clinic) = scripted_clinic().await;
    clinic.register_patient(patient(1001, "Alice")).await.unwrap();
    let appt = clinic
        .schedule_appointment(PatientId(1001), at(datetime!(2024-05-01 08:00)), Priority(1))
        .await
        .unwrap();
    scripted.reject_completions(true);

    let claim = clinic.claim_next().await.unwrap();
    let err = clinic.complete(claim, "Migraine", 20.0, "").await.unwrap_err();
    assert!(matches!(err, StorageError::Internal { .. }));
    assert!(clinic.consultations().await.unwrap().is_empty());

    // Still scheduled in the store, so it must be claimable again.
    assert_eq!(clinic.peek_next().await.unwrap().id, appt.id);

    scripted.reject_completions(false);
    let claim = clinic.claim_next().await.unwrap();
    clinic.complete(claim, "Migraine", 20.0, "").await.unwrap();
    assert!(clinic.claim_next().await.is_none());
    assert_eq!(clinic.consultations().await.unwrap().len(), 1);
}

#[tokio::test]
async fn failed_external_completion_keeps_the_appointment_queued() {
    let (scripted, clinic) = scripted_clinic().await;
    clinic.register_patient(patient(1001, "Alice")).await.unwrap();
    let appt = clinic
        .schedule_appointment(PatientId(1001), at(datetime!(2024-05-01 08:00)), Priority(2))
        .await
        .unwrap();
    scripted.reject_completions(true);

    assert!(clinic.complete_appointment(appt.id).await.is_err());

    assert_eq!(clinic.peek_next().await.unwrap().id, appt.id);
    assert_eq!(clinic.claim_next().await.unwrap().id(), appt.id);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn removal_waits_for_an_in_flight_schedule() {
    let (scripted, clinic) = scripted_clinic().await;
    let clinic = Arc::new(clinic);
    clinic.register_patient(patient(1001, "Alice")).await.unwrap();
    scripted.hold_appointments.store(true, Ordering::SeqCst);

    let scheduling = {
        let clinic = Arc::clone(&clinic);
        tokio::spawn(async move {
            clinic
                .schedule_appointment(PatientId(1001), at(datetime!(2024-05-01 08:00)), Priority(1))
                .await
        })
    };
    scripted.appointment_stored.notified().await;

    let removing = {
        let clinic = Arc::clone(&clinic);
        tokio::spawn(async move { clinic.remove_patient(PatientId(1001)).await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!removing.is_finished());

    scripted.resume.notify_one();
    scheduling.await.unwrap().unwrap();
    assert!(removing.await.unwrap().unwrap());

    assert!(clinic.peek_next().await.is_none());
    assert!(clinic.claim_next().await.is_none());
    assert_eq!(clinic.pending_count().await, 0);
}
