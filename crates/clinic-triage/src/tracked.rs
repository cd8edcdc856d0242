//! Shared, observable status of a queued appointment.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use clinic_core::{
    Appointment, AppointmentId, AppointmentStatus, AppointmentTime, PatientId, Priority,
    TriageKey,
};

/// In-memory lifecycle of a queued appointment.
///
/// `Pending` and `Claimed` both correspond to the stored status `scheduled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TriageState {
    /// Waiting to be handed out.
    Pending = 0,
    /// Handed out by `pop`; the claimant owes the store a status update.
    Claimed = 1,
    /// Completed in the store.
    Completed = 2,
    /// The store row no longer exists.
    Withdrawn = 3,
}

impl TriageState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::Pending,
            1 => Self::Claimed,
            2 => Self::Completed,
            _ => Self::Withdrawn,
        }
    }
}

/// An appointment as seen by the scheduler: the ordering fields, fixed at
/// creation, plus a state cell other code may change at any time.
#[derive(Debug)]
pub struct TrackedAppointment {
    id: AppointmentId,
    patient_id: PatientId,
    scheduled_at: AppointmentTime,
    priority: Priority,
    state: AtomicU8,
}

pub type SharedAppointment = Arc<TrackedAppointment>;

impl TrackedAppointment {
    pub fn new(appointment: &Appointment) -> SharedAppointment {
        let state = match appointment.status {
            AppointmentStatus::Scheduled => TriageState::Pending,
            AppointmentStatus::Completed => TriageState::Completed,
        };
        Arc::new(Self {
            id: appointment.id,
            patient_id: appointment.patient_id,
            scheduled_at: appointment.scheduled_at,
            priority: appointment.priority,
            state: AtomicU8::new(state as u8),
        })
    }

    pub fn id(&self) -> AppointmentId {
        self.id
    }

    pub fn patient_id(&self) -> PatientId {
        self.patient_id
    }

    pub fn scheduled_at(&self) -> AppointmentTime {
        self.scheduled_at
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn triage_key(&self) -> TriageKey {
        TriageKey {
            priority: self.priority,
            scheduled_at: self.scheduled_at,
            id: self.id,
        }
    }

    pub fn state(&self) -> TriageState {
        TriageState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Stored status as implied by the in-memory state.
    ///
    /// `Withdrawn` has no stored counterpart because its row is gone. It
    /// reports `Completed` since it will never be handed out again; use
    /// [`is_withdrawn`](Self::is_withdrawn) to tell the two apart.
    pub fn status(&self) -> AppointmentStatus {
        match self.state() {
            TriageState::Pending | TriageState::Claimed => AppointmentStatus::Scheduled,
            TriageState::Completed | TriageState::Withdrawn => AppointmentStatus::Completed,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.state() == TriageState::Pending
    }

    pub fn is_withdrawn(&self) -> bool {
        self.state() == TriageState::Withdrawn
    }

    /// `Pending -> Claimed`. Returns `false` if someone else got there first
    /// or the appointment is no longer pending.
    pub fn try_claim(&self) -> bool {
        self.transition(TriageState::Pending, TriageState::Claimed)
    }

    /// `Claimed -> Pending`, for a claimant that gives the appointment back.
    pub fn release(&self) -> bool {
        self.transition(TriageState::Claimed, TriageState::Pending)
    }

    /// `Claimed -> Completed`, once the claimant's completion is stored.
    pub fn finish(&self) -> bool {
        self.transition(TriageState::Claimed, TriageState::Completed)
    }

    /// `Pending -> Completed`, for completions that bypass the queue.
    ///
    /// Fails while the appointment is claimed, so an outstanding claim is
    /// never completed behind its holder's back.
    pub fn try_complete(&self) -> bool {
        self.transition(TriageState::Pending, TriageState::Completed)
    }

    /// `Completed -> Pending`, undoing `try_complete` when the store write
    /// that should have followed it failed.
    pub fn reopen(&self) -> bool {
        self.transition(TriageState::Completed, TriageState::Pending)
    }

    /// Records that the store row was deleted.
    pub fn withdraw(&self) {
        self.state.store(TriageState::Withdrawn as u8, Ordering::Release);
    }

    /// Copy of the appointment with its current status.
    pub fn snapshot(&self) -> Appointment {
        Appointment::new(self.id, self.patient_id, self.scheduled_at, self.priority)
            .with_status(self.status())
    }

    fn transition(&self, from: TriageState, to: TriageState) -> bool {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}
