//! Priority queue of pending appointments with lazy invalidation.
//!
//! Status changes made elsewhere are not pushed into the heap. Instead each
//! entry shares its [`TrackedAppointment`] state cell, and entries that are no
//! longer pending are discarded only when they reach the head of the queue.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::Arc;

use clinic_core::TriageKey;

use crate::tracked::{SharedAppointment, TrackedAppointment};

#[derive(Debug)]
struct QueueEntry {
    key: TriageKey,
    appointment: SharedAppointment,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry {
    /// Reversed so the max-heap yields the smallest triage key first.
    fn cmp(&self, other: &Self) -> Ordering {
        other.key.cmp(&self.key)
    }
}

/// Hands out the most urgent pending appointment.
///
/// Urgency is the [`TriageKey`] order: priority, then scheduled time, then
/// identifier. Pushing the same appointment twice is allowed; the shared state
/// cell guarantees it is still claimed at most once.
#[derive(Debug, Default)]
pub struct TriageScheduler {
    heap: BinaryHeap<QueueEntry>,
    discarded: u64,
}

impl TriageScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, appointment: SharedAppointment) {
        let key = appointment.triage_key();
        self.heap.push(QueueEntry { key, appointment });
    }

    /// Removes and claims the most urgent pending appointment.
    ///
    /// Entries that are no longer pending are dropped on the way. Returns
    /// `None` once the queue holds nothing pending.
    pub fn pop(&mut self) -> Option<SharedAppointment> {
        while let Some(entry) = self.heap.pop() {
            if entry.appointment.try_claim() {
                tracing::debug!(
                    appointment_id = %entry.key.id,
                    priority = %entry.key.priority,
                    "claimed appointment"
                );
                return Some(entry.appointment);
            }
            self.discard(&entry.appointment);
        }
        None
    }

    /// Returns the most urgent pending appointment without removing it.
    ///
    /// Stale entries ahead of it are removed permanently, so this needs
    /// `&mut self` even though nothing is claimed.
    pub fn peek(&mut self) -> Option<SharedAppointment> {
        loop {
            let head = self.heap.peek()?;
            if head.appointment.is_pending() {
                return Some(Arc::clone(&head.appointment));
            }
            if let Some(stale) = self.heap.pop() {
                self.discard(&stale.appointment);
            }
        }
    }

    /// Number of resident entries, stale ones included.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Number of resident entries that are still pending.
    pub fn pending_len(&self) -> usize {
        self.heap.iter().filter(|e| e.appointment.is_pending()).count()
    }

    /// Total stale entries dropped since creation.
    pub fn discarded(&self) -> u64 {
        self.discarded
    }

    fn discard(&mut self, appointment: &TrackedAppointment) {
        self.discarded += 1;
        tracing::debug!(
            appointment_id = %appointment.id(),
            state = ?appointment.state(),
            "discarding stale triage entry"
        );
    }
}

impl Extend<SharedAppointment> for TriageScheduler {
    fn extend<I: IntoIterator<Item = SharedAppointment>>(&mut self, iter: I) {
        for appointment in iter {
            self.push(appointment);
        }
    }
}

impl FromIterator<SharedAppointment> for TriageScheduler {
    fn from_iter<I: IntoIterator<Item = SharedAppointment>>(iter: I) -> Self {
        let mut scheduler = Self::new();
        scheduler.extend(iter);
        scheduler
    }
}
