use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;
use crate::id::{AppointmentId, PatientId};
use crate::time::AppointmentTime;

/// Triage priority. Lower values are more urgent.
///
/// The clinic uses 1 (critical), 2 (urgent) and 3 (normal), but no upper
/// bound is enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Priority(pub u32);

impl Priority {
    pub const CRITICAL: Priority = Priority(1);
    pub const URGENT: Priority = Priority(2);
    pub const NORMAL: Priority = Priority(3);

    pub const fn new(level: u32) -> Self {
        Self(level)
    }

    pub const fn level(self) -> u32 {
        self.0
    }

    pub fn label(self) -> &'static str {
        match self.0 {
            1 => "critical",
            2 => "urgent",
            3 => "normal",
            _ => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Priority {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().parse::<u32>() {
            Ok(level) if level > 0 => Ok(Priority(level)),
            _ => Err(CoreError::invalid_priority(s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    #[default]
    Scheduled,
    Completed,
}

impl AppointmentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(Self::Scheduled),
            "completed" => Ok(Self::Completed),
            other => Err(CoreError::invalid_status(other)),
        }
    }
}

/// Scheduling order key: priority, then scheduled time, then identifier.
///
/// The derived `Ord` compares fields in declaration order, which gives a
/// strict total order because identifiers are unique.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TriageKey {
    pub priority: Priority,
    pub scheduled_at: AppointmentTime,
    pub id: AppointmentId,
}

/// An appointment row as owned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: AppointmentId,
    pub patient_id: PatientId,
    pub scheduled_at: AppointmentTime,
    pub priority: Priority,
    #[serde(default)]
    pub status: AppointmentStatus,
}

impl Appointment {
    pub fn new(
        id: AppointmentId,
        patient_id: PatientId,
        scheduled_at: AppointmentTime,
        priority: Priority,
    ) -> Self {
        Self {
            id,
            patient_id,
            scheduled_at,
            priority,
            status: AppointmentStatus::Scheduled,
        }
    }

    pub fn with_status(mut self, status: AppointmentStatus) -> Self {
        self.status = status;
        self
    }

    pub fn triage_key(&self) -> TriageKey {
        TriageKey {
            priority: self.priority,
            scheduled_at: self.scheduled_at,
            id: self.id,
        }
    }

    pub fn is_scheduled(&self) -> bool {
        matches!(self.status, AppointmentStatus::Scheduled)
    }
}
