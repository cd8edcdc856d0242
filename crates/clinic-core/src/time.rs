use crate::error::{CoreError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use time::PrimitiveDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

/// Format operators type at the front desk.
const OPERATOR_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]");

/// Format used when persisting appointments.
const STORED_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");

const STORED_FORMAT_NO_SECONDS: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]");

/// Wall-clock date and time an appointment is scheduled for.
///
/// Clinic-local, without an offset. Ordering is chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AppointmentTime(pub PrimitiveDateTime);

impl AppointmentTime {
    pub fn new(datetime: PrimitiveDateTime) -> Self {
        Self(datetime)
    }

    pub fn inner(&self) -> &PrimitiveDateTime {
        &self.0
    }

    pub fn into_inner(self) -> PrimitiveDateTime {
        self.0
    }

    /// Renders the stored (ISO-8601, seconds precision) representation.
    pub fn to_stored_string(&self) -> Result<String> {
        self.0
            .format(STORED_FORMAT)
            .map_err(|e| CoreError::invalid_date_time(format!("Failed to format {:?}: {e}", self.0)))
    }
}

impl fmt::Display for AppointmentTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let formatted = self.0.format(OPERATOR_FORMAT).map_err(|_| fmt::Error)?;
        write!(f, "{formatted}")
    }
}

impl FromStr for AppointmentTime {
    type Err = CoreError;

    /// Accepts `YYYY-MM-DD HH:MM` as well as the stored ISO forms.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        [OPERATOR_FORMAT, STORED_FORMAT, STORED_FORMAT_NO_SECONDS]
            .iter()
            .find_map(|format| PrimitiveDateTime::parse(s, *format).ok())
            .map(AppointmentTime)
            .ok_or_else(|| {
                CoreError::invalid_date_time(format!(
                    "Failed to parse appointment time '{s}', expected YYYY-MM-DD HH:MM"
                ))
            })
    }
}

impl From<PrimitiveDateTime> for AppointmentTime {
    fn from(value: PrimitiveDateTime) -> Self {
        Self(value)
    }
}

impl Serialize for AppointmentTime {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let formatted = self.to_stored_string().map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&formatted)
    }
}

impl<'de> Deserialize<'de> for AppointmentTime {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        AppointmentTime::from_str(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_parse_operator_format() {
        let parsed: AppointmentTime = "2024-05-01 09:30".parse().unwrap();
        assert_eq!(parsed.into_inner(), datetime!(2024-05-01 09:30));
    }

    #[test]
    fn test_parse_stored_formats() {
        let with_seconds: AppointmentTime = "2024-05-01T09:30:00".parse().unwrap();
        let without_seconds: AppointmentTime = "2024-05-01T09:30".parse().unwrap();
        assert_eq!(with_seconds, without_seconds);
    }

    #[test]
    fn test_rejects_garbage() {
        let err = "next tuesday".parse::<AppointmentTime>().unwrap_err();
        assert!(matches!(err, CoreError::InvalidDateTime(_)));
        assert!("2024-02-30 10:00".parse::<AppointmentTime>().is_err());
    }

    #[test]
    fn test_display_and_serde() {
        let time = AppointmentTime::new(datetime!(2024-05-01 14:05));
        assert_eq!(time.to_string(), "2024-05-01 14:05");

        let json = serde_json::to_string(&time).unwrap();
        assert_eq!(json, "\"2024-05-01T14:05:00\"");
        let back: AppointmentTime = serde_json::from_str(&json).unwrap();
        assert_eq!(back, time);
    }

    #[test]
    fn test_chronological_order() {
        let early = AppointmentTime::new(datetime!(2024-05-01 08:00));
        let late = AppointmentTime::new(datetime!(2024-05-01 10:00));
        assert!(early < late);
    }
}
