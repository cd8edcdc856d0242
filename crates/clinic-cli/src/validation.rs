//! Operator input checks, applied before anything reaches the clinic core.

use std::sync::LazyLock;

use clinic_core::{AppointmentTime, PatientId, Priority};
use regex::Regex;
use thiserror::Error;

static PATIENT_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4,5}$").expect("Invalid patient id regex"));

static CONTACT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(09|07)\d{8}$").expect("Invalid contact regex"));

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Patient ID must be a 4 or 5 digit number")]
    PatientId,
    #[error("Phone number must start with 09 or 07 followed by 8 digits")]
    Contact,
    #[error("Age must be a number")]
    Age,
    #[error("Invalid time format, expected YYYY-MM-DD HH:MM")]
    Time,
    #[error("Priority must be a positive integer")]
    Priority,
    #[error("Please enter a diagnosis")]
    Diagnosis,
    #[error("Cost must be a number")]
    Cost,
}

pub fn patient_id(raw: &str) -> Result<PatientId, ValidationError> {
    let raw = raw.trim();
    if !PATIENT_ID.is_match(raw) {
        return Err(ValidationError::PatientId);
    }
    raw.parse().map_err(|_| ValidationError::PatientId)
}

pub fn contact(raw: &str) -> Result<String, ValidationError> {
    let raw = raw.trim();
    if CONTACT.is_match(raw) {
        Ok(raw.to_string())
    } else {
        Err(ValidationError::Contact)
    }
}

pub fn age(raw: &str) -> Result<u32, ValidationError> {
    raw.trim().parse().map_err(|_| ValidationError::Age)
}

pub fn appointment_time(raw: &str) -> Result<AppointmentTime, ValidationError> {
    raw.parse().map_err(|_| ValidationError::Time)
}

pub fn priority(raw: &str) -> Result<Priority, ValidationError> {
    raw.parse().map_err(|_| ValidationError::Priority)
}

pub fn diagnosis(raw: &str) -> Result<String, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        Err(ValidationError::Diagnosis)
    } else {
        Ok(raw.to_string())
    }
}

pub fn cost(raw: &str) -> Result<f64, ValidationError> {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(ValidationError::Cost),
    }
}
