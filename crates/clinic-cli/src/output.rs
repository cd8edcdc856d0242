use anyhow::Result;
use clinic_core::{Appointment, Patient};
use clinic_storage::ConsultationRecord;
use clinic_triage::ScheduleEntry;
use colored::Colorize;
use serde_json::{Value, json};
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::cli::OutputFormat;

pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

pub fn print_info(msg: &str) {
    println!("{} {}", "•".cyan(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_table(header: &[&str], rows: Vec<Vec<String>>) {
    let mut builder = Builder::default();
    builder.push_record(header.iter().map(|h| h.to_string()));
    for row in rows {
        builder.push_record(row);
    }
    let table = builder.build().with(Style::rounded()).to_string();
    println!("{table}");
}

pub fn print_patient(patient: &Patient, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(&serde_json::to_value(patient)?),
        OutputFormat::Table => {
            println!("{} {}", "Patient:".cyan(), patient.id.to_string().cyan());
            println!("{}: {}", "Name".cyan(), patient.name);
            println!("{}: {}", "Age".cyan(), patient.age);
            println!("{}: {}", "Gender".cyan(), patient.gender);
            println!("{}: {}", "Contact".cyan(), patient.contact);
            println!("{}: {}", "Medical History".cyan(), patient.medical_history);
            Ok(())
        }
    }
}

pub fn print_patients(patients: &[Patient], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(&serde_json::to_value(patients)?),
        OutputFormat::Table => {
            if patients.is_empty() {
                println!("No patients registered.");
                return Ok(());
            }
            let rows = patients
                .iter()
                .map(|p| {
                    vec![
                        p.id.to_string(),
                        p.name.clone(),
                        p.age.to_string(),
                        p.gender.clone(),
                        p.contact.clone(),
                    ]
                })
                .collect();
            print_table(&["ID", "Name", "Age", "Gender", "Contact"], rows);
            println!("Total: {}", patients.len());
            Ok(())
        }
    }
}

pub fn print_appointment(appointment: &Appointment, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(&serde_json::to_value(appointment)?),
        OutputFormat::Table => {
            println!(
                "{} {} for patient {} at {} (priority {}, {})",
                "Appointment".cyan(),
                appointment.id.to_string().cyan(),
                appointment.patient_id,
                appointment.scheduled_at,
                appointment.priority,
                appointment.priority.label()
            );
            Ok(())
        }
    }
}

pub fn print_schedule(entries: &[ScheduleEntry], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let values: Vec<Value> = entries
                .iter()
                .map(|entry| {
                    json!({
                        "appointment": entry.appointment,
                        "patient_name": entry.patient_name,
                    })
                })
                .collect();
            print_json(&Value::Array(values))
        }
        OutputFormat::Table => {
            if entries.is_empty() {
                println!("No scheduled appointments.");
                return Ok(());
            }
            let rows = entries
                .iter()
                .map(|entry| {
                    let a = &entry.appointment;
                    vec![
                        a.id.to_string(),
                        a.patient_id.to_string(),
                        entry.patient_name.clone().unwrap_or_else(|| "-".into()),
                        a.scheduled_at.to_string(),
                        format!("{} ({})", a.priority, a.priority.label()),
                    ]
                })
                .collect();
            print_table(
                &["Appointment ID", "Patient ID", "Patient Name", "Time", "Priority"],
                rows,
            );
            Ok(())
        }
    }
}

pub fn print_consultations(records: &[ConsultationRecord], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(&serde_json::to_value(records)?),
        OutputFormat::Table => {
            if records.is_empty() {
                println!("No consultations.");
                return Ok(());
            }
            let rows = records
                .iter()
                .map(|r| {
                    vec![
                        r.consultation.id.to_string(),
                        r.consultation.appointment_id.to_string(),
                        r.patient_id.to_string(),
                        r.patient_name.clone(),
                        r.consultation.diagnosis.clone(),
                        format!("{:.2}", r.consultation.cost),
                        r.consultation.notes.clone(),
                    ]
                })
                .collect();
            print_table(
                &[
                    "Consultation ID",
                    "Appointment ID",
                    "Patient ID",
                    "Patient Name",
                    "Diagnosis",
                    "Cost",
                    "Notes",
                ],
                rows,
            );
            Ok(())
        }
    }
}
