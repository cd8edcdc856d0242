use anyhow::{Context, Result, bail};
use clinic_core::AppointmentId;
use clinic_triage::Clinic;

use crate::cli::{NextArgs, OutputFormat, ScheduleArgs};
use crate::output::{print_appointment, print_info, print_schedule, print_success};

pub async fn schedule(clinic: &Clinic, args: &ScheduleArgs, format: OutputFormat) -> Result<()> {
    let appointment = clinic
        .schedule_appointment(args.patient, args.time, args.priority)
        .await
        .with_context(|| format!("Failed to schedule appointment for patient {}", args.patient))?;
    print_success(&format!("Appointment {} scheduled", appointment.id));
    print_appointment(&appointment, format)
}

pub async fn list(clinic: &Clinic, format: OutputFormat) -> Result<()> {
    let entries = clinic
        .scheduled_appointments()
        .await
        .context("Failed to read the schedule")?;
    print_schedule(&entries, format)
}

pub async fn peek(clinic: &Clinic, format: OutputFormat) -> Result<()> {
    match clinic.peek_next().await {
        Some(appointment) => print_appointment(&appointment, format),
        None => {
            print_info("No scheduled appointments");
            Ok(())
        }
    }
}

pub async fn next(clinic: &Clinic, args: &NextArgs, format: OutputFormat) -> Result<()> {
    let Some(claim) = clinic.claim_next().await else {
        print_info("No scheduled appointments");
        return Ok(());
    };
    let appointment = claim.appointment();
    let patient_name = clinic
        .find_patient(claim.patient_id())
        .await
        .map(|p| p.name)
        .unwrap_or_else(|| claim.patient_id().to_string());

    let consultation_id = clinic
        .complete(claim, &args.diagnosis, args.cost, &args.notes)
        .await
        .with_context(|| format!("Failed to complete appointment {}", appointment.id))?;
    print_appointment(&appointment, format)?;
    print_success(&format!(
        "Consultation {consultation_id} recorded for {patient_name}"
    ));
    Ok(())
}

pub async fn complete(clinic: &Clinic, id: AppointmentId) -> Result<()> {
    let completed = clinic
        .complete_appointment(id)
        .await
        .with_context(|| format!("Failed to complete appointment {id}"))?;
    if !completed {
        bail!("Appointment {id} is being handled by a doctor");
    }
    print_success(&format!("Appointment {id} marked completed"));
    Ok(())
}
