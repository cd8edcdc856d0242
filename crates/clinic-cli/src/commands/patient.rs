use anyhow::{Context, Result, bail};
use clinic_core::{Patient, PatientId};
use clinic_triage::Clinic;

use crate::cli::{AddPatientArgs, OutputFormat};
use crate::output::{print_patient, print_patients, print_success};

pub async fn add(clinic: &Clinic, args: &AddPatientArgs) -> Result<()> {
    let patient = Patient::new(args.id, &args.name, args.age, &args.gender, &args.contact)
        .with_medical_history(&args.history);
    clinic
        .register_patient(patient)
        .await
        .with_context(|| format!("Failed to register patient {}", args.id))?;
    print_success(&format!("Patient {} added", args.id));
    Ok(())
}

pub async fn show(clinic: &Clinic, id: PatientId, format: OutputFormat) -> Result<()> {
    match clinic.find_patient(id).await {
        Some(patient) => print_patient(&patient, format),
        None => bail!("Patient {id} not found"),
    }
}

pub async fn find(clinic: &Clinic, contact: &str, format: OutputFormat) -> Result<()> {
    match clinic.find_patient_by_contact(contact).await {
        Some(patient) => print_patient(&patient, format),
        None => bail!("No patient with phone number {contact}"),
    }
}

pub async fn list(clinic: &Clinic, format: OutputFormat) -> Result<()> {
    print_patients(&clinic.patients().await, format)
}

pub async fn remove(clinic: &Clinic, id: PatientId) -> Result<()> {
    let removed = clinic
        .remove_patient(id)
        .await
        .with_context(|| format!("Failed to remove patient {id}"))?;
    if !removed {
        bail!("Patient {id} not found");
    }
    print_success(&format!("Patient {id} and their appointments removed"));
    Ok(())
}
