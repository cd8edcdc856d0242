use anyhow::{Context, Result};
use clinic_triage::Clinic;

use crate::cli::OutputFormat;
use crate::output::print_consultations;

pub async fn list(clinic: &Clinic, format: OutputFormat) -> Result<()> {
    let records = clinic
        .consultations()
        .await
        .context("Failed to read consultations")?;
    print_consultations(&records, format)
}
