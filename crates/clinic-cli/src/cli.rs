use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clinic_core::{AppointmentId, AppointmentTime, PatientId, Priority};

use crate::validation;

#[derive(Parser)]
#[command(name = "clinic")]
#[command(about = "Clinic triage CLI: register patients and work the appointment queue")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (defaults to ./clinic.toml when present)
    #[arg(short, long, global = true, env = "CLINIC_CONFIG")]
    pub config: Option<String>,

    /// Snapshot file holding the clinic records (overrides config)
    #[arg(short, long, global = true, env = "CLINIC_DATA")]
    pub data: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true)]
    pub format: Option<OutputFormat>,
}

#[derive(Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Register, look up and remove patients
    Patient(PatientArgs),
    /// Schedule appointments and work the triage queue
    Appointment(AppointmentArgs),
    /// Review recorded consultations
    Consultation(ConsultationArgs),
}

#[derive(clap::Args)]
pub struct PatientArgs {
    #[command(subcommand)]
    pub command: PatientCommands,
}

#[derive(Subcommand)]
pub enum PatientCommands {
    /// Register a new patient
    Add(AddPatientArgs),
    /// Show a patient by ID
    Show(PatientRefArgs),
    /// Find a patient by phone number
    Find(FindPatientArgs),
    /// List patients, most recently registered first
    List,
    /// Remove a patient and their appointments
    Remove(PatientRefArgs),
}

#[derive(clap::Args)]
pub struct AddPatientArgs {
    /// 4 or 5 digit patient ID
    #[arg(long, value_parser = validation::patient_id)]
    pub id: PatientId,
    /// Full name
    #[arg(long)]
    pub name: String,
    /// Age in years
    #[arg(long, value_parser = validation::age)]
    pub age: u32,
    /// Gender
    #[arg(long)]
    pub gender: String,
    /// Phone number (09XXXXXXXX or 07XXXXXXXX)
    #[arg(long, value_parser = validation::contact)]
    pub contact: String,
    /// Free-text medical history
    #[arg(long, default_value = "")]
    pub history: String,
}

#[derive(clap::Args)]
pub struct PatientRefArgs {
    /// Patient ID
    #[arg(value_parser = validation::patient_id)]
    pub id: PatientId,
}

#[derive(clap::Args)]
pub struct FindPatientArgs {
    /// Phone number to search for
    #[arg(long)]
    pub contact: String,
}

#[derive(clap::Args)]
pub struct AppointmentArgs {
    #[command(subcommand)]
    pub command: AppointmentCommands,
}

#[derive(Subcommand)]
pub enum AppointmentCommands {
    /// Schedule an appointment for a registered patient
    Schedule(ScheduleArgs),
    /// List scheduled appointments in triage order
    List,
    /// Show the appointment the next doctor would receive
    Peek,
    /// Claim the most urgent appointment and record its consultation
    Next(NextArgs),
    /// Mark an appointment completed without a consultation
    Complete(AppointmentRefArgs),
}

#[derive(clap::Args)]
pub struct ScheduleArgs {
    /// Patient ID
    #[arg(long, value_parser = validation::patient_id)]
    pub patient: PatientId,
    /// Appointment time (YYYY-MM-DD HH:MM)
    #[arg(long, value_parser = validation::appointment_time)]
    pub time: AppointmentTime,
    /// Priority (1 critical, 2 urgent, 3 normal)
    #[arg(long, value_parser = validation::priority)]
    pub priority: Priority,
}

#[derive(clap::Args)]
pub struct NextArgs {
    /// Diagnosis
    #[arg(long, value_parser = validation::diagnosis)]
    pub diagnosis: String,
    /// Consultation cost
    #[arg(long, value_parser = validation::cost)]
    pub cost: f64,
    /// Other questions or notes
    #[arg(long, default_value = "")]
    pub notes: String,
}

#[derive(clap::Args)]
pub struct AppointmentRefArgs {
    /// Appointment ID
    pub id: AppointmentId,
}

#[derive(clap::Args)]
pub struct ConsultationArgs {
    #[command(subcommand)]
    pub command: ConsultationCommands,
}

#[derive(Subcommand)]
pub enum ConsultationCommands {
    /// List consultations with their patients
    List,
}
