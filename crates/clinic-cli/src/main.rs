mod cli;
mod commands;
mod config;
mod observability;
mod output;
mod validation;

use anyhow::{Context, Result};
use clap::Parser;
use clinic_db_memory::{GatewayConfig, create_gateway};
use clinic_triage::Clinic;

use cli::{AppointmentCommands, Cli, Commands, ConsultationCommands, PatientCommands};
use output::print_error;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let cfg = config::loader::load_config(cli.config.as_deref()).map_err(anyhow::Error::msg)?;
    observability::init_tracing_with_level(&cfg.logging.level);
    let format = cli.format.unwrap_or_default();

    let gateway_config = match &cli.data {
        Some(path) => GatewayConfig::snapshot(path.clone()),
        None => cfg.gateway_config(),
    };
    let gateway = create_gateway(&gateway_config)
        .await
        .context("Failed to open clinic records")?;
    let clinic = Clinic::open(gateway)
        .await
        .context("Failed to load clinic state")?;
    tracing::debug!(
        backend = clinic.gateway().backend_name(),
        pending = clinic.pending_count().await,
        "clinic opened"
    );

    match &cli.command {
        Commands::Patient(args) => match &args.command {
            PatientCommands::Add(add) => commands::patient::add(&clinic, add).await?,
            PatientCommands::Show(target) => {
                commands::patient::show(&clinic, target.id, format).await?
            }
            PatientCommands::Find(find) => {
                commands::patient::find(&clinic, &find.contact, format).await?
            }
            PatientCommands::List => commands::patient::list(&clinic, format).await?,
            PatientCommands::Remove(target) => {
                commands::patient::remove(&clinic, target.id).await?
            }
        },
        Commands::Appointment(args) => match &args.command {
            AppointmentCommands::Schedule(schedule) => {
                commands::appointment::schedule(&clinic, schedule, format).await?
            }
            AppointmentCommands::List => commands::appointment::list(&clinic, format).await?,
            AppointmentCommands::Peek => commands::appointment::peek(&clinic, format).await?,
            AppointmentCommands::Next(next) => {
                commands::appointment::next(&clinic, next, format).await?
            }
            AppointmentCommands::Complete(target) => {
                commands::appointment::complete(&clinic, target.id).await?
            }
        },
        Commands::Consultation(args) => match &args.command {
            ConsultationCommands::List => commands::consultation::list(&clinic, format).await?,
        },
    }

    Ok(())
}
