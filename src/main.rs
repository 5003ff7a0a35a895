// src/main.rs

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod cli;
mod config;
mod hrms_client;
mod reconcile;
#[cfg(test)]
mod reconcile_tests;
mod screens;
mod session;
mod ui;

use cli::{AttendanceCommand, Cli, Command, EmployeesCommand};
use config::AppConfig;
use hrms_client::HrmsClient;
use session::Session;

/// Protected commands refuse to run without the persisted login flag; this
/// is the console's redirect-to-login.
fn gate(session: &Session, config: &AppConfig) -> anyhow::Result<HrmsClient> {
    if !session.is_active() {
        anyhow::bail!("Not logged in. Run `hrms-console login` first.");
    }
    Ok(HrmsClient::new(config)?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()
        .context("Configuration error; set HRMS_API_URL (see .env.example)")?;
    let mut session = Session::load(&config.session_file).context("Failed to load session state")?;

    match cli.command {
        Command::Login(args) => screens::login(&mut session, args)?,
        Command::Logout => screens::logout(&mut session)?,
        Command::Dashboard => {
            let client = gate(&session, &config)?;
            screens::dashboard(&client).await?;
        }
        Command::Employees { command } => {
            let client = gate(&session, &config)?;
            match command {
                EmployeesCommand::List => screens::employees_list(&client).await?,
                EmployeesCommand::Add(args) => screens::employees_add(&client, args).await?,
                EmployeesCommand::Remove(args) => screens::employees_remove(&client, args).await?,
            }
        }
        Command::Attendance { command } => {
            let client = gate(&session, &config)?;
            match command {
                AttendanceCommand::View(args) => screens::attendance_view(&client, args).await?,
                AttendanceCommand::Mark(args) => screens::attendance_mark(&client, args).await?,
            }
        }
    }

    Ok(())
}
