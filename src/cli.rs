// src/cli.rs

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "hrms-console",
    version,
    about = "Terminal admin console for the HRMS Lite backend"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sign in to the console
    Login(LoginArgs),
    /// Sign out and clear the local session
    Logout,
    /// Overview stats: total employees, present and absent today
    Dashboard,
    /// Manage employee records
    Employees {
        #[command(subcommand)]
        command: EmployeesCommand,
    },
    /// View or mark daily attendance
    Attendance {
        #[command(subcommand)]
        command: AttendanceCommand,
    },
}

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Username; prompted for when omitted
    #[arg(short, long)]
    pub username: Option<String>,
    /// Password; prompted for when omitted
    #[arg(short, long)]
    pub password: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum EmployeesCommand {
    /// List the full roster
    List,
    /// Add a new employee
    Add(AddEmployeeArgs),
    /// Delete an employee after confirmation
    Remove(RemoveEmployeeArgs),
}

#[derive(Args, Debug)]
pub struct AddEmployeeArgs {
    /// Full name
    #[arg(long)]
    pub name: String,
    /// Email address
    #[arg(long)]
    pub email: String,
    /// Department, e.g. IT or HR
    #[arg(long)]
    pub department: String,
    /// Employee code, e.g. EMP001; left out, the backend assigns one
    #[arg(long)]
    pub code: Option<String>,
}

#[derive(Args, Debug)]
pub struct RemoveEmployeeArgs {
    /// Employee code or numeric id
    pub identifier: String,
    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Subcommand, Debug)]
pub enum AttendanceCommand {
    /// Show attendance for a date
    View(AttendanceDateArgs),
    /// Interactively mark attendance for a date
    Mark(AttendanceDateArgs),
}

#[derive(Args, Debug)]
pub struct AttendanceDateArgs {
    /// Date as YYYY-MM-DD; defaults to today
    #[arg(short, long)]
    pub date: Option<NaiveDate>,
}
