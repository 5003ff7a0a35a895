// src/screens.rs

//! One function per console screen. Every screen handles its own failures
//! inline: the message prints next to the action that triggered it, and
//! nothing propagates except terminal I/O trouble.

use std::io::{self, Write};

use chrono::{Local, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::cli::{AddEmployeeArgs, AttendanceDateArgs, LoginArgs, RemoveEmployeeArgs};
use crate::hrms_client::{io_context, Employee, HrmsClient, HrmsError, NewEmployee};
use crate::reconcile::{
    roster_key, AttendanceSheet, AttendanceStatus, DashboardStats, SaveAction,
};
use crate::session::Session;
use crate::ui;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Reads one trimmed line; `None` means the input stream is closed.
fn prompt(label: &str) -> io::Result<Option<String>> {
    print!("{} ", label);
    io::stdout().flush()?;
    let mut line = String::new();
    if io::stdin().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn confirm(question: &str) -> io::Result<bool> {
    print!("{} [y/N]: ", question);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(matches!(
        line.trim().to_lowercase().as_str(),
        "y" | "yes"
    ))
}

// --- Login / Logout ---

/// Login screen. The credential check is local and literal; success persists
/// the flag the other commands gate on.
pub fn login(session: &mut Session, args: LoginArgs) -> Result<(), HrmsError> {
    ui::page_heading("Admin Login", "Sign in to manage HRMS");
    ui::hint_line("Demo credentials: admin / admin1");
    println!();

    let username = match args.username {
        Some(u) => u,
        None => prompt("Username:")
            .map_err(|e| io_context(e, "Failed to read username"))?
            .unwrap_or_default(),
    };
    let password = match args.password {
        Some(p) => p,
        None => prompt("Password:")
            .map_err(|e| io_context(e, "Failed to read password"))?
            .unwrap_or_default(),
    };

    if session.login(&username, &password)? {
        ui::success_line("Signed in.");
        ui::hint_line("Try `dashboard`, `employees list` or `attendance view` next.");
    } else {
        ui::error_line("Invalid username or password");
    }
    Ok(())
}

pub fn logout(session: &mut Session) -> Result<(), HrmsError> {
    session.logout()?;
    ui::success_line("Signed out.");
    Ok(())
}

// --- Dashboard ---

/// Overview stat cards for today. A backend failure resets the numbers to
/// zero instead of aborting.
pub async fn dashboard(client: &HrmsClient) -> Result<(), HrmsError> {
    ui::page_heading("Dashboard", "Get an overview of your HRMS system");

    let today = Local::now().date_naive();
    let spinner = ui::create_spinner("Fetching stats...");
    let fetched = fetch_sheet(client, today).await;
    spinner.finish_and_clear();

    let stats = match fetched {
        Ok(sheet) => DashboardStats::from_sheet(&sheet),
        Err(e) => {
            ui::warn_line(&format!(
                "Backend connection failed ({}). Check your HRMS_API_URL.",
                e
            ));
            DashboardStats::default()
        }
    };

    ui::stat_card("Total Employees", stats.total_employees);
    ui::stat_card("Present Today", stats.present_today);
    ui::stat_card("Absent Today", stats.absent_today);
    Ok(())
}

/// Roster plus raw rows for one date, reconciled into the per-date sheet.
async fn fetch_sheet(client: &HrmsClient, date: NaiveDate) -> Result<AttendanceSheet, HrmsError> {
    let roster = client.list_employees().await?;
    let raw_rows = client.attendance_on(date).await?;
    let sheet = AttendanceSheet::new(date, roster, raw_rows);
    debug!(
        "{}: {} roster entries, {} surviving attendance rows",
        date,
        sheet.roster().len(),
        sheet.records().len()
    );
    Ok(sheet)
}

// --- Employees ---

pub async fn employees_list(client: &HrmsClient) -> Result<(), HrmsError> {
    ui::page_heading("Employees", "Manage your workforce");

    let spinner = ui::create_spinner("Fetching employees...");
    let fetched = client.list_employees().await;
    spinner.finish_and_clear();

    match fetched {
        Ok(roster) => render_roster(&roster),
        Err(e) => ui::error_line(&format!("Backend connection failed: {}", e)),
    }
    Ok(())
}

fn render_roster(roster: &[Employee]) {
    if roster.is_empty() {
        println!("No employees found. Add one to get started.");
        return;
    }
    let rows: Vec<Vec<String>> = roster
        .iter()
        .map(|emp| {
            vec![
                emp.display_code(),
                emp.display_name().to_string(),
                emp.email.clone().unwrap_or_else(|| "N/A".to_string()),
                emp.department.clone().unwrap_or_else(|| "N/A".to_string()),
            ]
        })
        .collect();
    ui::table(&["Employee ID", "Name", "Email", "Department"], &rows);
}

/// Validates the form locally before anything goes over the wire, then
/// refetches the roster on success. Backend rejections come back as one
/// inline string.
pub async fn employees_add(client: &HrmsClient, args: AddEmployeeArgs) -> Result<(), HrmsError> {
    ui::page_heading("Add New Employee", "Manage your workforce");

    if let Err(message) = validate_new_employee(&args) {
        ui::error_line(&message);
        return Ok(());
    }

    let payload = NewEmployee {
        full_name: args.name,
        email: args.email,
        department: args.department,
        employee_id: args.code.filter(|code| !code.trim().is_empty()),
    };
    debug!("Adding employee '{}'", payload.full_name);

    match client.create_employee(&payload).await {
        Ok(created) => {
            ui::success_line(&format!("Employee {} added.", created.display_name()));
            println!();
            match client.list_employees().await {
                Ok(roster) => render_roster(&roster),
                Err(e) => ui::error_line(&format!("Backend connection failed: {}", e)),
            }
        }
        Err(e) => ui::error_line(&format!("Failed to add employee: {}", e)),
    }
    Ok(())
}

fn validate_new_employee(args: &AddEmployeeArgs) -> Result<(), String> {
    if args.name.is_empty() || args.email.is_empty() || args.department.is_empty() {
        return Err("Name, Email, and Department are required".to_string());
    }
    if !is_valid_email(&args.email) {
        return Err("Please enter a valid email address".to_string());
    }
    Ok(())
}

/// Deletes by code or id after an explicit confirmation, then refetches.
pub async fn employees_remove(
    client: &HrmsClient,
    args: RemoveEmployeeArgs,
) -> Result<(), HrmsError> {
    if !args.yes {
        let question = format!(
            "Are you sure you want to delete employee {}?",
            args.identifier
        );
        let confirmed =
            confirm(&question).map_err(|e| io_context(e, "Failed to read confirmation"))?;
        if !confirmed {
            println!("Aborted.");
            return Ok(());
        }
    }

    match client.delete_employee(&args.identifier).await {
        Ok(()) => {
            ui::success_line("Employee deleted.");
            println!();
            match client.list_employees().await {
                Ok(roster) => render_roster(&roster),
                Err(e) => ui::error_line(&format!("Backend connection failed: {}", e)),
            }
        }
        Err(e) => ui::error_line(&format!("Failed to delete employee: {}", e)),
    }
    Ok(())
}

// --- Attendance ---

fn resolve_date(date: Option<NaiveDate>) -> Result<NaiveDate, String> {
    let today = Local::now().date_naive();
    let date = date.unwrap_or(today);
    if date > today {
        return Err(format!("Cannot select a future date (latest is {})", today));
    }
    Ok(date)
}

/// Read-only attendance table for one date.
pub async fn attendance_view(
    client: &HrmsClient,
    args: AttendanceDateArgs,
) -> Result<(), HrmsError> {
    ui::page_heading("Attendance", "Mark attendance for employees");

    let date = match resolve_date(args.date) {
        Ok(date) => date,
        Err(message) => {
            ui::error_line(&message);
            return Ok(());
        }
    };

    let spinner = ui::create_spinner("Fetching attendance...");
    let fetched = fetch_sheet(client, date).await;
    spinner.finish_and_clear();

    match fetched {
        Ok(sheet) => {
            println!("Date: {}", date);
            println!();
            render_sheet(&sheet, false);
        }
        Err(e) => ui::error_line(&format!("Failed to fetch attendance data: {}", e)),
    }
    Ok(())
}

/// Roster table with the derived status column. In mark mode staged edits
/// show a pending marker and a save-state column.
fn render_sheet(sheet: &AttendanceSheet, mark_mode: bool) {
    if sheet.roster().is_empty() {
        println!("No employees found. Add one to get started.");
        return;
    }
    let statuses = sheet.statuses();
    let mut rows = Vec::new();
    for (index, emp) in sheet.roster().iter().enumerate() {
        let key = roster_key(emp, index);
        let saved = statuses.get(&key).copied();
        let staged = sheet.staged_status(&key);
        let status_cell = match (staged, saved) {
            (Some(status), _) => format!("{} *", status),
            (None, Some(status)) => status.to_string(),
            (None, None) => "Not Marked".to_string(),
        };
        let mut row = vec![
            emp.display_code(),
            emp.display_name().to_string(),
            status_cell,
        ];
        if mark_mode {
            row.push(if staged.is_some() {
                "pending".to_string()
            } else {
                "Saved".to_string()
            });
        }
        rows.push(row);
    }
    if mark_mode {
        ui::table(&["Employee ID", "Name", "Status", "State"], &rows);
    } else {
        ui::table(&["Employee ID", "Name", "Status"], &rows);
    }
}

/// One line of the marking session.
#[derive(Debug, Clone, PartialEq)]
enum MarkCommand {
    Stage {
        target: String,
        status: AttendanceStatus,
    },
    Save(SaveTarget),
    SetDate(NaiveDate),
    Show,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq)]
enum SaveTarget {
    One(String),
    All,
}

fn parse_mark_command(line: &str) -> Option<MarkCommand> {
    let trimmed = line.trim();
    let (verb, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (trimmed, ""),
    };
    match verb.to_ascii_lowercase().as_str() {
        "present" | "p" if !rest.is_empty() => Some(MarkCommand::Stage {
            target: rest.to_string(),
            status: AttendanceStatus::Present,
        }),
        "absent" | "a" if !rest.is_empty() => Some(MarkCommand::Stage {
            target: rest.to_string(),
            status: AttendanceStatus::Absent,
        }),
        "save" if rest.eq_ignore_ascii_case("all") => Some(MarkCommand::Save(SaveTarget::All)),
        "save" if !rest.is_empty() => Some(MarkCommand::Save(SaveTarget::One(rest.to_string()))),
        "date" if !rest.is_empty() => rest.parse().ok().map(MarkCommand::SetDate),
        "show" if rest.is_empty() => Some(MarkCommand::Show),
        "help" if rest.is_empty() => Some(MarkCommand::Help),
        "done" | "quit" | "exit" if rest.is_empty() => Some(MarkCommand::Quit),
        _ => None,
    }
}

/// Accepts whatever identifier the operator typed, numeric id or employee
/// code, and resolves it to the roster entry's canonical key.
fn resolve_mark_target(sheet: &AttendanceSheet, input: &str) -> Option<String> {
    for (index, emp) in sheet.roster().iter().enumerate() {
        let key = roster_key(emp, index);
        let id_match = emp.id.map_or(false, |id| id.to_string() == input);
        let code_match = emp
            .employee_id
            .as_deref()
            .map_or(false, |code| code.eq_ignore_ascii_case(input));
        if key == input || id_match || code_match {
            return Some(key);
        }
    }
    None
}

fn print_mark_help() {
    println!("Commands:");
    println!("  present <employee>   stage a Present mark");
    println!("  absent <employee>    stage an Absent mark");
    println!("  save <employee>      persist one staged mark");
    println!("  save all             persist every staged mark");
    println!("  date <YYYY-MM-DD>    switch the selected date");
    println!("  show                 re-render the table");
    println!("  done                 leave the session");
}

/// Interactive marking session: stage Present/Absent per employee, save one
/// or all staged marks, switch the date, quit. Saves fold the backend's
/// answer back into the table without a refetch.
pub async fn attendance_mark(
    client: &HrmsClient,
    args: AttendanceDateArgs,
) -> Result<(), HrmsError> {
    ui::banner();
    ui::page_heading("Attendance", "Mark attendance for employees");

    let date = match resolve_date(args.date) {
        Ok(date) => date,
        Err(message) => {
            ui::error_line(&message);
            return Ok(());
        }
    };

    let spinner = ui::create_spinner("Fetching attendance...");
    let fetched = fetch_sheet(client, date).await;
    spinner.finish_and_clear();
    let mut sheet = match fetched {
        Ok(sheet) => sheet,
        Err(e) => {
            ui::error_line(&format!("Failed to fetch attendance data: {}", e));
            return Ok(());
        }
    };

    println!("Date: {}", sheet.date());
    println!();
    render_sheet(&sheet, true);
    println!();
    print_mark_help();

    loop {
        println!();
        let Some(line) = prompt("mark>").map_err(|e| io_context(e, "Failed to read command"))?
        else {
            break;
        };
        if line.is_empty() {
            continue;
        }
        match parse_mark_command(&line) {
            None => ui::error_line("Unrecognized command; type `help` to list them"),
            Some(MarkCommand::Help) => print_mark_help(),
            Some(MarkCommand::Quit) => break,
            Some(MarkCommand::Show) => {
                println!("Date: {}", sheet.date());
                println!();
                render_sheet(&sheet, true);
            }
            Some(MarkCommand::SetDate(new_date)) => match resolve_date(Some(new_date)) {
                Err(message) => ui::error_line(&message),
                Ok(new_date) => {
                    let spinner = ui::create_spinner("Fetching attendance...");
                    let fetched = fetch_sheet(client, new_date).await;
                    spinner.finish_and_clear();
                    match fetched {
                        // Unsaved edits belong to the old date and are dropped.
                        Ok(new_sheet) => {
                            sheet = new_sheet;
                            println!("Date: {}", sheet.date());
                            println!();
                            render_sheet(&sheet, true);
                        }
                        Err(e) => {
                            ui::error_line(&format!("Failed to fetch attendance data: {}", e))
                        }
                    }
                }
            },
            Some(MarkCommand::Stage { target, status }) => {
                match resolve_mark_target(&sheet, &target) {
                    Some(key) => {
                        sheet.stage(&key, status);
                        render_sheet(&sheet, true);
                    }
                    None => ui::error_line(&format!("No employee matches '{}'", target)),
                }
            }
            Some(MarkCommand::Save(SaveTarget::One(target))) => {
                match resolve_mark_target(&sheet, &target) {
                    Some(key) => {
                        save_one(client, &mut sheet, &key).await;
                        render_sheet(&sheet, true);
                    }
                    None => ui::error_line(&format!("No employee matches '{}'", target)),
                }
            }
            Some(MarkCommand::Save(SaveTarget::All)) => {
                let keys: Vec<String> = sheet.staged().keys().cloned().collect();
                if keys.is_empty() {
                    ui::warn_line("Nothing staged to save");
                    continue;
                }
                for key in keys {
                    save_one(client, &mut sheet, &key).await;
                }
                render_sheet(&sheet, true);
            }
        }
    }
    Ok(())
}

/// Persists one staged edit via the create-vs-update decision and folds the
/// backend's answer into the sheet. A failed save keeps the edit staged.
async fn save_one(client: &HrmsClient, sheet: &mut AttendanceSheet, key: &str) {
    let Some(action) = sheet.plan_save(key) else {
        ui::warn_line(&format!("Nothing staged for {}", key));
        return;
    };
    let spinner = ui::create_spinner("Saving...");
    let result = match &action {
        SaveAction::Create(payload) => client.create_attendance(payload).await,
        SaveAction::Update { id, payload } => client.update_attendance(id, payload).await,
    };
    spinner.finish_and_clear();
    match result {
        Ok(returned) => {
            sheet.apply_saved(returned);
            ui::success_line(&format!("Saved {}", key));
        }
        Err(e) => ui::error_line(&format!("Failed to save attendance: {}", e)),
    }
}
