// src/ui.rs

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Clears the screen and prints the console banner.
pub fn banner() {
    print!("\x1B[2J\x1B[1;1H");
    println!(
        "{} {}",
        " HR ".on_red().white().bold(),
        "HRMS Lite Console".bold()
    );
    println!();
}

/// Page heading: a title plus the muted one-line description under it.
pub fn page_heading(title: &str, subtitle: &str) {
    println!("{}", title.bold());
    println!("{}", subtitle.dimmed());
    println!();
}

/// Spinner shown while a fetch is in flight.
pub fn create_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.red} {msg}")
            .unwrap(),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

pub fn success_line(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

pub fn error_line(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message.red());
}

pub fn warn_line(message: &str) {
    eprintln!("{} {}", "!".yellow().bold(), message.yellow());
}

pub fn hint_line(message: &str) {
    println!("{}", message.dimmed());
}

/// One dashboard stat card: a big number and its label.
pub fn stat_card(label: &str, value: usize) {
    println!("  {}  {}", format!("{:>5}", value).red().bold(), label);
}

/// Aligned plain-text table. Column widths come from the content; headers
/// print bold over a dashed rule.
pub fn table(headers: &[&str], rows: &[Vec<String>]) {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }
    }

    let render = |cells: &[String]| -> String {
        cells
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                format!(
                    "{:width$}",
                    cell,
                    width = widths.get(i).copied().unwrap_or(0)
                )
            })
            .collect::<Vec<_>>()
            .join("  ")
    };

    let header_cells: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    let header_line = render(&header_cells);
    println!("{}", header_line.bold());
    println!("{}", "-".repeat(header_line.chars().count()));
    for row in rows {
        println!("{}", render(row));
    }
}
