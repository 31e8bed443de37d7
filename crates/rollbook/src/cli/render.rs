//! Text rendering of service replies.

use std::fmt::Write as _;

use crate::service::Reply;
use crate::storage::StoreStats;
use crate::student::Student;

use super::OutputFormat;

const RULE_WIDTH: usize = 100;

/// One-line summary of a student.
#[must_use]
pub fn format_student(student: &Student, precision: usize) -> String {
    format!(
        "Roll: {} | Name: {:<20} | Email: {:<25} | GPA: {:.precision$} | Course: {}",
        student.roll_number, student.name, student.email, student.gpa, student.course
    )
}

/// Render a reply for the terminal.
///
/// # Errors
///
/// Returns an error if JSON output was requested and serialization fails.
pub fn render_reply(
    reply: &Reply,
    format: OutputFormat,
    precision: usize,
) -> serde_json::Result<String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(reply),
        OutputFormat::Plain => Ok(render_plain(reply, precision)),
        OutputFormat::Table => Ok(render_table(reply, precision)),
    }
}

fn render_plain(reply: &Reply, precision: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", reply.message);
    for (i, student) in reply.records.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", i + 1, format_student(student, precision));
    }
    if let Some(stats) = &reply.stats {
        render_stats(&mut out, stats, precision, false);
    }
    out
}

fn render_table(reply: &Reply, precision: usize) -> String {
    let mut out = String::new();
    let rule = "=".repeat(RULE_WIDTH);

    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "{}", reply.message.to_uppercase());
    let _ = writeln!(out, "{rule}");

    if !reply.records.is_empty() {
        let headers = ["#", "ROLL", "NAME", "EMAIL", "GPA", "COURSE"];
        let rows: Vec<[String; 6]> = reply
            .records
            .iter()
            .enumerate()
            .map(|(i, s)| {
                [
                    (i + 1).to_string(),
                    s.roll_number.clone(),
                    s.name.clone(),
                    s.email.clone(),
                    format!("{:.precision$}", s.gpa),
                    s.course.clone(),
                ]
            })
            .collect();

        let mut widths = headers.map(str::len);
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        write_row(&mut out, &headers.map(str::to_string), &widths);
        for row in &rows {
            write_row(&mut out, row, &widths);
        }
    }

    if let Some(stats) = &reply.stats {
        render_stats(&mut out, stats, precision, true);
    }

    let _ = writeln!(out, "{rule}");
    out
}

fn write_row(out: &mut String, cells: &[String; 6], widths: &[usize; 6]) {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    let _ = writeln!(out, "{}", line.trim_end());
}

fn render_stats(out: &mut String, stats: &StoreStats, precision: usize, detailed: bool) {
    let _ = writeln!(out, "Total Students: {}", stats.total_students);
    let _ = writeln!(out, "Average GPA: {:.precision$}", stats.average_gpa);
    if detailed {
        if let Some(path) = &stats.data_path {
            let _ = writeln!(out, "Data file: {}", path.display());
            let _ = writeln!(out, "Data size: {} bytes", stats.data_size_bytes);
        }
    }
}
