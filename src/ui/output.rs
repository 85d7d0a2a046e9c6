//! Terminal output helpers shared by every command.

use chrono::NaiveDateTime;
use console::{Alignment, measure_text_width, pad_str, style};

use super::icons::{
    FAILURE, INFO, PRIORITY_CRITICAL, PRIORITY_HIGH, PRIORITY_LOW, PRIORITY_MEDIUM, SUCCESS,
    WARNING,
};

pub fn success(message: &str) {
    println!("{} {}", style(SUCCESS).green(), message);
}

/// Errors go to stderr so piped report output stays clean.
pub fn error(message: &str) {
    eprintln!("{} {}", style(FAILURE).red(), message);
}

pub fn warning(message: &str) {
    println!("{} {}", style(WARNING).yellow(), message);
}

pub fn info(message: &str) {
    println!("{} {}", style(INFO).blue(), message);
}

/// Bold section heading preceded by a blank line.
pub fn heading(text: &str) {
    println!();
    println!("{}", style(text).bold());
}

/// Bordered box with a title line, used for summaries.
pub fn panel(title: &str, lines: &[String]) {
    let width = lines
        .iter()
        .map(|l| measure_text_width(l))
        .chain(std::iter::once(measure_text_width(title)))
        .max()
        .unwrap_or(0);
    let rule = "─".repeat(width + 2);
    println!("{}", style(format!("┌{rule}┐")).cyan());
    println!(
        "{} {} {}",
        style("│").cyan(),
        pad_str(&style(title).bold().to_string(), width, Alignment::Left, None),
        style("│").cyan()
    );
    println!("{}", style(format!("├{rule}┤")).cyan());
    for line in lines {
        println!(
            "{} {} {}",
            style("│").cyan(),
            pad_str(line, width, Alignment::Left, None),
            style("│").cyan()
        );
    }
    println!("{}", style(format!("└{rule}┘")).cyan());
}

/// Render rows as left-aligned columns under a bold header. Cells may carry
/// ANSI styling; widths are measured on visible text.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| measure_text_width(h)).collect();
    for row in rows {
        for (idx, cell) in row.iter().enumerate().take(widths.len()) {
            widths[idx] = widths[idx].max(measure_text_width(cell));
        }
    }

    let join = |cells: Vec<String>| cells.join("  ").trim_end().to_string();

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(join(
        headers
            .iter()
            .zip(&widths)
            .map(|(h, w)| style(pad_str(h, *w, Alignment::Left, None)).bold().to_string())
            .collect(),
    ));
    lines.push(join(widths.iter().map(|w| "─".repeat(*w)).collect()));
    for row in rows {
        lines.push(join(
            row.iter()
                .zip(&widths)
                .map(|(cell, w)| pad_str(cell, *w, Alignment::Left, None).into_owned())
                .collect(),
        ));
    }
    lines.join("\n")
}

pub fn print_table(title: &str, headers: &[&str], rows: &[Vec<String>]) {
    if rows.is_empty() {
        warning(&format!("No data to display for {}", title));
        return;
    }
    heading(title);
    println!("{}", render_table(headers, rows));
}

/// Cut `text` to `max` characters, appending `...` when shortened.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max).collect();
        format!("{cut}...")
    }
}

pub fn format_priority(priority: i64) -> String {
    match priority {
        1 => format!("{}Critical", PRIORITY_CRITICAL),
        2 => format!("{}High", PRIORITY_HIGH),
        3 => format!("{}Medium", PRIORITY_MEDIUM),
        _ => format!("{}Low", PRIORITY_LOW),
    }
}

/// Upper-cased, coloured status label. Unknown values pass through.
pub fn format_status(status: &str) -> String {
    let lower = status.to_lowercase();
    let label = lower.replace('_', " ").to_uppercase();
    match lower.as_str() {
        "todo" => style(label).blue().to_string(),
        "in_progress" => style(label).yellow().to_string(),
        "blocked" | "open" => style(label).red().to_string(),
        "completed" | "resolved" => style(label).green().to_string(),
        "closed" => style(label).dim().to_string(),
        _ => status.to_string(),
    }
}

/// Normalise SQLite and ISO-8601 timestamps to `YYYY-MM-DD HH:MM:SS`.
/// Anything unparseable is returned unchanged.
pub fn format_datetime(value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }
    let trimmed = value.trim_end_matches('Z');
    let trimmed = trimmed.split('+').next().unwrap_or(trimmed);
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return parsed.format("%Y-%m-%d %H:%M:%S").to_string();
        }
    }
    value.to_string()
}
