//! Human-readable session journal (`agents_log.md`).
//!
//! Entries are appended as `- <message>` lines under one `## YYYY-MM-DD`
//! heading per day. The journal is a convenience copy of the action log, so
//! failures are reported as `false` and never abort a command.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;

const HEADER: &str = "# Agents Log\n\n> Append entries chronologically. Keep terse, atomic events.\n\n";

/// Append one entry for `today`, creating the file when missing.
pub fn append_entry(path: &Path, message: &str, today: NaiveDate) -> bool {
    match try_append(path, message, today) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "journal append failed");
            false
        }
    }
}

fn try_append(path: &Path, message: &str, today: NaiveDate) -> Result<()> {
    let heading = format!("## {}", today.format("%Y-%m-%d"));

    let mut text = String::new();
    if path.exists() {
        let existing = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        if !existing.lines().any(|line| line == heading) {
            text.push('\n');
            text.push_str(&heading);
            text.push('\n');
        }
    } else {
        text.push_str(HEADER);
        text.push_str(&heading);
        text.push('\n');
    }
    text.push_str("- ");
    text.push_str(message);
    text.push('\n');

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    file.write_all(text.as_bytes())
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// The entry `save` writes: `[HH:MM:SS] [Clide] <details> (trace: <first 8>)`.
pub fn save_entry(time: &str, details: &str, trace_id: &str) -> String {
    let short: String = trace_id.chars().take(8).collect();
    format!("[{}] [Clide] {} (trace: {})", time, details, short)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    #[test]
    fn test_new_file_gets_header_and_heading() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("agents_log.md");
        assert!(append_entry(&path, "first", day(1)));

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "# Agents Log\n\n> Append entries chronologically. Keep terse, atomic events.\n\n\
             ## 2026-03-01\n- first\n"
        );
    }

    #[test]
    fn test_same_day_heading_written_once() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("agents_log.md");
        append_entry(&path, "one", day(1));
        append_entry(&path, "two", day(1));

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.matches("## 2026-03-01").count(), 1);
        assert!(content.ends_with("- one\n- two\n"));
    }

    #[test]
    fn test_new_day_adds_heading() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("agents_log.md");
        append_entry(&path, "monday", day(2));
        append_entry(&path, "tuesday", day(3));

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("## 2026-03-02\n- monday\n\n## 2026-03-03\n- tuesday\n"));
    }

    #[test]
    fn test_unwritable_path_returns_false() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("agents_log.md");
        assert!(!append_entry(&path, "lost", day(1)));
    }

    #[test]
    fn test_save_entry_shortens_trace() {
        let entry = save_entry("09:15:00", "Session checkpoint", "0123456789abcdef");
        assert_eq!(entry, "[09:15:00] [Clide] Session checkpoint (trace: 01234567)");
    }
}
