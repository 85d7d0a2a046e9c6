//! Table reports in Markdown, JSON and CSV.

use clap::ValueEnum;
use serde_json::Value;

use crate::memory::Row;

/// Tables the `report` command can export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportTable {
    Milestones,
    Landmines,
    Defects,
    Stories,
    Config,
    Testing,
    Deployment,
}

impl ReportTable {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Milestones => "milestones",
            Self::Landmines => "landmines",
            Self::Defects => "defects",
            Self::Stories => "stories",
            Self::Config => "config",
            Self::Testing => "testing",
            Self::Deployment => "deployment",
        }
    }

    /// Heading used in Markdown reports.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Milestones => "Milestones",
            Self::Landmines => "Landmines",
            Self::Defects => "Defects",
            Self::Stories => "Stories",
            Self::Config => "Config",
            Self::Testing => "Testing",
            Self::Deployment => "Deployment",
        }
    }

    /// The read query behind each report.
    pub fn query(&self) -> &'static str {
        match self {
            Self::Milestones => "SELECT * FROM milestones ORDER BY achieved_at DESC, id DESC",
            Self::Landmines => {
                "SELECT * FROM landmines ORDER BY updated_at DESC, id DESC LIMIT 1000"
            }
            Self::Defects => "SELECT * FROM defects ORDER BY created_at DESC, id DESC",
            Self::Stories => "SELECT * FROM stories ORDER BY created_at DESC, id DESC",
            Self::Config => {
                "SELECT scope, name, value, source, notes, updated_at FROM configuration \
                 WHERE scope = 'global' ORDER BY name"
            }
            Self::Testing => "SELECT * FROM testing ORDER BY created_at DESC, id DESC",
            Self::Deployment => "SELECT * FROM deployment ORDER BY created_at DESC, id DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ReportFormat {
    #[default]
    Markdown,
    Json,
    Csv,
}

impl ReportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Markdown => "markdown",
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }
}

/// Render `rows` in the requested format. `generated_at` is only used by
/// the Markdown header.
pub fn render(
    format: ReportFormat,
    table: ReportTable,
    rows: &[Row],
    generated_at: &str,
) -> serde_json::Result<String> {
    match format {
        ReportFormat::Markdown => Ok(generate_markdown(table, rows, generated_at)),
        ReportFormat::Json => to_json(rows),
        ReportFormat::Csv => Ok(to_csv(rows)),
    }
}

pub fn generate_markdown(table: ReportTable, rows: &[Row], generated_at: &str) -> String {
    let mut lines = vec![
        format!("# {} Report", table.title()),
        String::new(),
        format!("Generated: {}", generated_at),
        format!("Total entries: {}", rows.len()),
        String::new(),
    ];

    let Some(first) = rows.first() else {
        return lines.join("\n");
    };
    let columns: Vec<&String> = first.keys().collect();

    lines.push(format!(
        "| {} |",
        columns.iter().map(|c| c.as_str()).collect::<Vec<_>>().join(" | ")
    ));
    lines.push(format!("| {} |", vec!["---"; columns.len()].join(" | ")));

    for row in rows {
        let cells: Vec<String> = columns
            .iter()
            .map(|col| {
                cell_text(row.get(col.as_str()))
                    .replace('\n', " ")
                    .replace('|', "\\|")
            })
            .collect();
        lines.push(format!("| {} |", cells.join(" | ")));
    }

    lines.join("\n")
}

pub fn to_json(rows: &[Row]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(rows)
}

/// Header line plus one line per row. Nulls become empty fields.
pub fn to_csv(rows: &[Row]) -> String {
    let Some(first) = rows.first() else {
        return String::new();
    };
    let columns: Vec<&String> = first.keys().collect();

    let mut out = String::new();
    let header: Vec<String> = columns.iter().map(|c| csv_field(c)).collect();
    out.push_str(&header.join(","));
    out.push('\n');

    for row in rows {
        let fields: Vec<String> = columns
            .iter()
            .map(|col| csv_field(&cell_text(row.get(col.as_str()))))
            .collect();
        out.push_str(&fields.join(","));
        out.push('\n');
    }
    out
}

fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
