//! HTML rendering for the dashboard index page. Every interpolated value
//! passes through [`escape`].

use std::fmt::Write;

use crate::memory::{Defect, Landmine, OpenWorkItem};

const STYLE: &str = "\
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 40px; }
h1 { color: #333; }
h2 { color: #666; margin-top: 30px; }
table { border-collapse: collapse; width: 100%; margin: 20px 0; }
th, td { border: 1px solid #ddd; padding: 12px; text-align: left; }
th { background-color: #f4f4f4; font-weight: 600; }
tr:hover { background-color: #f9f9f9; }
.badge { padding: 4px 8px; border-radius: 4px; font-size: 0.85em; }
.critical { background: #ff4444; color: white; }
.major { background: #ff8800; color: white; }
.minor { background: #ffbb33; color: white; }
.story { background: #0088cc; color: white; }
.defect { background: #cc0000; color: white; }
.empty { color: #999; font-style: italic; }";

/// Escape text for HTML element and attribute content.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn opt(value: Option<&str>) -> String {
    escape(value.unwrap_or("-"))
}

pub struct DashboardPage<'a> {
    pub db_label: &'a str,
    pub open_work: &'a [OpenWorkItem],
    pub critical_defects: &'a [Defect],
    pub landmines: &'a [Landmine],
}

impl DashboardPage<'_> {
    pub fn render(&self) -> String {
        let mut html = String::new();
        let _ = write!(
            html,
            "<!doctype html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
             <title>Clide Dashboard</title>\n<style>\n{STYLE}\n</style>\n</head>\n<body>\n\
             <h1>Clide Dashboard</h1>\n<p><strong>Database:</strong> {}</p>\n",
            escape(self.db_label)
        );

        self.open_work_section(&mut html);
        self.critical_section(&mut html);
        self.landmine_section(&mut html);

        html.push_str("</body>\n</html>\n");
        html
    }

    fn open_work_section(&self, html: &mut String) {
        html.push_str("<h2>Open Work</h2>\n");
        if self.open_work.is_empty() {
            html.push_str("<p class=\"empty\">No open work.</p>\n");
            return;
        }
        html.push_str(
            "<table>\n<tr><th>Kind</th><th>ID</th><th>Title</th><th>Status</th>\
             <th>Priority</th><th>Assignee</th><th>Updated</th></tr>\n",
        );
        for item in self.open_work {
            let kind = item.kind.as_str();
            let _ = writeln!(
                html,
                "<tr><td><span class=\"badge {kind}\">{kind}</span></td><td>#{}</td>\
                 <td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                item.id,
                escape(&item.title),
                escape(&item.status),
                item.priority,
                opt(item.assignee.as_deref()),
                escape(&item.updated_at),
            );
        }
        html.push_str("</table>\n");
    }

    fn critical_section(&self, html: &mut String) {
        html.push_str("<h2>Critical Defects</h2>\n");
        if self.critical_defects.is_empty() {
            html.push_str("<p class=\"empty\">No critical defects.</p>\n");
            return;
        }
        html.push_str(
            "<table>\n<tr><th>ID</th><th>Title</th><th>Severity</th><th>Status</th>\
             <th>Story</th><th>Created</th></tr>\n",
        );
        for defect in self.critical_defects {
            let severity = defect.severity.as_str();
            let story = defect
                .story_id
                .map(|id| format!("#{id}"))
                .unwrap_or_else(|| "-".to_string());
            let _ = writeln!(
                html,
                "<tr><td>#{}</td><td>{}</td>\
                 <td><span class=\"badge {severity}\">{severity}</span></td>\
                 <td>{}</td><td>{}</td><td>{}</td></tr>",
                defect.id,
                escape(&defect.title),
                defect.status.as_str(),
                story,
                escape(&defect.created_at),
            );
        }
        html.push_str("</table>\n");
    }

    fn landmine_section(&self, html: &mut String) {
        html.push_str("<h2>Recent Landmines</h2>\n");
        if self.landmines.is_empty() {
            html.push_str("<p class=\"empty\">No landmines recorded.</p>\n");
            return;
        }
        html.push_str(
            "<table>\n<tr><th>ID</th><th>Summary</th><th>Tags</th>\
             <th>Verification</th><th>Updated</th></tr>\n",
        );
        for landmine in self.landmines {
            let _ = writeln!(
                html,
                "<tr><td>#{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                landmine.id,
                escape(&landmine.summary),
                opt(landmine.tags.as_deref()),
                opt(landmine.solution_verification.as_deref()),
                escape(&landmine.updated_at),
            );
        }
        html.push_str("</table>\n");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{DefectStatus, Severity, WorkKind};

    fn work_item(title: &str) -> OpenWorkItem {
        OpenWorkItem {
            kind: WorkKind::Story,
            id: 7,
            title: title.to_string(),
            status: "todo".to_string(),
            priority: 1,
            assignee: None,
            created_at: "2026-01-01 00:00:00".to_string(),
            updated_at: "2026-01-01 00:00:00".to_string(),
        }
    }

    #[test]
    fn test_escape_handles_markup_characters() {
        assert_eq!(
            escape(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#x27;Jerry&#x27;&lt;/a&gt;"
        );
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn test_page_escapes_titles_and_db_label() {
        let work = [work_item("<script>alert(1)</script>")];
        let page = DashboardPage {
            db_label: "a&b.db",
            open_work: &work,
            critical_defects: &[],
            landmines: &[],
        }
        .render();
        assert!(page.contains("a&amp;b.db"));
        assert!(page.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(!page.contains("<script>"));
        assert!(page.contains("<span class=\"badge story\">story</span>"));
    }

    #[test]
    fn test_empty_sections_show_placeholders() {
        let page = DashboardPage {
            db_label: "memory_bank.db",
            open_work: &[],
            critical_defects: &[],
            landmines: &[],
        }
        .render();
        assert!(page.contains("No open work."));
        assert!(page.contains("No critical defects."));
        assert!(page.contains("No landmines recorded."));
    }

    #[test]
    fn test_defect_and_landmine_rows() {
        let defects = [Defect {
            id: 3,
            title: "Data loss".into(),
            description: None,
            severity: Severity::Critical,
            detected_by: None,
            story_id: Some(1),
            status: DefectStatus::Open,
            resolution: None,
            created_at: "2026-01-01 00:00:00".into(),
            resolved_at: None,
        }];
        let landmines = [Landmine {
            id: 4,
            summary: "Busy DB".into(),
            cause: None,
            impact: None,
            detection: None,
            remediation: None,
            avoidance_rules: None,
            tags: Some("sqlite".into()),
            solution_verification: Some("retry > 0".into()),
            created_at: "2026-01-01 00:00:00".into(),
            updated_at: "2026-01-02 00:00:00".into(),
        }];
        let page = DashboardPage {
            db_label: "db",
            open_work: &[],
            critical_defects: &defects,
            landmines: &landmines,
        }
        .render();
        assert!(page.contains("<span class=\"badge critical\">critical</span>"));
        assert!(page.contains("<td>#1</td>"));
        assert!(page.contains("retry &gt; 0"));
    }
}
