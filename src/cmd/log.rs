//! Agent activity log (`clide log`).

use anyhow::Result;
use clide::memory::AgentAction;
use clide::ui;

use super::Session;

pub fn cmd_log(
    session: &Session<'_>,
    limit: usize,
    agent: Option<&str>,
    trace: Option<&str>,
) -> Result<()> {
    let bank = session.bank()?;

    let (actions, title) = match trace {
        Some(trace) => (
            bank.actions_for_trace(trace)?,
            format!("Trace {}", trace),
        ),
        None => {
            let actions = bank.recent_actions(limit, agent)?;
            let title = format!("Agent Activity Log (last {})", actions.len());
            (actions, title)
        }
    };

    if actions.is_empty() {
        ui::info("No log entries found");
    } else {
        let rows: Vec<Vec<String>> = actions.iter().map(action_row).collect();
        ui::print_table(
            &title,
            &["ID", "Agent", "Action", "Details", "Started", "Ended"],
            &rows,
        );
    }

    session.record(&bank, "log", format!("Viewed {} log entries", actions.len()))
}

fn action_row(action: &AgentAction) -> Vec<String> {
    vec![
        format!("#{}", action.id),
        action.agent.clone(),
        action.action.clone(),
        ui::truncate(action.details.as_deref().unwrap_or(""), 40),
        ui::format_datetime(&action.started_at),
        action
            .ended_at
            .as_deref()
            .map(ui::format_datetime)
            .unwrap_or_else(|| "-".to_string()),
    ]
}
