//! Web dashboard (`clide dashboard`).

use anyhow::Result;
use clide::dashboard::{ServerConfig, start_server};

use super::Session;

pub async fn cmd_dashboard(
    session: &Session<'_>,
    host: Option<String>,
    port: Option<u16>,
    open: bool,
) -> Result<()> {
    session.require_store()?;
    let config = session.config;

    let server = ServerConfig {
        host: host.unwrap_or_else(|| config.dashboard_host.clone()),
        port: port.unwrap_or(config.dashboard_port),
        db_path: config.db_path.clone(),
        open_browser: open,
    };

    let bank = session.bank()?;
    session.record(
        &bank,
        "dashboard",
        format!("Dashboard started on {}:{}", server.host, server.port),
    )?;

    start_server(server).await
}
