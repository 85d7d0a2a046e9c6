use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use clide::Config;
use clide::report::{ReportFormat, ReportTable};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod cmd;

#[derive(Parser)]
#[command(name = "clide")]
#[command(version, about = "Project memory bank for agent-assisted development")]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the memory bank database
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Trace ID grouping this invocation's log entries (generated when absent)
    #[arg(long, global = true, env = "CLIDE_TRACE_ID")]
    pub trace_id: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the memory bank database
    Init {
        /// Delete and recreate an existing database
        #[arg(long)]
        force: bool,
    },
    /// Load context: open work, landmines and critical defects
    Boot {
        /// Show counts only
        #[arg(long)]
        summary: bool,
    },
    /// Save a session checkpoint to the log and journal
    Save {
        /// Checkpoint message
        #[arg(short, long)]
        message: Option<String>,
    },
    /// Show a project health snapshot
    Status {
        /// Include top stories and critical defects
        #[arg(long)]
        detailed: bool,
    },
    /// List open defects or show fix guidance for one
    Fix {
        /// Defect ID
        defect_id: Option<i64>,
        /// Request automatic fixing
        #[arg(long)]
        auto: bool,
    },
    /// Export a table as Markdown, JSON or CSV
    Report {
        #[arg(value_enum)]
        table: ReportTable,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = ReportFormat::Markdown)]
        format: ReportFormat,
    },
    /// Launch the read-only web dashboard
    Dashboard {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
        /// Open the dashboard in a browser
        #[arg(long)]
        open: bool,
    },
    /// Get, set, delete or list configuration entries
    Config {
        key: Option<String>,
        value: Option<String>,
        #[arg(long, default_value = "global")]
        scope: String,
        #[arg(long)]
        delete: bool,
        #[arg(long)]
        list: bool,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Copy the database file
    Backup {
        /// Backup path (default: memory_bank_backup_<timestamp>.db)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Create a story
    Story {
        title: String,
        #[arg(short, long)]
        description: Option<String>,
        /// Priority from 1 (critical) to 5 (lowest)
        #[arg(short, long, default_value_t = 3, value_parser = clap::value_parser!(i64).range(1..=5))]
        priority: i64,
        #[arg(short, long)]
        assignee: Option<String>,
        /// Comma-separated labels
        #[arg(short, long)]
        labels: Option<String>,
        #[arg(long)]
        acceptance: Option<String>,
    },
    /// Create a defect, or resolve one with --resolve
    Defect {
        title: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        /// critical, major, minor or trivial
        #[arg(short, long, default_value = "major")]
        severity: String,
        #[arg(long)]
        story_id: Option<i64>,
        /// Resolve the defect with this ID
        #[arg(long)]
        resolve: Option<i64>,
        #[arg(long)]
        resolution: Option<String>,
        /// Close instead of resolve
        #[arg(long, requires = "resolve")]
        close: bool,
    },
    /// Record a landmine (a pitfall to avoid)
    Landmine {
        summary: String,
        #[arg(short, long)]
        cause: Option<String>,
        #[arg(short, long)]
        impact: Option<String>,
        #[arg(short, long)]
        remediation: Option<String>,
        /// Comma-separated tags
        #[arg(short, long)]
        tags: Option<String>,
        #[arg(long)]
        detection: Option<String>,
        #[arg(long)]
        avoidance: Option<String>,
        #[arg(long)]
        verification: Option<String>,
    },
    /// Show recent agent activity
    Log {
        #[arg(short = 'n', long, default_value_t = 50)]
        limit: usize,
        #[arg(long)]
        agent: Option<String>,
        /// Show every entry of one trace
        #[arg(long)]
        trace: Option<String>,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "clide=debug,tower_http=debug"
    } else {
        "clide=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = Config::from_env()
        .context("Invalid environment configuration")?
        .with_db_path(cli.db.clone())
        .with_verbose(cli.verbose);
    init_tracing(config.verbose);
    tracing::debug!(db = %config.db_path.display(), "configuration loaded");

    let session = cmd::Session::new(&config, cli.trace_id.clone());

    match cli.command {
        Commands::Init { force } => cmd::cmd_init(&session, force)?,
        Commands::Boot { summary } => cmd::cmd_boot(&session, summary)?,
        Commands::Save { message } => cmd::cmd_save(&session, message.as_deref())?,
        Commands::Status { detailed } => cmd::cmd_status(&session, detailed)?,
        Commands::Fix { defect_id, auto } => cmd::cmd_fix(&session, defect_id, auto)?,
        Commands::Report {
            table,
            output,
            format,
        } => cmd::cmd_report(&session, table, output.as_deref(), format)?,
        Commands::Dashboard { host, port, open } => {
            cmd::cmd_dashboard(&session, host, port, open).await?
        }
        Commands::Config {
            key,
            value,
            scope,
            delete,
            list,
            notes,
        } => cmd::cmd_config(
            &session,
            cmd::ConfigArgs {
                key,
                value,
                scope,
                delete,
                list,
                notes,
            },
        )?,
        Commands::Backup { output } => cmd::cmd_backup(&session, output)?,
        Commands::Story {
            title,
            description,
            priority,
            assignee,
            labels,
            acceptance,
        } => cmd::cmd_story(
            &session,
            cmd::StoryArgs {
                title,
                description,
                priority,
                assignee,
                labels,
                acceptance,
            },
        )?,
        Commands::Defect {
            title,
            description,
            severity,
            story_id,
            resolve,
            resolution,
            close,
        } => cmd::cmd_defect(
            &session,
            cmd::DefectArgs {
                title,
                description,
                severity,
                story_id,
                resolve,
                resolution,
                close,
            },
        )?,
        Commands::Landmine {
            summary,
            cause,
            impact,
            remediation,
            tags,
            detection,
            avoidance,
            verification,
        } => cmd::cmd_landmine(
            &session,
            cmd::LandmineArgs {
                summary,
                cause,
                impact,
                detection,
                remediation,
                avoidance,
                tags,
                verification,
            },
        )?,
        Commands::Log {
            limit,
            agent,
            trace,
        } => cmd::cmd_log(&session, limit, agent.as_deref(), trace.as_deref())?,
    }

    Ok(())
}
