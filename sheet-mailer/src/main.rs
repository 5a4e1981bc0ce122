//! CLI for sending templated emails to spreadsheet recipients
//!
//! # Usage
//!
//! ```bash
//! # Send to a single row
//! sheet-mailer --config mailer.toml row --index 3 --subject "Hello" --template hello.html
//!
//! # Send to rows 0 through 9
//! sheet-mailer rows --from 0 --to 9 --subject "Hello" --template hello.html
//!
//! # Send to every recipient in the email column, without delivering
//! sheet-mailer --dry-run column --subject "Hello" --template hello.html
//!
//! # Render one row to stdout
//! sheet-mailer preview --index 0 --template hello.html
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand};
use sheet_mailer::batch::{build_replacements, BatchSender, BatchSummary, RowSelection};
use sheet_mailer::config::Config;
use sheet_mailer::templates::TemplateRenderer;
use sheet_mailer::transport::RecordingTransport;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "sheet-mailer")]
#[command(about = "Send templated emails to spreadsheet recipients", long_about = None)]
struct Cli {
    /// Configuration file
    #[arg(short, long, default_value = "mailer.toml")]
    config: PathBuf,

    /// Render and record messages without delivering them
    #[arg(long)]
    dry_run: bool,

    /// Print the per-row outcomes as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send to a single row
    Row {
        #[arg(short, long)]
        index: usize,
        #[arg(short, long)]
        subject: String,
        #[arg(short, long)]
        template: PathBuf,
    },
    /// Send to an inclusive range of rows
    Rows {
        #[arg(long)]
        from: usize,
        #[arg(long)]
        to: usize,
        #[arg(short, long)]
        subject: String,
        #[arg(short, long)]
        template: PathBuf,
    },
    /// Send to every recipient in the email column
    Column {
        #[arg(short, long)]
        subject: String,
        #[arg(short, long)]
        template: PathBuf,
    },
    /// Render one row to stdout without sending
    Preview {
        #[arg(short, long)]
        index: usize,
        #[arg(short, long)]
        template: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::load(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting sheet-mailer v{}", env!("CARGO_PKG_VERSION"));
    info!("  Source: {}", config.source.path);
    info!("  SMTP: {}:{}", config.smtp.host, config.smtp.port);
    info!("  From: {}", config.sender());

    let sender = if cli.dry_run || matches!(cli.command, Commands::Preview { .. }) {
        info!("Dry run: messages will be recorded, not delivered");
        BatchSender::from_config_with_transport(&config, Arc::new(RecordingTransport::new()))
            .await?
    } else {
        BatchSender::from_config(&config).await?
    };

    let (selection, subject, template) = match cli.command {
        Commands::Preview { index, template } => return preview(&sender, index, &template),
        Commands::Row {
            index,
            subject,
            template,
        } => (RowSelection::Row(index), subject, template),
        Commands::Rows {
            from,
            to,
            subject,
            template,
        } => (RowSelection::Rows((from..=to).collect()), subject, template),
        Commands::Column { subject, template } => (RowSelection::Column, subject, template),
    };

    let outcomes = sender.send_batch(&selection, &subject, &template).await;
    let summary = BatchSummary::from_outcomes(&outcomes);
    info!("Batch complete: {}", summary);

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&outcomes)?);
    }

    Ok(())
}

fn preview(sender: &BatchSender, index: usize, template: &Path) -> anyhow::Result<()> {
    let recipient = sender.get_row(index)?;
    let replacements = build_replacements(&recipient);

    let raw = std::fs::read_to_string(template)
        .with_context(|| format!("Failed to read {}", template.display()))?;
    for name in TemplateRenderer::unresolved_variables(&raw, &replacements) {
        warn!("Placeholder {{{{{}}}}} has no value and will be sent as-is", name);
    }

    let html = sender.create_email_content(template, &replacements)?;
    println!("To: {}", recipient.email.as_deref().unwrap_or("<missing>"));
    println!();
    println!("{}", html);

    Ok(())
}
