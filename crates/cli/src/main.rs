//! # returnboard-cli
//!
//! Command-line interface for the returns dashboard.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use returnboard_core::{
    load, CleanedTable, LoadReport, TableSource, WorkbookSource, DISPOSITION_COLUMN, MODEL_COLUMN,
    QUANTITY_COLUMN,
};
use returnboard_http::{RemoteOptions, RemoteSpreadsheetSource};
use returnboard_sheet::{Book, CellValue, Sheet};
use returnboard_viz::{page, render_report, DashboardReport, SheetViews};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// rb - product exchange/refund summaries
#[derive(Parser)]
#[command(name = "rb")]
#[command(author, version, about = "Summarize product exchange/refund spreadsheets", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Service-account key file for remote spreadsheets
    #[arg(long, global = true, env = "RETURNBOARD_CREDENTIALS", default_value = "credentials.json")]
    credentials: PathBuf,

    /// Base URL of the Sheets API
    #[arg(
        long = "sheets-api",
        global = true,
        env = "RETURNBOARD_SHEETS_API",
        default_value = "https://sheets.googleapis.com/v4"
    )]
    sheets_api: String,

    /// Timeout for each remote request, in seconds
    #[arg(long, global = true, env = "RETURNBOARD_TIMEOUT_SECS", default_value_t = 30)]
    timeout_secs: u64,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Print totals and top models for every sheet
    Summary {
        #[command(flatten)]
        source: SourceArgs,

        /// Output format (table, json)
        #[arg(short = 'f', long = "format", default_value = "table")]
        format: OutputFormat,
    },
    /// Write the dashboard as a standalone HTML file
    Export {
        #[command(flatten)]
        source: SourceArgs,

        /// Output file
        #[arg(short, long, default_value = "dashboard.html")]
        output: PathBuf,
    },
    /// Write the cleaned sheets to an xlsx workbook
    Clean {
        #[command(flatten)]
        source: SourceArgs,

        /// Output file
        #[arg(short, long, default_value = "cleaned.xlsx")]
        output: PathBuf,
    },
}

/// Where to read sheets from: a workbook file or a spreadsheet URL.
#[derive(Args, Debug)]
struct SourceArgs {
    /// Workbook file (xlsx, xlsm, xls, ods)
    #[arg(value_name = "FILE", required_unless_present = "url", conflicts_with = "url")]
    file: Option<PathBuf>,

    /// Shared spreadsheet URL
    #[arg(long)]
    url: Option<String>,
}

/// Output format for summaries.
#[derive(Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    /// JSON output
    Json,
    /// Plain text tables (default)
    #[default]
    Table,
}

impl Cli {
    fn remote_options(&self) -> RemoteOptions {
        RemoteOptions {
            credentials_path: self.credentials.clone(),
            api_base: self.sheets_api.clone(),
            timeout_secs: self.timeout_secs,
            ..RemoteOptions::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_writer(std::io::stderr)
            .init();
    }

    let remote = cli.remote_options();
    match &cli.command {
        Command::Summary { source, format } => {
            let report = load_report(source, &remote).await?;
            print_warnings(&report);
            print_summary(&report, *format)
        }
        Command::Export { source, output } => {
            let report = load_report(source, &remote).await?;
            print_warnings(&report);
            export_html(&report, output)
        }
        Command::Clean { source, output } => {
            let report = load_report(source, &remote).await?;
            print_warnings(&report);
            write_cleaned(&report, output)
        }
    }
}

/// Load and clean every sheet of the selected source.
async fn load_report(args: &SourceArgs, remote: &RemoteOptions) -> Result<LoadReport> {
    let source: Box<dyn TableSource> = match (&args.file, &args.url) {
        (Some(path), _) => Box::new(WorkbookSource::from_path(path)?),
        (None, Some(url)) => Box::new(RemoteSpreadsheetSource::new(url, remote.clone())),
        (None, None) => anyhow::bail!("Either FILE or --url is required"),
    };

    let report = load(source.as_ref())
        .await
        .with_context(|| format!("Failed to load {}", source.describe()))?;
    Ok(report)
}

/// Print per-tab errors and skipped sheets to stderr.
fn print_warnings(report: &LoadReport) {
    for err in &report.tab_errors {
        eprintln!("{} {err}", "Warning:".yellow().bold());
    }
    for skipped in &report.skipped {
        eprintln!(
            "{} {}: {}",
            "Skipped:".dimmed(),
            skipped.sheet,
            skipped.reason
        );
    }
    if !report.has_data() {
        eprintln!("{} no sheet has usable data", "Error:".red().bold());
    }
}

/// Print every sheet's views in the specified format.
fn print_summary(report: &LoadReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let dashboard = DashboardReport::from_load(report);
            println!("{}", serde_json::to_string_pretty(&dashboard)?);
        }
        OutputFormat::Table => {
            for (name, table) in report.sheets.iter() {
                if let Some(views) = SheetViews::build(name, table) {
                    print!("{}", format_views(&views));
                }
            }
        }
    }
    Ok(())
}

/// Text rendering of one sheet's totals and rankings.
fn format_views(views: &SheetViews) -> String {
    let mut out = format!(
        "{} {} (total {})\n",
        "==".cyan(),
        views.title.cyan().bold(),
        views.total
    );

    out.push_str(&format!("  {}\n", DISPOSITION_COLUMN.bold()));
    for share in &views.proportions.shares {
        out.push_str(&format!(
            "    {:<16} {:>8} {:>6.1}%\n",
            share.category, share.quantity, share.percent
        ));
    }

    out.push_str(&format!("  {}\n", "Top models".bold()));
    for (rank, entity) in views.top_entities.entities.iter().enumerate() {
        out.push_str(&format!(
            "    {:>2}. {:<20} {:>8}\n",
            rank + 1,
            entity.model,
            entity.quantity
        ));
    }
    out
}

/// Write the standalone dashboard page.
fn export_html(report: &LoadReport, output: &Path) -> Result<()> {
    let html = page(&render_report(report)?);
    std::fs::write(output, html)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    info!(output = %output.display(), sheets = report.sheets.len(), "dashboard exported");
    println!("{} {}", "Wrote".green().bold(), output.display());
    Ok(())
}

/// Cleaned table as a sheet with the three required columns.
fn cleaned_sheet(name: &str, table: &CleanedTable) -> Sheet {
    let rows = table
        .iter()
        .map(|r| {
            vec![
                CellValue::from(r.model.as_str()),
                CellValue::from(r.disposition.as_str()),
                CellValue::Float(r.quantity),
            ]
        })
        .collect();
    Sheet::with_header(
        name,
        vec![MODEL_COLUMN, DISPOSITION_COLUMN, QUANTITY_COLUMN],
        rows,
    )
}

/// Save every cleaned sheet to one workbook.
fn write_cleaned(report: &LoadReport, output: &Path) -> Result<()> {
    let mut book = Book::new();
    for (name, table) in report.sheets.iter() {
        book.add_sheet(name, cleaned_sheet(name, table))?;
    }
    book.save_as_xlsx(output)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    println!(
        "{} {} ({} sheets)",
        "Wrote".green().bold(),
        output.display(),
        book.sheet_count()
    );
    Ok(())
}
