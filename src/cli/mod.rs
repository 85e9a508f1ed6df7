//! CLI command implementations.
//!
//! Provides subcommand handlers for:
//! - `domo-viewer web`: serve the browser viewer
//! - `domo-viewer datasets | dashboards | dataflows`: fetch one collection
//!   and print it as a table, JSON or CSV
//! - `domo-viewer log --last N`: recent fetch activity
//! - `domo-viewer config show|init|set|path`: configuration management
//!
//! Notices go to stderr so JSON and CSV output on stdout stays clean.

use anyhow::{Result, bail};
use colored::Colorize;
use serde::Serialize;

use crate::activity::{ActivityLog, FetchLogEntry};
use crate::config;
use crate::notice::{Level, Notice};
use crate::project::{TableRow, format_average};
use crate::session::{ResourceState, Selection, Session};
use crate::web;

/// Output format for collection commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl OutputFormat {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("json") => Self::Json,
            Some("csv") => Self::Csv,
            _ => Self::Table,
        }
    }
}

/// Widest a terminal cell may get before it is cut.
const MAX_CELL_WIDTH: usize = 48;

// ---------------------------------------------------------------------------
// domo-viewer web
// ---------------------------------------------------------------------------

/// Serve the browser viewer, optionally pre-filling the credentials.
pub fn run_web(addr: Option<String>, no_browser: bool, instance: &str, token: &str) -> Result<()> {
    let config = config::load();
    let addr = addr.unwrap_or_else(|| config.web.addr.clone());
    let open = config.web.open_browser && !no_browser;

    let mut session = Session::from_config(&config);
    session.set_credentials(instance, token);

    web::serve(&addr, open, session)
}

// ---------------------------------------------------------------------------
// domo-viewer datasets | dataflows
// ---------------------------------------------------------------------------

/// Fetch and print every dataset.
pub fn run_datasets(instance: &str, token: &str, format: OutputFormat) -> Result<()> {
    let mut session = Session::from_config(&config::load());
    session.set_credentials(instance, token);

    print_notices(&session.fetch_datasets());
    ensure_loaded(session.datasets().state(), "datasets")?;

    print_rows(session.datasets().rows(), format)
}

/// Fetch and print every dataflow with its input and output dataset ids.
pub fn run_dataflows(instance: &str, token: &str, format: OutputFormat) -> Result<()> {
    let mut session = Session::from_config(&config::load());
    session.set_credentials(instance, token);

    print_notices(&session.fetch_dataflows());
    ensure_loaded(session.dataflows().state(), "dataflows")?;

    print_rows(session.dataflows().rows(), format)
}

// ---------------------------------------------------------------------------
// domo-viewer dashboards
// ---------------------------------------------------------------------------

/// Fetch and print dashboards, then optionally drill into one by title.
///
/// The table format shows both the dashboards and the selected dashboard's
/// cards. JSON and CSV print one row set: the cards when `select` is given,
/// the dashboards otherwise.
pub fn run_dashboards(
    instance: &str,
    token: &str,
    select: Option<&str>,
    no_counts: bool,
    format: OutputFormat,
) -> Result<()> {
    let mut config = config::load();
    if no_counts {
        config.dashboards.eager_card_counts = false;
    }

    let mut session = Session::from_config(&config);
    session.set_credentials(instance, token);

    print_notices(&session.fetch_dashboards());
    ensure_loaded(session.dashboards().state(), "dashboards")?;

    if format == OutputFormat::Table || select.is_none() {
        print_rows(session.dashboards().rows(), format)?;
    }
    if format == OutputFormat::Table
        && let Some(avg) = session.average_cards()
    {
        println!();
        println!(
            "  {} {}",
            "Average cards per dashboard:".bold(),
            format_average(avg)
        );
    }

    let Some(title) = select else {
        return Ok(());
    };

    print_notices(&session.select_dashboard(title));
    let Selection::CardsLoaded { page_id } = session.selection() else {
        bail!("no dashboard titled '{title}'");
    };

    if format == OutputFormat::Table {
        println!();
        println!(
            "{}",
            format!("Cards in Dashboard: {title} (ID: {page_id})")
                .bold()
                .cyan()
        );
    }
    print_rows(session.cards(), format)
}

fn ensure_loaded(state: &ResourceState, label: &str) -> Result<()> {
    match state {
        ResourceState::Loaded { .. } => Ok(()),
        _ => bail!("could not load {label}"),
    }
}

// ---------------------------------------------------------------------------
// domo-viewer log
// ---------------------------------------------------------------------------

/// Show the most recent outbound fetches.
pub fn run_log(last: usize, format: OutputFormat) -> Result<()> {
    let Some(log) = ActivityLog::default_location() else {
        bail!("could not determine home directory");
    };
    let entries = log.read_recent(last);

    if entries.is_empty() {
        println!("{}", "No fetches logged yet.".yellow());
        return Ok(());
    }

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&entries)?),
        OutputFormat::Csv => {
            let (headers, rows) = log_table(&entries);
            print!("{}", render_csv(&headers, &rows)?);
        }
        OutputFormat::Table => {
            println!("{}", "Recent Fetches".bold().cyan());
            println!("{}", "=".repeat(60));
            let (headers, rows) = log_table(&entries);
            print_table(&headers, &rows);
        }
    }

    Ok(())
}

fn log_table(entries: &[FetchLogEntry]) -> (Vec<&'static str>, Vec<Vec<String>>) {
    let headers = vec![
        "Time", "Resource", "Instance", "Page", "Outcome", "Status", "Records", "Latency",
    ];
    let rows = entries
        .iter()
        .map(|e| {
            vec![
                e.timestamp.clone(),
                e.resource.clone(),
                e.instance.clone(),
                e.page_id.clone().unwrap_or_default(),
                e.outcome.clone(),
                e.status.map(|s| s.to_string()).unwrap_or_default(),
                e.records.map(|r| r.to_string()).unwrap_or_default(),
                format!("{}ms", e.latency_ms),
            ]
        })
        .collect();
    (headers, rows)
}

// ---------------------------------------------------------------------------
// domo-viewer config show | init | set | path
// ---------------------------------------------------------------------------

/// Show the effective (merged) configuration as TOML.
pub fn run_config_show() -> Result<()> {
    let toml_str = config::show_effective_config()?;
    println!("{}", "Effective domo-viewer Configuration".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("{toml_str}");

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    println!("{}", "Sources (highest priority last):".dimmed());
    println!("  {} built-in defaults", "·".dimmed());
    print_source("~/.domo-viewer/config.toml", global_exists);
    print_source(".domo-viewer.toml", project_exists);
    println!(
        "  {} {}",
        "·".dimmed(),
        "DOMO_VIEWER_* environment variables".dimmed()
    );

    Ok(())
}

fn print_source(name: &str, exists: bool) {
    if exists {
        println!("  {} {}", "✓".green(), name.dimmed());
    } else {
        println!("  {} {}", "·".dimmed(), format!("{name} (not found)").dimmed());
    }
}

/// Initialize a default config file at `~/.domo-viewer/config.toml`.
pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!(
        "{} Config written to {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

/// Set a single configuration value in the global config file.
pub fn run_config_set(key: &str, value: &str) -> Result<()> {
    config::set_config_value(key, value)?;
    println!("{} Set {} = {}", "✓".green().bold(), key.bold(), value);
    Ok(())
}

/// Print where configuration and the fetch log live.
pub fn run_config_path() -> Result<()> {
    let show = |label: &str, path: Option<std::path::PathBuf>| match path {
        Some(path) => println!("  {} {}", format!("{label:<8}").bold(), path.display()),
        None => println!("  {} {}", format!("{label:<8}").bold(), "(unknown)".dimmed()),
    };
    show("Global:", config::global_config_file());
    show("Project:", config::project_config_file());
    show("Log:", ActivityLog::default_location().map(|log| log.path().to_path_buf()));
    Ok(())
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn print_notices(notices: &[Notice]) {
    for notice in notices {
        let marker = match notice.level {
            Level::Success => "✓".green().bold(),
            Level::Info => "·".blue().bold(),
            Level::Warning => "!".yellow().bold(),
            Level::Error => "✗".red().bold(),
        };
        eprintln!("{} {}", marker, notice.message);
    }
}

fn print_rows<R: TableRow + Serialize>(rows: &[R], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(rows)?),
        OutputFormat::Csv => {
            let (headers, cells) = table_of(rows);
            print!("{}", render_csv(&headers, &cells)?);
        }
        OutputFormat::Table => {
            if rows.is_empty() {
                println!("{}", "No rows.".yellow());
                return Ok(());
            }
            let (headers, cells) = table_of(rows);
            print_table(&headers, &cells);
        }
    }
    Ok(())
}

fn table_of<R: TableRow>(rows: &[R]) -> (Vec<&'static str>, Vec<Vec<String>>) {
    let headers = rows.first().map(|row| row.headers()).unwrap_or_default();
    (headers, rows.iter().map(|row| row.cells()).collect())
}

fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    let lines = render_table(headers, rows);
    let mut lines = lines.iter();

    if let Some(header) = lines.next() {
        println!("{}", header.bold());
    }
    if let Some(rule) = lines.next() {
        println!("{rule}");
    }
    for (i, line) in lines.enumerate() {
        if i % 2 == 0 {
            println!("{line}");
        } else {
            println!("{}", line.dimmed());
        }
    }
}

/// Lay out a plain-text table: header line, rule, one line per row.
fn render_table(headers: &[&str], rows: &[Vec<String>]) -> Vec<String> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(i) {
                *width = (*width).max(cell.chars().count().min(MAX_CELL_WIDTH));
            }
        }
    }

    let line = |cells: Vec<String>| -> String {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| format!("{:<width$}", truncate(cell, width)))
            .collect();
        format!("  {}", padded.join("  ")).trim_end().to_string()
    };

    let total = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
    let mut out = Vec::with_capacity(rows.len() + 2);
    out.push(line(headers.iter().map(|h| h.to_string()).collect()));
    out.push(format!("  {}", "-".repeat(total)));
    out.extend(rows.iter().map(|row| line(row.clone())));
    out
}

fn render_csv(headers: &[&str], rows: &[Vec<String>]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(headers)?;
    for row in rows {
        writer.write_record(row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("failed to flush CSV output: {}", e.error()))?;
    Ok(String::from_utf8(bytes)?)
}

/// Truncate a string to `max_len` characters, appending "…" if truncated.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{kept}…")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
