use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use domo_viewer::cli::{self, OutputFormat};

#[derive(Debug, Parser)]
#[command(name = "domo-viewer")]
#[command(about = "Browse dashboards, cards, datasets and dataflows of a Domo instance")]
struct App {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Args)]
struct CredentialArgs {
    /// Domo instance, as in https://<instance>.domo.com
    #[arg(long, env = "DOMO_INSTANCE", default_value = "")]
    instance: String,
    /// Developer token sent with every request
    #[arg(long, env = "DOMO_DEVELOPER_TOKEN", default_value = "", hide_env_values = true)]
    token: String,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Serve the browser viewer
    Web {
        /// Bind address (default from config: 127.0.0.1:9747)
        #[arg(long)]
        addr: Option<String>,
        /// Do not open a browser window
        #[arg(long)]
        no_browser: bool,
        #[command(flatten)]
        creds: CredentialArgs,
    },
    /// Fetch and list all datasets
    Datasets {
        #[command(flatten)]
        creds: CredentialArgs,
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Fetch and list dashboards, optionally drilling into one
    Dashboards {
        #[command(flatten)]
        creds: CredentialArgs,
        /// Show the cards of the dashboard with this title
        #[arg(long)]
        select: Option<String>,
        /// Skip the per-dashboard card count requests
        #[arg(long)]
        no_counts: bool,
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Fetch and list all dataflows
    Dataflows {
        #[command(flatten)]
        creds: CredentialArgs,
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Show recent fetch activity
    Log {
        /// Number of entries to show
        #[arg(long, default_value = "20")]
        last: usize,
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write a default config file to ~/.domo-viewer/config.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Set one value, e.g. `web.addr 127.0.0.1:8080`
    Set { key: String, value: String },
    /// Print config and log file locations
    Path,
}

fn main() -> Result<()> {
    let app = App::parse();

    match app.command {
        Commands::Web {
            addr,
            no_browser,
            creds,
        } => cli::run_web(addr, no_browser, &creds.instance, &creds.token),
        Commands::Datasets { creds, format } => {
            let fmt = OutputFormat::from_str_opt(Some(&format));
            cli::run_datasets(&creds.instance, &creds.token, fmt)
        }
        Commands::Dashboards {
            creds,
            select,
            no_counts,
            format,
        } => {
            let fmt = OutputFormat::from_str_opt(Some(&format));
            cli::run_dashboards(
                &creds.instance,
                &creds.token,
                select.as_deref(),
                no_counts,
                fmt,
            )
        }
        Commands::Dataflows { creds, format } => {
            let fmt = OutputFormat::from_str_opt(Some(&format));
            cli::run_dataflows(&creds.instance, &creds.token, fmt)
        }
        Commands::Log { last, format } => {
            let fmt = OutputFormat::from_str_opt(Some(&format));
            cli::run_log(last, fmt)
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::run_config_show(),
            ConfigAction::Init { force } => cli::run_config_init(force),
            ConfigAction::Set { key, value } => cli::run_config_set(&key, &value),
            ConfigAction::Path => cli::run_config_path(),
        },
    }
}
