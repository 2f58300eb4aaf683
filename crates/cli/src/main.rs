mod output;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use trading_dashboard_core::api::rest::RestTradingApi;
use trading_dashboard_core::errors::CoreError;
use trading_dashboard_core::models::filter::{FilterCriteria, Selection};
use trading_dashboard_core::models::operation::Operation;
use trading_dashboard_core::models::settings::Settings;
use trading_dashboard_core::services::pnl_service::PnlService;
use trading_dashboard_core::TradingDashboard;

#[derive(Parser)]
#[command(name = "tdash")]
#[command(version)]
#[command(about = "Trading dashboard: P&L reports and instance control", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Settings file (TOML). Defaults are used when it does not exist.
    #[arg(short, long, default_value = "tdash.toml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// P&L report from a JSON file of operations (no backend needed)
    Report {
        /// Path to a JSON array of operations
        #[arg(short, long)]
        file: String,

        #[command(flatten)]
        filter: FilterArgs,
    },
    /// P&L report from the backend
    Fetch {
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// List strategy instances
    Instances {
        /// Page number (1-based)
        #[arg(short, long, default_value = "1")]
        page: usize,

        /// Case-insensitive search on name and symbol
        #[arg(short, long, default_value = "")]
        search: String,
    },
    /// Start a strategy instance
    Start { id: i64 },
    /// Stop a strategy instance
    Stop { id: i64 },
    /// Delete a strategy instance
    Delete { id: i64 },
}

#[derive(Args)]
struct FilterArgs {
    /// Symbol, or "all"
    #[arg(long, default_value = "all")]
    symbol: Selection<String>,

    /// Instance id, or "all"
    #[arg(long, default_value = "all")]
    instance: Selection<i64>,

    /// First calendar day to include (YYYY-MM-DD)
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Last calendar day to include (YYYY-MM-DD)
    #[arg(long)]
    to: Option<NaiveDate>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

impl FilterArgs {
    fn criteria(&self) -> Result<FilterCriteria> {
        if let (Some(from), Some(to)) = (self.from, self.to) {
            if from > to {
                anyhow::bail!("--from ({from}) must not be after --to ({to})");
            }
        }
        Ok(FilterCriteria {
            symbol: self.symbol.clone(),
            instance_id: self.instance.clone(),
            start_date: self.from,
            end_date: self.to,
            ..FilterCriteria::local()
        })
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "warn,trading_dashboard_core=debug,tdash=debug"
    } else {
        "warn,trading_dashboard_core=info,tdash=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_settings(path: &str) -> Result<Settings> {
    let settings = if std::path::Path::new(path).exists() {
        Settings::from_file(path).with_context(|| format!("Failed to load settings from {path}"))?
    } else {
        Settings::default()
    };
    settings
        .apply_env_overrides()
        .context("Invalid TDASH_* environment override")
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        if let Some(CoreError::Unauthorized { login_url }) = e.downcast_ref::<CoreError>() {
            error!("Session expired or missing. Log in at {login_url} and set TDASH_API_TOKEN.");
        } else {
            error!("{e:#}");
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Report { file, filter } => {
            let content = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {file}"))?;
            let operations: Vec<Operation> = serde_json::from_str(&content)
                .with_context(|| format!("{file} is not a JSON array of operations"))?;
            info!(count = operations.len(), file = %file, "loaded operations");

            let report = PnlService::new().build_report(&operations, &filter.criteria()?);
            output::print_report(&report, filter.json)?;
        }
        Commands::Fetch { filter } => {
            let mut dashboard = connect(&cli.config)?;
            let report = dashboard.pnl_report(&filter.criteria()?).await?;
            output::print_report(&report, filter.json)?;
        }
        Commands::Instances { page, search } => {
            let settings = load_settings(&cli.config)?;
            let page_size = settings.page_size;
            let mut dashboard = TradingDashboard::new(RestTradingApi::new(settings)?);
            let page = dashboard.search_instances(&search, page, page_size).await?;
            output::print_instances(&page);
        }
        Commands::Start { id } => {
            connect(&cli.config)?.start_instance(id).await?;
            println!("Instance {id} started");
        }
        Commands::Stop { id } => {
            connect(&cli.config)?.stop_instance(id).await?;
            println!("Instance {id} stopped");
        }
        Commands::Delete { id } => {
            connect(&cli.config)?.delete_instance(id).await?;
            println!("Instance {id} deleted");
        }
    }
    Ok(())
}

fn connect(config: &str) -> Result<TradingDashboard<RestTradingApi>> {
    let settings = load_settings(config)?;
    Ok(TradingDashboard::new(RestTradingApi::new(settings)?))
}
