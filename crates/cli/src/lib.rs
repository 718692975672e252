pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use parcel_core::config::{AppConfig, LoadOptions, LogFormat};
use rust_decimal::Decimal;

use commands::browse::BrowseArgs;

#[derive(Debug, Parser)]
#[command(
    name = "parcel",
    about = "Parcel storefront CLI",
    long_about = "Browse property listings, price saved carts, and inspect storefront configuration.",
    after_help = "Examples:\n  parcel browse --category land --sort price-asc\n  parcel browse --file listings.json --search villa --json\n  parcel cart --file cart.json\n  parcel doctor --json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Filter, search, sort and page through the property catalog")]
    Browse(BrowseCommand),
    #[command(about = "Compute subtotal, tax, total and chart breakdown for a saved cart")]
    Cart {
        #[arg(long, help = "JSON array of { product, quantity } entries")]
        file: PathBuf,
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, product service reachability, and customer token")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

#[derive(Debug, Args)]
struct BrowseCommand {
    #[arg(long, help = "Read listings from a saved `{ products, categories }` JSON file")]
    file: Option<PathBuf>,
    #[arg(long, help = "Case-insensitive text matched against name and description")]
    search: Option<String>,
    #[arg(long, help = "Category id or name")]
    category: Option<String>,
    #[arg(long)]
    min_price: Option<Decimal>,
    #[arg(long)]
    max_price: Option<Decimal>,
    #[arg(long, help = "default | price-asc | price-desc | name-asc | name-desc")]
    sort: Option<String>,
    #[arg(long)]
    page: Option<u32>,
    #[arg(long, help = "Listings per page (overrides catalog.page_size)")]
    page_size: Option<u32>,
    #[arg(long, help = "Emit machine-readable JSON output")]
    json: bool,
}

impl From<BrowseCommand> for BrowseArgs {
    fn from(command: BrowseCommand) -> Self {
        Self {
            file: command.file,
            search: command.search,
            category: command.category,
            min_price: command.min_price,
            max_price: command.max_price,
            sort: command.sort,
            page: command.page,
            page_size: command.page_size,
            json: command.json,
        }
    }
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    let result = match cli.command {
        Command::Browse(command) => commands::browse::run(command.into()),
        Command::Cart { file, json } => commands::cart::run(&file, json),
        Command::Config => commands::CommandResult::text(commands::config::run()),
        Command::Doctor { json } => commands::doctor::run(json),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

/// Logs go to stderr so stdout stays parseable. A config that fails to load
/// falls back to defaults here; the command itself reports the failure.
fn init_logging() {
    use tracing::Level;
    use LogFormat::*;

    let config = AppConfig::load(LoadOptions::default()).unwrap_or_default();
    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_max_level(log_level);

    let _ = match config.logging.format {
        Compact => builder.compact().try_init(),
        Pretty => builder.pretty().try_init(),
        Json => builder.json().try_init(),
    };
}
