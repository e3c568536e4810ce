//! brokerlens CLI: normalise broker record dumps and print ranked views.

mod display;

use std::path::{Path, PathBuf};

use anyhow::Context;
use brokerlens_core::ranking::{self, DEFAULT_RISKY_LIMIT, SECTION_LIMIT, TOP_LIMIT};
use brokerlens_core::{BrokerCatalog, BrokerRecord, SortOrder};
use brokerlens_store::RecordDump;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

/// Normalise heterogeneous broker records and rank them.
#[derive(Parser, Debug)]
#[command(name = "brokerlens", version, about, long_about = None)]
struct Cli {
    /// Record dump: a JSON array or JSON Lines file of broker rows
    #[arg(long, global = true, env = "BROKERLENS_DATA", default_value = "brokers.json")]
    data: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rank brokers by score, regulation strength, or operating history
    Rank {
        #[arg(long, value_enum, default_value_t = Order::Score)]
        by: Order,
        #[arg(long, default_value_t = TOP_LIMIT)]
        limit: usize,
        /// Only rank brokers with license text
        #[arg(long)]
        licensed: bool,
    },
    /// Unlicensed or low-scoring brokers, riskiest first
    Risky {
        #[arg(long, default_value_t = DEFAULT_RISKY_LIMIT)]
        limit: usize,
    },
    /// Show one broker by code or name slug
    Show { code_or_slug: String },
    /// Search names, countries, and license text
    Search { query: String },
    /// Print every landing-page section
    Home,
    /// Write canonical records as JSON to stdout
    Normalize {
        #[arg(long)]
        pretty: bool,
    },
    /// Extract regulators from a license string
    Regulators { text: String },
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum Order {
    Score,
    Regulation,
    Experience,
}

impl From<Order> for SortOrder {
    fn from(order: Order) -> Self {
        match order {
            Order::Score => SortOrder::Score,
            Order::Regulation => SortOrder::Regulation,
            Order::Experience => SortOrder::Experience,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    tracing::debug!("brokerlens v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Regulators { text } => {
            display::print_regulators(&text);
            Ok(())
        }
        command => {
            let catalog = load_catalog(&cli.data)?;
            run(command, &catalog)
        }
    }
}

fn load_catalog(path: &Path) -> anyhow::Result<BrokerCatalog> {
    let dump = RecordDump::load(path)
        .with_context(|| format!("loading broker records from {}", path.display()))?;
    Ok(BrokerCatalog::from_raw(dump.records()))
}

fn run(command: Command, catalog: &BrokerCatalog) -> anyhow::Result<()> {
    match command {
        Command::Rank { by, limit, licensed } => {
            let order = SortOrder::from(by);
            let pool: Vec<&BrokerRecord> = if licensed {
                ranking::licensed(catalog.records())
            } else {
                catalog.records().iter().collect()
            };
            let view: Vec<&BrokerRecord> = order.apply(pool).into_iter().take(limit).collect();
            display::print_ranking(&format!("By {}", order.as_str()), &view);
        }
        Command::Risky { limit } => {
            let view = ranking::risky_brokers(catalog.records(), limit);
            display::print_ranking("Risky brokers", &view);
        }
        Command::Show { code_or_slug } => {
            let record = catalog
                .find(&code_or_slug)
                .with_context(|| format!("no broker matches '{code_or_slug}'"))?;
            display::print_broker_card(record);
            let recommended = catalog.recommended(&record.info.code, SECTION_LIMIT);
            display::print_ranking("Recommended", &recommended);
        }
        Command::Search { query } => {
            let results = catalog.search(&query);
            if results.is_empty() {
                println!("No brokers match '{query}'.");
            } else {
                display::print_ranking(&format!("Results for '{query}'"), &results);
            }
        }
        Command::Home => {
            let home = catalog.home();
            display::print_ranking("Top brokers", &home.top);
            display::print_ranking("Best regulated", &home.best_regulated);
            display::print_ranking("Highest rated", &home.highest_rated);
            display::print_ranking("Most experienced", &home.most_experienced);
            display::print_ranking("Risky brokers", &home.risky);
        }
        Command::Normalize { pretty } => {
            let json = if pretty {
                serde_json::to_string_pretty(catalog.records())?
            } else {
                serde_json::to_string(catalog.records())?
            };
            println!("{json}");
        }
        Command::Regulators { text } => display::print_regulators(&text),
    }
    Ok(())
}
