#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line front end for the accident dashboard engine.
//!
//! Loads an accident CSV, selects a UF, and prints either the full
//! dashboard as JSON or one categorical breakdown as text. Set `RUST_LOG`
//! to see load summaries and per-table exclusion counts.

mod config;
mod render;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use road_safety_accident_models::CategoricalField;
use road_safety_analytics::{DashboardCache, dashboard};
use road_safety_analytics_models::SortPolicy;
use road_safety_records::{RecordSet, load_csv};

use crate::config::DashboardConfig;

#[derive(Parser)]
#[command(name = "road_safety", about = "Accident dashboard tables from PRF exports")]
struct Cli {
    /// TOML config file (defaults to `road_safety.toml` if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Accident CSV to load (overrides `data_path` in the config)
    #[arg(long, global = true, env = "ROAD_SAFETY_DATA")]
    data: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the UF codes in the dataset with their row counts
    Ufs,
    /// Print every dashboard table as JSON
    Dashboard {
        /// UF to select (e.g., "SP"); all rows when omitted
        #[arg(long, env = "ROAD_SAFETY_UF")]
        uf: Option<String>,
        /// Compute the tables on the rayon thread pool
        #[arg(long)]
        parallel: bool,
        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Print the frequency table of one categorical field
    Breakdown {
        /// Field to count (e.g., `tipo_acidente`, `dia_semana`)
        field: CategoricalField,
        /// UF to select (e.g., "SP"); all rows when omitted
        #[arg(long, env = "ROAD_SAFETY_UF")]
        uf: Option<String>,
        /// Sort by the field's natural order instead of by count
        #[arg(long)]
        ordinal: bool,
        /// Append a stable colour to each category
        #[arg(long)]
        colors: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let config = DashboardConfig::load(cli.config.as_deref())?;
    let data_path = cli
        .data
        .or(config.data_path)
        .ok_or("No accident CSV given: pass --data, set ROAD_SAFETY_DATA, or set data_path in road_safety.toml")?;

    let records = load_csv(&data_path)?;
    log::info!(
        "Loaded {} records ({} columns, version {})",
        records.len(),
        records.schema().columns().count(),
        records.version()
    );

    match cli.command {
        Commands::Ufs => print_ufs(&records),
        Commands::Dashboard {
            uf,
            parallel,
            pretty,
        } => {
            let uf = uf.or(config.default_uf);
            let mut cache = if parallel {
                DashboardCache::parallel()
            } else {
                DashboardCache::new()
            };
            let dashboard = cache.get_or_build(&records, uf.as_deref());
            let json = if pretty {
                serde_json::to_string_pretty(dashboard.as_ref())?
            } else {
                serde_json::to_string(dashboard.as_ref())?
            };
            println!("{json}");
        }
        Commands::Breakdown {
            field,
            uf,
            ordinal,
            colors,
        } => {
            let uf = uf.or(config.default_uf);
            let view = records.filter_uf(uf.as_deref());
            let policy = if ordinal {
                SortPolicy::Ordinal
            } else {
                SortPolicy::Ranked
            };
            print!(
                "{}",
                render::breakdown(&dashboard::breakdown(&view, field, policy), colors)
            );
        }
    }

    Ok(())
}

fn print_ufs(records: &RecordSet) {
    println!("{:<6} ROWS", "UF");
    println!("{}", "-".repeat(16));
    for uf in records.ufs() {
        println!("{:<6} {}", uf, records.filter_uf(Some(&uf)).len());
    }
}
