use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use npi_importer::{Loader, dry_run_summary, parse_workbook, read_workbook};
use npi_infra::{DatabaseConfig, PostgresInventoryStore, db};

/// Import the NPI workbook into the inventory database.
#[derive(Debug, Parser)]
#[command(name = "npi-import", version)]
struct Args {
    /// Workbook to import.
    #[arg(long, default_value = "data/NPI_v3_Updated.xlsx")]
    file: PathBuf,

    /// Parse and summarize without writing anything.
    #[arg(long)]
    dry_run: bool,

    /// Print the summary as JSON.
    #[arg(long)]
    json: bool,

    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: Option<String>,

    #[arg(long, env = "NPI_DB_MAX_CONNECTIONS", default_value_t = 5)]
    max_connections: u32,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    npi_observability::init();
    let args = Args::parse();

    let raw = read_workbook(&args.file)?;
    let sheets = parse_workbook(&raw);
    let records: usize = sheets.iter().map(|s| s.records.len()).sum();
    tracing::info!(file = %args.file.display(), sheets = sheets.len(), records, "workbook parsed");

    let summary = if args.dry_run {
        dry_run_summary(&sheets)
    } else {
        let url = args
            .database_url
            .context("DATABASE_URL is required unless --dry-run is given")?;
        let pool = db::connect(&DatabaseConfig {
            url,
            max_connections: args.max_connections,
        })
        .await?;
        Loader::new(PostgresInventoryStore::new(pool)).load(&sheets).await?
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{summary}");
    }
    Ok(())
}
