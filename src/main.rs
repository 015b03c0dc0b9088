use anyhow::Result;
use clap::{Parser, Subcommand};
use inventory_etl::{
    config::{PipelineConfig, INGEST_LOG_FILE, PIPELINE_LOG_FILE, SUMMARY_LOG_FILE},
    ingest, logging, store, summary,
};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "inventory_etl")]
#[command(version, about = "Load inventory CSVs into DuckDB and build the vendor sales summary", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load every CSV of the data directory into the store, one table per file
    Ingest {
        #[command(flatten)]
        config: PipelineConfig,
    },

    /// Build vendor_sales_summary from the loaded tables
    Summarize {
        #[command(flatten)]
        config: PipelineConfig,
    },

    /// Ingest, then summarize
    Run {
        #[command(flatten)]
        config: PipelineConfig,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Ingest { config } => {
            logging::init_logging(&config.log_file(INGEST_LOG_FILE))?;
            guarded("Ingestion", || {
                let conn = store::open_disk_db(config.store_path())?;
                ingest::load_raw_data(&config, &conn)?;
                Ok(())
            })
        }

        Commands::Summarize { config } => {
            logging::init_logging(&config.log_file(SUMMARY_LOG_FILE))?;
            guarded("Pipeline", || {
                let conn = store::open_disk_db(config.store_path())?;
                summary::run(&conn)?;
                Ok(())
            })
        }

        Commands::Run { config } => {
            logging::init_logging(&config.log_file(PIPELINE_LOG_FILE))?;
            guarded("Pipeline", || {
                let conn = store::open_disk_db(config.store_path())?;
                let report = ingest::load_raw_data(&config, &conn)?;
                info!("{} tables ingested", report.tables.len());
                let summary = summary::run(&conn)?;
                info!("{} summary rows written", summary.rows);
                Ok(())
            })
        }
    }
}

/// Log a failed stage before handing the error back, so the log file and
/// the exit status both record it.
fn guarded(stage: &str, f: impl FnOnce() -> Result<()>) -> Result<()> {
    let result = f();
    if let Err(e) = &result {
        error!("{} failed: {:#}", stage, e);
    }
    result
}
