//! Paths shared by both pipeline stages.

use clap::Args;
use std::path::{Path, PathBuf};

pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_STORE_PATH: &str = "inventory.db";
pub const DEFAULT_LOG_DIR: &str = "logs";

/// Log file written by the `ingest` stage.
pub const INGEST_LOG_FILE: &str = "ingestion_db.log";
/// Log file written by the `summarize` stage.
pub const SUMMARY_LOG_FILE: &str = "get_vendor_summary.log";
/// Log file written when both stages run back to back.
pub const PIPELINE_LOG_FILE: &str = "pipeline.log";

/// Where to read CSVs from, which store to write, and where logs go.
///
/// Relative paths resolve against the working directory for every stage.
#[derive(Debug, Clone, Args)]
pub struct PipelineConfig {
    /// Directory scanned (non-recursively) for `.csv` files
    #[arg(long, env = "INVENTORY_DATA_DIR", default_value = DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,

    /// DuckDB database file holding ingested and derived tables
    #[arg(long = "store", env = "INVENTORY_STORE", default_value = DEFAULT_STORE_PATH)]
    pub store_path: PathBuf,

    /// Directory for append-mode log files
    #[arg(long, env = "INVENTORY_LOG_DIR", default_value = DEFAULT_LOG_DIR)]
    pub log_dir: PathBuf,
}

impl PipelineConfig {
    pub fn new(
        data_dir: impl Into<PathBuf>,
        store_path: impl Into<PathBuf>,
        log_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            data_dir: data_dir.into(),
            store_path: store_path.into(),
            log_dir: log_dir.into(),
        }
    }

    pub fn log_file(&self, name: &str) -> PathBuf {
        self.log_dir.join(name)
    }

    pub fn store_path(&self) -> &Path {
        &self.store_path
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DATA_DIR, DEFAULT_STORE_PATH, DEFAULT_LOG_DIR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        config: PipelineConfig,
    }

    #[test]
    fn defaults_match_constants() {
        let cfg = PipelineConfig::default();
        assert_eq!(cfg.data_dir, PathBuf::from("data"));
        assert_eq!(cfg.store_path(), Path::new("inventory.db"));
        assert_eq!(cfg.log_file(INGEST_LOG_FILE), PathBuf::from("logs/ingestion_db.log"));
    }

    #[test]
    fn flags_override_defaults() {
        let cli = TestCli::parse_from([
            "test",
            "--data-dir",
            "/srv/raw",
            "--store",
            "/srv/inventory.db",
            "--log-dir",
            "/var/log/etl",
        ]);
        assert_eq!(cli.config.data_dir, PathBuf::from("/srv/raw"));
        assert_eq!(cli.config.store_path, PathBuf::from("/srv/inventory.db"));
        assert_eq!(
            cli.config.log_file(SUMMARY_LOG_FILE),
            PathBuf::from("/var/log/etl/get_vendor_summary.log")
        );
    }
}
