use anyhow::{Context, Result};
use std::{
    fs::{self, File, OpenOptions},
    path::Path,
    sync::Mutex,
};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Open `path` for appending, creating its directory first.
pub fn open_log_file(path: &Path) -> Result<File> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("creating log directory {}", dir.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))
}

/// Install the global subscriber: timestamped, level-tagged lines appended
/// to the stage's log file, mirrored on stderr. `RUST_LOG` overrides the
/// default `info` filter.
pub fn init_logging(log_file: &Path) -> Result<()> {
    let file = open_log_file(log_file)?;

    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(env)
        .with(
            fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(false),
        )
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init()
        .context("installing tracing subscriber")?;
    Ok(())
}

#[cfg(test)]
pub(crate) fn init_test_logging() {
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,inventory_etl=debug")),
        )
        .with_test_writer()
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PipelineConfig, SUMMARY_LOG_FILE};
    use std::io::Write;

    #[test]
    fn log_file_is_created_and_appended() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("nested").join("logs").join("stage.log");

        writeln!(open_log_file(&path)?, "first")?;
        writeln!(open_log_file(&path)?, "second")?;

        let contents = fs::read_to_string(&path)?;
        assert_eq!(contents, "first\nsecond\n");
        Ok(())
    }

    #[test]
    fn stage_log_file_lands_in_configured_log_dir() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let config = PipelineConfig::new(dir.path(), ":memory:", dir.path().join("logs"));
        let path = config.log_file(SUMMARY_LOG_FILE);

        open_log_file(&path)?;
        assert!(dir.path().join("logs").join("get_vendor_summary.log").is_file());
        Ok(())
    }
}
