// src/ingest/mod.rs
pub mod convert;
pub mod infer;
pub mod reader;

use anyhow::{bail, Context, Result};
use arrow::record_batch::RecordBatch;
use duckdb::Connection;
use glob::{glob, Pattern};
use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    time::{Duration, Instant},
};
use tracing::info;

use crate::{config::PipelineConfig, store};
use convert::read_record_batch;

/// Outcome of one loader run: every table written with its row count.
#[derive(Debug)]
pub struct IngestReport {
    pub tables: Vec<(String, usize)>,
    pub elapsed: Duration,
}

/// All regular files directly inside `dir` whose name ends in `.csv`,
/// sorted by name. Sub-directories are not descended into.
pub fn discover_csv_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        bail!(
            "data_dir `{}` does not exist or is not a directory",
            dir.display()
        );
    }

    let pattern = format!("{}/*.csv", Pattern::escape(&dir.to_string_lossy()));
    let mut files = Vec::new();
    for entry in glob(&pattern).context("invalid glob pattern for data_dir")? {
        let path = entry.context("reading data_dir entry")?;
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Table name for a CSV file: its file name without the `.csv` suffix.
pub fn table_name_for(path: &Path) -> Result<String> {
    let file_name = path
        .file_name()
        .and_then(|s| s.to_str())
        .with_context(|| format!("non UTF-8 file name {:?}", path))?;
    match file_name.strip_suffix(".csv") {
        Some(stem) if !stem.is_empty() => Ok(stem.to_string()),
        _ => bail!("cannot derive a table name from {}", file_name),
    }
}

/// Read one CSV file into a typed RecordBatch.
pub fn read_csv_table(path: &Path) -> Result<RecordBatch> {
    read_record_batch(
        || {
            let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
            Ok(BufReader::new(file))
        },
        &path.display().to_string(),
    )
}

/// Fully replace `table_name` with `batch` and announce it.
pub fn ingest_db(conn: &Connection, table_name: &str, batch: &RecordBatch) -> Result<usize> {
    let rows = store::replace_table(conn, table_name, batch)?;
    println!("✅ Table '{}' created with {} rows", table_name, rows);
    info!("Table '{}' created with {} rows", table_name, rows);
    Ok(rows)
}

/// Load every CSV in `config.data_dir` into the store, one table per file.
#[tracing::instrument(level = "info", skip(config, conn), fields(dir = %config.data_dir.display()))]
pub fn load_raw_data(config: &PipelineConfig, conn: &Connection) -> Result<IngestReport> {
    let start = Instant::now();
    let mut tables = Vec::new();

    for path in discover_csv_files(&config.data_dir)? {
        let table_name = table_name_for(&path)?;
        let batch = read_csv_table(&path)?;

        let file_name = path.file_name().unwrap_or_default().to_string_lossy();
        info!("Ingesting {} into db", file_name);
        let rows = ingest_db(conn, &table_name, &batch)
            .with_context(|| format!("ingesting {} into table {}", file_name, table_name))?;
        tables.push((table_name, rows));
    }

    let elapsed = start.elapsed();
    info!("Ingestion complete");
    info!("Total Time taken {:.2} minutes", elapsed.as_secs_f64() / 60.0);

    Ok(IngestReport { tables, elapsed })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::init_test_logging;
    use crate::store::{open_mem_db, query_batch, table_row_count};
    use std::fs;

    fn write(dir: &Path, name: &str, content: &str) -> Result<()> {
        fs::write(dir.join(name), content)?;
        Ok(())
    }

    fn seed_dir() -> Result<tempfile::TempDir> {
        let dir = tempfile::tempdir()?;
        write(
            dir.path(),
            "purchases.csv",
            "VendorNumber,VendorName,Brand,Description,PurchasePrice,Quantity,Dollars\n\
             105,ALTAMAR BRANDS LLC,8412,Tequila Ocho Plata Fresno,35.71,6,214.26\n\
             105,ALTAMAR BRANDS LLC,8412,Tequila Ocho Plata Fresno,35.71,2,71.42\n\
             4466,AMERICAN VINTAGES LLC,5255,TGI Fridays Ultimte Mudslide,9.41,1,9.41\n",
        )?;
        write(
            dir.path(),
            "vendor_invoice.csv",
            "VendorNumber,Freight\n105,8.56\n4466,NA\n",
        )?;
        write(dir.path(), "notes.txt", "not a table\n")?;
        fs::create_dir(dir.path().join("archive"))?;
        write(&dir.path().join("archive"), "old.csv", "a\n1\n")?;
        Ok(dir)
    }

    #[test]
    fn discovers_only_top_level_csv_files() -> Result<()> {
        let dir = seed_dir()?;
        let names: Vec<String> = discover_csv_files(dir.path())?
            .iter()
            .map(|p| table_name_for(p))
            .collect::<Result<_>>()?;
        assert_eq!(names, vec!["purchases", "vendor_invoice"]);
        Ok(())
    }

    #[test]
    fn table_name_strips_only_the_extension() -> Result<()> {
        assert_eq!(table_name_for(Path::new("/x/sales.2024.csv"))?, "sales.2024");
        assert!(table_name_for(Path::new("/x/.csv")).is_err());
        Ok(())
    }

    #[test]
    fn missing_directory_is_an_error() {
        assert!(discover_csv_files(Path::new("/definitely/not/here")).is_err());
    }

    #[test]
    fn loads_one_table_per_csv_with_matching_shape() -> Result<()> {
        init_test_logging();
        let dir = seed_dir()?;
        let conn = open_mem_db()?;
        let config = PipelineConfig::new(dir.path(), ":memory:", dir.path().join("logs"));

        let report = load_raw_data(&config, &conn)?;
        assert_eq!(
            report.tables,
            vec![("purchases".to_string(), 3), ("vendor_invoice".to_string(), 2)]
        );
        assert_eq!(table_row_count(&conn, "purchases")?, 3);
        assert_eq!(table_row_count(&conn, "vendor_invoice")?, 2);

        let purchases = query_batch(&conn, "SELECT * FROM purchases")?;
        let schema = purchases.schema();
        let columns: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
        assert_eq!(
            columns,
            vec![
                "VendorNumber",
                "VendorName",
                "Brand",
                "Description",
                "PurchasePrice",
                "Quantity",
                "Dollars"
            ]
        );

        let freight_nulls: i64 = conn.query_row(
            "SELECT COUNT(*) FROM vendor_invoice WHERE Freight IS NULL",
            [],
            |r| r.get(0),
        )?;
        assert_eq!(freight_nulls, 1);
        Ok(())
    }

    #[test]
    fn rerun_replaces_tables_with_identical_contents() -> Result<()> {
        init_test_logging();
        let dir = seed_dir()?;
        let conn = open_mem_db()?;
        let config = PipelineConfig::new(dir.path(), ":memory:", dir.path().join("logs"));

        load_raw_data(&config, &conn)?;
        let first = query_batch(&conn, "SELECT * FROM purchases ORDER BY ALL")?;
        load_raw_data(&config, &conn)?;
        let second = query_batch(&conn, "SELECT * FROM purchases ORDER BY ALL")?;

        assert_eq!(first, second);
        assert_eq!(table_row_count(&conn, "purchases")?, 3);
        Ok(())
    }

    #[test]
    fn malformed_file_aborts_the_run() -> Result<()> {
        let dir = tempfile::tempdir()?;
        write(dir.path(), "broken.csv", "a,b\n1,2,3\n")?;
        let conn = open_mem_db()?;
        let config = PipelineConfig::new(dir.path(), ":memory:", dir.path().join("logs"));

        assert!(load_raw_data(&config, &conn).is_err());
        Ok(())
    }
}
