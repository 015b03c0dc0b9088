// src/summary/mod.rs
pub mod clean;
pub mod metrics;
pub mod query;

use anyhow::Result;
use arrow::{record_batch::RecordBatch, util::pretty::pretty_format_batches};
use duckdb::Connection;
use tracing::info;

use crate::ingest::ingest_db;
use crate::schema::vendor_sales_summary as out;
pub use clean::clean_data;
pub use metrics::{derive_metrics, DerivedMetrics};
pub use query::create_vendor_summary;

/// Rows logged when previewing an intermediate table.
const PREVIEW_ROWS: usize = 5;

#[derive(Debug)]
pub struct SummaryReport {
    pub rows: usize,
}

/// Query, clean and persist the vendor sales summary.
#[tracing::instrument(level = "info", skip(conn))]
pub fn run(conn: &Connection) -> Result<SummaryReport> {
    info!("Creating Vendor Summary.....");
    let summary = create_vendor_summary(conn)?;
    info!("\n{}", preview(&summary)?);

    info!("Cleaning Data.....");
    let cleaned = clean_data(&summary)?;
    info!("\n{}", preview(&cleaned)?);

    info!("Ingesting data.....");
    let rows = ingest_db(conn, out::TABLE, &cleaned)?;
    info!("Data ingestion complete and committed to {}.", out::TABLE);

    Ok(SummaryReport { rows })
}

fn preview(batch: &RecordBatch) -> Result<String> {
    let head = batch.slice(0, batch.num_rows().min(PREVIEW_ROWS));
    Ok(pretty_format_batches(&[head])?.to_string())
}
