// src/store/mod.rs

use anyhow::{bail, Context, Result};
use arrow::{compute::concat_batches, record_batch::RecordBatch};
use duckdb::Connection;
use std::path::Path;
use tracing::debug;

use crate::schema::map_to_duckdb_type;

/// Rows per appended slice; one DuckDB data chunk holds at most this many.
const APPEND_CHUNK_ROWS: usize = 2048;

/// Open a DuckDB database on disk at `path`, creating the file if it doesn't exist.
pub fn open_disk_db(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)
        .with_context(|| format!("opening store {}", path.display()))?;
    Ok(conn)
}

/// Open a DuckDB in‐memory database
pub fn open_mem_db() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    Ok(conn)
}

/// Double-quote an identifier so file-derived table names and CSV headers
/// can be used verbatim.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Drop `table_name` if present, recreate it from the batch's schema and
/// bulk-append every row. Returns the number of rows written.
#[tracing::instrument(level = "debug", skip(conn, batch), fields(rows = batch.num_rows()))]
pub fn replace_table(conn: &Connection, table_name: &str, batch: &RecordBatch) -> Result<usize> {
    let schema = batch.schema();
    if schema.fields().is_empty() {
        bail!("cannot create table {} without columns", table_name);
    }

    let columns = schema
        .fields()
        .iter()
        .map(|f| {
            let ty = map_to_duckdb_type(f.data_type())
                .with_context(|| format!("column {} of table {}", f.name(), table_name))?;
            Ok(format!("{} {}", quote_ident(f.name()), ty))
        })
        .collect::<Result<Vec<_>>>()?;

    let table = quote_ident(table_name);
    let sql = format!(
        "DROP TABLE IF EXISTS {table};\nCREATE TABLE {table} ({cols});",
        table = table,
        cols = columns.join(", ")
    );
    conn.execute_batch(&sql)
        .with_context(|| format!("recreating table {}", table_name))?;

    let rows = batch.num_rows();
    if rows > 0 {
        let mut appender = conn
            .appender(table_name)
            .with_context(|| format!("opening appender for {}", table_name))?;
        let mut offset = 0;
        while offset < rows {
            let len = APPEND_CHUNK_ROWS.min(rows - offset);
            appender
                .append_record_batch(batch.slice(offset, len))
                .with_context(|| {
                    format!("appending rows {}..{} to {}", offset, offset + len, table_name)
                })?;
            offset += len;
        }
        appender
            .flush()
            .with_context(|| format!("flushing appender for {}", table_name))?;
    }

    debug!(table = table_name, rows, "table replaced");
    Ok(rows)
}

/// Run `sql` and gather every result batch into one RecordBatch.
pub fn query_batch(conn: &Connection, sql: &str) -> Result<RecordBatch> {
    let mut stmt = conn.prepare(sql)?;
    let arrow = stmt.query_arrow([])?;
    let schema = arrow.get_schema();
    let batches: Vec<RecordBatch> = arrow.collect();

    debug!(batch_count = batches.len(), "query executed");
    concat_batches(&schema, &batches).context("concatenating query result batches")
}

/// Number of rows currently stored in `table_name`.
pub fn table_row_count(conn: &Connection, table_name: &str) -> Result<i64> {
    let sql = format!("SELECT COUNT(*) FROM {}", quote_ident(table_name));
    let count: i64 = conn
        .query_row(&sql, [], |r| r.get(0))
        .with_context(|| format!("counting rows of {}", table_name))?;
    Ok(count)
}
