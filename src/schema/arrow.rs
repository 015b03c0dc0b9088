// src/schema/arrow.rs

use anyhow::{bail, Result};
use arrow::datatypes::DataType;

/// Map an Arrow DataType onto the DuckDB column type used when a table is
/// (re)created from a RecordBatch.
///
/// Covers:
/// - Int8/16/32/64      → TINYINT/SMALLINT/INTEGER/BIGINT
/// - UInt8/16/32/64     → UTINYINT/USMALLINT/UINTEGER/UBIGINT
/// - Float32, Float64   → FLOAT, DOUBLE
/// - Boolean            → BOOLEAN
/// - Utf8, LargeUtf8    → VARCHAR
/// - Date32             → DATE
/// - Timestamp(*)       → TIMESTAMP
/// - Decimal128(p, s)   → DECIMAL(p, s)
///
/// Anything else is rejected; the appender would not accept it either.
pub fn map_to_duckdb_type(dt: &DataType) -> Result<String> {
    let ty = match dt {
        DataType::Int8 => "TINYINT".to_string(),
        DataType::Int16 => "SMALLINT".to_string(),
        DataType::Int32 => "INTEGER".to_string(),
        DataType::Int64 => "BIGINT".to_string(),
        DataType::UInt8 => "UTINYINT".to_string(),
        DataType::UInt16 => "USMALLINT".to_string(),
        DataType::UInt32 => "UINTEGER".to_string(),
        DataType::UInt64 => "UBIGINT".to_string(),
        DataType::Float32 => "FLOAT".to_string(),
        DataType::Float64 => "DOUBLE".to_string(),
        DataType::Boolean => "BOOLEAN".to_string(),
        DataType::Utf8 | DataType::LargeUtf8 => "VARCHAR".to_string(),
        DataType::Date32 => "DATE".to_string(),
        DataType::Timestamp(_, _) => "TIMESTAMP".to_string(),
        DataType::Decimal128(p, s) => format!("DECIMAL({}, {})", p, s),
        other => bail!("no DuckDB column type for Arrow type {:?}", other),
    };
    Ok(ty)
}
