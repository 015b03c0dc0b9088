use anyhow::{anyhow, bail, Context, Result};
use arrow::{
    array::{
        Array, ArrayRef, AsArray, BooleanArray, Float64Array, Float64Builder, LargeStringArray,
        PrimitiveArray, StringArray,
    },
    compute::{cast_with_options, CastOptions},
    datatypes::{
        ArrowPrimitiveType, DataType, Field, Float32Type, Float64Type, Int16Type, Int32Type,
        Int64Type, Int8Type, Schema, UInt16Type, UInt32Type, UInt64Type, UInt8Type,
    },
    record_batch::{RecordBatch, RecordBatchOptions},
};
use std::sync::Arc;
use tracing::{error, info};

use crate::schema::vendor_sales_summary as out;
use crate::summary::metrics::derive_metrics;

/// Coerce `Volume` to float, zero-fill every missing value and append the
/// derived profit columns.
#[tracing::instrument(level = "info", skip(batch), fields(rows = batch.num_rows()))]
pub fn clean_data(batch: &RecordBatch) -> Result<RecordBatch> {
    match clean(batch) {
        Ok(cleaned) => {
            info!("Data cleaned and additional metrics added successfully.");
            Ok(cleaned)
        }
        Err(e) => {
            error!("Error cleaning data: {:#}", e);
            Err(e.context("cleaning vendor summary"))
        }
    }
}

fn clean(batch: &RecordBatch) -> Result<RecordBatch> {
    let schema = batch.schema();
    schema
        .index_of(out::VOLUME)
        .with_context(|| format!("summary has no {} column", out::VOLUME))?;

    let mut fields = Vec::with_capacity(schema.fields().len() + out::DERIVED_COLUMNS.len());
    let mut columns: Vec<ArrayRef> = Vec::with_capacity(fields.capacity());

    for (field, col) in schema.fields().iter().zip(batch.columns()) {
        let col = if field.name() == out::VOLUME {
            to_float64(col).with_context(|| format!("converting {} to float", out::VOLUME))?
        } else if matches!(
            col.data_type(),
            DataType::Decimal128(_, _) | DataType::Decimal256(_, _)
        ) {
            // integer SUMs come back as DECIMAL(38, 0)
            to_float64(col).with_context(|| format!("converting {} to float", field.name()))?
        } else {
            col.clone()
        };
        let col = fill_missing_with_zero(&col)
            .with_context(|| format!("filling missing values in {}", field.name()))?;

        fields.push(Field::new(field.name(), col.data_type().clone(), false));
        columns.push(col);
    }

    let sales = float_column(&fields, &columns, out::TOTAL_SALES_DOLLARS)?;
    let purchases = float_column(&fields, &columns, out::TOTAL_PURCHASE_DOLLARS)?;

    let n = batch.num_rows();
    let mut gross_profit = Float64Builder::with_capacity(n);
    let mut profit_margin = Float64Builder::with_capacity(n);
    let mut ratio = Float64Builder::with_capacity(n);
    for i in 0..n {
        let m = derive_metrics(sales.value(i), purchases.value(i));
        gross_profit.append_value(m.gross_profit);
        profit_margin.append_value(m.profit_margin);
        ratio.append_value(m.sales_to_purchase_ratio);
    }

    for (name, builder) in out::DERIVED_COLUMNS
        .iter()
        .zip([&mut gross_profit, &mut profit_margin, &mut ratio])
    {
        fields.push(Field::new(*name, DataType::Float64, false));
        columns.push(Arc::new(builder.finish()));
    }

    let options = RecordBatchOptions::new().with_row_count(Some(n));
    RecordBatch::try_new_with_options(Arc::new(Schema::new(fields)), columns, &options)
        .map_err(Into::into)
}

/// Strict conversion to Float64: text must parse as a number, nulls stay null.
fn to_float64(col: &ArrayRef) -> Result<ArrayRef> {
    match col.data_type() {
        DataType::Float64 => Ok(col.clone()),
        DataType::Utf8 => {
            let strings = col.as_string::<i32>();
            let mut b = Float64Builder::with_capacity(strings.len());
            for v in strings.iter() {
                match v {
                    Some(s) => {
                        let parsed = s
                            .trim()
                            .parse::<f64>()
                            .map_err(|_| anyhow!("could not convert string to float: '{}'", s))?;
                        b.append_value(parsed);
                    }
                    None => b.append_null(),
                }
            }
            Ok(Arc::new(b.finish()))
        }
        _ => {
            let options = CastOptions {
                safe: false,
                ..Default::default()
            };
            Ok(cast_with_options(col, &DataType::Float64, &options)?)
        }
    }
}

fn fill_primitive<T: ArrowPrimitiveType>(col: &ArrayRef) -> ArrayRef {
    let arr = col.as_primitive::<T>();
    let filled: PrimitiveArray<T> = arr.iter().map(|v| Some(v.unwrap_or_default())).collect();
    Arc::new(filled.with_data_type(arr.data_type().clone()))
}

/// Replace nulls and float NaNs with zero, keeping the float's width.
fn fill_float<T: ArrowPrimitiveType>(col: &ArrayRef, is_nan: fn(T::Native) -> bool) -> ArrayRef {
    let arr = col.as_primitive::<T>();
    let filled: PrimitiveArray<T> = arr
        .iter()
        .map(|v| Some(v.filter(|x| !is_nan(*x)).unwrap_or_default()))
        .collect();
    Arc::new(filled)
}

/// Replace missing values with zero: `0` for numbers, `false` for booleans
/// and the string `"0"` for text columns. NaN counts as missing in float
/// columns.
pub fn fill_missing_with_zero(col: &ArrayRef) -> Result<ArrayRef> {
    let is_float = matches!(col.data_type(), DataType::Float32 | DataType::Float64);
    if col.null_count() == 0 && !is_float {
        return Ok(col.clone());
    }

    let filled: ArrayRef = match col.data_type() {
        DataType::Int8 => fill_primitive::<Int8Type>(col),
        DataType::Int16 => fill_primitive::<Int16Type>(col),
        DataType::Int32 => fill_primitive::<Int32Type>(col),
        DataType::Int64 => fill_primitive::<Int64Type>(col),
        DataType::UInt8 => fill_primitive::<UInt8Type>(col),
        DataType::UInt16 => fill_primitive::<UInt16Type>(col),
        DataType::UInt32 => fill_primitive::<UInt32Type>(col),
        DataType::UInt64 => fill_primitive::<UInt64Type>(col),
        DataType::Float32 => fill_float::<Float32Type>(col, f32::is_nan),
        DataType::Float64 => fill_float::<Float64Type>(col, f64::is_nan),
        DataType::Boolean => {
            let filled: BooleanArray = col
                .as_boolean()
                .iter()
                .map(|v| Some(v.unwrap_or(false)))
                .collect();
            Arc::new(filled)
        }
        DataType::Utf8 => {
            let filled: StringArray = col
                .as_string::<i32>()
                .iter()
                .map(|v| Some(v.unwrap_or("0")))
                .collect();
            Arc::new(filled)
        }
        DataType::LargeUtf8 => {
            let filled: LargeStringArray = col
                .as_string::<i64>()
                .iter()
                .map(|v| Some(v.unwrap_or("0")))
                .collect();
            Arc::new(filled)
        }
        other => bail!("cannot zero-fill a column of type {:?}", other),
    };
    Ok(filled)
}

fn float_column(fields: &[Field], columns: &[ArrayRef], name: &str) -> Result<Float64Array> {
    let idx = fields
        .iter()
        .position(|f| f.name() == name)
        .with_context(|| format!("summary has no {} column", name))?;
    let col = to_float64(&columns[idx]).with_context(|| format!("converting {} to float", name))?;
    Ok(col.as_primitive::<Float64Type>().clone())
}
