use crate::ingest::infer::{is_missing, parse_bool, present, TypeInference};
use crate::ingest::reader::{cell, CsvSource};
use anyhow::{bail, Result};
use arrow::{
    array::{ArrayRef, BooleanBuilder, Float64Builder, Int64Builder, StringBuilder},
    datatypes::{DataType, Field, Schema},
    record_batch::{RecordBatch, RecordBatchOptions},
};
use csv::StringRecord;
use std::{io::Read, sync::Arc};

/// Typed builder for one column, chosen once the column's dtype is known.
enum ColumnBuilder {
    Int(Int64Builder),
    Float(Float64Builder),
    Bool(BooleanBuilder),
    Text(StringBuilder),
}

impl ColumnBuilder {
    fn new(dtype: &DataType, rows: usize) -> Self {
        match dtype {
            DataType::Int64 => Self::Int(Int64Builder::with_capacity(rows)),
            DataType::Float64 => Self::Float(Float64Builder::with_capacity(rows)),
            DataType::Boolean => Self::Bool(BooleanBuilder::with_capacity(rows)),
            _ => Self::Text(StringBuilder::new()),
        }
    }

    fn append(&mut self, raw: &str) {
        match self {
            Self::Int(b) => b.append_option(present(raw).and_then(|v| v.parse().ok())),
            // NaN in any spelling is a missing value
            Self::Float(b) => b.append_option(
                present(raw)
                    .and_then(|v| v.parse::<f64>().ok())
                    .filter(|v| !v.is_nan()),
            ),
            Self::Bool(b) => b.append_option(present(raw).and_then(parse_bool)),
            // Text keeps its original spacing
            Self::Text(b) => {
                if is_missing(raw) {
                    b.append_null();
                } else {
                    b.append_value(raw);
                }
            }
        }
    }

    fn finish(&mut self) -> ArrayRef {
        match self {
            Self::Int(b) => Arc::new(b.finish()),
            Self::Float(b) => Arc::new(b.finish()),
            Self::Bool(b) => Arc::new(b.finish()),
            Self::Text(b) => Arc::new(b.finish()),
        }
    }
}

/// Read a CSV document into a single RecordBatch with one inferred dtype
/// per column.
///
/// `open` is called twice: the first pass only votes on column types, the
/// second streams every cell straight into typed builders, so the raw text
/// is never held in memory as a whole.
pub fn read_record_batch<R: Read>(
    mut open: impl FnMut() -> Result<R>,
    source: &str,
) -> Result<RecordBatch> {
    let mut record = StringRecord::new();

    let mut csv = CsvSource::open(open()?, source)?;
    let width = csv.headers().len();
    let mut votes = vec![TypeInference::default(); width];
    let mut rows = 0;
    while csv.read_next(&mut record)? {
        for (idx, vote) in votes.iter_mut().enumerate() {
            vote.observe(cell(&record, idx));
        }
        rows += 1;
    }
    let types: Vec<DataType> = votes.iter().map(TypeInference::finish).collect();

    let mut csv = CsvSource::open(open()?, source)?;
    if csv.headers().len() != width {
        bail!("{} changed while it was being read", source);
    }
    let mut builders: Vec<ColumnBuilder> =
        types.iter().map(|t| ColumnBuilder::new(t, rows)).collect();
    let mut second_pass_rows = 0;
    while csv.read_next(&mut record)? {
        for (idx, builder) in builders.iter_mut().enumerate() {
            builder.append(cell(&record, idx));
        }
        second_pass_rows += 1;
    }
    if second_pass_rows != rows {
        bail!("{} changed while it was being read", source);
    }

    let mut fields = Vec::with_capacity(width);
    let mut columns = Vec::with_capacity(width);
    for (name, builder) in csv.headers().iter().zip(builders.iter_mut()) {
        let col = builder.finish();
        fields.push(Field::new(name, col.data_type().clone(), true));
        columns.push(col);
    }

    // explicit row count so header-only files still produce a valid batch
    let options = RecordBatchOptions::new().with_row_count(Some(rows));
    RecordBatch::try_new_with_options(Arc::new(Schema::new(fields)), columns, &options)
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Array, BooleanArray, Float64Array, Int64Array, StringArray};
    use std::io::Cursor;

    fn read_str(content: &str) -> Result<RecordBatch> {
        read_record_batch(|| Ok(Cursor::new(content)), "t.csv")
    }

    #[test]
    fn converts_each_column_to_its_inferred_type() -> Result<()> {
        let content = "VendorNumber,VendorName,Dollars,Active,Size\n\
                       105,ALTAMAR BRANDS LLC,104.54,True,750\n\
                       4466,AMERICAN VINTAGES LLC,,False,Unknown\n";
        let batch = read_str(content)?;

        assert_eq!(batch.num_rows(), 2);
        let schema = batch.schema();
        let types: Vec<&DataType> = schema.fields().iter().map(|f| f.data_type()).collect();
        assert_eq!(
            types,
            vec![
                &DataType::Int64,
                &DataType::Utf8,
                &DataType::Float64,
                &DataType::Boolean,
                &DataType::Utf8
            ]
        );

        let vendors = batch.column(0).as_any().downcast_ref::<Int64Array>().unwrap();
        assert_eq!(vendors.value(1), 4466);

        let dollars = batch.column(2).as_any().downcast_ref::<Float64Array>().unwrap();
        assert_eq!(dollars.value(0), 104.54);
        assert!(dollars.is_null(1));

        let active = batch.column(3).as_any().downcast_ref::<BooleanArray>().unwrap();
        assert!(active.value(0));
        assert!(!active.value(1));

        let size = batch.column(4).as_any().downcast_ref::<StringArray>().unwrap();
        assert_eq!(size.value(1), "Unknown");
        Ok(())
    }

    #[test]
    fn missing_text_cells_become_null() -> Result<()> {
        let batch = read_str("Name\nfoo\nNA\n bar\n")?;

        let names = batch.column(0).as_any().downcast_ref::<StringArray>().unwrap();
        assert_eq!(names.len(), 3);
        assert!(names.is_null(1));
        assert_eq!(names.value(2), " bar");
        Ok(())
    }

    #[test]
    fn header_only_file_yields_empty_batch() -> Result<()> {
        let batch = read_str("a,b\n")?;
        assert_eq!(batch.num_rows(), 0);
        assert_eq!(batch.num_columns(), 2);
        Ok(())
    }

    #[test]
    fn nan_spellings_load_as_null() -> Result<()> {
        let batch = read_str("SalesDollars\n40\nNAN\n nan \nNan\n")?;

        let dollars = batch.column(0).as_any().downcast_ref::<Float64Array>().unwrap();
        assert_eq!(dollars.value(0), 40.0);
        assert_eq!(dollars.null_count(), 3);
        Ok(())
    }

    #[test]
    fn short_rows_are_padded_with_nulls() -> Result<()> {
        let batch = read_str("a,b,c\n1,2,3\n4\n")?;
        assert_eq!(batch.num_rows(), 2);
        assert!(batch.column(1).is_null(1));
        assert!(batch.column(2).is_null(1));
        Ok(())
    }

    #[test]
    fn many_rows_stream_through_both_passes() -> Result<()> {
        let mut content = String::from("id,price,label\n");
        for i in 0..10_000 {
            content.push_str(&format!("{},{}.5,item {}\n", i, i, i));
        }
        let mut opened = 0;
        let batch = read_record_batch(
            || {
                opened += 1;
                Ok(Cursor::new(content.as_bytes()))
            },
            "big.csv",
        )?;

        assert_eq!(opened, 2);
        assert_eq!(batch.num_rows(), 10_000);
        let prices = batch.column(1).as_any().downcast_ref::<Float64Array>().unwrap();
        assert_eq!(prices.value(9_999), 9_999.5);
        let labels = batch.column(2).as_any().downcast_ref::<StringArray>().unwrap();
        assert_eq!(labels.value(42), "item 42");
        Ok(())
    }

    #[test]
    fn source_that_changes_between_passes_is_rejected() {
        let versions = ["a\n1\n2\n", "a\n1\n"];
        let mut next = 0;
        let result = read_record_batch(
            || {
                let content = versions[next];
                next += 1;
                Ok(Cursor::new(content))
            },
            "moving.csv",
        );
        assert!(result.is_err());
    }
}
