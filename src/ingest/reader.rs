use anyhow::{bail, Context, Result};
use csv::{Reader, ReaderBuilder, StringRecord};
use std::{collections::HashMap, io::Read};

/// Record-at-a-time view of one CSV document.
///
/// - the first record is the header; duplicate names become `name.1`,
///   `name.2`, ... and blank names become `Unnamed: <idx>`
/// - records shorter than the header read as if padded with empty
///   (missing) cells, see [`cell`]
/// - a record longer than the header is an error naming its line
pub struct CsvSource<R: Read> {
    rdr: Reader<R>,
    headers: Vec<String>,
    source: String,
    records_read: u64,
}

impl<R: Read> CsvSource<R> {
    pub fn open(reader: R, source: &str) -> Result<Self> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true) // short rows are padded on access, long ones rejected
            .from_reader(reader);

        let mut header = StringRecord::new();
        let found = rdr
            .read_record(&mut header)
            .with_context(|| format!("CSV parse error in {} at header", source))?;
        if !found {
            bail!("no columns to parse from {}", source);
        }

        Ok(Self {
            rdr,
            headers: dedupe_headers(header.iter().map(str::to_string).collect()),
            source: source.to_string(),
            records_read: 0,
        })
    }

    /// Column names from the header record, made unique.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Read the next data record into `record`. Returns `false` at end of input.
    pub fn read_next(&mut self, record: &mut StringRecord) -> Result<bool> {
        let found = self.rdr.read_record(record).with_context(|| {
            format!(
                "CSV parse error in {} at record {}",
                self.source,
                self.records_read + 1
            )
        })?;
        if !found {
            return Ok(false);
        }
        self.records_read += 1;

        let width = self.headers.len();
        if record.len() > width {
            let line = record
                .position()
                .map(|p| p.line())
                .unwrap_or(self.records_read + 1);
            bail!(
                "error tokenizing {}: expected {} fields in line {}, saw {}",
                self.source,
                width,
                line,
                record.len()
            );
        }
        Ok(true)
    }
}

/// Cell `idx` of a record; cells past the end of a short record are empty.
pub fn cell(record: &StringRecord, idx: usize) -> &str {
    record.get(idx).unwrap_or("")
}

fn dedupe_headers(raw: Vec<String>) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut out = Vec::with_capacity(raw.len());

    for (idx, name) in raw.into_iter().enumerate() {
        let mut col = if name.is_empty() {
            format!("Unnamed: {}", idx)
        } else {
            name
        };
        let mut seen = counts.get(&col).copied().unwrap_or(0);
        while seen > 0 {
            counts.insert(col.clone(), seen + 1);
            col = format!("{}.{}", col, seen);
            seen = counts.get(&col).copied().unwrap_or(0);
        }
        counts.insert(col.clone(), seen + 1);
        out.push(col);
    }

    out
}
