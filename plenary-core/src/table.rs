//! Delimited table output
//!
//! The table is the interface to downstream consumers: a fixed header, one row
//! per record, standard quoting. Rows go to a `.partial` sibling first and the
//! file is renamed into place only once everything has been flushed, so a
//! failed run never leaves a truncated table where a complete one is expected.

use crate::error::WriteError;
use crate::types::PlenaryMinutes;
use anyhow::{anyhow, Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::path::{Path, PathBuf};

/// Column order of the output table
pub const COLUMNS: [&str; 7] = [
    "date",
    "datetime",
    "title",
    "period",
    "type",
    "text",
    "period_number",
];

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Serialize)]
struct TableRow<'a> {
    date: String,
    datetime: String,
    title: &'a str,
    period: u32,
    #[serde(rename = "type")]
    doc_type: &'a str,
    text: &'a str,
    period_number: u32,
}

impl<'a> From<&'a PlenaryMinutes> for TableRow<'a> {
    fn from(pm: &'a PlenaryMinutes) -> Self {
        Self {
            date: pm.date.format(DATE_FORMAT).to_string(),
            datetime: pm.datetime.format(DATETIME_FORMAT).to_string(),
            title: &pm.title,
            period: pm.period,
            doc_type: &pm.doc_type,
            text: &pm.text,
            period_number: pm.period_number,
        }
    }
}

#[derive(Deserialize)]
struct OwnedRow {
    date: String,
    datetime: String,
    title: String,
    period: u32,
    #[serde(rename = "type")]
    doc_type: String,
    text: String,
    period_number: u32,
}

/// Single-pass writer for the normalized table
pub struct TableWriter {
    delimiter: u8,
}

impl Default for TableWriter {
    fn default() -> Self {
        Self::new(b',')
    }
}

impl TableWriter {
    pub fn new(delimiter: u8) -> Self {
        Self { delimiter }
    }

    /// Write all records to `path`, returning the final path on success
    pub fn write(&self, records: &[PlenaryMinutes], path: &Path) -> Result<PathBuf, WriteError> {
        let partial = partial_path(path);

        let result = self.write_rows(records, &partial).and_then(|()| {
            fs::rename(&partial, path).map_err(|source| WriteError::Finalize {
                path: path.to_path_buf(),
                source,
            })
        });

        if result.is_err() {
            fs::remove_file(&partial).ok();
        } else {
            println!("💾 Wrote {} rows to {}", records.len(), path.display());
        }
        result.map(|()| path.to_path_buf())
    }

    fn write_rows(&self, records: &[PlenaryMinutes], partial: &Path) -> Result<(), WriteError> {
        let create_err = |source| WriteError::Create {
            path: partial.to_path_buf(),
            source,
        };
        let write_err = |source| WriteError::Write {
            path: partial.to_path_buf(),
            source,
        };

        if let Some(parent) = partial.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(create_err)?;
        }
        let file = File::create(partial).map_err(create_err)?;

        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(false)
            .from_writer(file);

        // Written explicitly so an empty run still produces a header
        writer.write_record(COLUMNS).map_err(write_err)?;
        for pm in records {
            writer.serialize(TableRow::from(pm)).map_err(write_err)?;
        }

        let file = writer
            .into_inner()
            .map_err(|e| write_err(csv::Error::from(e.into_error())))?;
        file.sync_all().map_err(|e| write_err(csv::Error::from(e)))?;
        Ok(())
    }
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".partial");
    path.with_file_name(name)
}

/// Read a table written by [`TableWriter`] back into records.
///
/// This is the downstream reader contract: `datetime` must parse as a
/// date-time at the start of `date`, and `text` keeps its literal `\n` escapes.
pub fn read_table(path: &Path, delimiter: u8) -> Result<Vec<PlenaryMinutes>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("Failed to open table {}", path.display()))?;

    let headers = reader.headers()?;
    if headers.iter().ne(COLUMNS) {
        return Err(anyhow!(
            "Unexpected header in {}: {:?}",
            path.display(),
            headers
        ));
    }

    let mut records = Vec::new();
    for (index, row) in reader.deserialize::<OwnedRow>().enumerate() {
        let row = row.with_context(|| format!("Invalid row {} in {}", index + 1, path.display()))?;

        let date = NaiveDate::parse_from_str(&row.date, DATE_FORMAT)
            .with_context(|| format!("Invalid date `{}` in row {}", row.date, index + 1))?;
        let datetime = NaiveDateTime::parse_from_str(&row.datetime, DATETIME_FORMAT)
            .with_context(|| format!("Invalid datetime `{}` in row {}", row.datetime, index + 1))?;

        let pm = PlenaryMinutes::new(
            row.title,
            date,
            row.text,
            row.period,
            row.doc_type,
            row.period_number,
        )?;
        if pm.datetime != datetime {
            return Err(anyhow!(
                "Row {}: datetime {} is not the start of {}",
                index + 1,
                datetime,
                date
            ));
        }
        records.push(pm);
    }

    Ok(records)
}
