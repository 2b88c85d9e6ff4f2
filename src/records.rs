use csv::StringRecord;
use log::debug;
use std::{fs::File, path::Path};

use crate::error::{Error, Result};

/// Column layout of `inspections_cleaned.csv`.
pub const INSPECTION_CITY: usize = 3;
pub const INSPECTION_SCORE: usize = 16;
pub const INSPECTION_SERIAL: usize = 17;

/// Column layout of `violations.csv`.
pub const VIOLATION_SERIAL: usize = 1;
pub const VIOLATION_CODE: usize = 2;

/// The two digit code sits at these character positions of the composite code field.
const CODE_SLICE: std::ops::Range<usize> = 3..5;

#[derive(Debug, PartialEq, Clone)]
pub struct InspectionRecord {
    pub serial: String,
    pub city: String,
    pub score: u32,
}

#[derive(Debug, PartialEq, Clone)]
pub struct ViolationRecord {
    pub serial: String,
    pub code: u32,
}

pub fn read_inspections<P: AsRef<Path>>(path: P) -> Result<Vec<InspectionRecord>> {
    let path = path.as_ref();
    let records = decode_rows(path, INSPECTION_CITY, |row| {
        Ok(InspectionRecord {
            city: row.field(INSPECTION_CITY)?.to_owned(),
            score: row.parse_u32(INSPECTION_SCORE, row.field(INSPECTION_SCORE)?)?,
            serial: row.field(INSPECTION_SERIAL)?.to_owned(),
        })
    })?;

    debug!("decoded {} inspection rows from {}", records.len(), path.display());
    Ok(records)
}

pub fn read_violations<P: AsRef<Path>>(path: P) -> Result<Vec<ViolationRecord>> {
    let path = path.as_ref();
    let records = decode_rows(path, VIOLATION_SERIAL, |row| {
        let serial = strip_outer(row.field(VIOLATION_SERIAL)?).to_owned();
        let code_field = row.field(VIOLATION_CODE)?;
        let code = code_field
            .get(CODE_SLICE)
            .ok_or_else(|| Error::FieldTooShort {
                file: path.to_owned(),
                line: row.line,
                column: VIOLATION_CODE,
                value: code_field.to_owned(),
            })?;
        Ok(ViolationRecord {
            serial,
            code: row.parse_u32(VIOLATION_CODE, code)?,
        })
    })?;

    debug!("decoded {} violation rows from {}", records.len(), path.display());
    Ok(records)
}

/// Decodes every row after the header, stopping at the first failure.
///
/// The CSV reader passes over empty lines, so a jump in line numbers between
/// rows is reported as a row lacking `first_column`.
fn decode_rows<T>(
    path: &Path,
    first_column: usize,
    decode: impl Fn(&Row) -> Result<T>,
) -> Result<Vec<T>> {
    let mut rdr = reader(path)?;
    // The header is line 1.
    let mut next_line = 2;
    let mut decoded = Vec::new();

    for record in rdr.records() {
        let row = Row::new(path, record?);
        if row.line > next_line {
            return Err(Error::MissingColumn {
                file: path.to_owned(),
                line: next_line,
                column: first_column,
            });
        }
        next_line = row.line + 1;
        decoded.push(decode(&row)?);
    }

    Ok(decoded)
}

// Plain comma splitting: quotes are data, so a quoted field containing a comma
// shifts every later column.
fn reader(path: &Path) -> Result<csv::Reader<File>> {
    Ok(csv::ReaderBuilder::new()
        .has_headers(true)
        .quoting(false)
        .flexible(true)
        .from_path(path)?)
}

/// Drops the first and last character, which wrap the serial in quotes.
fn strip_outer(s: &str) -> &str {
    let mut chars = s.chars();
    if chars.next().is_none() || chars.next_back().is_none() {
        return "";
    }
    chars.as_str()
}

struct Row<'a> {
    file: &'a Path,
    line: u64,
    record: StringRecord,
}

impl<'a> Row<'a> {
    fn new(file: &'a Path, record: StringRecord) -> Self {
        let line = record.position().map_or(0, |p| p.line());
        Self { file, line, record }
    }

    fn field(&self, column: usize) -> Result<&str> {
        self.record.get(column).ok_or_else(|| Error::MissingColumn {
            file: self.file.to_owned(),
            line: self.line,
            column,
        })
    }

    fn parse_u32(&self, column: usize, value: &str) -> Result<u32> {
        value
            .trim()
            .parse::<u32>()
            .map_err(|source| Error::InvalidInteger {
                file: self.file.to_owned(),
                line: self.line,
                column,
                value: value.to_owned(),
                source,
            })
    }
}
