//! CSV parsing and schema validation.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crmkit_core::{CsvRow, PipelineError, PipelineResult};

use crate::profile::ImportProfile;

/// Number of rows shown before submission.
pub const PREVIEW_ROWS: usize = 5;

/// Entries of `required` absent from `headers`, in `required` order.
pub(crate) fn missing_columns<S: AsRef<str>>(required: &[&str], headers: &[S]) -> Vec<String> {
    required
        .iter()
        .filter(|column| !headers.iter().any(|h| h.as_ref() == **column))
        .map(|column| column.to_string())
        .collect()
}

/// Rows parsed from one CSV file that passed the required-column check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvBatch {
    headers: Vec<String>,
    rows: Vec<CsvRow>,
}

impl CsvBatch {
    /// Parse `reader` and check that every `required` column is present.
    ///
    /// Blank lines are skipped. A row whose field count differs from the
    /// header row is a parse error, and the first parse error aborts the batch.
    pub fn parse<R: Read>(reader: R, required: &[&str]) -> PipelineResult<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let headers: Vec<String> = csv_reader
            .headers()
            .map_err(|e| PipelineError::CsvParseError(e.to_string()))?
            .iter()
            .map(str::to_string)
            .collect();

        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record.map_err(|e| PipelineError::CsvParseError(e.to_string()))?;
            let row: CsvRow = headers
                .iter()
                .cloned()
                .zip(record.iter().map(str::to_string))
                .collect();
            rows.push(row);
        }

        let missing = missing_columns(required, &headers);
        if !missing.is_empty() {
            return Err(PipelineError::CsvSchemaInvalid { missing });
        }

        tracing::debug!(
            columns = headers.len(),
            rows = rows.len(),
            "Parsed CSV batch"
        );

        Ok(Self { headers, rows })
    }

    pub fn parse_str(text: &str, required: &[&str]) -> PipelineResult<Self> {
        Self::parse(text.as_bytes(), required)
    }

    /// Parse a file from disk against a profile's required columns.
    pub fn from_path(path: impl AsRef<Path>, profile: &ImportProfile) -> PipelineResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            PipelineError::CsvParseError(format!("Cannot read {}: {}", path.display(), e))
        })?;
        Self::parse(file, profile.required_headers)
    }

    /// Headers in file order.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[CsvRow] {
        &self.rows
    }

    /// First [`PREVIEW_ROWS`] rows.
    pub fn preview(&self) -> &[CsvRow] {
        &self.rows[..self.rows.len().min(PREVIEW_ROWS)]
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
