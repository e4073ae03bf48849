use crmkit_core::{log_error, Credential, CsvRow, PipelineError, PipelineResult};
use std::io::Read;

use crate::parser::CsvBatch;
use crate::profile::ImportProfile;
use crate::submit::{BulkSubmitter, SubmitSummary};

/// One import flow: pick a file, inspect the preview, submit.
///
/// Loading a new file always discards the previous batch first, so a failed
/// load leaves nothing to preview or submit.
#[derive(Debug)]
pub struct ImportSession {
    profile: ImportProfile,
    batch: Option<CsvBatch>,
}

impl ImportSession {
    pub fn new(profile: ImportProfile) -> Self {
        Self {
            profile,
            batch: None,
        }
    }

    pub fn profile(&self) -> &ImportProfile {
        &self.profile
    }

    pub fn load<R: Read>(&mut self, reader: R) -> PipelineResult<&CsvBatch> {
        self.batch = None;
        match CsvBatch::parse(reader, self.profile.required_headers) {
            Ok(batch) => Ok(self.batch.insert(batch)),
            Err(err) => {
                log_error(&err, "csv_load");
                Err(err)
            }
        }
    }

    pub fn batch(&self) -> Option<&CsvBatch> {
        self.batch.as_ref()
    }

    /// Up to five rows of the loaded batch; empty when nothing valid is loaded.
    pub fn preview(&self) -> &[CsvRow] {
        self.batch.as_ref().map(CsvBatch::preview).unwrap_or(&[])
    }

    pub fn row_count(&self) -> usize {
        self.batch.as_ref().map_or(0, CsvBatch::len)
    }

    /// Submit the loaded batch. On success the session is cleared.
    pub async fn submit(
        &mut self,
        submitter: &BulkSubmitter,
        credential: &Credential,
    ) -> PipelineResult<SubmitSummary> {
        let batch = self.batch.as_ref().ok_or(PipelineError::NothingToSubmit)?;
        let summary = submitter.submit(&self.profile, batch, credential).await?;
        self.batch = None;
        Ok(summary)
    }

    pub fn clear(&mut self) {
        self.batch = None;
    }
}
