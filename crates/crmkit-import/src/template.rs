//! Sample CSV templates.

use std::io::Write;

use crmkit_core::{PipelineError, PipelineResult};

use crate::profile::ImportProfile;

/// Write the profile's sample headers and rows to `writer`, quoting where needed.
pub fn write_template<W: Write>(profile: &ImportProfile, writer: W) -> PipelineResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    let to_internal =
        |e: csv::Error| PipelineError::Internal(format!("Failed to write template: {}", e));

    csv_writer
        .write_record(profile.sample_headers)
        .map_err(to_internal)?;
    for row in profile.sample_rows {
        csv_writer.write_record(*row).map_err(to_internal)?;
    }
    csv_writer
        .flush()
        .map_err(|e| PipelineError::Internal(format!("Failed to write template: {}", e)))?;
    Ok(())
}

/// Render the profile's sample CSV as a string.
pub fn render_template(profile: &ImportProfile) -> PipelineResult<String> {
    let mut buffer = Vec::new();
    write_template(profile, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| PipelineError::Internal(e.to_string()))
}
