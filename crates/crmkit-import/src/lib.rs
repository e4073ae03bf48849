//! crmkit CSV bulk import
//!
//! Parses a CSV file against an [`ImportProfile`], exposes a short preview
//! and submits every row to the profile's bulk endpoint in one request.

pub mod parser;
pub mod profile;
pub mod session;
pub mod submit;
pub mod template;

pub use parser::{CsvBatch, PREVIEW_ROWS};
pub use profile::{ImportProfile, CUSTOMERS, LEADS, USER_LEADS};
pub use session::ImportSession;
pub use submit::{BulkSubmitter, SubmitSummary};
pub use template::{render_template, write_template};
