//! Validation modules

pub mod guard;

pub use guard::{check_size, content_type_for_path, MediaPolicy};
