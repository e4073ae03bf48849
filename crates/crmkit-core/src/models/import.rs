use std::collections::BTreeMap;

/// One parsed CSV record: column name to raw string value.
pub type CsvRow = BTreeMap<String, String>;
