use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::aideon::merge::error::Result;

/// Label of the provenance column unless configured otherwise.
pub const DEFAULT_SOURCE_COLUMN: &str = "Source_File";

/// Options controlling how a batch is merged.
///
/// Serialised with camelCase keys so an options document reads
/// `{"addSourceColumn": false, "ignoreHeaders": true}`. Missing keys take
/// their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct MergeOptions {
    /// Append a column holding each row's source file name.
    pub add_source_column: bool,
    /// Relabel the merged header positionally with the first source's labels.
    pub ignore_headers: bool,
    /// Label of the provenance column.
    pub source_column_name: String,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            add_source_column: true,
            ignore_headers: false,
            source_column_name: DEFAULT_SOURCE_COLUMN.to_string(),
        }
    }
}

impl MergeOptions {
    /// Reads an options document from disk.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }
}
