use std::path::{Path, PathBuf};

use glob::glob;
use tracing::{debug, warn};

use crate::aideon::merge::error::{MergeError, Result};

/// Extensions picked up by discovery, in the order their matches are listed.
pub const SPREADSHEET_EXTENSIONS: [&str; 2] = ["xlsx", "xls"];

/// Lists the candidate spreadsheets directly inside `directory`.
///
/// All `*.xlsx` matches come first, then all `*.xls` matches, each group
/// sorted by path. Subdirectories are not searched. `exclude` removes one
/// path from the listing, typically the batch's own output file.
pub fn discover_inputs(directory: &Path, exclude: Option<&Path>) -> Result<Vec<PathBuf>> {
    if !directory.is_dir() {
        return Err(MergeError::MissingInput(directory.to_path_buf()));
    }

    let escaped = glob::Pattern::escape(&directory.to_string_lossy());
    let mut files = Vec::new();
    for extension in SPREADSHEET_EXTENSIONS {
        let pattern = format!("{escaped}/*.{extension}");
        let mut matches: Vec<PathBuf> = Vec::new();
        for entry in glob(&pattern)? {
            match entry {
                Ok(path) if path.is_file() => matches.push(path),
                Ok(_) => {}
                Err(err) => warn!(%err, "skipping unreadable directory entry"),
            }
        }
        matches.sort();
        files.extend(matches);
    }

    if let Some(excluded) = exclude {
        let before = files.len();
        files.retain(|path| !same_file(path, excluded));
        if files.len() != before {
            debug!(path = %excluded.display(), "output file excluded from inputs");
        }
    }

    debug!(file_count = files.len(), directory = %directory.display(), "inputs discovered");
    Ok(files)
}

fn same_file(lhs: &Path, rhs: &Path) -> bool {
    match (lhs.canonicalize(), rhs.canonicalize()) {
        (Ok(lhs), Ok(rhs)) => lhs == rhs,
        _ => lhs == rhs,
    }
}
