//! Batch orchestration: discovery, loading, normalization, concatenation and
//! output, in that order, on a single worker.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

use serde::Serialize;
use tracing::{debug, instrument};

use crate::aideon::merge::concat::concatenate;
use crate::aideon::merge::error::{MergeError, Result};
use crate::aideon::merge::events::EventEmitter;
use crate::aideon::merge::io::discovery::discover_inputs;
use crate::aideon::merge::io::excel_read::load_table;
use crate::aideon::merge::io::excel_write::write_merged;
use crate::aideon::merge::model::Table;
use crate::aideon::merge::normalize::normalize;
use crate::aideon::merge::options::MergeOptions;

/// Number of labels listed in the schema summary event.
const SCHEMA_PREVIEW: usize = 5;

/// Everything needed to run one batch.
#[derive(Debug, Clone)]
pub struct BatchRequest {
    pub input_dir: PathBuf,
    pub output: PathBuf,
    pub options: MergeOptions,
}

impl BatchRequest {
    pub fn new(input_dir: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output: output.into(),
            options: MergeOptions::default(),
        }
    }

    pub fn with_options(mut self, options: MergeOptions) -> Self {
        self.options = options;
        self
    }
}

/// Outcome of a successful batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeSummary {
    pub output: PathBuf,
    pub files_total: usize,
    pub files_merged: usize,
    pub files_failed: usize,
    pub files_empty: usize,
    /// Tables passed through without widening.
    pub tables_degraded: usize,
    pub rows: usize,
    pub columns: usize,
}

/// Runs merge batches, at most one at a time.
///
/// Clones share the same in-flight flag, so a front end can hand a clone to
/// each caller and still get exclusivity.
#[derive(Debug, Clone, Default)]
pub struct BatchRunner {
    active: Arc<AtomicBool>,
}

/// Marks a runner busy until dropped.
struct ActiveBatch {
    active: Arc<AtomicBool>,
}

impl Drop for ActiveBatch {
    fn drop(&mut self) {
        self.active.store(false, Ordering::Release);
    }
}

impl BatchRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    fn claim(&self) -> Result<ActiveBatch> {
        self.active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| MergeError::BatchInProgress)?;
        Ok(ActiveBatch {
            active: Arc::clone(&self.active),
        })
    }

    /// Runs a batch on the calling thread.
    pub fn run(&self, request: &BatchRequest, events: &EventEmitter) -> Result<MergeSummary> {
        let _active = self.claim()?;
        run_batch(request, events)
    }

    /// Runs a batch on a dedicated worker thread.
    ///
    /// The runner is claimed before the thread starts, so a second call made
    /// while the worker is alive is rejected with
    /// [`MergeError::BatchInProgress`]. The emitter is dropped when the batch
    /// ends, which closes a channel-backed sink.
    pub fn spawn(
        &self,
        request: BatchRequest,
        events: EventEmitter,
    ) -> Result<JoinHandle<Result<MergeSummary>>> {
        let active = self.claim()?;
        let handle = thread::Builder::new()
            .name("merge-batch".to_string())
            .spawn(move || {
                let _active = active;
                run_batch(&request, &events)
            })?;
        Ok(handle)
    }
}

/// Waits for a spawned batch and flattens a worker panic into an error.
pub fn join_batch(handle: JoinHandle<Result<MergeSummary>>) -> Result<MergeSummary> {
    handle.join().map_err(|_| MergeError::WorkerPanicked)?
}

fn run_batch(request: &BatchRequest, events: &EventEmitter) -> Result<MergeSummary> {
    let result = execute(request, events);
    if let Err(err) = &result {
        events.error(format!("Merge failed: {err}"));
    }
    result
}

#[instrument(
    level = "info",
    skip_all,
    fields(input = %request.input_dir.display(), output = %request.output.display())
)]
fn execute(request: &BatchRequest, events: &EventEmitter) -> Result<MergeSummary> {
    let files = discover_inputs(&request.input_dir, Some(&request.output))?;
    if files.is_empty() {
        return Err(MergeError::NoInputFiles(request.input_dir.clone()));
    }
    events.info(format!("Found {} spreadsheet file(s)", files.len()));

    let loaded = load_all(&files, events);
    if loaded.tables.is_empty() {
        return Err(MergeError::BatchEmpty {
            directory: request.input_dir.clone(),
            attempted: files.len(),
        });
    }

    events.info("Normalizing columns...");
    let first_header = loaded.tables[0].labels();
    let normalized = normalize(&loaded.tables);
    let schema = normalized.schema.labels();
    events.info(format!("Columns detected: {}", schema.len()));
    let preview = schema
        .iter()
        .take(SCHEMA_PREVIEW)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    let ellipsis = if schema.len() > SCHEMA_PREVIEW { "..." } else { "" };
    events.info(format!("Columns: {preview}{ellipsis}"));

    for (index, (source, table)) in loaded.tables.iter().zip(&normalized.tables).enumerate() {
        if normalized.is_degraded(index) {
            continue;
        }
        events.info(format!(
            "{} normalized: {} -> {} columns",
            source.name,
            source.column_count(),
            table.column_count()
        ));
    }
    for (index, err) in &normalized.degraded {
        events.warning(format!(
            "Could not normalize {}, merging it unchanged: {err}",
            loaded.tables[*index].name
        ));
    }

    events.info("Merging data...");
    let merged = concatenate(&normalized, &request.options, &first_header);
    debug!(rows = merged.row_count, "merge computed");

    events.info("Saving merged workbook...");
    write_merged(&request.output, &merged)?;

    events.success("Merge completed successfully");
    events.success(format!("Saved to {}", request.output.display()));
    events.success(format!("Total rows: {}", merged.row_count));
    events.success(format!("Total columns: {}", merged.column_count()));

    Ok(MergeSummary {
        output: request.output.clone(),
        files_total: files.len(),
        files_merged: loaded.tables.len(),
        files_failed: loaded.failed,
        files_empty: loaded.empty,
        tables_degraded: normalized.degraded.len(),
        rows: merged.row_count,
        columns: merged.column_count(),
    })
}

struct Loaded {
    tables: Vec<Table>,
    failed: usize,
    empty: usize,
}

fn load_all(files: &[PathBuf], events: &EventEmitter) -> Loaded {
    let total = files.len();
    let mut loaded = Loaded {
        tables: Vec::with_capacity(total),
        failed: 0,
        empty: 0,
    };

    for (index, path) in files.iter().enumerate() {
        let name = display_name(path);
        events.info(format!("Processing {name}"));
        match load_table(path) {
            Ok(table) if table.is_empty() => {
                events.warning(format!("Skipping empty file {name}"));
                loaded.empty += 1;
            }
            Ok(table) => {
                events.success(format!(
                    "{name}: {} rows, {} columns",
                    table.row_count,
                    table.column_count()
                ));
                loaded.tables.push(table);
            }
            Err(err) => {
                events.error(format!("Failed to read {name}: {err}"));
                loaded.failed += 1;
            }
        }
        events.progress(index + 1, total);
    }

    loaded
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
