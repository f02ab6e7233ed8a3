use std::path::PathBuf;
use std::sync::mpsc;

use aideon_merge::batch::{BatchRequest, BatchRunner, MergeSummary, join_batch};
use aideon_merge::events::{BatchEvent, EventEmitter};
use aideon_merge::options::MergeOptions;
use aideon_merge::{MergeError, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = run(cli) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    init_logging(&cli.log_level)?;
    match cli.command {
        Command::Merge(args) => execute_merge(args),
    }
}

fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("aideon_merge={level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| MergeError::Logging(err.to_string()))
}

fn execute_merge(args: MergeArgs) -> Result<()> {
    if !args.input.is_dir() {
        return Err(MergeError::MissingInput(args.input));
    }

    let options = args.resolve_options()?;
    let request = BatchRequest::new(&args.input, &args.output).with_options(options);

    let (tx, rx) = mpsc::channel::<BatchEvent>();
    let runner = BatchRunner::new();
    let handle = runner.spawn(request, EventEmitter::new(tx))?;

    for event in rx {
        render(&event, args.events)?;
    }

    let summary = join_batch(handle)?;
    print_summary(&summary, args.events)
}

fn render(event: &BatchEvent, style: EventStyle) -> Result<()> {
    match style {
        EventStyle::Json => println!("{}", serde_json::to_string(event)?),
        EventStyle::Text => match event {
            BatchEvent::Status(status) => println!(
                "[{}] {:<7} {}",
                status.timestamp.format("%H:%M:%S"),
                status.level.to_string(),
                status.message
            ),
            BatchEvent::Progress(progress) => println!(
                "           progress {}/{} ({:.0}%)",
                progress.completed,
                progress.total,
                progress.percent()
            ),
        },
    }
    Ok(())
}

fn print_summary(summary: &MergeSummary, style: EventStyle) -> Result<()> {
    match style {
        EventStyle::Json => println!("{}", serde_json::to_string(summary)?),
        EventStyle::Text => {
            println!();
            println!("Merged {} of {} file(s)", summary.files_merged, summary.files_total);
            if summary.files_failed > 0 || summary.files_empty > 0 {
                println!(
                    "Skipped {} unreadable and {} empty file(s)",
                    summary.files_failed, summary.files_empty
                );
            }
            println!(
                "{} rows x {} columns written to {}",
                summary.rows,
                summary.columns,
                summary.output.display()
            );
        }
    }
    Ok(())
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Merge a folder of spreadsheets with differing columns into one workbook."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Diagnostic log level written to stderr (RUST_LOG takes precedence).
    /// Batch events are printed regardless.
    #[arg(long, global = true, default_value = "off")]
    log_level: String,
}

#[derive(Subcommand)]
enum Command {
    /// Merge every .xlsx and .xls file of a directory.
    Merge(MergeArgs),
}

#[derive(clap::Args)]
struct MergeArgs {
    /// Directory holding the spreadsheets to merge.
    #[arg(long)]
    input: PathBuf,

    /// Path of the merged workbook.
    #[arg(long)]
    output: PathBuf,

    /// JSON document with merge options; flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Do not append the source file name column.
    #[arg(long)]
    no_source_column: bool,

    /// Relabel the merged header with the first file's header.
    #[arg(long)]
    ignore_headers: bool,

    /// Label of the source file name column.
    #[arg(long)]
    source_column_name: Option<String>,

    /// How progress events are printed.
    #[arg(long, value_enum, default_value_t = EventStyle::Text)]
    events: EventStyle,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum EventStyle {
    Text,
    Json,
}

impl MergeArgs {
    fn resolve_options(&self) -> Result<MergeOptions> {
        let mut options = match &self.config {
            Some(path) => MergeOptions::from_json_file(path)?,
            None => MergeOptions::default(),
        };
        if self.no_source_column {
            options.add_source_column = false;
        }
        if self.ignore_headers {
            options.ignore_headers = true;
        }
        if let Some(name) = &self.source_column_name {
            options.source_column_name = name.clone();
        }
        Ok(options)
    }
}
