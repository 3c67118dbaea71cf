use std::fs;
use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::Parser;
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use paperfetch::batch::BatchDriver;
use paperfetch::error::PaperError;
use paperfetch::mirror::{DEFAULT_MIRROR_BASE, MirrorHttpClient};
use paperfetch::record::{clean_raw_csv, decode_records};
use paperfetch::store::Store;

#[derive(Parser)]
#[command(name = "paperfetch")]
#[command(about = "Batch-fetches documents for a bibliographic CSV export via a mirror service")]
#[command(version, author)]
struct Cli {
    /// Bibliographic CSV export to ingest.
    #[arg(long, default_value = "artikelen.csv")]
    input: Utf8PathBuf,

    /// Directory that receives the downloaded documents.
    #[arg(long, default_value = ".")]
    out_dir: Utf8PathBuf,

    /// Follow-up report for records that could not be processed.
    #[arg(long, default_value = "artikelen_todo.txt")]
    report: Utf8PathBuf,

    /// Mirror base URL used for identifier lookups.
    #[arg(long, default_value = DEFAULT_MIRROR_BASE)]
    mirror: String,

    /// Print a JSON run summary to stdout.
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(err) = report.downcast_ref::<PaperError>() {
            return ExitCode::from(map_exit_code(err));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &PaperError) -> u8 {
    match error {
        PaperError::InputRead(_) | PaperError::CsvStructure(_) => 2,
        PaperError::MirrorHttp(_) => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let raw = fs::read_to_string(cli.input.as_std_path())
        .map_err(|_| PaperError::InputRead(cli.input.clone().into_std_path_buf()))?;
    let clean = clean_raw_csv(&raw);
    let records = decode_records(&clean)?;
    tracing::info!(total = records.len(), input = %cli.input, "decoded records");

    let mirror = MirrorHttpClient::new(&cli.mirror)?;
    let store = Store::new(cli.out_dir.clone());
    let driver = BatchDriver::new(mirror, store);
    let summary = driver.run(&records, &cli.report)?;

    tracing::info!(
        stored = summary.stored.len(),
        failed = summary.failed.len(),
        report = %cli.report,
        "batch complete"
    );

    if cli.json {
        let json = serde_json::to_string_pretty(&summary).into_diagnostic()?;
        println!("{json}");
    }
    Ok(())
}
