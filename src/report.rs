use std::fs;

use camino::Utf8Path;

use crate::batch::Failure;
use crate::error::PaperError;

/// Writes the follow-up report: one block per failed record with the
/// fields needed to chase it down manually, blocks separated by a blank
/// line. An empty batch still produces an (empty) report file.
pub fn write_report(path: &Utf8Path, failures: &[Failure]) -> Result<(), PaperError> {
    let blocks: Vec<String> = failures.iter().map(format_block).collect();
    fs::write(path.as_std_path(), blocks.join("\n"))
        .map_err(|_| PaperError::Report(path.as_std_path().to_path_buf()))
}

fn format_block(failure: &Failure) -> String {
    let record = &failure.record;
    format!(
        "{}\n{}\n{}\n{}\n{}\n",
        record.title, record.year, record.authors, record.journal, record.url
    )
}
