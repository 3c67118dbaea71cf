use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use tracing::{info, warn};

use crate::error::{FailureKind, PaperError};
use crate::mirror::MirrorClient;
use crate::record::Record;
use crate::report;
use crate::store::Store;

/// A record that could not be fully processed, retained for the
/// follow-up report.
#[derive(Debug, Clone)]
pub struct Failure {
    pub record: Record,
    pub kind: FailureKind,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub stored: Vec<String>,
    pub failed: Vec<FailedEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FailedEntry {
    pub title: String,
    pub identifier_field: String,
    pub kind: String,
    pub reason: String,
}

/// Drives the whole batch: identifier extraction, resolution, download and
/// storage per record, with every per-record failure isolated. Records are
/// processed strictly in input order, one at a time.
pub struct BatchDriver<M: MirrorClient> {
    mirror: M,
    store: Store,
}

impl<M: MirrorClient> BatchDriver<M> {
    pub fn new(mirror: M, store: Store) -> Self {
        Self { mirror, store }
    }

    /// Processes every record and writes the follow-up report, which is
    /// always produced, even when empty. Only fatal filesystem problems
    /// propagate; a failing record never stops the batch.
    pub fn run(
        &self,
        records: &[Record],
        report_path: &Utf8Path,
    ) -> Result<BatchSummary, PaperError> {
        self.store.ensure_out_dir()?;
        let total = records.len();
        let mut stored = Vec::new();
        // Failures accumulate as an explicit fold over the input sequence,
        // so the report order is the input order.
        let mut failures: Vec<Failure> = Vec::new();

        for (index, record) in records.iter().enumerate() {
            info!(index, total, title = %record.title, "processing record");
            match self.process(record) {
                Ok(path) => {
                    info!(path = %path, "stored document");
                    stored.push(path.to_string());
                }
                Err(kind) => {
                    warn!(reason = %kind, title = %record.title, "record failed");
                    failures.push(Failure {
                        record: record.clone(),
                        kind,
                    });
                }
            }
        }

        report::write_report(report_path, &failures)?;

        let failed = failures
            .into_iter()
            .map(|failure| FailedEntry {
                title: failure.record.title.to_string(),
                identifier_field: failure.record.url.to_string(),
                kind: failure.kind.label().to_string(),
                reason: failure.kind.to_string(),
            })
            .collect();
        Ok(BatchSummary {
            total,
            stored,
            failed,
        })
    }

    fn process(&self, record: &Record) -> Result<Utf8PathBuf, FailureKind> {
        let doi = record.doi().ok_or(FailureKind::MissingIdentifier)?;
        let resolved = self.mirror.resolve(&doi)?;
        if let Some(title) = &resolved.title {
            info!(%title, "found document");
        }
        let payload = self.mirror.download(&resolved.download_url)?;
        self.store.save_document(record, &payload)
    }
}
