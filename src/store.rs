use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use chrono::Utc;

use crate::error::{FailureKind, PaperError};
use crate::record::Record;

/// Local storage for fetched documents.
#[derive(Debug, Clone)]
pub struct Store {
    out_dir: Utf8PathBuf,
}

impl Store {
    pub fn new(out_dir: Utf8PathBuf) -> Self {
        Self { out_dir }
    }

    pub fn out_dir(&self) -> &Utf8Path {
        &self.out_dir
    }

    pub fn ensure_out_dir(&self) -> Result<(), PaperError> {
        fs::create_dir_all(self.out_dir.as_std_path())
            .map_err(|err| PaperError::Filesystem(err.to_string()))
    }

    /// Writes the document payload in one shot under a name derived from
    /// the record. If the derived name is already taken (same first author
    /// and year earlier in the run), a high-resolution timestamp is
    /// appended. Not atomic; good enough for a single-process batch.
    pub fn save_document(&self, record: &Record, payload: &[u8]) -> Result<Utf8PathBuf, FailureKind> {
        let stem = document_stem(record);
        let mut path = self.out_dir.join(format!("{stem}.pdf"));
        if path.as_std_path().exists() {
            path = self
                .out_dir
                .join(format!("{stem} {}.pdf", Utc::now().timestamp_micros()));
        }
        fs::write(path.as_std_path(), payload)
            .map_err(|err| FailureKind::Storage(err.to_string()))?;
        Ok(path)
    }
}

/// Base filename for a record: first author plus year. Short and
/// human-recognizable, preferred over full sanitized titles.
pub fn document_stem(record: &Record) -> String {
    let author = record
        .authors
        .first()
        .map(first_author)
        .unwrap_or("unknown");
    let year = record.year.first().unwrap_or("undated");
    sanitize(&format!("{author} {year}"))
}

fn first_author(authors: &str) -> &str {
    authors.split(',').next().unwrap_or(authors).trim()
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|ch| if matches!(ch, '/' | '\\' | '\0') { '_' } else { ch })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::FieldValue;

    fn record_with(authors: FieldValue, year: FieldValue) -> Record {
        Record {
            key: FieldValue::Absent,
            title: FieldValue::Absent,
            year,
            month: FieldValue::Absent,
            day: FieldValue::Absent,
            journal: FieldValue::Absent,
            issn: FieldValue::Absent,
            volume: FieldValue::Absent,
            issue: FieldValue::Absent,
            pages: FieldValue::Absent,
            authors,
            url: FieldValue::Absent,
            language: FieldValue::Absent,
            publisher: FieldValue::Absent,
            location: FieldValue::Absent,
        }
    }

    #[test]
    fn stem_uses_first_comma_token_and_year() {
        let record = record_with(
            FieldValue::Scalar("Berg, P. van den, Smith, J.".to_string()),
            FieldValue::Scalar("2019".to_string()),
        );
        assert_eq!(document_stem(&record), "Berg 2019");
    }

    #[test]
    fn stem_takes_first_entry_of_multi_valued_authors() {
        let record = record_with(
            FieldValue::Multi(vec!["Curie, M.".to_string(), "Dirac, P.".to_string()]),
            FieldValue::Scalar("1931".to_string()),
        );
        assert_eq!(document_stem(&record), "Curie 1931");
    }

    #[test]
    fn stem_falls_back_when_fields_are_absent() {
        let record = record_with(FieldValue::Absent, FieldValue::Absent);
        assert_eq!(document_stem(&record), "unknown undated");
    }

    #[test]
    fn stem_sanitizes_path_separators() {
        let record = record_with(
            FieldValue::Scalar("A/B".to_string()),
            FieldValue::Scalar("2020".to_string()),
        );
        assert_eq!(document_stem(&record), "A_B 2020");
    }
}
