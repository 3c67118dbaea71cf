use std::fmt;

use csv::ReaderBuilder;
use regex::Regex;

use crate::domain::Doi;
use crate::error::PaperError;

/// Field layout of the export. Header names in the input file are not
/// trusted; this static schema is authoritative. Cells beyond the schema
/// are a mess in the source data and are discarded.
pub const SCHEMA: [&str; 15] = [
    "key", "title", "year", "month", "day", "journal", "issn", "volume", "issue", "pages",
    "authors", "url", "language", "publisher", "location",
];

/// One decoded cell. Cells in the export pack zero, one or several
/// sub-values, so every consumer has to match on the shape explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Absent,
    Scalar(String),
    Multi(Vec<String>),
}

impl FieldValue {
    pub fn is_absent(&self) -> bool {
        matches!(self, FieldValue::Absent)
    }

    /// First sub-value, if any.
    pub fn first(&self) -> Option<&str> {
        match self {
            FieldValue::Absent => None,
            FieldValue::Scalar(value) => Some(value),
            FieldValue::Multi(values) => values.first().map(String::as_str),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Absent => Ok(()),
            FieldValue::Scalar(value) => write!(f, "{value}"),
            FieldValue::Multi(values) => write!(f, "{}", values.join("; ")),
        }
    }
}

/// One bibliographic entry, decoded from a single input line.
/// Immutable after decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub key: FieldValue,
    pub title: FieldValue,
    pub year: FieldValue,
    pub month: FieldValue,
    pub day: FieldValue,
    pub journal: FieldValue,
    pub issn: FieldValue,
    pub volume: FieldValue,
    pub issue: FieldValue,
    pub pages: FieldValue,
    pub authors: FieldValue,
    pub url: FieldValue,
    pub language: FieldValue,
    pub publisher: FieldValue,
    pub location: FieldValue,
}

impl Record {
    /// Extracts the record's identifier, when one is usable.
    ///
    /// The url cell carries a display label followed by the DOI when the
    /// exporter knew one, so only a multi-valued cell with a second entry
    /// qualifies. Everything else means "no identifier".
    pub fn doi(&self) -> Option<Doi> {
        match &self.url {
            FieldValue::Multi(entries) if entries.len() >= 2 => entries[1].parse().ok(),
            _ => None,
        }
    }
}

/// Repairs the raw export before CSV parsing: drops the stray quote some
/// lines start with and collapses doubled quotes to single ones.
pub fn clean_raw_csv(raw: &str) -> String {
    let leading_quote = Regex::new("(?m)^\"").unwrap();
    let cleaned = leading_quote.replace_all(raw, "");
    cleaned.replace("\"\"", "\"")
}

/// Decodes pre-cleaned CSV text into records. The first line is a header
/// and is discarded. A line that cannot be tokenized as CSV aborts the
/// batch: the schema assumption is violated, not just one record.
pub fn decode_records(clean: &str) -> Result<Vec<Record>, PaperError> {
    // Sub-values inside a cell are separated by runs of spaces wide enough
    // to never occur in prose.
    let splitter = Regex::new(r" {2,}").unwrap();
    let mut records = Vec::new();
    for line in clean.lines().skip(1) {
        if line.trim().is_empty() {
            continue;
        }
        let tokens = tokenize_line(line)?;
        records.push(build_record(&tokens, &splitter));
    }
    Ok(records)
}

fn tokenize_line(line: &str) -> Result<Vec<String>, PaperError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes());
    let mut row = csv::StringRecord::new();
    let got = reader
        .read_record(&mut row)
        .map_err(|err| PaperError::CsvStructure(err.to_string()))?;
    if !got {
        return Err(PaperError::CsvStructure(format!("unparseable line: {line}")));
    }
    Ok(row.iter().map(str::to_string).collect())
}

fn build_record(tokens: &[String], splitter: &Regex) -> Record {
    let fields: [FieldValue; SCHEMA.len()] = std::array::from_fn(|position| {
        tokens
            .get(position)
            .map_or(FieldValue::Absent, |token| decode_cell(token, splitter))
    });
    let [key, title, year, month, day, journal, issn, volume, issue, pages, authors, url, language, publisher, location] =
        fields;
    Record {
        key,
        title,
        year,
        month,
        day,
        journal,
        issn,
        volume,
        issue,
        pages,
        authors,
        url,
        language,
        publisher,
        location,
    }
}

fn decode_cell(cell: &str, splitter: &Regex) -> FieldValue {
    let cell = cell.strip_suffix(';').unwrap_or(cell);
    let mut values = Vec::new();
    for piece in splitter.split(cell) {
        let piece = piece.trim();
        let piece = piece.strip_suffix(';').unwrap_or(piece).trim();
        if !piece.is_empty() {
            values.push(piece.to_string());
        }
    }
    if values.is_empty() {
        FieldValue::Absent
    } else if values.len() == 1 {
        FieldValue::Scalar(values.remove(0))
    } else {
        FieldValue::Multi(values)
    }
}
