//! Pass reports and their NDJSON serialization.
//!
//! Every pass returns a `PassReport` next to the rewritten text. Reports can
//! be appended to a file as NDJSON, one JSON object per pass run.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use crate::error::SeedError;

/// Summary of one pass over one file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PassReport {
    /// Registered pass name
    pub pass: String,

    /// Seed file the pass ran against, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// Statements or predicates rewritten
    pub rewritten: usize,

    /// Matches left alone because they were already in the target form
    pub skipped: usize,

    /// Codes that could not be used (unresolved lookups, unconsumed comments)
    #[serde(default)]
    pub misses: Vec<String>,

    /// Per-table counters, in first-seen order
    #[serde(default)]
    pub counts: IndexMap<String, usize>,

    /// Whether the pass changed the text
    pub changed: bool,
}

impl PassReport {
    pub fn new(pass: impl Into<String>) -> Self {
        Self {
            pass: pass.into(),
            ..Default::default()
        }
    }

    pub fn bump(&mut self, key: &str) {
        *self.counts.entry(key.to_string()).or_insert(0) += 1;
    }

    pub fn count(&self, key: &str) -> usize {
        self.counts.get(key).copied().unwrap_or(0)
    }
}

/// NDJSON (Newline Delimited JSON) writer
///
/// Writes reports as NDJSON, one JSON object per line.
pub struct NdjsonWriter<W: Write> {
    writer: W,
}

impl<W: Write> NdjsonWriter<W> {
    /// Create a new NDJSON writer
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Write a single value as an NDJSON line
    pub fn write<T: Serialize>(&mut self, value: &T) -> Result<(), SeedError> {
        let json = serde_json::to_string(value)
            .map_err(|e| SeedError::Report(format!("JSON error: {}", e)))?;
        writeln!(self.writer, "{}", json)
            .map_err(|e| SeedError::Report(format!("IO error: {}", e)))?;
        Ok(())
    }

    /// Write multiple values
    pub fn write_all<T: Serialize>(&mut self, values: &[T]) -> Result<(), SeedError> {
        for value in values {
            self.write(value)?;
        }
        Ok(())
    }

    /// Flush the underlying writer
    pub fn flush(&mut self) -> Result<(), SeedError> {
        self.writer
            .flush()
            .map_err(|e| SeedError::Report(format!("IO error: {}", e)))
    }
}

/// Append reports to an NDJSON file, creating it if needed
pub fn append_reports<P: AsRef<Path>>(path: P, reports: &[PassReport]) -> Result<(), SeedError> {
    let path = path.as_ref();
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| SeedError::io(path, e))?;

    let mut writer = NdjsonWriter::new(file);
    writer.write_all(reports)?;
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_ndjson_writer() {
        let mut buf = Vec::new();
        let mut writer = NdjsonWriter::new(&mut buf);

        let mut first = PassReport::new("annotate");
        first.rewritten = 3;
        first.bump("products");
        let second = PassReport::new("rewrite-refs");

        writer.write(&first).unwrap();
        writer.write(&second).unwrap();
        writer.flush().unwrap();

        let output = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("\"pass\":\"annotate\""));
        assert!(lines[0].contains("\"products\":1"));
        assert!(lines[1].contains("rewrite-refs"));
    }

    #[test]
    fn test_append_reports_accumulates() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("reports.ndjson");

        append_reports(&path, &[PassReport::new("annotate")]).unwrap();
        append_reports(&path, &[PassReport::new("add-conflicts")]).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let reports: Vec<PassReport> = contents
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[1].pass, "add-conflicts");
    }

    #[test]
    fn test_bump_counts() {
        let mut report = PassReport::new("annotate");
        report.bump("recipes");
        report.bump("recipes");

        assert_eq!(report.count("recipes"), 2);
        assert_eq!(report.count("products"), 0);
    }
}
