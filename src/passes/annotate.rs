//! Code annotator: copies entity codes from comments into INSERT statements.
//!
//! ```sql
//! -- A-1: Water
//! INSERT INTO products (name, unit) VALUES ('Water', 'ml');
//! ```
//!
//! becomes
//!
//! ```sql
//! -- A-1: Water
//! INSERT INTO products (code, name, unit) VALUES ('A-1', 'Water', 'ml');
//! ```

use regex::Regex;
use std::path::Path;

use super::{Pass, PassOutcome};
use crate::entity::{EntityCode, EntityKind, CODE_PATTERN};
use crate::error::SeedError;
use crate::report::PassReport;

/// Statement whose header was rewritten but whose VALUES tuple hasn't been
/// reached yet. Lines are held back in both forms so the statement can be
/// emitted untouched if it ends without a tuple.
#[derive(Debug)]
struct Held {
    code: EntityCode,
    kind: EntityKind,
    original: String,
    rewritten: String,
    bare_values: bool,
}

/// State threaded through the line loop.
///
/// A code remembered from a comment is consumed by the first INSERT header
/// of a targeted table, then injected into that statement's VALUES tuple.
#[derive(Debug)]
enum Cursor {
    Idle,
    Remembered(EntityCode),
    Held(Held),
    /// Header already carries a code column; its tuple passes through.
    PassThrough { bare_values: bool },
}

pub struct CodeAnnotator {
    comment: Regex,
    header: Regex,
    values_open: Regex,
    bare_values: Regex,
    coded_tuple: Regex,
}

impl CodeAnnotator {
    pub fn new() -> Result<Self, SeedError> {
        Ok(Self {
            comment: Regex::new(&format!(r"^--\s*({}):", CODE_PATTERN))?,
            header: Regex::new(
                r"^\s*INSERT INTO\s+(?P<table>\w+)\s*\(\s*(?P<coded>code\s*,\s*)?(?P<name>name)\s*[,)]",
            )?,
            values_open: Regex::new(r"\bVALUES\s*\(")?,
            bare_values: Regex::new(r"\bVALUES\s*$")?,
            coded_tuple: Regex::new(&format!(r"^\s*'{}'\s*,", CODE_PATTERN))?,
        })
    }

    /// Insert `'code', ` right after the tuple paren at `paren`, unless the
    /// tuple already leads with a code. Returns whether the line changed.
    fn inject(&self, line: &mut String, paren: usize, code: &str) -> bool {
        let after = paren + 1;
        if self.coded_tuple.is_match(&line[after..]) {
            return false;
        }
        line.insert_str(after, &format!("'{}', ", code));
        true
    }

    /// Offset of the opening paren of a VALUES tuple on this line, if any
    fn tuple_paren(&self, line: &str, bare_values: bool) -> Option<usize> {
        if bare_values {
            let trimmed = line.trim_start();
            if trimmed.starts_with('(') {
                return Some(line.len() - trimmed.len());
            }
            return None;
        }
        self.values_open.find(line).map(|m| m.end() - 1)
    }

    /// Line outside any statement we're tracking
    fn scan(
        &self,
        cursor: Cursor,
        raw: &str,
        line_no: usize,
        output: &mut String,
        report: &mut PassReport,
    ) -> Cursor {
        let comment_code = self
            .comment
            .captures(raw)
            .and_then(|caps| caps[1].parse::<EntityCode>().ok());

        if let Some(code) = comment_code {
            if let Cursor::Remembered(previous) = cursor {
                tracing::debug!(line = line_no, code = %previous, "code overwritten before use");
                report.misses.push(previous.to_string());
            }
            output.push_str(raw);
            return Cursor::Remembered(code);
        }

        let header = self.header.captures(raw).and_then(|caps| {
            let kind = EntityKind::from_table(&caps["table"])?;
            let name_at = caps.name("name")?.start();
            Some((kind, caps.name("coded").is_some(), name_at))
        });

        let Some((kind, already_coded, name_at)) = header else {
            output.push_str(raw);
            return cursor;
        };

        if already_coded {
            report.skipped += 1;
            output.push_str(raw);
            return self.pass_through(raw, false);
        }

        match cursor {
            Cursor::Remembered(code) => {
                let mut line = raw.to_string();
                line.insert_str(name_at, "code, ");
                tracing::debug!(line = line_no, code = %code, table = kind.table(), "annotating insert");
                if code.kind() != kind {
                    tracing::warn!(line = line_no, code = %code, table = kind.table(), "code prefix belongs to another kind of entity");
                }

                let held = Held {
                    code,
                    kind,
                    original: String::new(),
                    rewritten: String::new(),
                    bare_values: false,
                };
                self.advance(held, raw, line, line_no, output, report)
            }
            other => {
                tracing::debug!(line = line_no, table = kind.table(), "insert without a preceding code");
                output.push_str(raw);
                other
            }
        }
    }

    /// Feed one more line of a held statement; `line` is `raw` with any
    /// header rewrite already applied.
    fn advance(
        &self,
        mut held: Held,
        raw: &str,
        mut line: String,
        line_no: usize,
        output: &mut String,
        report: &mut PassReport,
    ) -> Cursor {
        held.original.push_str(raw);

        match self.tuple_paren(&line, held.bare_values) {
            Some(paren) => {
                if self.inject(&mut line, paren, held.code.as_str()) {
                    report.rewritten += 1;
                    report.bump(held.kind.table());
                } else {
                    report.skipped += 1;
                }
                held.rewritten.push_str(&line);
                output.push_str(&held.rewritten);
                Cursor::Idle
            }
            None if line.contains(';') => {
                tracing::debug!(line = line_no, code = %held.code, "statement ended before a VALUES tuple");
                output.push_str(&held.original);
                report.misses.push(held.code.to_string());
                Cursor::Idle
            }
            None => {
                if !held.bare_values && self.bare_values.is_match(&line) {
                    held.bare_values = true;
                }
                held.rewritten.push_str(&line);
                Cursor::Held(held)
            }
        }
    }

    /// Track an already-annotated statement until its tuple or terminator
    fn pass_through(&self, line: &str, bare_values: bool) -> Cursor {
        if self.tuple_paren(line, bare_values).is_some() || line.contains(';') {
            Cursor::Idle
        } else {
            Cursor::PassThrough {
                bare_values: bare_values || self.bare_values.is_match(line),
            }
        }
    }
}

impl Pass for CodeAnnotator {
    fn name(&self) -> &'static str {
        "annotate"
    }

    fn apply(&self, input: &str) -> PassOutcome {
        let mut report = PassReport::new(self.name());
        let mut output = String::with_capacity(input.len() + 64);
        let mut cursor = Cursor::Idle;

        for (index, raw) in input.split_inclusive('\n').enumerate() {
            let line_no = index + 1;

            cursor = match cursor {
                Cursor::Held(held) => {
                    self.advance(held, raw, raw.to_string(), line_no, &mut output, &mut report)
                }
                Cursor::PassThrough { bare_values } => {
                    output.push_str(raw);
                    self.pass_through(raw, bare_values)
                }
                other => self.scan(other, raw, line_no, &mut output, &mut report),
            };
        }

        match cursor {
            Cursor::Remembered(code) => report.misses.push(code.to_string()),
            Cursor::Held(held) => {
                output.push_str(&held.original);
                report.misses.push(held.code.to_string());
            }
            _ => {}
        }

        report.changed = output != input;
        tracing::info!(
            rewritten = report.rewritten,
            skipped = report.skipped,
            unused_codes = report.misses.len(),
            "annotate pass finished"
        );

        PassOutcome {
            text: output,
            report,
        }
    }

    fn confirmation(&self, path: &Path, _report: &PassReport) -> Vec<String> {
        vec![
            format!("✅ Added code fields to {}", path.display()),
            "✅ Updated products, preparations, and recipes with codes from comments".to_string(),
        ]
    }
}
