//! Reference rewriter: turns `WHERE code = 'X'` into `WHERE name = 'Y'`.
//!
//! Names come from the lookup table. A code the table doesn't know leaves
//! the predicate exactly as written.

use indexmap::IndexMap;
use regex::{Captures, Regex};
use std::path::Path;

use super::{Pass, PassOutcome};
use crate::entity::EntityKind;
use crate::error::SeedError;
use crate::lookup::LookupTable;
use crate::report::PassReport;

pub struct ReferenceRewriter {
    lookup: LookupTable,
    predicate: Regex,
    inserts: Vec<(EntityKind, Regex)>,
}

impl ReferenceRewriter {
    pub fn new(lookup: LookupTable) -> Result<Self, SeedError> {
        let inserts = EntityKind::ALL
            .into_iter()
            .map(|kind| {
                let re = Regex::new(&format!(
                    r"INSERT INTO\s+{}\s*(?:\((?P<cols>[^)]*)\))?\s*VALUES\s*\(\s*'(?P<first>[^']*)'(?:\s*,\s*'(?P<second>[^']*)')?",
                    regex::escape(kind.table())
                ))?;
                Ok((kind, re))
            })
            .collect::<Result<Vec<_>, SeedError>>()?;

        Ok(Self {
            lookup,
            predicate: Regex::new(r"WHERE code\s*=\s*'([^']+)'")?,
            inserts,
        })
    }

    /// Names inserted per entity kind, in file order.
    ///
    /// The name is the literal aligned with the `name` column: the second
    /// value when the column list leads with `code`, the first otherwise.
    pub fn collect_names(&self, text: &str) -> IndexMap<EntityKind, Vec<String>> {
        self.inserts
            .iter()
            .map(|(kind, re)| {
                let names = re
                    .captures_iter(text)
                    .filter_map(|caps| {
                        let coded = caps
                            .name("cols")
                            .map(|cols| {
                                cols.as_str()
                                    .split(',')
                                    .next()
                                    .map(str::trim)
                                    == Some("code")
                            })
                            .unwrap_or(false);
                        let name = if coded {
                            caps.name("second")
                        } else {
                            caps.name("first")
                        };
                        name.map(|m| m.as_str().to_string())
                    })
                    .collect();
                (*kind, names)
            })
            .collect()
    }
}

impl Pass for ReferenceRewriter {
    fn name(&self) -> &'static str {
        "rewrite-refs"
    }

    fn apply(&self, input: &str) -> PassOutcome {
        let mut report = PassReport::new(self.name());

        for (kind, names) in self.collect_names(input) {
            tracing::debug!(table = kind.table(), found = names.len(), "collected names");
            report.counts.insert(kind.label().to_string(), names.len());
        }

        let text = self
            .predicate
            .replace_all(input, |caps: &Captures| {
                let code = &caps[1];
                match self.lookup.resolve(code) {
                    Some(name) => {
                        report.rewritten += 1;
                        format!("WHERE name = '{}'", name.replace('\'', "''"))
                    }
                    None => {
                        tracing::warn!(code, "no name recorded for code, predicate left unchanged");
                        report.misses.push(code.to_string());
                        caps[0].to_string()
                    }
                }
            })
            .into_owned();

        report.changed = text != input;
        tracing::info!(
            rewritten = report.rewritten,
            misses = report.misses.len(),
            "rewrite-refs pass finished"
        );

        PassOutcome { text, report }
    }

    fn confirmation(&self, path: &Path, report: &PassReport) -> Vec<String> {
        let mut lines: Vec<String> = report
            .counts
            .iter()
            .map(|(label, count)| format!("Found {} {}", count, label))
            .collect();
        lines.push(String::new());
        lines.push("✅ Replaced all WHERE code = 'X' with WHERE name = 'Y'".to_string());
        lines.push(format!("✅ Updated {}", path.display()));
        lines
    }
}
