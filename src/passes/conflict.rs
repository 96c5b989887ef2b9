//! Conflict-clause injector: appends `ON CONFLICT ... DO NOTHING` to INSERTs.
//!
//! Each rule names a table and, optionally, the key column the clause is
//! keyed on. Keyed rules only match statements whose column list starts with
//! the key column; unkeyed rules cover relational tables and match any INSERT
//! into the table.

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{Pass, PassOutcome};
use crate::error::SeedError;
use crate::report::PassReport;

/// Rest of a statement: quoted literals (with `''` escapes) or any other
/// non-terminator character, then the terminator
const STATEMENT_TAIL: &str = r"(?:'(?:[^']|'')*'|[^;'])*;";

/// One table targeted by the injector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictRule {
    pub table: String,

    /// Conflict target column; `None` emits an unkeyed `ON CONFLICT DO NOTHING`
    #[serde(default)]
    pub key: Option<String>,
}

impl ConflictRule {
    pub fn keyed(table: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            key: Some(key.into()),
        }
    }

    pub fn unkeyed(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            key: None,
        }
    }

    /// Rules used when the tool config doesn't list any
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::keyed("products", "code"),
            Self::keyed("preparations", "code"),
            Self::unkeyed("preparation_ingredients"),
            Self::unkeyed("recipe_components"),
        ]
    }

    pub fn clause(&self) -> String {
        match &self.key {
            Some(key) => format!("ON CONFLICT ({}) DO NOTHING", key),
            None => "ON CONFLICT DO NOTHING".to_string(),
        }
    }

    /// Statement pattern: from `INSERT INTO <table>` up to the first `;`
    /// outside a quoted literal
    fn pattern(&self) -> String {
        let table = regex::escape(&self.table);
        match &self.key {
            Some(key) => format!(
                r"INSERT INTO\s+{}\s*\(\s*{}\s*[,)]{}",
                table,
                regex::escape(key),
                STATEMENT_TAIL
            ),
            None => format!(r"INSERT INTO\s+{}\b{}", table, STATEMENT_TAIL),
        }
    }
}

pub struct ConflictInjector {
    rules: Vec<(ConflictRule, Regex)>,
}

impl ConflictInjector {
    pub fn new(rules: Vec<ConflictRule>) -> Result<Self, SeedError> {
        let rules = rules
            .into_iter()
            .map(|rule| {
                let re = Regex::new(&rule.pattern())?;
                Ok((rule, re))
            })
            .collect::<Result<Vec<_>, SeedError>>()?;

        Ok(Self { rules })
    }
}

impl Pass for ConflictInjector {
    fn name(&self) -> &'static str {
        "add-conflicts"
    }

    fn apply(&self, input: &str) -> PassOutcome {
        let mut report = PassReport::new(self.name());
        let mut text = input.to_string();

        for (rule, re) in &self.rules {
            let clause = rule.clause();
            let rewritten = re.replace_all(&text, |caps: &Captures| {
                let statement = &caps[0];
                if statement.to_ascii_uppercase().contains("ON CONFLICT") {
                    report.skipped += 1;
                    return statement.to_string();
                }

                report.rewritten += 1;
                report.bump(&rule.table);
                let body = statement[..statement.len() - 1].trim_end();
                format!("{} {};", body, clause)
            });
            text = rewritten.into_owned();
        }

        report.changed = text != input;
        tracing::info!(
            rewritten = report.rewritten,
            skipped = report.skipped,
            "add-conflicts pass finished"
        );

        PassOutcome { text, report }
    }

    fn confirmation(&self, path: &Path, report: &PassReport) -> Vec<String> {
        let mut lines = vec![format!("✅ Added ON CONFLICT clauses to {}", path.display())];
        for (table, count) in &report.counts {
            lines.push(format!("   {} {} statements", count, table));
        }
        lines
    }
}
