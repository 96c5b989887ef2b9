//! Rewrite passes and the registry they are looked up from.
//!
//! A pass takes the full text of a seed file and returns the full new text
//! together with a report. Passes never fail on unmatched input: anything
//! they don't recognise is passed through unchanged.

pub mod annotate;
pub mod conflict;
pub mod references;

use indexmap::IndexMap;
use std::path::Path;

use crate::config::ToolConfig;
use crate::error::SeedError;
use crate::lookup::LookupTable;
use crate::report::PassReport;

pub use annotate::CodeAnnotator;
pub use conflict::{ConflictInjector, ConflictRule};
pub use references::ReferenceRewriter;

/// Result of running one pass over a text
#[derive(Debug, Clone)]
pub struct PassOutcome {
    pub text: String,
    pub report: PassReport,
}

/// Trait for whole-text rewrite passes
pub trait Pass: Send + Sync {
    /// Name the pass is registered and invoked under
    fn name(&self) -> &'static str;

    /// Transform `input`, returning the new text and a report
    fn apply(&self, input: &str) -> PassOutcome;

    /// Console lines printed after the pass changed a file
    fn confirmation(&self, path: &Path, report: &PassReport) -> Vec<String>;
}

/// Registry of passes, kept in registration order
pub struct PassRegistry {
    passes: IndexMap<String, Box<dyn Pass>>,
}

impl PassRegistry {
    /// Create a new empty pass registry
    pub fn new() -> Self {
        Self {
            passes: IndexMap::new(),
        }
    }

    /// Registry holding the three seed passes, configured from `config`
    pub fn with_defaults(config: &ToolConfig, lookup: LookupTable) -> Result<Self, SeedError> {
        let mut registry = Self::new();
        registry.register(Box::new(CodeAnnotator::new()?));
        registry.register(Box::new(ConflictInjector::new(config.conflict_rules.clone())?));
        registry.register(Box::new(ReferenceRewriter::new(lookup)?));
        Ok(registry)
    }

    /// Register a pass under its own name, replacing any pass of that name
    pub fn register(&mut self, pass: Box<dyn Pass>) {
        self.passes.insert(pass.name().to_string(), pass);
    }

    pub fn get(&self, name: &str) -> Result<&dyn Pass, SeedError> {
        self.passes
            .get(name)
            .map(|pass| pass.as_ref())
            .ok_or_else(|| SeedError::UnknownPass(name.to_string()))
    }

    /// Check if a pass is registered
    pub fn has_pass(&self, name: &str) -> bool {
        self.passes.contains_key(name)
    }

    /// Names of all registered passes, in registration order
    pub fn list_passes(&self) -> Vec<&str> {
        self.passes.keys().map(String::as_str).collect()
    }
}

impl Default for PassRegistry {
    fn default() -> Self {
        Self::new()
    }
}
