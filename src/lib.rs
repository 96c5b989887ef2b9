//! # Seedcodes: rewrite passes for SQL seed files
//!
//! Seedcodes mutates a SQL seed file in place with three regex-driven passes:
//!
//! - **annotate**: copies entity codes from comment lines (`-- A-1: Water`)
//!   into the following INSERT as a leading `code` column and value
//! - **add-conflicts**: appends `ON CONFLICT ... DO NOTHING` to INSERTs for
//!   configured tables
//! - **rewrite-refs**: turns `WHERE code = 'R-7'` into `WHERE name = 'TomYum'`
//!   using a YAML lookup table
//!
//! ## Example: lookup table
//!
//! ```yaml
//! recipes:
//!   7: TomYum
//! preparations:
//!   P-16: Tuna portion 150g
//! products:
//!   A-1: Water
//! ```
//!
//! ## Example: running passes
//!
//! ```ignore
//! use seedcodes::{run_passes, LookupTable, PassRegistry, RunOptions, ToolConfig};
//!
//! let config = ToolConfig::default();
//! let registry = PassRegistry::with_defaults(&config, LookupTable::builtin()?)?;
//! let names = vec!["annotate".to_string(), "rewrite-refs".to_string()];
//! let summary = run_passes(&registry, &names, "seed.sql".as_ref(), RunOptions::default())?;
//! ```

// Core modules
pub mod entity;
pub mod error;
pub mod lookup;
pub mod report;

// Passes and the registry they're looked up from
pub mod passes;

// File handling and configuration
pub mod config;
pub mod runner;
pub mod seed_file;

// Re-export key types
pub use config::ToolConfig;
pub use entity::{EntityCode, EntityKind};
pub use error::SeedError;
pub use lookup::LookupTable;
pub use passes::{
    CodeAnnotator, ConflictInjector, ConflictRule, Pass, PassOutcome, PassRegistry,
    ReferenceRewriter,
};
pub use report::{NdjsonWriter, PassReport};
pub use runner::{run_passes, RunOptions, RunSummary};
pub use seed_file::SeedFile;
