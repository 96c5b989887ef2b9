//! Runs a sequence of passes over one seed file.
//!
//! The file is read once, every pass is applied to the previous pass's
//! output, and the result is written back once, only if something changed.

use std::path::{Path, PathBuf};

use crate::error::SeedError;
use crate::passes::PassRegistry;
use crate::report::PassReport;
use crate::seed_file::SeedFile;

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Transform and report without writing
    pub dry_run: bool,

    /// Copy the original to `<file>.bak` before writing
    pub backup: bool,
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub path: PathBuf,
    pub reports: Vec<PassReport>,
    pub written: bool,
    pub backup: Option<PathBuf>,
}

impl RunSummary {
    pub fn changed(&self) -> bool {
        self.reports.iter().any(|r| r.changed)
    }
}

/// Apply the named passes, in order, to the file at `path`.
///
/// Unknown pass names are rejected before the file is touched.
pub fn run_passes(
    registry: &PassRegistry,
    names: &[String],
    path: &Path,
    options: RunOptions,
) -> Result<RunSummary, SeedError> {
    let passes = names
        .iter()
        .map(|name| registry.get(name))
        .collect::<Result<Vec<_>, _>>()?;

    let seed = SeedFile::read(path)?;
    let mut text = seed.contents().to_string();
    let mut reports = Vec::with_capacity(passes.len());

    for pass in passes {
        let outcome = pass.apply(&text);
        let mut report = outcome.report;
        report.file = Some(path.display().to_string());
        text = outcome.text;
        reports.push(report);
    }

    let mut summary = RunSummary {
        path: path.to_path_buf(),
        reports,
        written: false,
        backup: None,
    };

    if !summary.changed() {
        tracing::info!(path = %path.display(), "no changes");
        return Ok(summary);
    }

    if options.dry_run {
        tracing::info!(path = %path.display(), "dry run, file left untouched");
        return Ok(summary);
    }

    if options.backup {
        summary.backup = Some(seed.backup()?);
    }
    seed.overwrite(&text)?;
    summary.written = true;

    Ok(summary)
}
