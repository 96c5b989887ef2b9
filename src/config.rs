//! Tool configuration loader.
//!
//! Settings come from three places, highest priority first: CLI flags,
//! environment variables (a `.env` file is read by the binary), and an
//! optional `seedcodes.yaml`. Relative paths inside the YAML file are
//! resolved against the directory the file lives in.

use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::SeedError;
use crate::lookup::LookupTable;
use crate::passes::ConflictRule;

/// Config file picked up from the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "seedcodes.yaml";

/// Environment variable naming the seed file
pub const SEED_FILE_ENV: &str = "SEEDCODES_SEED_FILE";

/// Environment variable naming the lookup file
pub const LOOKUP_ENV: &str = "SEEDCODES_LOOKUP";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolConfig {
    /// SQL seed file rewritten in place
    #[serde(default)]
    pub seed_file: Option<PathBuf>,

    /// YAML code -> name mapping for the reference rewriter
    #[serde(default)]
    pub lookup: Option<PathBuf>,

    /// Tables that receive conflict clauses
    #[serde(default = "ConflictRule::defaults")]
    pub conflict_rules: Vec<ConflictRule>,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            seed_file: None,
            lookup: None,
            conflict_rules: ConflictRule::defaults(),
        }
    }
}

/// Where a resolved setting came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Cli,
    Env,
    ConfigFile,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Cli => write!(f, "CLI flag"),
            Source::Env => write!(f, "environment"),
            Source::ConfigFile => write!(f, "config file"),
        }
    }
}

impl ToolConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    /// Returns `SeedError::Config` if the file can't be read or parsed.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, SeedError> {
        let path = path.as_ref();

        let contents = fs::read_to_string(path).map_err(|e| {
            SeedError::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;

        let mut config: ToolConfig = serde_yaml::from_str(&contents)
            .map_err(|e| SeedError::Config(format!("Failed to parse {}: {}", path.display(), e)))?;

        if let Some(base) = path.parent() {
            config.seed_file = config.seed_file.map(|p| rebase(base, p));
            config.lookup = config.lookup.map(|p| rebase(base, p));
        }

        for rule in &config.conflict_rules {
            if rule.table.trim().is_empty() {
                return Err(SeedError::Config(format!(
                    "{}: conflict rule with an empty table name",
                    path.display()
                )));
            }
        }

        Ok(config)
    }

    /// Load `explicit` if given, else `seedcodes.yaml` from the working
    /// directory if it exists, else defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, SeedError> {
        match explicit {
            Some(path) => Self::load_from_file(path),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.is_file() {
                    tracing::debug!("using {}", DEFAULT_CONFIG_FILE);
                    Self::load_from_file(fallback)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Seed file with precedence: CLI > `SEEDCODES_SEED_FILE` > config file
    pub fn resolve_seed_file(&self, cli: Option<PathBuf>) -> Result<PathBuf, SeedError> {
        let (path, source) = pick(cli, std::env::var_os(SEED_FILE_ENV), self.seed_file.clone())
            .ok_or_else(|| {
                SeedError::Config(format!(
                    "No seed file given. Pass --file, set {}, or set seed_file in {}",
                    SEED_FILE_ENV, DEFAULT_CONFIG_FILE
                ))
            })?;

        tracing::debug!(path = %path.display(), %source, "seed file");
        Ok(path)
    }

    /// Lookup table with precedence: CLI > `SEEDCODES_LOOKUP` > config file >
    /// the built-in table
    pub fn resolve_lookup(&self, cli: Option<PathBuf>) -> Result<LookupTable, SeedError> {
        match pick(cli, std::env::var_os(LOOKUP_ENV), self.lookup.clone()) {
            Some((path, source)) => {
                tracing::debug!(path = %path.display(), %source, "lookup table");
                LookupTable::load_from_file(&path)
            }
            None => {
                tracing::debug!("using built-in lookup table");
                LookupTable::builtin()
            }
        }
    }
}

fn rebase(base: &Path, path: PathBuf) -> PathBuf {
    if path.is_relative() {
        base.join(path)
    } else {
        path
    }
}

/// First present value in precedence order. Empty env values count as unset.
pub fn pick(
    cli: Option<PathBuf>,
    env: Option<OsString>,
    config: Option<PathBuf>,
) -> Option<(PathBuf, Source)> {
    if let Some(path) = cli {
        return Some((path, Source::Cli));
    }
    if let Some(value) = env.filter(|v| !v.is_empty()) {
        return Some((PathBuf::from(value), Source::Env));
    }
    config.map(|path| (path, Source::ConfigFile))
}
