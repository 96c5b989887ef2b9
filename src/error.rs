//! Error type shared by every pass and by the file runner.

use std::fmt;
use std::path::PathBuf;

/// Error type for seed file operations
#[derive(Debug)]
pub enum SeedError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Config(String),
    Lookup(String),
    Pattern(regex::Error),
    UnknownPass(String),
    Report(String),
}

impl SeedError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SeedError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<regex::Error> for SeedError {
    fn from(err: regex::Error) -> Self {
        SeedError::Pattern(err)
    }
}

impl fmt::Display for SeedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeedError::Io { path, source } => {
                write!(f, "I/O error on {}: {}", path.display(), source)
            }
            SeedError::Config(msg) => write!(f, "Config error: {}", msg),
            SeedError::Lookup(msg) => write!(f, "Lookup table error: {}", msg),
            SeedError::Pattern(e) => write!(f, "Invalid pattern: {}", e),
            SeedError::UnknownPass(name) => write!(f, "Pass not found: {}", name),
            SeedError::Report(msg) => write!(f, "Report error: {}", msg),
        }
    }
}

impl std::error::Error for SeedError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SeedError::Io { source, .. } => Some(source),
            SeedError::Pattern(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_names_the_path() {
        let err = SeedError::io(
            "/tmp/seed.sql",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        assert_eq!(err.to_string(), "I/O error on /tmp/seed.sql: missing");
    }

    #[test]
    fn test_unknown_pass_message() {
        let err = SeedError::UnknownPass("reorder".to_string());
        assert_eq!(err.to_string(), "Pass not found: reorder");
    }
}
