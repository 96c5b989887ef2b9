//! Whole-file reads and in-place writes of seed files

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::SeedError;

/// A seed file read fully into memory
#[derive(Debug, Clone)]
pub struct SeedFile {
    path: PathBuf,
    contents: String,
}

impl SeedFile {
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self, SeedError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| SeedError::io(path, e))?;

        tracing::debug!(path = %path.display(), bytes = contents.len(), "read seed file");
        Ok(Self {
            path: path.to_path_buf(),
            contents,
        })
    }

    pub fn contents(&self) -> &str {
        &self.contents
    }

    /// Copy the contents as read to `<file>.bak`, returning the backup path
    pub fn backup(&self) -> Result<PathBuf, SeedError> {
        let backup = backup_path(&self.path);
        write_file(&backup, &self.contents).map_err(|e| SeedError::io(&backup, e))?;
        Ok(backup)
    }

    /// Overwrite the file with `contents`
    pub fn overwrite(&self, contents: &str) -> Result<(), SeedError> {
        write_file(&self.path, contents).map_err(|e| SeedError::io(&self.path, e))?;
        tracing::debug!(path = %self.path.display(), bytes = contents.len(), "wrote seed file");
        Ok(())
    }
}

/// `seed.sql` -> `seed.sql.bak`
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".bak");
    PathBuf::from(name)
}

/// Write content to a file, creating parent directories if needed
pub fn write_file<P: AsRef<Path>, C: AsRef<[u8]>>(path: P, contents: C) -> io::Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    fs::write(path, contents)
}
