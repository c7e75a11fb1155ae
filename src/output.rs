//! Output destinations for the merged header.
//!
//! `-` (or an empty path) means stdout. Anything else is written through a
//! temporary file in the destination directory that is renamed over the
//! target only after every byte has been written, so a failed run never
//! leaves a partial or corrupt header behind.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::Builder;

/// Where the merged header goes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Destination {
    Stdout,
    File(PathBuf),
}

impl Destination {
    /// Interpret a command-line output argument.
    #[must_use]
    pub fn from_arg(arg: &str) -> Self {
        if arg.is_empty() || arg == "-" {
            Self::Stdout
        } else {
            Self::File(PathBuf::from(arg))
        }
    }

    /// Write `contents` to this destination.
    ///
    /// # Errors
    /// Returns the I/O error from writing, syncing, or the final rename. On
    /// error the temporary file is removed and the target is left untouched.
    pub fn commit(&self, contents: &[u8]) -> io::Result<()> {
        match self {
            Self::Stdout => {
                let mut out = io::stdout().lock();
                out.write_all(contents)?;
                out.flush()
            }
            Self::File(path) => write_atomic(path, contents),
        }
    }
}

/// Write `contents` to `path` via write-to-temp + fsync + rename.
///
/// # Errors
/// See [`Destination::commit`].
pub fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut tmp = Builder::new().prefix("tmp-").tempfile_in(dir)?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    tracing::debug!(path = %path.display(), bytes = contents.len(), "output committed");
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
