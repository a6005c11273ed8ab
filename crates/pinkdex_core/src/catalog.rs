//! Catalog file access.
//!
//! A catalog is a text file with one [`DexLine`] per line:
//!
//! ```text
//! <dir>/
//! ├─ pinkdex           # the catalog
//! ├─ pinkdex.lock      # advisory lock for single-writer
//! └─ pinkdex.tmp       # present only while a save is in flight
//! ```
//!
//! The lock file ensures only one process edits a catalog at a time.

use crate::config::DexConfig;
use crate::dex::{AddOutcome, Dex};
use crate::error::{CoreError, CoreResult};
use fs2::FileExt;
use pinkdex_codec::{CodecError, DexLine, ShelfcodeGrammar};
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// A catalog line that could not be loaded.
#[derive(Debug)]
pub struct LineError {
    /// One-based line number in the source.
    pub line_number: usize,
    /// The line as read, without its newline.
    pub text: String,
    /// Why it was rejected.
    pub error: CoreError,
}

impl fmt::Display for LineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {} ({:?})", self.line_number, self.error, self.text)
    }
}

/// Reads catalog lines into a new collection.
///
/// Blank lines are skipped. A line that is not UTF-8, fails to parse, fails
/// to merge, or holds no copies is reported and loading continues with the
/// next one.
///
/// # Errors
///
/// Returns an I/O error if reading fails.
pub fn read_catalog<R: BufRead>(
    reader: R,
    grammar: &ShelfcodeGrammar,
    config: DexConfig,
) -> CoreResult<(Dex, Vec<LineError>)> {
    let mut dex = Dex::new(config);
    let mut errors = Vec::new();

    for (i, raw) in reader.split(b'\n').enumerate() {
        let mut raw = raw?;
        if raw.last() == Some(&b'\r') {
            raw.pop();
        }
        let (text, result) = match String::from_utf8(raw) {
            Ok(text) => {
                if text.trim().is_empty() {
                    continue;
                }
                let result = DexLine::parse(&text, grammar)
                    .map_err(CoreError::from)
                    .and_then(|line| dex.add(line))
                    .and_then(|outcome| match outcome {
                        AddOutcome::Dropped => Err(CoreError::NoCopies),
                        _ => Ok(()),
                    });
                (text, result)
            }
            Err(err) => (
                String::from_utf8_lossy(err.as_bytes()).into_owned(),
                Err(CodecError::malformed_line("not valid UTF-8").into()),
            ),
        };
        if let Err(error) = result {
            warn!(line_number = i + 1, error = %error, "rejected catalog line");
            errors.push(LineError {
                line_number: i + 1,
                text,
                error,
            });
        }
    }
    Ok((dex, errors))
}

/// An open, locked catalog file.
///
/// # Thread Safety
///
/// A `CatalogFile` holds an exclusive lock on its catalog. Only one
/// instance can exist per catalog at a time, across processes.
#[derive(Debug)]
pub struct CatalogFile {
    /// Catalog path.
    path: PathBuf,
    /// Lock file handle (held for exclusive access).
    _lock_file: File,
}

impl CatalogFile {
    /// Opens a catalog, taking its lock.
    ///
    /// The catalog itself need not exist yet; loading a missing catalog
    /// yields an empty collection.
    ///
    /// # Errors
    ///
    /// Returns `CatalogLocked` if another holder has the lock, or an I/O
    /// error if the lock file cannot be created.
    pub fn open(path: &Path) -> CoreResult<Self> {
        let lock_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(lock_path(path))?;

        // Non-blocking
        if lock_file.try_lock_exclusive().is_err() {
            return Err(CoreError::CatalogLocked);
        }

        Ok(Self {
            path: path.to_path_buf(),
            _lock_file: lock_file,
        })
    }

    /// Path to the catalog.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the catalog.
    ///
    /// See [`read_catalog`] for how bad lines are handled.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the catalog exists but cannot be read.
    pub fn load(
        &self,
        grammar: &ShelfcodeGrammar,
        config: DexConfig,
    ) -> CoreResult<(Dex, Vec<LineError>)> {
        if !self.path.exists() {
            info!(path = %self.path.display(), "catalog missing; starting empty");
            return Ok((Dex::new(config), Vec::new()));
        }

        let reader = BufReader::new(File::open(&self.path)?);
        let (dex, errors) = read_catalog(reader, grammar, config)?;
        info!(
            path = %self.path.display(),
            lines = dex.len(),
            rejected = errors.len(),
            "catalog loaded"
        );
        Ok((dex, errors))
    }

    /// Sorts and atomically writes a collection to the catalog.
    ///
    /// # Errors
    ///
    /// As for [`Dex::save`].
    pub fn save(&self, dex: &mut Dex, progress: impl FnMut(usize)) -> CoreResult<()> {
        dex.save(&self.path, progress)
    }
}

fn lock_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".lock");
    path.with_file_name(name)
}
