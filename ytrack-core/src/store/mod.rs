//! Persistence of series tables.

mod table;

pub use table::CsvStore;

use std::fs::{self, File};
use std::path::Path;

use tempfile::NamedTempFile;
use ytrack_types::{SeriesKey, YtrackError};

use crate::frame::Series;

/// Loads and stores series by identity.
///
/// Implementations replace the whole table on `store`; a failed store must
/// leave the previous table intact.
pub trait SeriesStore: Send + Sync {
    /// The persisted series for `key`, or `None` if it was never stored.
    ///
    /// # Errors
    /// Returns `CorruptSeries` if a table exists but cannot be read back, or
    /// `Io` on filesystem failure.
    fn load(&self, key: &SeriesKey) -> Result<Option<Series>, YtrackError>;

    /// Replace the persisted table for `series.key` with `series`.
    ///
    /// # Errors
    /// Returns `Io` if the table could not be written.
    fn store(&self, series: &Series) -> Result<(), YtrackError>;
}

/// Write `path` through a temporary file in the same directory, then rename
/// it into place.
///
/// A failure before the rename leaves any existing file untouched.
///
/// # Errors
/// Returns `Io` on filesystem failure, or whatever `write` returns.
pub fn write_atomic<F>(path: &Path, write: F) -> Result<(), YtrackError>
where
    F: FnOnce(&mut File) -> Result<(), YtrackError>,
{
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir).map_err(|e| YtrackError::io(dir, e))?;
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| YtrackError::io(dir, e))?;
    write(tmp.as_file_mut())?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| YtrackError::io(tmp.path(), e))?;
    tmp.persist(path).map_err(|e| YtrackError::io(path, e.error))?;
    Ok(())
}
