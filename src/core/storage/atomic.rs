//! Atomic file replacement.
//!
//! Records are written to a uniquely named temporary file in the
//! destination directory, synced, then renamed over the target. A
//! reader sees either the previous record or the new one, never a
//! partial write, and concurrent writers to the same target resolve
//! to whichever rename lands last.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use tokio_util::sync::CancellationToken;

use crate::core::error::{DoctreeError, Result};

/// Prefix of in-flight temporary files; readers skip these
pub const TEMP_PREFIX: &str = ".doctree-";

/// Atomically replace `path` with `contents`
///
/// Cancellation is honoured up to the final rename. A cancelled write
/// removes its temporary file and leaves any existing record intact.
pub fn atomic_write(cancel: &CancellationToken, path: &Path, contents: &[u8]) -> Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| DoctreeError::InvalidPath(format!("no parent: {}", path.display())))?;
    fs::create_dir_all(dir).map_err(|e| DoctreeError::io(dir, e))?;

    let mut temp = tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| DoctreeError::io(dir, e))?;

    {
        let mut writer = BufWriter::new(temp.as_file_mut());
        writer
            .write_all(contents)
            .and_then(|_| writer.flush())
            .map_err(|e| DoctreeError::io(path, e))?;
    }
    temp.as_file()
        .sync_all()
        .map_err(|e| DoctreeError::io(path, e))?;

    if cancel.is_cancelled() {
        return Err(DoctreeError::Cancelled);
    }

    temp.persist(path)
        .map_err(|e| DoctreeError::io(path, e.error))?;

    Ok(())
}
