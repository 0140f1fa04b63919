//! Exclusive rebuild lock.
//!
//! An advisory lock on `.rebuild.lock`, held through the open file. The
//! kernel drops it when the process exits, so a killed rebuild never leaves
//! the store locked. The file itself stays in place between rebuilds.

use std::fs::{File, OpenOptions, TryLockError};
use std::io::{Seek, Write};
use std::path::{Path, PathBuf};

use super::error::{StoreError, StoreResult};

pub(crate) const LOCK_FILE: &str = ".rebuild.lock";

/// Held for the duration of a rebuild; the lock is released on drop.
#[derive(Debug)]
pub(crate) struct RebuildLock {
    path: PathBuf,
    file: File,
}

impl RebuildLock {
    /// Lock `root/.rebuild.lock`, failing fast if another rebuild holds it.
    pub(crate) fn acquire(root: &Path) -> StoreResult<Self> {
        let path = root.join(LOCK_FILE);
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        match file.try_lock() {
            Ok(()) => {}
            Err(TryLockError::WouldBlock) => return Err(StoreError::RebuildInProgress(path)),
            Err(TryLockError::Error(e)) => return Err(e.into()),
        }

        // Owner pid, for humans inspecting the file
        file.set_len(0)?;
        file.rewind()?;
        writeln!(file, "{}", std::process::id())?;

        tracing::debug!(target: "store", "acquired {}", path.display());
        Ok(Self { path, file })
    }
}

impl Drop for RebuildLock {
    fn drop(&mut self) {
        if let Err(e) = self.file.unlock() {
            tracing::warn!(
                target: "store",
                "failed to unlock {}: {e}",
                self.path.display()
            );
        }
    }
}
