use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Lock file name inside the kanban directory
pub const LOCK_FILE: &str = ".lock";

/// How long writers wait for each other before giving up
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

const RETRY_EVERY: Duration = Duration::from_millis(10);

/// Exclusive advisory lock over a board's store.
///
/// Held for the whole of a write command so that two `kb` processes (say a
/// `kb add` and a running `kb remind --watch`) never interleave a
/// load-modify-save cycle. The flock goes away with the file handle. The lock
/// file itself stays on disk: unlinking it would let a waiter lock the orphaned
/// inode while a newcomer locks a fresh file at the same path.
pub struct FileLock {
    _file: File,
    path: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("could not open lock file {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("board is busy ({path} held for {waited:?}): another kb process may be writing")]
    Busy { path: PathBuf, waited: Duration },
}

impl FileLock {
    /// Take the lock on `kanban_dir`, retrying until `timeout` elapses
    pub fn acquire(kanban_dir: &Path, timeout: Duration) -> Result<Self, LockError> {
        let path = kanban_dir.join(LOCK_FILE);
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(|source| LockError::Open {
                path: path.clone(),
                source,
            })?;

        let started = Instant::now();
        while !try_flock(&file) {
            let waited = started.elapsed();
            if waited >= timeout {
                tracing::debug!(path = %path.display(), ?waited, "lock wait timed out");
                return Err(LockError::Busy { path, waited });
            }
            std::thread::sleep(RETRY_EVERY);
        }
        Ok(FileLock { _file: file, path })
    }

    pub fn acquire_default(kanban_dir: &Path) -> Result<Self, LockError> {
        Self::acquire(kanban_dir, DEFAULT_LOCK_TIMEOUT)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(unix)]
fn try_flock(file: &File) -> bool {
    use std::os::unix::io::AsRawFd;
    // SAFETY: the descriptor is owned by `file` and stays open for the call
    unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) == 0 }
}

// No flock outside Unix; writers are not serialized there
#[cfg(not(unix))]
fn try_flock(_file: &File) -> bool {
    true
}
