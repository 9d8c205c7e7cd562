use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

/// Name of the lock file inside the todo directory
pub const LOCK_FILE: &str = ".lock";

/// How long a writer waits for another `todo` process to finish.
pub const DEFAULT_WAIT: Duration = Duration::from_secs(5);

const POLL: Duration = Duration::from_millis(10);

/// Exclusive hold on the todo directory while one command rewrites its
/// files. Released when dropped. The `.lock` file stays behind, since a
/// waiting process may already have it open.
pub struct WriteLock {
    _file: File,
}

#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("cannot open {}: {source}", path.display())]
    Open { path: PathBuf, source: io::Error },
    #[error("todo directory is locked by another process (waited {}s on {})", waited.as_secs(), path.display())]
    Busy { path: PathBuf, waited: Duration },
}

impl WriteLock {
    /// Take the lock on `todo_dir`, polling until `wait` runs out.
    pub fn acquire(todo_dir: &Path, wait: Duration) -> Result<Self, LockError> {
        let path = todo_dir.join(LOCK_FILE);
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(|source| LockError::Open {
                path: path.clone(),
                source,
            })?;

        let deadline = Instant::now() + wait;
        while !try_exclusive(&file) {
            if Instant::now() >= deadline {
                return Err(LockError::Busy { path, waited: wait });
            }
            thread::sleep(POLL);
        }
        tracing::debug!(path = %path.display(), "holding write lock");
        Ok(WriteLock { _file: file })
    }

    pub fn acquire_default(todo_dir: &Path) -> Result<Self, LockError> {
        Self::acquire(todo_dir, DEFAULT_WAIT)
    }
}

/// Non-blocking `flock(LOCK_EX)`; false while someone else holds it.
#[cfg(unix)]
fn try_exclusive(file: &File) -> bool {
    use std::os::unix::io::AsRawFd;
    // SAFETY: the descriptor belongs to `file`, which outlives the call
    unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) == 0 }
}

#[cfg(not(unix))]
fn try_exclusive(_file: &File) -> bool {
    true
}
