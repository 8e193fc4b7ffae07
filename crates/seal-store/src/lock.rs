use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use fs2::FileExt;
use tracing::debug;

use crate::error::{StoreError, StoreResult};

const RETRY_INTERVAL: Duration = Duration::from_millis(10);

/// Exclusive write access to a chain store.
///
/// For file stores this is an OS advisory lock on `<chain>.lock`. The kernel
/// drops it with the file handle, so a writer that dies mid-append never
/// blocks later writers. The lock file itself stays on disk and only records
/// the pid of the last holder.
#[derive(Debug)]
pub struct StoreLock {
    held: Option<(PathBuf, File)>,
}

impl StoreLock {
    /// A lock with nothing on disk, for backends guarded in memory.
    pub fn in_process() -> Self {
        Self { held: None }
    }

    /// Lock `path` exclusively, retrying until `timeout` elapses.
    pub fn acquire(path: &Path, timeout: Duration) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        let started = Instant::now();
        loop {
            match FileExt::try_lock_exclusive(&file) {
                Ok(()) => break,
                Err(e) if is_contended(&e) => {
                    if started.elapsed() >= timeout {
                        return Err(StoreError::Locked(path.to_path_buf()));
                    }
                    thread::sleep(RETRY_INTERVAL);
                }
                Err(e) => return Err(e.into()),
            }
        }

        // The pid is informational; a failed write does not give up the lock.
        if file.set_len(0).is_ok() {
            let _ = writeln!(file, "{}", std::process::id());
        }
        debug!(lock = %path.display(), "store lock acquired");
        Ok(Self {
            held: Some((path.to_path_buf(), file)),
        })
    }

    /// The lock file, if this lock has one.
    pub fn path(&self) -> Option<&Path> {
        self.held.as_ref().map(|(path, _)| path.as_path())
    }
}

fn is_contended(e: &io::Error) -> bool {
    e.kind() == io::ErrorKind::WouldBlock
        || e.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        // Closing the handle releases the lock.
        if let Some((path, _)) = self.held.take() {
            debug!(lock = %path.display(), "store lock released");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_file_records_holder_and_outlives_the_lock() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chain.json.lock");

        let lock = StoreLock::acquire(&path, Duration::ZERO).unwrap();
        assert_eq!(lock.path(), Some(path.as_path()));

        drop(lock);
        let pid = fs::read_to_string(&path).unwrap();
        assert_eq!(pid.trim(), std::process::id().to_string());
        let again = StoreLock::acquire(&path, Duration::ZERO).unwrap();
        assert_eq!(again.path(), Some(path.as_path()));
    }

    #[test]
    fn leftover_lock_file_does_not_block() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chain.json.lock");
        fs::write(&path, "999999\n").unwrap();

        let lock = StoreLock::acquire(&path, Duration::ZERO).unwrap();
        drop(lock);
        let pid = fs::read_to_string(&path).unwrap();
        assert_eq!(pid.trim(), std::process::id().to_string());
    }

    #[test]
    fn second_acquire_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chain.json.lock");

        let _held = StoreLock::acquire(&path, Duration::ZERO).unwrap();
        let err = StoreLock::acquire(&path, Duration::from_millis(30)).unwrap_err();
        assert!(matches!(err, StoreError::Locked(p) if p == path));
    }

    #[test]
    fn waiter_gets_lock_after_release() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chain.json.lock");

        let held = StoreLock::acquire(&path, Duration::ZERO).unwrap();
        let waiter_path = path.clone();
        let waiter = thread::spawn(move || {
            StoreLock::acquire(&waiter_path, Duration::from_secs(5)).map(|_| ())
        });
        thread::sleep(Duration::from_millis(50));
        drop(held);
        assert!(waiter.join().unwrap().is_ok());
    }

    #[test]
    fn in_process_lock_has_no_file() {
        assert!(StoreLock::in_process().path().is_none());
    }
}
