//! Filesystem infrastructure: implements `LocalFs` and `InstallLocker`.

use std::any::Any;
use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};

use crate::application::ports::InstallLocker;
use crate::domain::{InstallerError, hex_encode};

/// Production filesystem implementation of `LocalFs`.
pub struct LocalFs;

impl crate::application::ports::LocalFs for LocalFs {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn write(&self, path: &Path, content: &[u8]) -> Result<()> {
        std::fs::write(path, content).with_context(|| format!("writing file {}", path.display()))
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        match std::fs::remove_file(path) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => {
                Err(e).with_context(|| format!("removing {}", path.display()))
            }
            _ => Ok(()),
        }
    }
}

/// Lock file path for `install_path`, keyed by the SHA-256 of the path.
#[must_use]
pub fn lock_path(lock_dir: &Path, install_path: &Path) -> PathBuf {
    let digest = Sha256::digest(install_path.to_string_lossy().as_bytes());
    let hex = hex_encode(&digest);
    lock_dir.join(format!("shipctl-{}.lock", &hex[..16]))
}

/// Per-install-path lock held as an exclusive `flock` on a file in
/// `lock_dir`.
///
/// The kernel drops the lock with the descriptor, so a run killed by a
/// signal never leaves a lock behind. The file itself is left in place.
pub struct FileInstallLocker {
    lock_dir: PathBuf,
}

impl FileInstallLocker {
    #[must_use]
    pub fn new(lock_dir: PathBuf) -> Self {
        Self { lock_dir }
    }
}

/// Keeps the lock file open, and locked, until dropped.
pub struct LockGuard {
    #[cfg(unix)]
    _lock: nix::fcntl::Flock<File>,
    #[cfg(not(unix))]
    _file: File,
}

impl InstallLocker for FileInstallLocker {
    fn acquire(&self, install_path: &Path) -> Result<Box<dyn Any>> {
        let path = lock_path(&self.lock_dir, install_path);
        let file = std::fs::OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .with_context(|| format!("opening lock file {}", path.display()))?;

        #[cfg(unix)]
        let guard = {
            use nix::errno::Errno;
            use nix::fcntl::{Flock, FlockArg};

            match Flock::lock(file, FlockArg::LockExclusiveNonblock) {
                Ok(lock) => LockGuard { _lock: lock },
                Err((_, errno)) if errno == Errno::EWOULDBLOCK => {
                    return Err(InstallerError::InstallInProgress {
                        path: install_path.display().to_string(),
                        lock: path.display().to_string(),
                    }
                    .into());
                }
                Err((_, errno)) => {
                    return Err(std::io::Error::from(errno))
                        .with_context(|| format!("locking {}", path.display()));
                }
            }
        };
        #[cfg(not(unix))]
        let guard = LockGuard { _file: file };

        tracing::debug!(lock = %path.display(), "install lock acquired");
        Ok(Box::new(guard))
    }
}
