use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use tracing::trace;

use super::PermissionStore;
use crate::constants::PERMISSION_GRANTED;
use crate::NotificationError;
use crate::Result;

/// In-memory permission flag, revocable at runtime
#[derive(Debug, Default)]
pub struct PermissionFlag {
    granted: AtomicBool,
}

impl PermissionFlag {
    pub fn new(granted: bool) -> Self {
        Self {
            granted: AtomicBool::new(granted),
        }
    }

    pub fn grant(&self) {
        self.granted.store(true, Ordering::Release);
    }

    pub fn revoke(&self) {
        self.granted.store(false, Ordering::Release);
    }
}

impl PermissionStore for PermissionFlag {
    fn notifications_granted(&self) -> bool {
        self.granted.load(Ordering::Acquire)
    }
}

/// Permission persisted as a small file next to the host's local state.
///
/// The file is re-read on every check. Content `granted` means yes; a missing
/// or unreadable file means no.
#[derive(Debug, Clone)]
pub struct FilePermissionStore {
    path: PathBuf,
}

impl FilePermissionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn grant(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(NotificationError::Permission)?;
        }
        fs::write(&self.path, PERMISSION_GRANTED).map_err(NotificationError::Permission)?;
        Ok(())
    }

    pub fn revoke(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(NotificationError::Permission(e).into()),
        }
    }
}

impl PermissionStore for FilePermissionStore {
    fn notifications_granted(&self) -> bool {
        match fs::read_to_string(&self.path) {
            Ok(content) => content.trim() == PERMISSION_GRANTED,
            Err(e) => {
                trace!(path = %self.path.display(), "notification permission unreadable: {:?}", e);
                false
            }
        }
    }
}
