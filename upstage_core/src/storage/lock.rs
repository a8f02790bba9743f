use std::{
    fs::{self, File, OpenOptions},
    io,
    path::{Path, PathBuf},
};

use log::{debug, warn};

/// Exclusive advisory lock on `<store file>.lock`.
///
/// Held for one read-validate-mutate-write sequence. Dropping the guard
/// releases the lock, so every exit path (including `?` and unwinding)
/// unlocks. The lock file itself is left in place; deleting it would let a
/// waiter lock an unlinked inode while a newcomer locks a fresh one.
#[derive(Debug)]
pub struct StoreLock {
    file: File,
    path: PathBuf,
}

impl StoreLock {
    /// Blocks until the lock for `store_path` is acquired.
    pub fn acquire(store_path: &Path) -> io::Result<Self> {
        let path = lock_path_for(store_path);
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)?;
        file.lock()?;
        debug!("Acquired store lock {path:?}");
        Ok(Self { file, path })
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        if let Err(e) = self.file.unlock() {
            warn!("Could not release store lock {:?}: {e}", self.path);
        } else {
            debug!("Released store lock {:?}", self.path);
        }
    }
}

/// `profiles.json` → `profiles.json.lock`, in the same directory.
pub fn lock_path_for(store_path: &Path) -> PathBuf {
    let mut name = store_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "profiles".into());
    name.push(".lock");
    store_path.with_file_name(name)
}
