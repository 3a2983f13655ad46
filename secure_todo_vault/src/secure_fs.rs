//! Secure TODO Vault - File-Backed Fallback Store
//!
//! One file per key under a root directory, written atomically. This is the
//! desktop counterpart of browser local storage for the fallback path.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use crate::error::{PlatformError, TodoResult};
use crate::storage::FallbackStore;

/// Secure Filesystem Handler
pub struct SecureFs {
    /// Root directory
    root: PathBuf,
}

impl SecureFs {
    /// Create new SecureFs with root directory
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    /// Map a storage key to a file name. Bytes outside `[A-Za-z0-9.-]` are
    /// written as `_xx` hex, so distinct keys never share a file.
    fn full_path(&self, key: &str) -> PathBuf {
        let mut name = String::with_capacity(key.len());
        for byte in key.bytes() {
            if byte.is_ascii_alphanumeric() || matches!(byte, b'.' | b'-') {
                name.push(char::from(byte));
            } else {
                name.push('_');
                name.push_str(&hex::encode([byte]));
            }
        }
        self.root.join(format!("{}.val", name))
    }

    /// Write value atomically
    pub fn write_value(&self, key: &str, value: &str) -> TodoResult<()> {
        let path = self.full_path(key);
        fs::create_dir_all(&self.root)?;

        // Write to temp file first (atomic write)
        let temp_path = path.with_extension("tmp");

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)?;

        file.write_all(value.as_bytes())?;
        file.sync_all()?;

        fs::rename(&temp_path, &path)?;

        Ok(())
    }

    /// Read value; `None` when the file does not exist
    pub fn read_value(&self, key: &str) -> TodoResult<Option<String>> {
        let path = self.full_path(key);

        if !path.exists() {
            return Ok(None);
        }

        let mut file = File::open(&path)?;
        let mut data = String::new();
        file.read_to_string(&mut data)?;

        Ok(Some(data))
    }

    /// Delete value, overwriting it with zeros first
    pub fn delete_value(&self, key: &str) -> TodoResult<()> {
        let path = self.full_path(key);

        if path.exists() {
            if let Ok(metadata) = fs::metadata(&path) {
                let size = metadata.len() as usize;
                if size > 0 {
                    if let Ok(mut file) = OpenOptions::new().write(true).open(&path) {
                        let _ = file.write_all(&vec![0u8; size]);
                        let _ = file.sync_all();
                    }
                }
            }

            fs::remove_file(&path)?;
        }

        Ok(())
    }

    /// Check if a key is stored
    pub fn exists(&self, key: &str) -> bool {
        self.full_path(key).exists()
    }
}

impl FallbackStore for SecureFs {
    fn get(&self, key: &str) -> Result<Option<String>, PlatformError> {
        self.read_value(key).map_err(|e| PlatformError::new(e.to_string()))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PlatformError> {
        self.write_value(key, value).map_err(|e| PlatformError::new(e.to_string()))
    }

    fn remove(&self, key: &str) -> Result<(), PlatformError> {
        self.delete_value(key).map_err(|e| PlatformError::new(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_secure_fs() {
        let dir = tempdir().unwrap();
        let fs = SecureFs::new(&dir.path().join("store"));

        fs.write_value("secure_todo_app.todos", "[]").unwrap();
        assert!(fs.exists("secure_todo_app.todos"));
        assert_eq!(fs.read_value("secure_todo_app.todos").unwrap().as_deref(), Some("[]"));

        fs.delete_value("secure_todo_app.todos").unwrap();
        assert!(!fs.exists("secure_todo_app.todos"));
        assert_eq!(fs.read_value("secure_todo_app.todos").unwrap(), None);
    }

    #[test]
    fn test_distinct_keys_never_collide() {
        let dir = tempdir().unwrap();
        let fs = SecureFs::new(dir.path());

        fs.set("a/b", "slash").unwrap();
        fs.set("a_b", "underscore").unwrap();
        fs.set("a b", "space").unwrap();

        assert_eq!(fs.get("a/b").unwrap().as_deref(), Some("slash"));
        assert_eq!(fs.get("a_b").unwrap().as_deref(), Some("underscore"));
        assert_eq!(fs.get("a b").unwrap().as_deref(), Some("space"));
        assert_eq!(fs.full_path("ns.todos"), dir.path().join("ns.todos.val"));
        assert_eq!(fs.full_path("a_b"), dir.path().join("a_5fb.val"));
    }

    #[test]
    fn test_keys_cannot_escape_root() {
        let dir = tempdir().unwrap();
        let fs = SecureFs::new(dir.path());

        fs.set("../outside/key", "x").unwrap();
        assert_eq!(fs.get("../outside/key").unwrap().as_deref(), Some("x"));
        assert!(!dir.path().parent().unwrap().join("outside").exists());
    }
}
