//! Vault read/write store.
//!
//! Every operation is scoped under the vault root: caller-supplied paths are
//! normalized and traversal is rejected before any I/O. There is no
//! application-level locking; the filesystem's per-call atomicity is the only
//! transaction, and concurrent edits to the same note are last-write-wins.

use backon::{BlockingRetryable, ConstantBuilder};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::debug;

use crate::types::{Result, VaultError, normalize_rel};

#[derive(Debug, Clone)]
pub struct VaultStore {
    root: PathBuf,
}

impl VaultStore {
    /// Open a store over an existing vault root directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(VaultError::not_found(format!(
                "vault root {}",
                root.display()
            )));
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Normalize a relative path and join it under the root.
    pub fn full_path(&self, rel: &str) -> Result<PathBuf> {
        Ok(self.root.join(normalize_rel(rel)?))
    }

    pub fn exists(&self, rel: &str) -> bool {
        self.full_path(rel).map(|p| p.exists()).unwrap_or(false)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub fn read(&self, rel: &str) -> Result<String> {
        let path = self.full_path(rel)?;
        fs::read_to_string(&path).map_err(|e| Self::map_read_err(e, rel))
    }

    pub fn read_bytes(&self, rel: &str) -> Result<Vec<u8>> {
        let path = self.full_path(rel)?;
        fs::read(&path).map_err(|e| Self::map_read_err(e, rel))
    }

    fn map_read_err(err: std::io::Error, rel: &str) -> VaultError {
        if err.kind() == ErrorKind::NotFound {
            VaultError::not_found(rel)
        } else {
            VaultError::Io(err)
        }
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Write a file, creating parent directories as needed. Last write wins.
    pub fn write(&self, rel: &str, content: &str) -> Result<()> {
        let path = self.full_path(rel)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content)?;
        Ok(())
    }

    /// Create a file that must not already exist.
    /// Losing the race to a concurrent writer yields [`VaultError::Conflict`].
    pub fn create_new(&self, rel: &str, content: &str) -> Result<()> {
        let path = self.full_path(rel)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        match fs::OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                use std::io::Write;
                file.write_all(content.as_bytes())?;
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Err(VaultError::conflict(rel)),
            Err(e) => Err(VaultError::Io(e)),
        }
    }

    /// Create the note unless it already exists, returning whether it was
    /// created. A creation race is retried once; finding the note present on
    /// the second look counts as success.
    pub fn ensure_note(&self, rel: &str, initial: &str) -> Result<bool> {
        let attempt = || -> Result<bool> {
            if self.exists(rel) {
                return Ok(false);
            }
            self.create_new(rel, initial)?;
            Ok(true)
        };
        attempt
            .retry(
                ConstantBuilder::default()
                    .with_delay(Duration::from_millis(10))
                    .with_max_times(1),
            )
            .when(|e: &VaultError| e.is_retryable())
            .notify(|err, _| debug!("retrying note creation after race: {err}"))
            .call()
    }

    pub fn rename(&self, from: &str, to: &str) -> Result<()> {
        let from_path = self.full_path(from)?;
        let to_path = self.full_path(to)?;
        if !from_path.exists() {
            return Err(VaultError::not_found(from));
        }
        if let Some(parent) = to_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::rename(&from_path, &to_path)?;
        Ok(())
    }

    /// Delete a file. Directories are refused.
    pub fn delete(&self, rel: &str) -> Result<()> {
        let path = self.full_path(rel)?;
        let meta = fs::symlink_metadata(&path).map_err(|e| Self::map_read_err(e, rel))?;
        if !meta.is_file() {
            return Err(VaultError::invalid_input(format!(
                "only file deletion is allowed: {rel}"
            )));
        }
        fs::remove_file(&path)?;
        Ok(())
    }
}
