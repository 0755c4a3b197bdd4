//! Unified Error Type System
//!
//! Centralized error types for the entire engine.
//! Every fallible operation returns [`VaultError`] so callers can route on the
//! failure class instead of string-matching messages.
//!
//! ## Error Classes
//!
//! - **NotFound**: resolution or read miss — never fatal, callers decide
//! - **Conflict**: create-if-absent race — retryable once
//! - **InvalidInput**: malformed date/path/parameters — rejected before I/O
//! - **DependencyUnavailable**: export rendering capability missing
//! - **Export**: export pipeline failure carrying the underlying message
//! - **Io**: permission/disk errors — surfaced with message, not auto-retried
//!
//! ## Design Principles
//!
//! - Single unified error type for the entire engine
//! - Failures caught at the narrowest scope (per-embed, per-diagram,
//!   per-scanned-file) so one bad reference never aborts a whole render
//! - No panic/unwrap outside tests

use thiserror::Error;

#[derive(Debug, Error)]
pub enum VaultError {
    // -------------------------------------------------------------------------
    // System Errors (auto From impl)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // -------------------------------------------------------------------------
    // Domain Errors
    // -------------------------------------------------------------------------
    /// Resolution or read miss. Callers treat this as "offer to create" or
    /// "report not found", never as a crash.
    #[error("not found: {0}")]
    NotFound(String),

    /// A create-if-absent operation lost a race with a concurrent writer.
    #[error("already exists: {0}")]
    Conflict(String),

    /// Malformed date, path, or parameter. Raised before any I/O happens.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("config error: {0}")]
    Config(String),

    // -------------------------------------------------------------------------
    // Export Errors
    // -------------------------------------------------------------------------
    /// A rendering capability (diagram engine, browser binary, converter) is
    /// missing. Fails the one request that needed it; nothing is written.
    #[error("export dependencies unavailable: {0}")]
    DependencyUnavailable(String),

    /// Generic export failure with the underlying reason. Never partial output.
    #[error("export failed: {0}")]
    Export(String),
}

impl VaultError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn conflict(what: impl Into<String>) -> Self {
        Self::Conflict(what.into())
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn dependency_unavailable(message: impl Into<String>) -> Self {
        Self::DependencyUnavailable(message.into())
    }

    pub fn export(message: impl Into<String>) -> Self {
        Self::Export(message.into())
    }

    /// Check whether this is a resolution/read miss.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound(_) => true,
            Self::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }

    /// Check whether this error may resolve on a single retry.
    /// Only creation races qualify; everything else surfaces immediately.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

pub type Result<T> = std::result::Result<T, VaultError>;

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_detection() {
        assert!(VaultError::not_found("Daily/missing.md").is_not_found());
        let io = VaultError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "no such file",
        ));
        assert!(io.is_not_found());
        assert!(!VaultError::conflict("x").is_not_found());
    }

    #[test]
    fn test_only_conflicts_retry() {
        assert!(VaultError::conflict("Daily/2025-01-01.md").is_retryable());
        assert!(!VaultError::not_found("x").is_retryable());
        assert!(!VaultError::invalid_input("bad date").is_retryable());
        assert!(!VaultError::dependency_unavailable("no browser").is_retryable());
    }

    #[test]
    fn test_display_messages() {
        assert_eq!(
            VaultError::invalid_input("empty wiki target").to_string(),
            "invalid input: empty wiki target"
        );
        assert_eq!(
            VaultError::dependency_unavailable("diagram engine failed to load").to_string(),
            "export dependencies unavailable: diagram engine failed to load"
        );
    }
}
