//! Vaultmark - Note Resolution & Rendering Engine
//!
//! The engine behind a personal knowledge base kept as a directory tree of
//! markdown notes: wiki-style cross-references resolved against a live file
//! inventory, calendar-derived journal notes, and multi-format export from
//! the same semantic model the interactive preview uses.
//!
//! ## Core Features
//!
//! - **Wiki Resolution**: `[[target]]` references mapped onto concrete vault
//!   paths with well-defined tie-break rules over a fresh inventory snapshot
//! - **Two Render Paths**: asynchronous, partial-failure-tolerant preview and
//!   one-shot synchronous export, kept consistent by a shared renderer core
//! - **Backlink Index**: on-demand inbound-reference scans, no persistent index
//! - **Lint Engine**: deterministic, idempotent markdown normalization
//! - **Calendar Notes**: daily/weekly paths from configurable templates
//! - **Export Pipeline**: themed self-contained HTML, PDF and Word documents
//!   with inlined assets and rasterized diagrams
//!
//! ## Quick Start
//!
//! ```ignore
//! use vaultmark::{Settings, Vault};
//!
//! let vault = Vault::open("/path/to/vault", Settings::default())?;
//! let hit = vault.resolve("Projects/Roadmap")?;
//! let html = vault.render("# Hello [[world]]", "", true);
//! let backlinks = vault.backlinks_for("Projects/Roadmap.md")?;
//! ```
//!
//! ## Modules
//!
//! - [`resolve`]: wiki target resolution over inventory snapshots
//! - [`render`]: expander, renderer core, strategies, hydration, debounce
//! - [`backlinks`]: inbound-reference scans
//! - [`lint`]: idempotent text normalization
//! - [`calendar`]: date/ISO-week path templating
//! - [`export`]: static export pipeline (HTML, PDF, DOCX, single diagrams)
//! - [`vault`]: inventory snapshots, scoped store, and the [`Vault`] facade

pub mod backlinks;
pub mod calendar;
pub mod config;
pub mod constants;
pub mod export;
pub mod lint;
pub mod logging;
pub mod notes;
pub mod render;
pub mod resolve;
pub mod search;
pub mod types;
pub mod vault;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{DiagramSettings, DiagramTheme, LintSettings, Settings, SettingsLoader};

// Error Types
pub use types::error::{Result, VaultError};

// Domain Types
pub use types::{BacklinkEntry, FileKind, ResolvedTarget, SearchHit, VaultFile, WikiReference};

// Facade
pub use vault::{Vault, VaultStore};

// =============================================================================
// Engine Re-exports
// =============================================================================

pub use export::{DiagramFormat, ExportArtifact, ExportFormat, Exporter};
pub use lint::{LintIssue, LintOutcome, LintRule};
pub use render::{
    ExportStrategy, MarkdownRenderer, PreviewDebouncer, PreviewStrategy, RenderStrategy,
    hydrate_embeds,
};
