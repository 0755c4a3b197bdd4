//! Global Constants
//!
//! Centralized constants for configuration and tuning.
//! All magic numbers should be defined here with documentation.

/// Interactive preview constants
pub mod preview {
    /// Quiet period after the last edit before a re-render fires (milliseconds)
    pub const DEBOUNCE_MS: u64 = 350;
}

/// Backlink scan constants
pub mod backlinks {
    /// Snippets longer than this are ellipsis-truncated (characters)
    pub const SNIPPET_MAX_CHARS: usize = 120;
}

/// Vault search constants
pub mod search {
    /// Fallback result cap when settings carry no limit
    pub const DEFAULT_RESULT_LIMIT: usize = 50;

    /// Context window before a content match (characters)
    pub const SNIPPET_BEFORE: usize = 40;

    /// Context window after a content match (characters)
    pub const SNIPPET_AFTER: usize = 80;
}

/// Syntax highlighting constants
pub mod highlight {
    /// Languages considered by heuristic auto-detection when a fence carries
    /// no language tag
    pub const AUTO_DETECT_LANGUAGES: &[&str] = &[
        "python",
        "javascript",
        "typescript",
        "bash",
        "shell",
        "json",
        "yaml",
        "html",
        "css",
        "markdown",
    ];
}

/// Export pipeline constants
pub mod export {
    /// Diagram engine loaded into the headless rendering context
    pub const DIAGRAM_ENGINE_URL: &str =
        "https://cdn.jsdelivr.net/npm/mermaid@11/dist/mermaid.min.js";

    /// Upper bound for diagram layout inside the headless context (seconds)
    pub const DIAGRAM_RENDER_TIMEOUT_SECS: u64 = 20;

    /// Idle teardown for a headless browser that a failed export abandoned (seconds)
    pub const BROWSER_IDLE_TIMEOUT_SECS: u64 = 60;

    /// Page margin applied to paginated PDF output (inches)
    pub const PDF_MARGIN_INCHES: f64 = 0.5;
}
