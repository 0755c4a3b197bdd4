//! Settings types and loading.

mod loader;
mod types;

pub use loader::SettingsLoader;
pub use types::{ALLOWED_THEMES, DiagramSettings, DiagramTheme, LintSettings, Settings};
