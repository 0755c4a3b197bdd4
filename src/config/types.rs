//! Engine Settings
//!
//! Read-only view of the host's settings store: directory/template strings for
//! calendar notes, the export theme, diagram theme/font overrides, lint
//! toggles, and the search cap. All fields have working defaults so an empty
//! settings source yields a usable engine.

use serde::{Deserialize, Serialize};

use crate::lint::LintRule;
use crate::types::{Result, VaultError};

/// Themes the export shell knows a palette for.
pub const ALLOWED_THEMES: &[&str] = &[
    "light",
    "midnight",
    "dracula",
    "monokai",
    "solarized",
    "tokyonight",
    "nord",
    "gruvbox",
    "catppuccin",
    "catppuccin-latte",
    "ocean",
    "forest",
    "sand",
    "paper",
];

/// Root settings structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct Settings {
    /// Directory prefixed onto daily-note paths that carry no separator
    pub daily_notes_dir: String,

    /// Daily note path template; every `YYYY-MM-DD` token is substituted
    pub daily_notes_template: String,

    /// Directory prefixed onto weekly-note paths that carry no separator
    pub weekly_notes_dir: String,

    /// Weekly note path template; `YYYY`/`WWW`/`WW`/`{W}` tokens are substituted
    pub weekly_notes_template: String,

    /// Template applied when provisioning a new note
    pub note_template: String,

    /// Export theme name (see [`ALLOWED_THEMES`])
    pub theme: String,

    /// Maximum combined search results per query
    pub search_limit: usize,

    /// Diagram rendering overrides
    pub diagram: DiagramSettings,

    /// Lint rule toggles
    pub lint: LintSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            daily_notes_dir: "Daily".to_string(),
            daily_notes_template: "Daily/YYYY-MM-DD DAILY.md".to_string(),
            weekly_notes_dir: "Weekly notes".to_string(),
            weekly_notes_template: "Weekly notes/YYYY-{W}WW.md".to_string(),
            note_template: DEFAULT_NOTE_TEMPLATE.to_string(),
            theme: "light".to_string(),
            search_limit: 1000,
            diagram: DiagramSettings::default(),
            lint: LintSettings::default(),
        }
    }
}

const DEFAULT_NOTE_TEMPLATE: &str = "---\ncreated: {{created}}\nupdated: {{updated}}\n---\n\n";

impl Settings {
    /// Validate settings values. Returns `VaultError::Config` on failure.
    pub fn validate(&self) -> Result<()> {
        if !ALLOWED_THEMES.contains(&self.theme.as_str()) {
            return Err(VaultError::Config(format!(
                "unknown theme '{}'; valid themes: {}",
                self.theme,
                ALLOWED_THEMES.join(", ")
            )));
        }
        for (name, dir) in [
            ("daily_notes_dir", &self.daily_notes_dir),
            ("weekly_notes_dir", &self.weekly_notes_dir),
        ] {
            if dir.contains("..") {
                return Err(VaultError::Config(format!(
                    "{name} must stay under the vault root"
                )));
            }
        }
        if self.daily_notes_template.trim().is_empty() {
            return Err(VaultError::Config(
                "daily_notes_template must not be empty".to_string(),
            ));
        }
        if self.weekly_notes_template.trim().is_empty() {
            return Err(VaultError::Config(
                "weekly_notes_template must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Effective settings as pretty TOML, for host display.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| VaultError::Config(e.to_string()))
    }
}

// =============================================================================
// Diagram Settings
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct DiagramSettings {
    /// Diagram engine theme; `Auto` follows the export theme's darkness
    pub theme: DiagramTheme,

    /// Font size override in pixels; `None` keeps the engine default
    pub font_size: Option<u32>,

    /// Font family override; `"auto"` keeps the engine default
    pub font_family: String,

    /// Free-form font family used when `font_family` is `"custom"`
    pub font_family_custom: String,
}

impl Default for DiagramSettings {
    fn default() -> Self {
        Self {
            theme: DiagramTheme::Auto,
            font_size: None,
            font_family: "auto".to_string(),
            font_family_custom: String::new(),
        }
    }
}

impl DiagramSettings {
    /// The effective font family, if any override is active.
    pub fn effective_font_family(&self) -> Option<&str> {
        match self.font_family.as_str() {
            "auto" | "" => None,
            "custom" => {
                let custom = self.font_family_custom.trim();
                (!custom.is_empty()).then_some(custom)
            }
            other => Some(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DiagramTheme {
    /// Dark export themes get the dark diagram theme, light ones the default
    #[default]
    Auto,
    Default,
    Dark,
    Forest,
    Neutral,
}

impl DiagramTheme {
    /// Resolve `Auto` against the darkness of the surrounding document theme.
    pub fn resolve(self, theme_is_dark: bool) -> &'static str {
        match self {
            Self::Auto => {
                if theme_is_dark {
                    "dark"
                } else {
                    "default"
                }
            }
            Self::Default => "default",
            Self::Dark => "dark",
            Self::Forest => "forest",
            Self::Neutral => "neutral",
        }
    }
}

// =============================================================================
// Lint Settings
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct LintSettings {
    /// Master switch; when off, `enabled_rules` is empty
    pub enabled: bool,
    pub collapse_blank_runs: bool,
    pub trim_trailing: bool,
    pub no_blank_in_list: bool,
    pub heading_levels: bool,
}

impl Default for LintSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            collapse_blank_runs: true,
            trim_trailing: true,
            no_blank_in_list: true,
            heading_levels: true,
        }
    }
}

impl LintSettings {
    /// The rule set the lint engine should apply, in no particular order
    /// (the engine itself applies rules in its fixed sequence).
    pub fn enabled_rules(&self) -> Vec<LintRule> {
        if !self.enabled {
            return Vec::new();
        }
        let mut rules = Vec::new();
        if self.collapse_blank_runs {
            rules.push(LintRule::CollapseBlankRuns);
        }
        if self.trim_trailing {
            rules.push(LintRule::TrimTrailing);
        }
        if self.no_blank_in_list {
            rules.push(LintRule::NoBlankInList);
        }
        if self.heading_levels {
            rules.push(LintRule::HeadingLevels);
        }
        rules
    }
}
