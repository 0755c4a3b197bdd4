//! Settings Loader (Figment-based)
//!
//! Loads and merges settings from multiple sources using Figment:
//! 1. Built-in defaults (Serialized)
//! 2. Global settings (~/.config/vaultmark/settings.toml)
//! 3. Vault-local settings (<vault>/.vaultmark/settings.toml)
//! 4. Environment variables (VAULTMARK_* prefix)

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::env;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::types::Settings;
use crate::types::{Result, VaultError};

/// Settings file name used at both the global and vault level.
const SETTINGS_FILE: &str = "settings.toml";

/// Settings loader
pub struct SettingsLoader;

impl SettingsLoader {
    /// Load settings with full resolution chain:
    /// defaults → global → vault-local → env vars
    pub fn load(vault_root: &Path) -> Result<Settings> {
        let mut figment = Figment::new().merge(Serialized::defaults(Settings::default()));

        if let Some(global_path) = Self::global_settings_path()
            && global_path.exists()
        {
            debug!("loading global settings from {}", global_path.display());
            figment = figment.merge(Toml::file(&global_path));
        }

        let vault_path = Self::vault_settings_path(vault_root);
        if vault_path.exists() {
            debug!("loading vault settings from {}", vault_path.display());
            figment = figment.merge(Toml::file(&vault_path));
        }

        figment = figment.merge(Env::prefixed("VAULTMARK_").split("__").lowercase(true));

        let settings: Settings = figment
            .extract()
            .map_err(|e| VaultError::Config(format!("settings error: {e}")))?;

        settings.validate()?;

        Ok(settings)
    }

    /// Load settings from one file only, on top of defaults.
    pub fn load_from_file(path: &Path) -> Result<Settings> {
        let settings: Settings = Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path))
            .extract()
            .map_err(|e| VaultError::Config(format!("settings error: {e}")))?;
        settings.validate()?;
        Ok(settings)
    }

    // =========================================================================
    // Path Management
    // =========================================================================

    /// Global settings directory (~/.config/vaultmark/)
    pub fn global_dir() -> Option<PathBuf> {
        env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                env::var("HOME")
                    .ok()
                    .map(|home| PathBuf::from(home).join(".config"))
            })
            .map(|p| p.join("vaultmark"))
    }

    /// Global settings file path
    pub fn global_settings_path() -> Option<PathBuf> {
        Self::global_dir().map(|dir| dir.join(SETTINGS_FILE))
    }

    /// Vault-local settings file path (<vault>/.vaultmark/settings.toml)
    pub fn vault_settings_path(vault_root: &Path) -> PathBuf {
        vault_root.join(".vaultmark").join(SETTINGS_FILE)
    }
}
