//! Export document palettes.
//!
//! Each theme the settings layer accepts maps to a small palette driving the
//! themed document shell. Unknown names fall back to `light` so an export
//! never fails over a missing palette.

use tracing::warn;

#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub name: &'static str,
    pub is_dark: bool,
    pub background: &'static str,
    pub foreground: &'static str,
    pub accent: &'static str,
    pub border: &'static str,
    pub code_background: &'static str,
}

const PALETTES: &[Palette] = &[
    Palette {
        name: "light",
        is_dark: false,
        background: "#ffffff",
        foreground: "#1f2328",
        accent: "#0969da",
        border: "#d0d7de",
        code_background: "#f6f8fa",
    },
    Palette {
        name: "midnight",
        is_dark: true,
        background: "#0d1117",
        foreground: "#c9d1d9",
        accent: "#58a6ff",
        border: "#30363d",
        code_background: "#161b22",
    },
    Palette {
        name: "dracula",
        is_dark: true,
        background: "#282a36",
        foreground: "#f8f8f2",
        accent: "#bd93f9",
        border: "#44475a",
        code_background: "#21222c",
    },
    Palette {
        name: "monokai",
        is_dark: true,
        background: "#272822",
        foreground: "#f8f8f2",
        accent: "#a6e22e",
        border: "#49483e",
        code_background: "#1e1f1c",
    },
    Palette {
        name: "solarized",
        is_dark: false,
        background: "#fdf6e3",
        foreground: "#657b83",
        accent: "#268bd2",
        border: "#eee8d5",
        code_background: "#eee8d5",
    },
    Palette {
        name: "tokyonight",
        is_dark: true,
        background: "#1a1b26",
        foreground: "#c0caf5",
        accent: "#7aa2f7",
        border: "#292e42",
        code_background: "#16161e",
    },
    Palette {
        name: "nord",
        is_dark: true,
        background: "#2e3440",
        foreground: "#d8dee9",
        accent: "#88c0d0",
        border: "#3b4252",
        code_background: "#3b4252",
    },
    Palette {
        name: "gruvbox",
        is_dark: true,
        background: "#282828",
        foreground: "#ebdbb2",
        accent: "#fabd2f",
        border: "#3c3836",
        code_background: "#3c3836",
    },
    Palette {
        name: "catppuccin",
        is_dark: true,
        background: "#1e1e2e",
        foreground: "#cdd6f4",
        accent: "#89b4fa",
        border: "#313244",
        code_background: "#181825",
    },
    Palette {
        name: "catppuccin-latte",
        is_dark: false,
        background: "#eff1f5",
        foreground: "#4c4f69",
        accent: "#1e66f5",
        border: "#ccd0da",
        code_background: "#e6e9ef",
    },
    Palette {
        name: "ocean",
        is_dark: false,
        background: "#e8f1f8",
        foreground: "#143a52",
        accent: "#1273b5",
        border: "#c3d9e8",
        code_background: "#d9e8f3",
    },
    Palette {
        name: "forest",
        is_dark: false,
        background: "#eef5ee",
        foreground: "#1e3a29",
        accent: "#2e7d46",
        border: "#cfe3d4",
        code_background: "#dfeee2",
    },
    Palette {
        name: "sand",
        is_dark: false,
        background: "#f7f1e3",
        foreground: "#4a3f2a",
        accent: "#b07d2b",
        border: "#e6dcc3",
        code_background: "#efe7d3",
    },
    Palette {
        name: "paper",
        is_dark: false,
        background: "#fafaf8",
        foreground: "#333333",
        accent: "#555555",
        border: "#e0e0dc",
        code_background: "#f0f0ec",
    },
];

impl Palette {
    /// Palette for a theme name, falling back to `light`.
    pub fn for_theme(name: &str) -> &'static Palette {
        PALETTES.iter().find(|p| p.name == name).unwrap_or_else(|| {
            warn!("no palette for theme '{name}', falling back to light");
            &PALETTES[0]
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ALLOWED_THEMES;

    #[test]
    fn test_every_allowed_theme_has_a_palette() {
        for theme in ALLOWED_THEMES {
            assert_eq!(Palette::for_theme(theme).name, *theme);
        }
    }

    #[test]
    fn test_unknown_theme_falls_back_to_light() {
        let palette = Palette::for_theme("nonexistent");
        assert_eq!(palette.name, "light");
        assert!(!palette.is_dark);
    }
}
