//! Headless rendering sessions.
//!
//! Each export that needs pagination or diagram layout gets its own isolated
//! browser process — never pooled, so concurrency stays bounded by resource
//! cost. The session owns the process handle; dropping it (on success, error,
//! or unwind) is the guaranteed-teardown path.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use headless_chrome::protocol::cdp::Page::CaptureScreenshotFormatOption;
use headless_chrome::types::PrintToPdfOptions;
use headless_chrome::{Browser, LaunchOptions, Tab};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::config::{DiagramSettings, DiagramTheme};
use crate::constants::export::{
    BROWSER_IDLE_TIMEOUT_SECS, DIAGRAM_ENGINE_URL, DIAGRAM_RENDER_TIMEOUT_SECS, PDF_MARGIN_INCHES,
};
use crate::types::{Result, VaultError};

/// Resolved diagram engine overrides for one export.
#[derive(Debug, Clone)]
pub struct DiagramOptions {
    pub theme: &'static str,
    pub font_size: Option<u32>,
    pub font_family: Option<String>,
}

impl DiagramOptions {
    pub fn from_settings(diagram: &DiagramSettings, theme_is_dark: bool) -> Self {
        Self {
            theme: diagram.theme.resolve(theme_is_dark),
            font_size: diagram.font_size,
            font_family: diagram.effective_font_family().map(str::to_string),
        }
    }
}

impl Default for DiagramOptions {
    fn default() -> Self {
        Self {
            theme: DiagramTheme::Auto.resolve(false),
            font_size: None,
            font_family: None,
        }
    }
}

/// One isolated headless rendering context holding a loaded document.
pub struct HeadlessSession {
    /// Owns the browser process; teardown happens on drop.
    _browser: Browser,
    tab: Arc<Tab>,
}

impl HeadlessSession {
    /// Launch a browser and load the document. A missing or unlaunchable
    /// browser binary is a [`VaultError::DependencyUnavailable`].
    pub fn open(html: &str) -> Result<Self> {
        let launch = LaunchOptions::default_builder()
            .headless(true)
            .idle_browser_timeout(Duration::from_secs(BROWSER_IDLE_TIMEOUT_SECS))
            .build()
            .map_err(|e| VaultError::export(format!("browser launch options: {e}")))?;
        let browser = Browser::new(launch).map_err(|e| {
            VaultError::dependency_unavailable(format!("headless browser unavailable: {e}"))
        })?;
        let tab = browser
            .new_tab()
            .map_err(|e| VaultError::export(format!("browser tab: {e}")))?;

        let url = format!("data:text/html;base64,{}", BASE64.encode(html));
        tab.navigate_to(&url)
            .and_then(|t| t.wait_until_navigated())
            .map_err(|e| VaultError::export(format!("document load: {e}")))?;

        debug!("headless session ready ({} bytes of html)", html.len());
        Ok(Self {
            _browser: browser,
            tab,
        })
    }

    /// Inject the diagram engine and lay out every diagram mount with the
    /// requested theme/font overrides. Engine load failure is a missing
    /// dependency; a layout failure is an export failure.
    pub fn render_diagrams(&self, options: &DiagramOptions) -> Result<()> {
        let inject = format!(
            r#"(() => new Promise((resolve, reject) => {{
                const s = document.createElement('script');
                s.src = '{DIAGRAM_ENGINE_URL}';
                s.onload = () => typeof mermaid !== 'undefined'
                    ? resolve(true)
                    : reject(new Error('diagram engine missing after load'));
                s.onerror = () => reject(new Error('diagram engine failed to load'));
                document.head.appendChild(s);
            }}))()"#
        );
        self.tab
            .set_default_timeout(Duration::from_secs(DIAGRAM_RENDER_TIMEOUT_SECS))
            .evaluate(&inject, true)
            .map_err(|e| {
                VaultError::dependency_unavailable(format!("diagram engine unavailable: {e}"))
            })?;

        let mut theme_variables = serde_json::Map::new();
        if let Some(size) = options.font_size {
            theme_variables.insert("fontSize".to_string(), json!(format!("{size}px")));
        }
        if let Some(family) = &options.font_family {
            theme_variables.insert("fontFamily".to_string(), json!(family));
        }
        let init = json!({
            "startOnLoad": false,
            "theme": options.theme,
            "themeVariables": theme_variables,
        });
        let run = format!(
            r#"(async () => {{
                mermaid.initialize({init});
                await mermaid.run({{ querySelector: '.mermaid' }});
                return document.querySelectorAll('.mermaid svg').length;
            }})()"#
        );
        let laid_out = self
            .tab
            .evaluate(&run, true)
            .map_err(|e| VaultError::export(format!("diagram layout: {e}")))?;
        info!(
            "diagram layout complete: {:?} diagrams",
            laid_out.value.unwrap_or_default()
        );
        Ok(())
    }

    /// Capture the loaded document as a paginated PDF.
    pub fn print_pdf(&self) -> Result<Vec<u8>> {
        let options = PrintToPdfOptions {
            print_background: Some(true),
            prefer_css_page_size: Some(true),
            margin_top: Some(PDF_MARGIN_INCHES),
            margin_bottom: Some(PDF_MARGIN_INCHES),
            margin_left: Some(PDF_MARGIN_INCHES),
            margin_right: Some(PDF_MARGIN_INCHES),
            ..Default::default()
        };
        self.tab
            .print_to_pdf(Some(options))
            .map_err(|e| VaultError::export(format!("pdf capture: {e}")))
    }

    /// Rasterize every diagram mount, in document order.
    pub fn screenshot_diagrams(&self) -> Result<Vec<Vec<u8>>> {
        let elements = self
            .tab
            .find_elements(".mermaid")
            .map_err(|e| VaultError::export(format!("diagram lookup: {e}")))?;
        elements
            .iter()
            .map(|el| {
                el.capture_screenshot(CaptureScreenshotFormatOption::Png)
                    .map_err(|e| VaultError::export(format!("diagram capture: {e}")))
            })
            .collect()
    }

    /// Serialized vector markup of the nth rendered diagram.
    pub fn diagram_svg(&self, index: usize) -> Result<String> {
        let expr =
            format!("document.querySelectorAll('.mermaid svg')[{index}]?.outerHTML ?? null");
        let result = self
            .tab
            .evaluate(&expr, false)
            .map_err(|e| VaultError::export(format!("diagram markup: {e}")))?;
        result
            .value
            .as_ref()
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or_else(|| VaultError::export("diagram produced no vector markup"))
    }
}
