//! Export pipeline.
//!
//! One-shot, fully-synchronous exports from the same semantic model the
//! interactive preview uses. Every step either completes or the whole export
//! fails — never partial output. Failure classes: missing rendering
//! capability is `DependencyUnavailable`, a missing source note is
//! `NotFound`, everything else surfaces as a generic export failure with the
//! underlying message.

mod browser;
mod document;
mod docx;
mod theme;

pub use browser::{DiagramOptions, HeadlessSession};
pub use document::{ExportDocument, build_document, extract_diagram_sources};
pub use theme::Palette;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use regex::Regex;
use std::sync::OnceLock;

use tracing::info;

use crate::config::Settings;
use crate::render::escape_html;
use crate::types::{Result, VaultError, stem};
use crate::vault::VaultStore;

// =============================================================================
// Formats & Artifacts
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Html,
    Pdf,
    Docx,
}

impl ExportFormat {
    pub fn mime(self) -> &'static str {
        match self {
            Self::Html => "text/html; charset=utf-8",
            Self::Pdf => "application/pdf",
            Self::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Pdf => "pdf",
            Self::Docx => "docx",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = VaultError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "html" => Ok(Self::Html),
            "pdf" => Ok(Self::Pdf),
            "docx" | "word" => Ok(Self::Docx),
            other => Err(VaultError::invalid_input(format!(
                "unknown export format: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagramFormat {
    Png,
    Svg,
}

impl DiagramFormat {
    pub fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Svg => "image/svg+xml",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Svg => "svg",
        }
    }
}

impl std::str::FromStr for DiagramFormat {
    type Err = VaultError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "svg" => Ok(Self::Svg),
            other => Err(VaultError::invalid_input(format!(
                "unknown diagram format: {other}"
            ))),
        }
    }
}

/// Finished export: bytes plus the metadata a download response needs.
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub bytes: Vec<u8>,
    pub mime: &'static str,
    /// ASCII-safe filename every client accepts.
    pub filename: String,
    /// RFC 5987 `UTF-8''…` form conveying the original name.
    pub filename_utf8: String,
}

impl ExportArtifact {
    fn new(bytes: Vec<u8>, mime: &'static str, base_name: &str, extension: &str) -> Self {
        let full = format!("{base_name}.{extension}");
        Self {
            bytes,
            mime,
            filename: ascii_fallback(&full),
            filename_utf8: format!("UTF-8''{}", utf8_percent_encode(&full, NON_ALPHANUMERIC)),
        }
    }
}

/// Degrade a filename to ASCII: every non-ASCII or control character becomes
/// an underscore. The UTF-8 field carries the faithful name.
fn ascii_fallback(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii() && !c.is_ascii_control() && c != '"' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

// =============================================================================
// Exporter
// =============================================================================

fn diagram_mount_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new("(?s)<div class=\"mermaid\">.*?</div>").expect("static regex"))
}

pub struct Exporter<'a> {
    store: &'a VaultStore,
    settings: &'a Settings,
}

impl<'a> Exporter<'a> {
    pub fn new(store: &'a VaultStore, settings: &'a Settings) -> Self {
        Self { store, settings }
    }

    /// Export a whole note to the requested format.
    pub fn export_note(&self, rel: &str, format: ExportFormat) -> Result<ExportArtifact> {
        let doc = build_document(self.store, self.settings, rel)?;
        info!(
            "exporting {rel} as {:?} ({} diagrams)",
            format, doc.diagram_count
        );

        let bytes = match format {
            ExportFormat::Html => doc.html.clone().into_bytes(),
            ExportFormat::Pdf => {
                let session = HeadlessSession::open(&doc.html)?;
                if doc.diagram_count > 0 {
                    session.render_diagrams(&self.diagram_options(&doc))?;
                }
                session.print_pdf()?
            }
            ExportFormat::Docx => {
                let html = if doc.diagram_count > 0 {
                    let session = HeadlessSession::open(&doc.html)?;
                    session.render_diagrams(&self.diagram_options(&doc))?;
                    let rasters = session.screenshot_diagrams()?;
                    rasterize_diagram_mounts(&doc.html, &rasters)
                } else {
                    doc.html.clone()
                };
                docx::package_html(&html)?
            }
        };

        Ok(ExportArtifact::new(
            bytes,
            format.mime(),
            &doc.title,
            format.extension(),
        ))
    }

    /// Export one fenced diagram, isolated by ordinal index.
    pub fn export_diagram(
        &self,
        rel: &str,
        index: usize,
        format: DiagramFormat,
    ) -> Result<ExportArtifact> {
        let raw = self.store.read(rel)?;
        let sources = extract_diagram_sources(crate::notes::strip_frontmatter(&raw));
        let Some((_, source)) = sources.get(index) else {
            return Err(VaultError::invalid_input(format!(
                "note has {} diagram(s), index {index} is out of range",
                sources.len()
            )));
        };

        let shell = single_diagram_shell(source);
        let session = HeadlessSession::open(&shell)?;
        let theme_is_dark = Palette::for_theme(&self.settings.theme).is_dark;
        session.render_diagrams(&DiagramOptions::from_settings(
            &self.settings.diagram,
            theme_is_dark,
        ))?;

        let bytes = match format {
            DiagramFormat::Png => {
                let mut rasters = session.screenshot_diagrams()?;
                if rasters.is_empty() {
                    return Err(VaultError::export("diagram produced no raster output"));
                }
                rasters.swap_remove(0)
            }
            DiagramFormat::Svg => session.diagram_svg(0)?.into_bytes(),
        };

        let base_name = format!("{} diagram {}", stem(rel), index + 1);
        Ok(ExportArtifact::new(
            bytes,
            format.mime(),
            &base_name,
            format.extension(),
        ))
    }

    fn diagram_options(&self, doc: &ExportDocument) -> DiagramOptions {
        DiagramOptions::from_settings(&self.settings.diagram, doc.theme_is_dark)
    }
}

/// Replace each diagram mount with its pre-rendered raster, in order. Word
/// processors cannot run the diagram engine, so the capture happens before
/// packaging.
fn rasterize_diagram_mounts(html: &str, rasters: &[Vec<u8>]) -> String {
    let mut next = 0usize;
    diagram_mount_re()
        .replace_all(html, |_: &regex::Captures<'_>| {
            let replacement = match rasters.get(next) {
                Some(bytes) => format!(
                    "<img src=\"data:image/png;base64,{}\" alt=\"diagram\">",
                    BASE64.encode(bytes)
                ),
                None => "<!-- diagram raster missing -->".to_string(),
            };
            next += 1;
            replacement
        })
        .into_owned()
}

/// Minimal shell holding exactly one diagram mount.
fn single_diagram_shell(source: &str) -> String {
    format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"></head>\
         <body><div class=\"mermaid\">{}</div></body></html>",
        escape_html(source)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let full = root.join(rel);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, content).unwrap();
    }

    fn fixture(content: &str) -> (TempDir, Settings) {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "Nötes/ünïcode note.md", content);
        (temp, Settings::default())
    }

    #[test]
    fn test_html_export_without_diagrams_needs_no_browser() {
        let (temp, settings) = fixture("# Plain\n\ntext only");
        let store = VaultStore::open(temp.path()).unwrap();
        let exporter = Exporter::new(&store, &settings);

        let artifact = exporter
            .export_note("Nötes/ünïcode note.md", ExportFormat::Html)
            .unwrap();
        let html = String::from_utf8(artifact.bytes).unwrap();
        assert!(html.contains("<h1>Plain</h1>"));
        assert_eq!(artifact.mime, "text/html; charset=utf-8");
    }

    #[test]
    fn test_docx_export_without_diagrams_needs_no_browser() {
        let (temp, settings) = fixture("# Doc\n\nno diagrams here");
        let store = VaultStore::open(temp.path()).unwrap();
        let exporter = Exporter::new(&store, &settings);

        let artifact = exporter
            .export_note("Nötes/ünïcode note.md", ExportFormat::Docx)
            .unwrap();
        assert_eq!(&artifact.bytes[..4], b"PK\x03\x04");
    }

    #[test]
    fn test_missing_note_fails_not_found() {
        let temp = TempDir::new().unwrap();
        let settings = Settings::default();
        let store = VaultStore::open(temp.path()).unwrap();
        let exporter = Exporter::new(&store, &settings);

        let err = exporter
            .export_note("ghost.md", ExportFormat::Html)
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_diagram_index_out_of_range_rejected_before_rendering() {
        let (temp, settings) = fixture("no fences at all");
        let store = VaultStore::open(temp.path()).unwrap();
        let exporter = Exporter::new(&store, &settings);

        let err = exporter
            .export_diagram("Nötes/ünïcode note.md", 0, DiagramFormat::Png)
            .unwrap_err();
        assert!(matches!(err, VaultError::InvalidInput(_)));
    }

    #[test]
    fn test_filename_pair_shapes() {
        let artifact = ExportArtifact::new(Vec::new(), "application/pdf", "ünïcode nöte", "pdf");
        assert!(artifact.filename.is_ascii());
        assert_eq!(artifact.filename, "_n_code n_te.pdf");
        assert!(artifact.filename_utf8.starts_with("UTF-8''"));
        assert!(artifact.filename_utf8.contains("%C3%BC"));
    }

    #[test]
    fn test_format_parsing() {
        use std::str::FromStr;
        assert_eq!(ExportFormat::from_str("PDF").unwrap(), ExportFormat::Pdf);
        assert_eq!(ExportFormat::from_str("word").unwrap(), ExportFormat::Docx);
        assert!(ExportFormat::from_str("odt").is_err());
        assert_eq!(DiagramFormat::from_str("svg").unwrap(), DiagramFormat::Svg);
        assert!(DiagramFormat::from_str("bmp").is_err());
    }

    #[test]
    fn test_rasterize_replaces_mounts_in_order() {
        let html = "<p>a</p><div class=\"mermaid\">one</div><p>b</p><div class=\"mermaid\">two</div>";
        let out = rasterize_diagram_mounts(html, &[vec![1, 2], vec![3, 4]]);
        assert!(!out.contains("class=\"mermaid\""));
        assert_eq!(out.matches("data:image/png;base64,").count(), 2);
        assert!(out.contains("<p>a</p>"));
        assert!(out.contains("<p>b</p>"));
    }
}
