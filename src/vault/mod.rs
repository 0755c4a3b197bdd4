//! Vault access: inventory snapshots, the scoped store, and the engine facade.

pub mod inventory;
mod store;

pub use store::VaultStore;

use chrono::{NaiveDate, Utc};
use std::path::Path;

use crate::backlinks;
use crate::calendar;
use crate::config::Settings;
use crate::export::{DiagramFormat, ExportArtifact, ExportFormat, Exporter};
use crate::lint::{self, LintOutcome};
use crate::notes::{TemplateContext, apply_note_template};
use crate::render::{MarkdownRenderer, PreviewStrategy, hydrate_embeds};
use crate::resolve;
use crate::search;
use crate::types::{BacklinkEntry, ResolvedTarget, Result, SearchHit};

/// The engine facade: every exposed operation over one vault.
///
/// Stateless beyond root and settings — each call that needs the file
/// inventory walks a fresh snapshot, so concurrent callers may observe
/// different states of a mutating vault. That weak consistency is the
/// accepted trade-off for a single-user tool.
#[derive(Debug, Clone)]
pub struct Vault {
    store: VaultStore,
    settings: Settings,
}

impl Vault {
    pub fn open(root: impl AsRef<Path>, settings: Settings) -> Result<Self> {
        Ok(Self {
            store: VaultStore::open(root.as_ref().to_path_buf())?,
            settings,
        })
    }

    pub fn store(&self) -> &VaultStore {
        &self.store
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    // =========================================================================
    // Resolution & Rendering
    // =========================================================================

    /// Resolve a wiki target against a fresh inventory snapshot.
    pub fn resolve(&self, target: &str) -> Result<ResolvedTarget> {
        let snapshot = inventory::snapshot(self.store.root())?;
        resolve::resolve(target, &snapshot)
    }

    /// Render note text to preview HTML. Embed placeholders are left for
    /// [`Vault::hydrate`].
    pub fn render(&self, text: &str, base_dir: &str, allow_embeds: bool) -> String {
        let strategy = PreviewStrategy::default();
        MarkdownRenderer::new(&strategy).render(text, base_dir, allow_embeds)
    }

    /// Render for a known note path (diagram blocks carry their source note).
    pub fn render_note(&self, text: &str, note_path: &str, allow_embeds: bool) -> String {
        let strategy = PreviewStrategy::for_note(note_path);
        let base_dir = crate::types::parent_dir(note_path);
        MarkdownRenderer::new(&strategy).render(text, base_dir, allow_embeds)
    }

    /// Hydrate embed placeholders in rendered preview HTML.
    pub async fn hydrate(&self, html: &str) -> String {
        hydrate_embeds(html, self.store.root()).await
    }

    // =========================================================================
    // Scans
    // =========================================================================

    pub fn backlinks_for(&self, relative_path: &str) -> Result<Vec<BacklinkEntry>> {
        backlinks::backlinks_for(self.store.root(), relative_path)
    }

    pub fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        search::search(self.store.root(), query, self.settings.search_limit)
    }

    /// Dates stamped into note basenames, for calendar displays.
    pub fn calendar_dates(&self) -> Result<Vec<NaiveDate>> {
        let files = inventory::markdown_files(self.store.root())?;
        Ok(calendar::harvest_dates(
            files
                .iter()
                .map(|f| crate::types::basename(&f.relative_path)),
        ))
    }

    // =========================================================================
    // Lint
    // =========================================================================

    /// Lint with the rule set enabled in settings.
    pub fn lint(&self, text: &str) -> LintOutcome {
        lint::lint(text, &self.settings.lint.enabled_rules())
    }

    // =========================================================================
    // Calendar Notes
    // =========================================================================

    pub fn daily_path(&self, date_iso: &str) -> Result<String> {
        calendar::daily_path(
            date_iso,
            &self.settings.daily_notes_template,
            &self.settings.daily_notes_dir,
        )
    }

    pub fn weekly_path(&self, iso_year: i32, iso_week: u32) -> Result<String> {
        calendar::weekly_path(
            iso_year,
            iso_week,
            &self.settings.weekly_notes_template,
            &self.settings.weekly_notes_dir,
        )
    }

    /// Provision the daily note for a date: template the path, create it from
    /// the note template if absent. A lost creation race is retried once and
    /// counts as success when the note turns out to exist.
    pub fn ensure_daily_note(&self, date_iso: &str) -> Result<String> {
        let rel = self.daily_path(date_iso)?;
        let ctx = TemplateContext::at(Utc::now())
            .with("date", date_iso)
            .with("title", date_iso);
        let initial = apply_note_template(&self.settings.note_template, &ctx);
        self.store.ensure_note(&rel, &initial)?;
        Ok(rel)
    }

    // =========================================================================
    // Export
    // =========================================================================

    pub fn export_note(&self, relative_path: &str, format: ExportFormat) -> Result<ExportArtifact> {
        Exporter::new(&self.store, &self.settings).export_note(relative_path, format)
    }

    pub fn export_diagram(
        &self,
        relative_path: &str,
        index: usize,
        format: DiagramFormat,
    ) -> Result<ExportArtifact> {
        Exporter::new(&self.store, &self.settings).export_diagram(relative_path, index, format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn vault() -> (TempDir, Vault) {
        let temp = TempDir::new().unwrap();
        let vault = Vault::open(temp.path(), Settings::default()).unwrap();
        (temp, vault)
    }

    fn write(root: &Path, rel: &str, content: &str) {
        let full = root.join(rel);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, content).unwrap();
    }

    #[test]
    fn test_resolve_sees_fresh_inventory() {
        let (temp, vault) = vault();
        let miss = vault.resolve("note").unwrap();
        assert!(!miss.existed);

        write(temp.path(), "Daily/note.md", "x");
        let hit = vault.resolve("note").unwrap();
        assert!(hit.existed);
        assert_eq!(hit.relative_path, "Daily/note.md");
    }

    #[test]
    fn test_lint_respects_settings_toggles() {
        let temp = TempDir::new().unwrap();
        let mut settings = Settings::default();
        settings.lint.enabled = false;
        let vault = Vault::open(temp.path(), settings).unwrap();

        let messy = "a  \n\n\n\nb";
        assert_eq!(vault.lint(messy).text, messy);
    }

    #[test]
    fn test_heading_continuity_before_render() {
        let (_temp, vault) = vault();
        let linted = vault.lint("# A\n### B");
        assert_eq!(linted.text, "# A\n## B");
        let html = vault.render(&linted.text, "", true);
        assert!(html.contains("<h2>B</h2>"));
    }

    #[test]
    fn test_daily_and_weekly_paths_from_settings() {
        let (_temp, vault) = vault();
        assert_eq!(
            vault.daily_path("2025-01-01").unwrap(),
            "Daily/2025-01-01 DAILY.md"
        );
        assert_eq!(
            vault.weekly_path(2025, 1).unwrap(),
            "Weekly notes/2025-W01.md"
        );
    }

    #[test]
    fn test_ensure_daily_note_applies_template() {
        let (_temp, vault) = vault();
        let rel = vault.ensure_daily_note("2025-06-15").unwrap();
        assert_eq!(rel, "Daily/2025-06-15 DAILY.md");
        let content = vault.store().read(&rel).unwrap();
        assert!(content.starts_with("---\ncreated: "));

        // second call is a no-op on content
        vault.ensure_daily_note("2025-06-15").unwrap();
        assert_eq!(vault.store().read(&rel).unwrap(), content);
    }

    #[test]
    fn test_calendar_dates_harvest() {
        let (temp, vault) = vault();
        write(temp.path(), "Daily/2025-01-02 DAILY.md", "x");
        write(temp.path(), "misc/undated.md", "x");

        let dates = vault.calendar_dates().unwrap();
        assert_eq!(
            dates,
            vec![NaiveDate::from_ymd_opt(2025, 1, 2).unwrap()]
        );
    }

    #[test]
    fn test_backlinks_through_facade() {
        let (temp, vault) = vault();
        write(temp.path(), "a.md", "[[b]]");
        write(temp.path(), "b.md", "x");

        let links = vault.backlinks_for("b.md").unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].path, "a.md");
    }
}
