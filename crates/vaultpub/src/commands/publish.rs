//! `vaultpub publish` command implementation.

use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use clap::Args;
use tracing::debug;
use vaultpub_config::{CliSettings, Config};
use vaultpub_confluence::{ConfluenceClient, SyncReport, Synchronizer, VaultAttachments};
use vaultpub_diagrams::{DiagramRenderer, DisabledRenderer, KrokiRenderer};
use vaultpub_markup::Transcoder;

use crate::error::CliError;
use crate::frontmatter::set_property;
use crate::output::Output;

/// Kroki request timeout in seconds.
const KROKI_TIMEOUT: u64 = 30;

/// Arguments for the publish command.
#[derive(Args)]
pub(crate) struct PublishArgs {
    /// Markdown notes to publish.
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Vault root; folder pages mirror note paths below it (overrides config).
    #[arg(long)]
    vault_root: Option<PathBuf>,

    /// Kroki server URL for diagram rendering (overrides config).
    #[arg(long, env = "VAULTPUB_KROKI_URL")]
    kroki_url: Option<String>,

    /// Confluence space key (overrides config).
    #[arg(long)]
    space: Option<String>,

    /// Write the page URL into each note's frontmatter.
    #[arg(long)]
    record_url: bool,

    /// Path to configuration file (default: auto-discover vaultpub.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl PublishArgs {
    /// Execute the publish command.
    ///
    /// Notes are published one after another. A failing note does not stop
    /// the others.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is invalid or any note fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            vault_root: self.vault_root.clone(),
            kroki_url: self.kroki_url.clone(),
            space_key: self.space.clone(),
            record_url: self.record_url.then_some(true),
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let confluence = config.require_confluence()?;
        let client = ConfluenceClient::from_config(confluence)?;

        let kroki = config
            .diagrams
            .kroki_url
            .as_deref()
            .map(|url| KrokiRenderer::new(url, Duration::from_secs(KROKI_TIMEOUT)));
        let renderer: &dyn DiagramRenderer = match &kroki {
            Some(kroki) => kroki,
            None => &DisabledRenderer,
        };
        let attachments = VaultAttachments::new(config.vault_resolved.attachments_dir());

        let publisher = NotePublisher {
            synchronizer: Synchronizer::new(&client, renderer, &attachments)
                .root_page_id(confluence.root_page_id.clone()),
            transcoder: Transcoder::new().icon_prefix(config.vault_resolved.icon_prefix.as_str()),
            vault_root: &config.vault_resolved.root,
            url_property: config
                .publish
                .record_url
                .then_some(config.publish.url_property.as_str()),
        };

        let mut failed = 0;
        for file in &self.files {
            output.info(&format!("Publishing {}...", file.display()));
            match publisher.publish(file) {
                Ok(report) => print_report(&output, &report),
                Err(err) => {
                    output.error(&format!("Error: {}: {err}", file.display()));
                    failed += 1;
                }
            }
        }

        if failed > 0 {
            return Err(CliError::Validation(format!(
                "{failed} of {} note(s) failed to publish",
                self.files.len()
            )));
        }
        Ok(())
    }
}

/// Publishes single notes of one vault.
struct NotePublisher<'a> {
    synchronizer: Synchronizer<'a>,
    transcoder: Transcoder,
    vault_root: &'a Path,
    /// Frontmatter property receiving the page URL, when recording is on.
    url_property: Option<&'a str>,
}

impl NotePublisher<'_> {
    fn publish(&self, file: &Path) -> Result<SyncReport, CliError> {
        let markdown = std::fs::read_to_string(file)?;
        let title = note_title(file)?;
        let folders = folder_path(self.vault_root, file)?;

        debug!(title = %title, folders = ?folders, "Publishing note");
        let transcoded = self.transcoder.transcode(&markdown);
        let report = self.synchronizer.sync(&title, &folders, &transcoded)?;

        if let Some(property) = self.url_property {
            let updated = set_property(&markdown, property, &report.url);
            if updated != markdown {
                std::fs::write(file, updated)?;
            }
        }

        Ok(report)
    }
}

/// Page title of a note: its file name without extension.
fn note_title(file: &Path) -> Result<String, CliError> {
    file.file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.trim().is_empty())
        .map(str::to_owned)
        .ok_or_else(|| CliError::Validation(format!("cannot derive a title from {}", file.display())))
}

/// Folder segments between the vault root and the note.
fn folder_path(vault_root: &Path, file: &Path) -> Result<Vec<String>, CliError> {
    let root = vault_root.canonicalize()?;
    let file = file.canonicalize()?;
    let relative = file.strip_prefix(&root).map_err(|_| {
        CliError::Validation(format!(
            "{} is outside the vault root {}",
            file.display(),
            root.display()
        ))
    })?;

    Ok(relative
        .parent()
        .map(|dir| {
            dir.components()
                .filter_map(|c| match c {
                    Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default())
}

fn print_report(output: &Output, report: &SyncReport) {
    for folder in &report.folders_created {
        output.info(&format!("Created folder page: {folder}"));
    }
    for moved in &report.pages_moved {
        output.warning(&format!("Moving {moved}"));
    }

    if report.created {
        output.success("Page created successfully!");
    } else {
        output.success("Page updated successfully!");
    }
    output.info(&format!("ID: {}", report.page.id));
    output.info(&format!("Title: {}", report.page.title));
    output.info(&format!("Version: {}", report.page.version));
    output.info(&format!("URL: {}", report.url));

    if report.attachments_uploaded > 0 {
        output.info(&format!(
            "Attachments uploaded: {}",
            report.attachments_uploaded
        ));
    }

    if !report.warnings.is_empty() {
        output.heading(&format!("Warnings ({}):", report.warnings.len()));
        for warning in &report.warnings {
            output.warning(&format!("  - {warning}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;
    use tempfile::TempDir;
    use vaultpub_confluence::MockConfluence;

    use super::*;

    #[test]
    fn test_note_title() {
        assert_eq!(note_title(Path::new("vault/Tech/Alpha Plan.md")).unwrap(), "Alpha Plan");
    }

    #[test]
    fn test_folder_path() {
        let temp_dir = TempDir::new().unwrap();
        let note_dir = temp_dir.path().join("Tech").join("RnD");
        fs::create_dir_all(&note_dir).unwrap();
        fs::write(note_dir.join("Alpha.md"), "x").unwrap();

        let folders = folder_path(temp_dir.path(), &note_dir.join("Alpha.md")).unwrap();

        assert_eq!(folders, vec!["Tech".to_owned(), "RnD".to_owned()]);
    }

    #[test]
    fn test_folder_path_at_vault_root() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("Alpha.md"), "x").unwrap();

        let folders = folder_path(temp_dir.path(), &temp_dir.path().join("Alpha.md")).unwrap();

        assert!(folders.is_empty());
    }

    #[test]
    fn test_note_outside_vault_rejected() {
        let vault = TempDir::new().unwrap();
        let elsewhere = TempDir::new().unwrap();
        fs::write(elsewhere.path().join("Alpha.md"), "x").unwrap();

        let err = folder_path(vault.path(), &elsewhere.path().join("Alpha.md")).unwrap_err();

        assert!(matches!(err, CliError::Validation(_)));
    }

    #[test]
    fn test_publish_records_url() {
        let temp_dir = TempDir::new().unwrap();
        let note_dir = temp_dir.path().join("Tech");
        fs::create_dir_all(&note_dir).unwrap();
        let note = note_dir.join("Alpha.md");
        fs::write(&note, "---\ntags: [plan]\n---\nHello").unwrap();

        let confluence = MockConfluence::new();
        let attachments = VaultAttachments::new(temp_dir.path().join("attachments"));
        let publisher = NotePublisher {
            synchronizer: Synchronizer::new(&confluence, &DisabledRenderer, &attachments),
            transcoder: Transcoder::new(),
            vault_root: temp_dir.path(),
            url_property: Some("confluence_url"),
        };

        let report = publisher.publish(&note).unwrap();

        assert_eq!(report.page.title, "Alpha");
        assert_eq!(report.page.body, "<p>Hello</p>");
        assert_eq!(report.folders_created, vec!["Tech".to_owned()]);
        assert_eq!(
            fs::read_to_string(&note).unwrap(),
            format!(
                "---\ntags: [plan]\nconfluence_url: {}\n---\nHello",
                report.url
            )
        );

        // Recording the URL does not change what gets published next time.
        let again = publisher.publish(&note).unwrap();
        assert_eq!(again.page.id, report.page.id);
        assert_eq!(again.page.body, "<p>Hello</p>");
    }
}
