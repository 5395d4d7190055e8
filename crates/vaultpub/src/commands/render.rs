//! `vaultpub render` command implementation.

use std::path::PathBuf;

use clap::Args;
use vaultpub_config::{CliSettings, Config};
use vaultpub_markup::{Transcoded, Transcoder};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Markdown note to convert.
    file: PathBuf,

    /// Vault root used to locate the configuration (overrides config).
    #[arg(long)]
    vault_root: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover vaultpub.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl RenderArgs {
    /// Execute the render command.
    ///
    /// Storage markup goes to stdout; pending attachments are listed on
    /// stderr.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is invalid or the note can't be read.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            vault_root: self.vault_root.clone(),
            ..CliSettings::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let markdown = std::fs::read_to_string(&self.file)?;

        let transcoded = Transcoder::new()
            .icon_prefix(config.vault_resolved.icon_prefix.as_str())
            .transcode(&markdown);

        output.markup(&transcoded.markup)?;
        print_placeholders(&output, &transcoded);
        Ok(())
    }
}

fn print_placeholders(output: &Output, transcoded: &Transcoded) {
    if !transcoded.has_placeholders() {
        return;
    }

    output.heading("Pending attachments:");
    for diagram in &transcoded.diagrams {
        output.info(&format!(
            "Diagram {} -> {}",
            diagram.token(),
            diagram.attachment_name()
        ));
    }
    for image in &transcoded.images {
        output.info(&format!("Image {} -> {}", image.token(), image.filename));
    }
}
