//! `mdinline copy` command implementation.

use clap::Args;
use mdinline_core::copy_to_clipboard;

use super::ConvertOptions;
use crate::clipboard::SystemClipboard;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the copy command.
#[derive(Args)]
pub(crate) struct CopyArgs {
    #[command(flatten)]
    options: ConvertOptions,
}

impl CopyArgs {
    /// Execute the copy command.
    ///
    /// # Errors
    ///
    /// Returns an error if conversion fails or the clipboard is unavailable.
    /// The clipboard is only written after a successful conversion.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let prepared = self.options.prepare()?;

        output.info(&format!("Converting {}", prepared.source_path.display()));

        let mut clipboard = SystemClipboard::default();
        let conversion = copy_to_clipboard(
            &prepared.converter,
            &prepared.document,
            &prepared.source_path,
            &mut clipboard,
        )?;

        let stats = conversion.stats;
        output.detail(&format!(
            "{} diagram(s), {} wiki image(s), {} image link(s), {} cached",
            stats.diagrams, stats.wiki_images, stats.standard_images, stats.cache_hits
        ));
        output.success("Copied to clipboard");
        Ok(())
    }
}
