//! `mdinline convert` command implementation.

use std::io::Write;

use clap::Args;

use super::ConvertOptions;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the convert command.
#[derive(Args)]
pub(crate) struct ConvertArgs {
    #[command(flatten)]
    options: ConvertOptions,
}

impl ConvertArgs {
    /// Execute the convert command, writing the result to stdout.
    ///
    /// # Errors
    ///
    /// Returns an error if conversion fails or stdout can't be written.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let prepared = self.options.prepare()?;

        let conversion = prepared
            .converter
            .convert(&prepared.document, &prepared.source_path)?;

        let mut stdout = std::io::stdout().lock();
        stdout.write_all(conversion.text.as_bytes())?;
        stdout.flush()?;

        output.success(&format!(
            "Inlined {} reference(s) from {}",
            conversion.stats.total(),
            prepared.source_path.display()
        ));
        Ok(())
    }
}
