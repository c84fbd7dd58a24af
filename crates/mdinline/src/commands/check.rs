//! `mdinline check` command implementation.

use std::path::PathBuf;

use clap::Args;
use mdinline_core::check_bold_spacing;

use super::read_document;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the check command.
#[derive(Args)]
pub(crate) struct CheckArgs {
    /// Markdown document to check ("-" reads from stdin).
    document: PathBuf,
}

impl CheckArgs {
    /// Execute the check command.
    ///
    /// # Errors
    ///
    /// Returns an error if the document can't be read or any line has an issue.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let (text, _) = read_document(&self.document)?;

        let issues = check_bold_spacing(&text);
        if issues.is_empty() {
            output.success("No formatting issues found");
            return Ok(());
        }

        output.warning("Bold markers touching surrounding text:");
        for issue in &issues {
            output.info(&format!("  line {}: {}", issue.line_number, issue.content));
        }
        Err(CliError::Validation(format!(
            "{} line(s) with bold spacing issues",
            issues.len()
        )))
    }
}
