//! System clipboard sink.
//!
//! On Linux the selection belongs to the process that set it and is lost when
//! that process exits. There the text is handed to a detached copy of this
//! binary (the hidden `hold-clipboard` command) which keeps serving it until
//! another application takes the clipboard over.

use mdinline_core::{ClipboardError, ClipboardSink};

/// Hidden subcommand that runs the clipboard holder.
#[cfg(target_os = "linux")]
pub(crate) const HOLD_COMMAND: &str = "hold-clipboard";

/// First line the holder prints once it owns the clipboard.
#[cfg(any(target_os = "linux", test))]
const READY: &str = "ready";

/// Writes converted text to the system clipboard.
#[derive(Default)]
pub(crate) struct SystemClipboard;

impl ClipboardSink for SystemClipboard {
    #[cfg(not(target_os = "linux"))]
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        arboard::Clipboard::new()
            .and_then(|mut clipboard| clipboard.set_text(text))
            .map_err(|e| ClipboardError(e.to_string()))
    }

    #[cfg(target_os = "linux")]
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        linux::spawn_holder(text)
    }
}

/// Interpret the holder's first output line.
#[cfg(any(target_os = "linux", test))]
fn holder_response(line: &str) -> Result<(), ClipboardError> {
    match line.trim() {
        READY => Ok(()),
        "" => Err(ClipboardError(
            "clipboard holder exited without a response".to_owned(),
        )),
        message => Err(ClipboardError(message.to_owned())),
    }
}

#[cfg(target_os = "linux")]
pub(crate) use linux::hold_clipboard;

#[cfg(target_os = "linux")]
mod linux {
    use std::io::{self, BufRead, BufReader, Read, Write};
    use std::process::{Command, Stdio};

    use arboard::{Clipboard, SetExtLinux};
    use mdinline_core::ClipboardError;

    use super::{HOLD_COMMAND, READY, holder_response};

    fn failure(context: &str, err: &io::Error) -> ClipboardError {
        ClipboardError(format!("{context}: {err}"))
    }

    /// Start a detached holder, send it `text` and wait for its verdict.
    // The holder outlives this process and is never waited on.
    #[allow(clippy::zombie_processes)]
    pub(super) fn spawn_holder(text: &str) -> Result<(), ClipboardError> {
        let exe = std::env::current_exe()
            .map_err(|e| failure("cannot locate the mdinline binary", &e))?;
        let mut child = Command::new(exe)
            .arg(HOLD_COMMAND)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| failure("failed to start clipboard holder", &e))?;
        tracing::debug!(pid = child.id(), "Started clipboard holder");

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(text.as_bytes())
                .map_err(|e| failure("failed to send text to clipboard holder", &e))?;
        }

        let mut line = String::new();
        if let Some(stdout) = child.stdout.take() {
            BufReader::new(stdout)
                .read_line(&mut line)
                .map_err(|e| failure("failed to read clipboard holder status", &e))?;
        }
        holder_response(&line)
    }

    /// Serve stdin as the clipboard contents until another application
    /// replaces them.
    ///
    /// The outcome of taking the clipboard is reported as the first stdout
    /// line: [`READY`] or an error message.
    pub(crate) fn hold_clipboard() -> io::Result<()> {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text)?;

        let mut stdout = io::stdout();
        let mut clipboard = match Clipboard::new() {
            Ok(clipboard) => clipboard,
            Err(e) => return writeln!(stdout, "{e}"),
        };
        if let Err(e) = clipboard.set_text(text.as_str()) {
            return writeln!(stdout, "{e}");
        }
        writeln!(stdout, "{READY}")?;
        stdout.flush()?;

        if let Err(e) = clipboard.set().wait().text(text) {
            tracing::warn!("Clipboard holder stopped: {e}");
        }
        Ok(())
    }
}
