//! Local `PlantUML` process provider.
//!
//! Runs `PlantUML` (a jar through a Java runtime, or a standalone
//! executable) in `-pipe` mode: diagram source goes to stdin, the rendered
//! image comes back on stdout. Renders are cached by content, so a diagram
//! is only rendered once per format.

use std::ffi::OsString;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use mdinline_cache::{CacheBucket, CacheBucketExt};

use crate::cache::DiagramKey;
use crate::consts::HEADLESS_FLAG;
use crate::error::DiagramError;
use crate::language::DiagramFormat;
use crate::provider::{DiagramPayload, ProviderSettings, Rendered};

/// Provider that pipes diagrams through a local `PlantUML` process.
pub struct LocalProcessProvider {
    settings: ProviderSettings,
    cache: Box<dyn CacheBucket>,
}

impl LocalProcessProvider {
    /// Create a provider. The renderer path is resolved on each render, so a
    /// bad path only fails documents that actually contain diagrams.
    #[must_use]
    pub fn new(settings: ProviderSettings, cache: Box<dyn CacheBucket>) -> Self {
        Self { settings, cache }
    }

    pub(crate) fn render(
        &self,
        source: &str,
        format: DiagramFormat,
    ) -> Result<Rendered, DiagramError> {
        let key = DiagramKey { source, format }.compute_key()?;

        if let Some(payload) = self.cached(&key, format) {
            tracing::debug!(%key, "diagram cache hit");
            return Ok(Rendered {
                payload,
                from_cache: true,
            });
        }

        let output = self.run(source, format)?;
        let payload = match format {
            DiagramFormat::Png => {
                self.cache.set_string(&key, &BASE64_STANDARD.encode(&output));
                DiagramPayload::Raster(output)
            }
            DiagramFormat::Svg => {
                let svg = String::from_utf8(output)?;
                self.cache.set_string(&key, &svg);
                DiagramPayload::Vector(svg)
            }
        };

        Ok(Rendered::fresh(payload))
    }

    /// Look up a previous render. Unreadable entries count as misses.
    fn cached(&self, key: &str, format: DiagramFormat) -> Option<DiagramPayload> {
        let text = self.cache.get_string(key)?;
        match format {
            DiagramFormat::Png => match BASE64_STANDARD.decode(text.as_bytes()) {
                Ok(bytes) => Some(DiagramPayload::Raster(bytes)),
                Err(e) => {
                    tracing::debug!(%key, "ignoring corrupt cache entry: {e}");
                    None
                }
            },
            DiagramFormat::Svg => Some(DiagramPayload::Vector(text)),
        }
    }

    /// Run `PlantUML` and return its stdout.
    ///
    /// Exit status 1 is a failure carrying stderr. Every other status,
    /// including 0 and termination by signal, is treated as success.
    fn run(&self, source: &str, format: DiagramFormat) -> Result<Vec<u8>, DiagramError> {
        let (program, args) = self.command_line(format)?;
        tracing::debug!(program = %program.display(), ?args, "running PlantUML");

        let mut child = Command::new(&program)
            .args(&args)
            .current_dir(&self.settings.vault_root)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| DiagramError::Spawn {
                program: program.clone(),
                source,
            })?;

        // Feed stdin from another thread so a large render cannot deadlock
        // against a full stdout pipe.
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| io::Error::other("renderer stdin was not captured"))?;
        let input = source.to_owned();
        let writer = std::thread::spawn(move || stdin.write_all(input.as_bytes()));

        let output = child.wait_with_output()?;

        match writer.join() {
            Ok(Ok(())) => {}
            // A renderer may exit before consuming its input
            Ok(Err(e)) => tracing::debug!("failed to write diagram to renderer stdin: {e}"),
            Err(_) => tracing::warn!("renderer stdin writer panicked"),
        }

        if output.status.code() == Some(1) {
            tracing::debug!(
                stdout = %String::from_utf8_lossy(&output.stdout),
                "PlantUML exited with status 1"
            );
            return Err(DiagramError::Process {
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }

        if output.stdout.is_empty() {
            return Err(DiagramError::EmptyOutput);
        }

        Ok(output.stdout)
    }

    /// Program and arguments for rendering in `format`.
    fn command_line(&self, format: DiagramFormat) -> Result<(PathBuf, Vec<OsString>), DiagramError> {
        let renderer = resolve_renderer_path(&self.settings.local_jar, &self.settings.vault_root)?;
        let common = [
            OsString::from(HEADLESS_FLAG),
            OsString::from("-charset"),
            OsString::from("utf-8"),
            OsString::from("-graphvizdot"),
            OsString::from(&self.settings.dot_path),
        ];

        let (program, mut args) = if renderer.extension().is_some_and(|ext| ext == "jar") {
            let mut args = vec![OsString::from("-jar")];
            args.push(common[0].clone());
            args.push(renderer.into_os_string());
            args.extend(common[1..].iter().cloned());
            (PathBuf::from(&self.settings.java_path), args)
        } else {
            (renderer, common.to_vec())
        };

        args.push(OsString::from(format!("-t{}", format.as_str())));
        args.push(OsString::from("-pipe"));
        Ok((program, args))
    }
}

/// Resolve the configured renderer path.
///
/// `~` expands to the home directory, absolute paths are kept, and relative
/// paths are taken from the vault root.
fn resolve_renderer_path(configured: &str, vault_root: &Path) -> Result<PathBuf, DiagramError> {
    let configured = configured.trim();
    if configured.is_empty() {
        return Err(DiagramError::InvalidExecutable(configured.to_owned()));
    }

    if configured.starts_with('~') {
        return Ok(PathBuf::from(shellexpand::tilde(configured).into_owned()));
    }

    let path = Path::new(configured);
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(vault_root.join(path))
    }
}
