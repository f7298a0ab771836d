//! Writing generated artifacts to disk.

use crate::orchestrator::{GeneratedArtifact, StubArtifact};
use anyhow::{Context, Result};
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

/// Writes string content to a file.
///
/// Creates the file if it doesn't exist, or overwrites it if it does. Parent
/// directories are created as needed.
///
/// # Errors
///
/// Returns an error if a directory or the file cannot be created or written to.
pub fn write_to_file(content: &str, path: &Path) -> Result<()> {
    debug!("Writing content to file: {}", path.display());

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    fs::write(path, content)
        .with_context(|| format!("Failed to write to file: {}", path.display()))?;

    debug!("Successfully wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}

/// Writes a spec artifact as `<output_dir>/<SpecName>.g.rs`.
///
/// # Returns
///
/// The path written.
pub fn write_artifact(artifact: &GeneratedArtifact, output_dir: &Path) -> Result<PathBuf> {
    let path = output_dir.join(artifact.file_name());
    write_to_file(&artifact.contents, &path)?;
    info!("Wrote {}", path.display());
    Ok(path)
}

/// Writes a stub artifact under its `<namespace>.<class>.g.rs` name.
pub fn write_stub(artifact: &StubArtifact, output_dir: &Path) -> Result<PathBuf> {
    let path = output_dir.join(&artifact.file_name);
    write_to_file(&artifact.contents, &path)?;
    info!("Wrote {}", path.display());
    Ok(path)
}
