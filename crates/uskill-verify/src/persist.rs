use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};

/// Saves rendered report text at `path`.
///
/// The text is staged in a hidden sibling file and renamed over the
/// destination, so an interrupted run leaves the previous report intact.
pub fn persist_report(path: &Path, rendered: &str) -> Result<()> {
    if path.is_dir() {
        bail!("report path '{}' is a directory", path.display());
    }
    let Some(file_name) = path.file_name() else {
        bail!("report path '{}' has no file name", path.display());
    };
    let report_dir = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(report_dir)
        .with_context(|| format!("failed to create report directory {}", report_dir.display()))?;

    let staging = report_dir.join(format!(
        ".{}.partial-{}",
        file_name.to_string_lossy(),
        std::process::id()
    ));
    fs::write(&staging, rendered)
        .with_context(|| format!("failed to stage report at {}", staging.display()))?;
    if let Err(error) = fs::rename(&staging, path) {
        let _ = fs::remove_file(&staging);
        return Err(error)
            .with_context(|| format!("failed to move report into {}", path.display()));
    }
    tracing::debug!(path = %path.display(), bytes = rendered.len(), "report saved");
    Ok(())
}
