//! Screenshot persistence.

use std::fs;
use std::path::PathBuf;

use crate::error::{AuditError, AuditResult};

/// Writes page screenshots into a fixed output directory, creating the
/// directory on first use. One PNG per page, named from the page label; no
/// manifest or index file.
#[derive(Debug, Clone)]
pub struct ScreenshotSink {
    dir: PathBuf,
}

impl ScreenshotSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Persist `bytes` under a filename derived from `label`
    pub fn write(&self, label: &str, bytes: &[u8]) -> AuditResult<PathBuf> {
        fs::create_dir_all(&self.dir).map_err(|source| AuditError::ScreenshotWrite {
            path: self.dir.clone(),
            source,
        })?;

        let path = self.dir.join(filename_for(label));
        fs::write(&path, bytes).map_err(|source| AuditError::ScreenshotWrite {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

/// Derive a screenshot filename from a page label: whitespace becomes a
/// filename-safe separator
pub fn filename_for(label: &str) -> String {
    let stem: String = label
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect();
    format!("{}.png", stem)
}
