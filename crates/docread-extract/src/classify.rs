//! Extension-based format classification.

use docread_core::DocumentFormat;
use std::path::Path;

/// Classify a file by its extension.
///
/// Case-insensitive. The file is never opened, so a mislabeled file is
/// classified by its name alone.
#[must_use]
pub fn classify(path: &Path) -> Option<DocumentFormat> {
    DocumentFormat::from_path(path)
}

/// Lowercased extension without the dot, or an empty string.
#[must_use]
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}
