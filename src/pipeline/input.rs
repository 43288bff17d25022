//! Input resolution: validate a user-supplied local path.
//!
//! We validate the PDF magic bytes (`%PDF`) before handing the file to
//! pdfium so callers get a meaningful error rather than a cryptic parse
//! failure, and so a missing file is reported before the image output
//! directory is created or touched.

use crate::error::ExtractError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Resolve a local file path, validating existence, readability, and PDF
/// magic bytes.
pub fn resolve_local(path_str: &str) -> Result<PathBuf, ExtractError> {
    let path = PathBuf::from(path_str);

    if !path.exists() {
        return Err(ExtractError::FileNotFound { path });
    }

    match std::fs::File::open(&path) {
        Ok(mut f) => {
            use std::io::Read;
            let mut magic = [0u8; 4];
            if f.read_exact(&mut magic).is_ok() && &magic != b"%PDF" {
                return Err(ExtractError::NotAPdf { path, magic });
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(ExtractError::PermissionDenied { path });
        }
        Err(_) => {
            return Err(ExtractError::FileNotFound { path });
        }
    }

    debug!("Resolved local PDF: {}", path.display());
    Ok(path)
}

/// The source file's stem, sanitised for use in generated image filenames.
///
/// Everything outside `[A-Za-z0-9_.-]` becomes an underscore, matching the
/// character class used for the served image URLs.
pub fn sanitised_base_name(path: &Path) -> String {
    use once_cell::sync::Lazy;
    use regex::Regex;

    static RE_UNSAFE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w.-]").unwrap());

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    RE_UNSAFE.replace_all(&stem, "_").into_owned()
}
