//! MIME type lookup for files that are described rather than parsed.

use std::path::Path;

/// MIME type guessed from a path's extension.
pub fn mime_from_path(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

/// Whether a manifest media type denotes an (X)HTML content document.
pub fn is_html_mime(mime: &str) -> bool {
    matches!(mime, "application/xhtml+xml" | "text/html")
}
