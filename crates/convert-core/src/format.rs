//! Input document formats and per-file document references.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Document formats the extractor knows how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Xlsx,
    Pptx,
    Html,
    Epub,
    Csv,
    Json,
    Xml,
    Txt,
    Markdown,
    Image,
    Audio,
    Zip,
}

impl DocumentFormat {
    /// Parse from file extension (case-insensitive, without the dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            "xlsx" => Some(Self::Xlsx),
            "pptx" => Some(Self::Pptx),
            "html" | "htm" | "xhtml" => Some(Self::Html),
            "epub" => Some(Self::Epub),
            "csv" => Some(Self::Csv),
            "json" | "jsonl" => Some(Self::Json),
            "xml" => Some(Self::Xml),
            "txt" | "text" | "log" => Some(Self::Txt),
            "md" | "markdown" => Some(Self::Markdown),
            "png" | "jpg" | "jpeg" | "gif" | "bmp" | "tif" | "tiff" | "webp" => Some(Self::Image),
            "mp3" | "wav" | "m4a" | "flac" | "ogg" => Some(Self::Audio),
            "zip" => Some(Self::Zip),
            _ => None,
        }
    }

    /// Detect the format of a path from its extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// Short display name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pdf => "PDF",
            Self::Docx => "DOCX",
            Self::Xlsx => "XLSX",
            Self::Pptx => "PPTX",
            Self::Html => "HTML",
            Self::Epub => "EPUB",
            Self::Csv => "CSV",
            Self::Json => "JSON",
            Self::Xml => "XML",
            Self::Txt => "TXT",
            Self::Markdown => "Markdown",
            Self::Image => "Image",
            Self::Audio => "Audio",
            Self::Zip => "ZIP",
        }
    }
}

impl std::fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A file to convert together with its inferred format.
///
/// `format` is `None` when the extension is not recognised; the registry
/// turns that into an `UnsupportedFormat` error.
#[derive(Debug, Clone)]
pub struct DocumentRef {
    pub path: PathBuf,
    pub format: Option<DocumentFormat>,
}

impl DocumentRef {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let format = DocumentFormat::from_path(&path);
        Self { path, format }
    }

    /// File name without extension, used to name output files.
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "untitled".to_string())
    }

    /// File name for log messages.
    pub fn display_name(&self) -> String {
        self.path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parsing() {
        assert_eq!(DocumentFormat::from_extension("pdf"), Some(DocumentFormat::Pdf));
        assert_eq!(DocumentFormat::from_extension("DOCX"), Some(DocumentFormat::Docx));
        assert_eq!(DocumentFormat::from_extension("htm"), Some(DocumentFormat::Html));
        assert_eq!(DocumentFormat::from_extension("jpeg"), Some(DocumentFormat::Image));
        assert_eq!(DocumentFormat::from_extension("wav"), Some(DocumentFormat::Audio));
        assert_eq!(DocumentFormat::from_extension("doc"), None);
        assert_eq!(DocumentFormat::from_extension("xyz"), None);
    }

    #[test]
    fn test_document_ref() {
        let doc = DocumentRef::new("input/Quarterly Report.XLSX");
        assert_eq!(doc.format, Some(DocumentFormat::Xlsx));
        assert_eq!(doc.stem(), "Quarterly Report");
        assert_eq!(doc.display_name(), "Quarterly Report.XLSX");

        let unknown = DocumentRef::new("notes.unknownext");
        assert_eq!(unknown.format, None);

        let bare = DocumentRef::new("Makefile");
        assert_eq!(bare.format, None);
        assert_eq!(bare.stem(), "Makefile");
    }
}
