//! ZIP container access for OOXML (DOCX/XLSX/PPTX), EPUB and plain ZIP inputs.

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use zip::read::ZipArchive;

/// An opened ZIP container with by-name entry access.
pub struct ZipPackage {
    archive: ZipArchive<File>,
}

impl ZipPackage {
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = File::open(path)?;
        let archive = ZipArchive::new(file)?;
        Ok(Self { archive })
    }

    /// Entry names in archive order.
    pub fn entry_names(&self) -> Vec<String> {
        (0..self.archive.len())
            .filter_map(|i| self.archive.name_for_index(i).map(|s| s.to_string()))
            .collect()
    }

    pub fn has_entry(&self, name: &str) -> bool {
        self.archive.index_for_name(name).is_some()
    }

    pub fn read_bytes(&mut self, name: &str) -> io::Result<Vec<u8>> {
        let mut entry = self.archive.by_name(name)?;
        // The declared size comes from the archive and is not trusted.
        let mut buf = Vec::new();
        entry.read_to_end(&mut buf)?;
        Ok(buf)
    }

    /// Read an entry as UTF-8 text (BOM and invalid sequences tolerated).
    pub fn read_string(&mut self, name: &str) -> io::Result<String> {
        let bytes = self.read_bytes(name)?;
        Ok(crate::encoding::decode_to_utf8(&bytes).0)
    }

    /// Read an entry if present; `None` when the archive lacks it.
    pub fn read_optional(&mut self, name: &str) -> io::Result<Option<String>> {
        if self.has_entry(name) {
            self.read_string(name).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Extract the file entries whose names pass `keep` under `output_dir`.
    ///
    /// Rejected entries are never written. Entries whose names escape the
    /// target directory are skipped.
    pub fn extract_matching<F>(
        &mut self,
        output_dir: &Path,
        mut keep: F,
    ) -> io::Result<Vec<(String, PathBuf)>>
    where
        F: FnMut(&str) -> bool,
    {
        let mut extracted = Vec::new();

        for i in 0..self.archive.len() {
            let mut entry = self.archive.by_index(i)?;
            if entry.is_dir() {
                continue;
            }
            let name = entry.name().to_string();
            if !keep(&name) {
                continue;
            }
            let Some(relative) = entry.enclosed_name() else {
                log::warn!("Skipping unsafe zip entry: {}", name);
                continue;
            };

            let out_path = output_dir.join(relative);
            if let Some(parent) = out_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let mut outfile = File::create(&out_path)?;
            io::copy(&mut entry, &mut outfile)?;
            extracted.push((name, out_path));
        }

        Ok(extracted)
    }
}

/// Resolve a relationship target against the entry that references it.
///
/// `resolve_part("ppt/slides/slide1.xml", "../media/image1.png")` gives
/// `ppt/media/image1.png`. Absolute targets (`/word/media/a.png`) are taken
/// from the package root.
pub fn resolve_part(source_part: &str, target: &str) -> String {
    if let Some(abs) = target.strip_prefix('/') {
        return abs.to_string();
    }
    let mut segments: Vec<&str> = source_part.split('/').collect();
    segments.pop();
    for seg in target.split('/') {
        match seg {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    segments.join("/")
}

/// Strip any fragment from a manifest/link href and percent-decode it.
pub fn decode_href(href: &str) -> String {
    let path = href.split('#').next().unwrap_or(href);
    percent_encoding::percent_decode_str(path)
        .decode_utf8_lossy()
        .into_owned()
}

/// Relationships part for a given part: `a/b.xml` → `a/_rels/b.xml.rels`.
pub fn rels_path_for(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part),
    }
}
