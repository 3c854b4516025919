//! ZIP input plugin — converts every supported entry through the registry.
//!
//! Entries are extracted into a temporary directory that is removed when
//! conversion finishes. Archives nested deeper than `max_zip_depth` are
//! skipped.

use std::path::Path;

use convert_core::error::{ConvertError, Result};
use convert_core::format::{DocumentFormat, DocumentRef};
use convert_core::plugin::{ExtractContext, InputPlugin};
use convert_utils::archive::ZipPackage;

pub struct ZipInputPlugin;

impl InputPlugin for ZipInputPlugin {
    fn name(&self) -> &str {
        "ZIP Input"
    }

    fn supported_formats(&self) -> &[DocumentFormat] {
        &[DocumentFormat::Zip]
    }

    fn convert(&self, input_path: &Path, ctx: &ExtractContext<'_>) -> Result<String> {
        let name = DocumentRef::new(input_path).display_name();
        if ctx.depth > ctx.options.max_zip_depth {
            return Err(ConvertError::Extraction(format!(
                "{} is nested deeper than {} archives",
                name, ctx.options.max_zip_depth
            )));
        }

        let mut pkg = ZipPackage::open(input_path)
            .map_err(|e| ConvertError::Extraction(format!("Invalid ZIP archive: {}", e)))?;
        let scratch = tempfile::tempdir()?;
        let entries = pkg
            .extract_matching(scratch.path(), |entry| {
                let supported = ctx.registry.supports(Path::new(entry));
                if !supported {
                    log::debug!("Skipping unsupported zip entry: {}", entry);
                }
                supported
            })
            .map_err(|e| ConvertError::Extraction(format!("Cannot unpack {}: {}", name, e)))?;

        let nested = ctx.nested();
        let mut sections = vec![format!("# Content from the zip file `{}`:", name)];
        for (entry_name, path) in entries {
            match ctx.registry.extract_with(&path, &nested) {
                Ok(md) => sections.push(format!("## File: {}\n\n{}", entry_name, md.trim_end())),
                Err(e) => log::warn!("Skipping zip entry {}: {}", entry_name, e),
            }
        }

        Ok(sections.join("\n\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use convert_core::options::ConversionOptions;
    use convert_core::registry::PluginRegistry;
    use convert_input_txt::TxtInputPlugin;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut cursor = std::io::Cursor::new(Vec::new());
        {
            let mut zip = zip::ZipWriter::new(&mut cursor);
            for (name, body) in entries {
                zip.start_file(*name, SimpleFileOptions::default()).unwrap();
                zip.write_all(body).unwrap();
            }
            zip.finish().unwrap();
        }
        cursor.into_inner()
    }

    fn registry() -> PluginRegistry {
        PluginRegistry::new()
            .with(Box::new(TxtInputPlugin))
            .with(Box::new(ZipInputPlugin))
    }

    #[test]
    fn test_zip_entries_converted_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bundle.zip");
        std::fs::write(
            &path,
            zip_bytes(&[
                ("notes/readme.md", b"# Readme\n\nHello"),
                ("tool.exe", b"MZ"),
                ("broken.json", b"{oops"),
                ("data.csv", b"a,b\n1,2"),
            ]),
        )
        .unwrap();

        let md = registry().extract(&path, &ConversionOptions::default()).unwrap();
        assert_eq!(
            md,
            "# Content from the zip file `bundle.zip`:\n\n\
             ## File: notes/readme.md\n\n# Readme\n\nHello\n\n\
             ## File: data.csv\n\n| a | b |\n| --- | --- |\n| 1 | 2 |\n"
        );
    }

    #[test]
    fn test_nested_zip_depth_limit() {
        let dir = tempfile::tempdir().unwrap();
        let innermost = zip_bytes(&[("deep.txt", b"too deep")]);
        let inner = zip_bytes(&[("inner.zip", &innermost), ("mid.txt", b"middle")]);
        let outer = zip_bytes(&[("outer.zip", &inner)]);
        let path = dir.path().join("top.zip");
        std::fs::write(&path, outer).unwrap();

        let mut opts = ConversionOptions::default();
        opts.max_zip_depth = 1;
        let md = registry().extract(&path, &opts).unwrap();
        assert!(md.contains("## File: outer.zip"));
        assert!(md.contains("middle"));
        assert!(!md.contains("too deep"));

        opts.max_zip_depth = 2;
        let md = registry().extract(&path, &opts).unwrap();
        assert!(md.contains("too deep"));
    }

    #[test]
    fn test_invalid_zip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.zip");
        std::fs::write(&path, b"not a zip").unwrap();
        let err = registry()
            .extract(&path, &ConversionOptions::default())
            .unwrap_err();
        assert!(matches!(err, ConvertError::Extraction(_)));
    }
}
