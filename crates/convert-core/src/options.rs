//! Conversion options shared across the pipeline.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ConvertError, Result};

/// Name of the per-user config directory under the platform config dir.
pub const CONFIG_DIR_NAME: &str = "docmark";

/// Name of the project-local config file.
pub const LOCAL_CONFIG_FILE: &str = ".docmark.toml";

/// All options controlling extraction and rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionOptions {
    // -- General --
    pub verbose: u8,
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub generate_pdf: bool,

    // -- Input --
    /// Forced encoding label for plain-text inputs (e.g. "windows-1255").
    pub input_encoding: Option<String>,
    /// How deep ZIP archives nested inside ZIP archives are followed.
    pub max_zip_depth: usize,

    // -- PDF rendering --
    pub font_path: Option<PathBuf>,
    pub bold_font_path: Option<PathBuf>,
    pub italic_font_path: Option<PathBuf>,
    pub mono_font_path: Option<PathBuf>,
    /// Body text size in points; headings scale from their own table.
    pub base_font_size: f32,
    /// Left, right and top page margin in mm.
    pub page_margin_mm: f32,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            verbose: 0,
            input_dir: PathBuf::from("input"),
            output_dir: PathBuf::from("output"),
            generate_pdf: true,
            input_encoding: None,
            max_zip_depth: 2,
            font_path: None,
            bold_font_path: None,
            italic_font_path: None,
            mono_font_path: None,
            base_font_size: 10.0,
            page_margin_mm: 20.0,
        }
    }
}

impl ConversionOptions {
    /// Load config from global and project-local TOML files, then from an
    /// explicit file if one is given. Later files override earlier ones.
    ///
    /// Missing global/local files are silently ignored and unparsable ones
    /// are logged; an explicit file that is missing or invalid is an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut opts = ConversionOptions::default();

        // 1. Global config: ~/.config/docmark/config.toml
        if let Some(config_dir) = dirs::config_dir() {
            let global_path = config_dir.join(CONFIG_DIR_NAME).join("config.toml");
            if let Some(parsed) = Self::load_optional(&global_path) {
                opts = parsed;
            }
        }

        // 2. Project-local config: ./.docmark.toml
        if let Some(parsed) = Self::load_optional(Path::new(LOCAL_CONFIG_FILE)) {
            opts = parsed;
        }

        // 3. Explicit --config file
        if let Some(path) = explicit {
            opts = Self::load_from(path)?;
        }

        Ok(opts)
    }

    /// Parse options from a TOML file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ConvertError::Config(format!("Cannot read {}: {}", path.display(), e))
        })?;
        toml::from_str(&contents)
            .map_err(|e| ConvertError::Config(format!("Cannot parse {}: {}", path.display(), e)))
    }

    fn load_optional(path: &Path) -> Option<Self> {
        let contents = std::fs::read_to_string(path).ok()?;
        match toml::from_str::<ConversionOptions>(&contents) {
            Ok(parsed) => {
                log::debug!("Loaded config from {}", path.display());
                Some(parsed)
            }
            Err(e) => {
                log::warn!("Failed to parse {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Serialize the effective options as pretty TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| ConvertError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toml_round_trip_full() {
        let mut opts = ConversionOptions::default();
        opts.verbose = 2;
        opts.generate_pdf = false;
        opts.output_dir = PathBuf::from("exports");
        opts.font_path = Some(PathBuf::from("/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf"));
        opts.base_font_size = 12.0;
        opts.max_zip_depth = 0;

        let toml_str = opts.to_toml().unwrap();
        let parsed: ConversionOptions = toml::from_str(&toml_str).unwrap();

        assert_eq!(parsed.verbose, 2);
        assert!(!parsed.generate_pdf);
        assert_eq!(parsed.output_dir, PathBuf::from("exports"));
        assert_eq!(
            parsed.font_path.as_deref(),
            Some(Path::new("/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf"))
        );
        assert_eq!(parsed.base_font_size, 12.0);
        assert_eq!(parsed.max_zip_depth, 0);
    }

    #[test]
    fn test_toml_partial_config() {
        let toml_str = r#"
output_dir = "out"
page_margin_mm = 15.0
"#;
        let opts: ConversionOptions = toml::from_str(toml_str).unwrap();
        assert_eq!(opts.output_dir, PathBuf::from("out"));
        assert_eq!(opts.page_margin_mm, 15.0);
        // Defaults filled in
        assert!(opts.generate_pdf);
        assert_eq!(opts.input_dir, PathBuf::from("input"));
        assert_eq!(opts.base_font_size, 10.0);
        assert!(opts.font_path.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "generate_pdf = false\nmax_zip_depth = 1\n").unwrap();

        let opts = ConversionOptions::load_from(&path).unwrap();
        assert!(!opts.generate_pdf);
        assert_eq!(opts.max_zip_depth, 1);
    }

    #[test]
    fn test_load_from_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "generate_pdf = \"maybe\"").unwrap();

        let err = ConversionOptions::load_from(&path).unwrap_err();
        assert!(matches!(err, ConvertError::Config(_)));

        let missing = ConversionOptions::load_from(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(missing, ConvertError::Config(_)));
    }
}
