//! Unicode font discovery and advance-width measurement.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use ttf_parser::{Face, GlyphId};

use convert_core::error::{ConvertError, Result};
use convert_core::options::ConversionOptions;

/// Millimetres per PostScript point.
pub const MM_PER_PT: f32 = 25.4 / 72.0;

/// The face a run of text is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontStyle {
    Regular,
    Bold,
    Italic,
    Mono,
}

/// Anything that can tell how wide a string is once drawn.
pub trait TextMeasure {
    fn width_mm(&self, text: &str, style: FontStyle, size_pt: f32) -> f32;
}

/// One family of font files to look for. Only `regular` is required.
struct Candidate {
    regular: &'static str,
    bold: &'static str,
    italic: &'static str,
    mono: &'static str,
}

#[cfg(target_os = "windows")]
const CANDIDATES: &[Candidate] = &[
    Candidate {
        regular: r"C:\Windows\Fonts\arial.ttf",
        bold: r"C:\Windows\Fonts\arialbd.ttf",
        italic: r"C:\Windows\Fonts\ariali.ttf",
        mono: r"C:\Windows\Fonts\consola.ttf",
    },
    Candidate {
        regular: r"C:\Windows\Fonts\calibri.ttf",
        bold: r"C:\Windows\Fonts\calibrib.ttf",
        italic: r"C:\Windows\Fonts\calibrii.ttf",
        mono: r"C:\Windows\Fonts\lucon.ttf",
    },
];

#[cfg(target_os = "macos")]
const CANDIDATES: &[Candidate] = &[
    Candidate {
        regular: "/Library/Fonts/Arial Unicode.ttf",
        bold: "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
        italic: "/System/Library/Fonts/Supplemental/Arial Italic.ttf",
        mono: "/System/Library/Fonts/Supplemental/Courier New.ttf",
    },
    Candidate {
        regular: "/System/Library/Fonts/Supplemental/Arial.ttf",
        bold: "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
        italic: "/System/Library/Fonts/Supplemental/Arial Italic.ttf",
        mono: "/System/Library/Fonts/Supplemental/Courier New.ttf",
    },
    Candidate {
        regular: "/Library/Fonts/Arial.ttf",
        bold: "/Library/Fonts/Arial Bold.ttf",
        italic: "/Library/Fonts/Arial Italic.ttf",
        mono: "/Library/Fonts/Courier New.ttf",
    },
];

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
const CANDIDATES: &[Candidate] = &[
    Candidate {
        regular: "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        bold: "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
        italic: "/usr/share/fonts/truetype/dejavu/DejaVuSans-Oblique.ttf",
        mono: "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
    },
    Candidate {
        regular: "/usr/share/fonts/dejavu/DejaVuSans.ttf",
        bold: "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
        italic: "/usr/share/fonts/dejavu/DejaVuSans-Oblique.ttf",
        mono: "/usr/share/fonts/dejavu/DejaVuSansMono.ttf",
    },
    Candidate {
        regular: "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
        bold: "/usr/share/fonts/truetype/noto/NotoSans-Bold.ttf",
        italic: "/usr/share/fonts/truetype/noto/NotoSans-Italic.ttf",
        mono: "/usr/share/fonts/truetype/noto/NotoSansMono-Regular.ttf",
    },
    Candidate {
        regular: "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
        bold: "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
        italic: "/usr/share/fonts/truetype/liberation/LiberationSans-Italic.ttf",
        mono: "/usr/share/fonts/truetype/liberation/LiberationMono-Regular.ttf",
    },
    Candidate {
        regular: "/usr/share/fonts/truetype/freefont/FreeSans.ttf",
        bold: "/usr/share/fonts/truetype/freefont/FreeSansBold.ttf",
        italic: "/usr/share/fonts/truetype/freefont/FreeSansOblique.ttf",
        mono: "/usr/share/fonts/truetype/freefont/FreeMono.ttf",
    },
];

/// A loaded TrueType/OpenType font file.
pub struct FontFace {
    pub path: PathBuf,
    pub data: Vec<u8>,
    units_per_em: f32,
    /// Horizontal advance of every character the Unicode cmap maps.
    advances: HashMap<char, u16>,
    notdef_advance: u16,
}

impl FontFace {
    /// Read and validate a font file. The face must map Unicode code points.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)
            .map_err(|e| ConvertError::FontLoad(format!("{}: {}", path.display(), e)))?;
        Self::from_bytes(path, data)
    }

    pub fn from_bytes(path: &Path, data: Vec<u8>) -> Result<Self> {
        let face = Face::parse(&data, 0)
            .map_err(|e| ConvertError::FontLoad(format!("{}: {}", path.display(), e)))?;
        if face.glyph_index('a').is_none() {
            return Err(ConvertError::FontLoad(format!(
                "{}: no Unicode character map",
                path.display()
            )));
        }
        if face.glyph_index('\u{05D0}').is_none() {
            log::debug!("{} has no Hebrew glyphs", path.display());
        }
        let units_per_em = face.units_per_em() as f32;
        let notdef_advance = face.glyph_hor_advance(GlyphId(0)).unwrap_or(0);
        let advances = unicode_advances(&face);

        Ok(Self {
            path: path.to_path_buf(),
            data,
            units_per_em,
            advances,
            notdef_advance,
        })
    }

    /// Advance width of `text` at `size_pt`, in mm. Characters without a
    /// glyph count with the `.notdef` advance.
    pub fn width_mm(&self, text: &str, size_pt: f32) -> f32 {
        let units: u32 = text.chars().map(|c| self.advance(c) as u32).sum();
        units as f32 / self.units_per_em * size_pt * MM_PER_PT
    }

    /// Advance of `c` in font units.
    pub fn advance(&self, c: char) -> u16 {
        self.advances
            .get(&c)
            .copied()
            .unwrap_or(self.notdef_advance)
    }
}

/// Walk the Unicode cmap subtables once. Earlier subtables win, matching
/// `Face::glyph_index`.
fn unicode_advances(face: &Face<'_>) -> HashMap<char, u16> {
    let mut advances = HashMap::new();
    let Some(cmap) = face.tables().cmap else {
        return advances;
    };
    for subtable in cmap.subtables {
        if !subtable.is_unicode() {
            continue;
        }
        subtable.codepoints(|code_point| {
            let Some(c) = char::from_u32(code_point) else {
                return;
            };
            if advances.contains_key(&c) {
                return;
            }
            if let Some(advance) = subtable
                .glyph_index(code_point)
                .and_then(|g| face.glyph_hor_advance(g))
            {
                advances.insert(c, advance);
            }
        });
    }
    advances
}

/// The faces used to render one document. Missing bold, italic or mono
/// faces fall back to the regular face.
pub struct FontSet {
    faces: Vec<FontFace>,
    /// Index into `faces` for Regular, Bold, Italic, Mono.
    slots: [usize; 4],
}

impl FontSet {
    /// Configured fonts first, then the platform's well-known font files.
    pub fn discover(options: &ConversionOptions) -> Result<Self> {
        if let Some(regular) = &options.font_path {
            return Self::from_paths(
                regular,
                options.bold_font_path.as_deref(),
                options.italic_font_path.as_deref(),
                options.mono_font_path.as_deref(),
            );
        }

        for candidate in CANDIDATES {
            let regular = Path::new(candidate.regular);
            if !regular.is_file() {
                continue;
            }
            let optional = |p: &'static str| Some(Path::new(p)).filter(|p| p.is_file());
            match Self::from_paths(
                regular,
                optional(candidate.bold),
                optional(candidate.italic),
                optional(candidate.mono),
            ) {
                Ok(set) => return Ok(set),
                Err(e) => log::warn!("Skipping font {}: {}", candidate.regular, e),
            }
        }

        Err(ConvertError::FontLoad(
            "No Unicode font found; set font_path in the config file".to_string(),
        ))
    }

    /// Load a set from explicit files. A bad regular face is an error; a bad
    /// optional face is logged and replaced by the regular one.
    pub fn from_paths(
        regular: &Path,
        bold: Option<&Path>,
        italic: Option<&Path>,
        mono: Option<&Path>,
    ) -> Result<Self> {
        let mut faces = vec![FontFace::load(regular)?];
        let mut slots = [0usize; 4];

        for (slot, path) in [(1, bold), (2, italic), (3, mono)] {
            let Some(path) = path else { continue };
            match FontFace::load(path) {
                Ok(face) => {
                    faces.push(face);
                    slots[slot] = faces.len() - 1;
                }
                Err(e) => log::warn!("{}, using regular face", e),
            }
        }

        log::debug!("Using font {}", regular.display());
        Ok(Self { faces, slots })
    }

    pub fn face(&self, style: FontStyle) -> &FontFace {
        &self.faces[self.slots[slot_of(style)]]
    }

    /// Index of the face used for `style` among [`faces`](Self::faces).
    pub fn face_index(&self, style: FontStyle) -> usize {
        self.slots[slot_of(style)]
    }

    pub fn faces(&self) -> &[FontFace] {
        &self.faces
    }
}

fn slot_of(style: FontStyle) -> usize {
    match style {
        FontStyle::Regular => 0,
        FontStyle::Bold => 1,
        FontStyle::Italic => 2,
        FontStyle::Mono => 3,
    }
}

impl TextMeasure for FontSet {
    fn width_mm(&self, text: &str, style: FontStyle, size_pt: f32) -> f32 {
        self.face(style).width_mm(text, size_pt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_configured_font() {
        let mut options = ConversionOptions::default();
        options.font_path = Some(PathBuf::from("/nonexistent/font.ttf"));
        let err = FontSet::discover(&options).err().unwrap();
        assert!(matches!(err, ConvertError::FontLoad(_)));
    }

    #[test]
    fn test_garbage_font_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.ttf");
        std::fs::write(&path, b"definitely not a font").unwrap();
        assert!(matches!(
            FontFace::load(&path),
            Err(ConvertError::FontLoad(_))
        ));
    }

    #[test]
    fn test_discovered_font_measures_text() {
        let Ok(fonts) = FontSet::discover(&ConversionOptions::default()) else {
            return; // no system font available
        };
        let short = fonts.width_mm("ab", FontStyle::Regular, 10.0);
        let long = fonts.width_mm("abab", FontStyle::Regular, 10.0);
        assert!(short > 0.0);
        assert!((long - 2.0 * short).abs() < 0.01);
        let bigger = fonts.width_mm("ab", FontStyle::Regular, 20.0);
        assert!((bigger - 2.0 * short).abs() < 0.01);
    }

    #[test]
    fn test_cached_advances_match_face() {
        let Ok(fonts) = FontSet::discover(&ConversionOptions::default()) else {
            return;
        };
        let font = fonts.face(FontStyle::Regular);
        let face = Face::parse(&font.data, 0).unwrap();
        let notdef = face.glyph_hor_advance(GlyphId(0)).unwrap_or(0);
        for c in "Wi 2024 שלום (x) \u{E000}\u{10FFFD}".chars() {
            let direct = face
                .glyph_index(c)
                .and_then(|g| face.glyph_hor_advance(g))
                .unwrap_or(notdef);
            assert_eq!(font.advance(c), direct, "advance of {:?}", c);
        }
    }

    #[test]
    fn test_missing_faces_fall_back_to_regular() {
        let Ok(fonts) = FontSet::discover(&ConversionOptions::default()) else {
            return;
        };
        let regular = fonts.face(FontStyle::Regular).path.clone();
        let only_regular = FontSet::from_paths(&regular, None, None, None).unwrap();
        assert_eq!(only_regular.faces().len(), 1);
        assert_eq!(only_regular.face_index(FontStyle::Mono), 0);
        assert_eq!(only_regular.face(FontStyle::Bold).path, regular);
    }
}
