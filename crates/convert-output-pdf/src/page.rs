//! Turn composed page layouts into printpdf pages.

use printpdf::{
    Color, FontId, Line, LinePoint, Mm, Op, ParsedFont, PdfDocument, PdfPage, PdfSaveOptions,
    Point, Pt, Rgb, TextItem,
};
use sha2::{Digest, Sha256};

use convert_core::error::{ConvertError, Result};

use crate::fonts::{FontSet, FontStyle, MM_PER_PT};
use crate::layout::{PageGeometry, PageItem, PageLayout};

/// Builds the ops of one page.
struct PageBuilder<'a> {
    font_ids: &'a [FontId],
    fonts: &'a FontSet,
    ops: Vec<Op>,
}

impl<'a> PageBuilder<'a> {
    fn new(font_ids: &'a [FontId], fonts: &'a FontSet) -> Self {
        Self {
            font_ids,
            fonts,
            ops: Vec::new(),
        }
    }

    fn font(&self, style: FontStyle) -> FontId {
        self.font_ids[self.fonts.face_index(style)].clone()
    }

    fn stroke(&mut self, y_mm: f32, x_start: f32, x_end: f32, thickness_mm: f32, color: Color) {
        self.ops.push(Op::SetOutlineColor { col: color });
        self.ops.push(Op::SetOutlineThickness {
            pt: Pt(thickness_mm / MM_PER_PT),
        });
        self.ops.push(Op::DrawLine {
            line: Line {
                points: vec![
                    LinePoint {
                        p: Point {
                            x: Mm(x_start).into(),
                            y: Mm(y_mm).into(),
                        },
                        bezier: false,
                    },
                    LinePoint {
                        p: Point {
                            x: Mm(x_end).into(),
                            y: Mm(y_mm).into(),
                        },
                        bezier: false,
                    },
                ],
                is_closed: false,
            },
        });
    }

    /// Each run gets its own text section so cursor positions stay absolute.
    fn write_run(
        &mut self,
        text: &str,
        style: FontStyle,
        size_pt: f32,
        x_mm: f32,
        y_mm: f32,
        color: Color,
    ) {
        let font = self.font(style);
        self.ops.push(Op::SetFillColor { col: color });
        self.ops.push(Op::StartTextSection);
        self.ops.push(Op::SetFontSize {
            size: Pt(size_pt),
            font: font.clone(),
        });
        self.ops.push(Op::SetTextCursor {
            pos: Point {
                x: Mm(x_mm).into(),
                y: Mm(y_mm).into(),
            },
        });
        self.ops.push(Op::WriteText {
            items: vec![TextItem::Text(text.to_string())],
            font,
        });
        self.ops.push(Op::EndTextSection);
    }

    fn finish(self, geometry: &PageGeometry) -> PdfPage {
        PdfPage::new(Mm(geometry.width_mm), Mm(geometry.height_mm), self.ops)
    }
}

fn color((r, g, b): (u8, u8, u8)) -> Color {
    Color::Rgb(Rgb {
        r: r as f32 / 255.0,
        g: g as f32 / 255.0,
        b: b as f32 / 255.0,
        icc_profile: None,
    })
}

/// Serialize composed pages into PDF bytes, embedding the fonts in `fonts`.
pub fn build_pdf(
    title: &str,
    layouts: &[PageLayout],
    fonts: &FontSet,
    geometry: &PageGeometry,
) -> Result<Vec<u8>> {
    let mut doc = PdfDocument::new(title);
    let mut warnings = Vec::new();

    // `add_font` picks random ids, and they end up in the embedded font names.
    let mut font_ids = Vec::with_capacity(fonts.faces().len());
    for (index, face) in fonts.faces().iter().enumerate() {
        let parsed = ParsedFont::from_bytes(&face.data, 0, &mut warnings).ok_or_else(|| {
            ConvertError::FontLoad(format!("Cannot embed {}", face.path.display()))
        })?;
        let id = FontId(format!("F{}", index + 1));
        doc.resources.fonts.map.insert(id.clone(), parsed);
        font_ids.push(id);
    }

    let pages: Vec<PdfPage> = layouts
        .iter()
        .map(|layout| {
            let mut builder = PageBuilder::new(&font_ids, fonts);
            for item in &layout.items {
                match item {
                    PageItem::Stroke {
                        y_mm,
                        x_start_mm,
                        x_end_mm,
                        thickness_mm,
                        color: rgb,
                    } => {
                        builder.stroke(*y_mm, *x_start_mm, *x_end_mm, *thickness_mm, color(*rgb))
                    }
                    PageItem::Text {
                        baseline_mm,
                        size_pt,
                        color: rgb,
                        fragments,
                        ..
                    } => {
                        for fragment in fragments {
                            builder.write_run(
                                &fragment.text,
                                fragment.style,
                                *size_pt,
                                fragment.x_mm,
                                *baseline_mm,
                                color(*rgb),
                            );
                        }
                    }
                }
            }
            builder.finish(geometry)
        })
        .collect();

    let mut bytes = doc
        .with_pages(pages)
        .save(&PdfSaveOptions::default(), &mut warnings);
    if !warnings.is_empty() {
        log::debug!("printpdf reported {} warnings", warnings.len());
    }
    stamp_file_id(&mut bytes);
    Ok(bytes)
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn rfind(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).rposition(|w| w == needle)
}

/// Overwrite the trailer `/ID` strings with a digest of everything before the
/// trailer. The replacement has the same length, so no offsets move.
fn stamp_file_id(bytes: &mut [u8]) {
    let Some(trailer) = rfind(bytes, b"trailer") else {
        return;
    };
    let digest = Sha256::digest(&bytes[..trailer]);
    let id: String = digest[..16].iter().map(|b| format!("{:02x}", b)).collect();

    let Some(mut cursor) = find(&bytes[trailer..], b"/ID").map(|p| trailer + p) else {
        return;
    };
    for _ in 0..2 {
        let Some(open) = bytes[cursor..].iter().position(|&b| b == b'(') else {
            return;
        };
        let start = cursor + open + 1;
        let Some(len) = bytes[start..].iter().position(|&b| b == b')') else {
            return;
        };
        if len == id.len() {
            bytes[start..start + len].copy_from_slice(id.as_bytes());
        } else {
            log::debug!("Unexpected /ID length {}, left as written", len);
        }
        cursor = start + len + 1;
    }
}
