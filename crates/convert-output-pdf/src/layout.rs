//! Line placement: wrapping, direction-aware anchoring and page breaks.

use std::ops::Range;

use convert_core::options::ConversionOptions;

use crate::bidi::{line_direction, single_paragraph, Direction, Reorderer, StyleRun};
use crate::fonts::{FontStyle, TextMeasure, MM_PER_PT};
use crate::markdown::{classify_lines, inline_spans, plain_text, LineKind, MdLine, Span};

/// Line height as a multiple of the font size.
const LINE_HEIGHT: f32 = 1.4;

const HEADING_SIZES: [f32; 6] = [20.0, 16.0, 13.0, 11.0, 10.0, 10.0];

const BODY_COLOR: Rgb = (30, 30, 30);
const HEADING_COLOR: Rgb = (0, 0, 0);
const CODE_COLOR: Rgb = (50, 50, 50);
const CODE_BACKGROUND: Rgb = (240, 240, 240);
const QUOTE_COLOR: Rgb = (100, 100, 100);
const RULE_COLOR: Rgb = (180, 180, 180);

/// 8-bit RGB colour.
pub type Rgb = (u8, u8, u8);

/// Page size and margins, all in mm.
#[derive(Debug, Clone)]
pub struct PageGeometry {
    pub width_mm: f32,
    pub height_mm: f32,
    /// Left, right and top margin.
    pub margin_mm: f32,
    pub bottom_margin_mm: f32,
    pub base_font_size: f32,
}

impl PageGeometry {
    /// A4 portrait with the configured margin and body size.
    pub fn a4(options: &ConversionOptions) -> Self {
        Self {
            width_mm: 210.0,
            height_mm: 297.0,
            margin_mm: options.page_margin_mm,
            bottom_margin_mm: 15.0,
            base_font_size: options.base_font_size,
        }
    }

    pub fn left_mm(&self) -> f32 {
        self.margin_mm
    }

    pub fn right_mm(&self) -> f32 {
        self.width_mm - self.margin_mm
    }

    pub fn printable_width_mm(&self) -> f32 {
        self.right_mm() - self.left_mm()
    }

    fn top_mm(&self) -> f32 {
        self.height_mm - self.margin_mm
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::a4(&ConversionOptions::default())
    }
}

/// A run of text placed at an absolute x position.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedFragment {
    pub text: String,
    pub style: FontStyle,
    pub x_mm: f32,
    pub width_mm: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PageItem {
    Text {
        baseline_mm: f32,
        size_pt: f32,
        color: Rgb,
        direction: Direction,
        fragments: Vec<PlacedFragment>,
    },
    /// A horizontal stroke; thick strokes serve as shaded bands.
    Stroke {
        y_mm: f32,
        x_start_mm: f32,
        x_end_mm: f32,
        thickness_mm: f32,
        color: Rgb,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageLayout {
    pub items: Vec<PageItem>,
}

impl PageLayout {
    /// Text of each line in visual order, for inspection.
    pub fn lines(&self) -> Vec<String> {
        self.items
            .iter()
            .filter_map(|item| match item {
                PageItem::Text { fragments, .. } => {
                    Some(fragments.iter().map(|f| f.text.as_str()).collect())
                }
                PageItem::Stroke { .. } => None,
            })
            .collect()
    }
}

/// How one kind of line is drawn.
struct BlockStyle {
    size_pt: f32,
    face: FontStyle,
    color: Rgb,
    indent_mm: f32,
    /// Inline emphasis kept as separate runs.
    inline: bool,
    forced: Option<Direction>,
}

fn block_style(kind: &LineKind, base: f32) -> BlockStyle {
    let body = BlockStyle {
        size_pt: base,
        face: FontStyle::Regular,
        color: BODY_COLOR,
        indent_mm: 0.0,
        inline: true,
        forced: None,
    };
    match kind {
        LineKind::Heading(level) => BlockStyle {
            size_pt: HEADING_SIZES[(*level as usize).clamp(1, 6) - 1],
            face: FontStyle::Bold,
            color: HEADING_COLOR,
            ..body
        },
        LineKind::ListItem { depth, .. } => BlockStyle {
            indent_mm: 3.0 * *depth as f32,
            ..body
        },
        LineKind::Quote => BlockStyle {
            size_pt: base - 1.0,
            face: FontStyle::Italic,
            color: QUOTE_COLOR,
            indent_mm: 5.0,
            ..body
        },
        LineKind::Code => BlockStyle {
            size_pt: base - 1.0,
            face: FontStyle::Mono,
            color: CODE_COLOR,
            inline: false,
            forced: Some(Direction::Ltr),
            ..body
        },
        LineKind::Rule | LineKind::Blank | LineKind::Paragraph => body,
    }
}

/// Lays lines out top to bottom, starting a new page when the cursor would
/// pass the bottom margin.
pub struct Composer<'m> {
    measure: &'m dyn TextMeasure,
    geometry: PageGeometry,
    pages: Vec<PageLayout>,
    current: PageLayout,
    /// Cursor, mm from the bottom edge.
    y_pos: f32,
    in_code: bool,
}

impl<'m> Composer<'m> {
    pub fn new(measure: &'m dyn TextMeasure, geometry: PageGeometry) -> Self {
        let y_pos = geometry.top_mm();
        Self {
            measure,
            geometry,
            pages: Vec::new(),
            current: PageLayout::default(),
            y_pos,
            in_code: false,
        }
    }

    fn new_page(&mut self) {
        let page = std::mem::take(&mut self.current);
        self.pages.push(page);
        self.y_pos = self.geometry.top_mm();
    }

    fn ensure_space(&mut self, needed_mm: f32) {
        let at_top = self.y_pos >= self.geometry.top_mm();
        if self.y_pos - needed_mm < self.geometry.bottom_margin_mm && !at_top {
            self.new_page();
        }
    }

    /// Vertical spacing. Spacing never carries over to a new page.
    fn skip(&mut self, mm: f32) {
        self.y_pos = (self.y_pos - mm).max(self.geometry.bottom_margin_mm);
    }

    pub fn push_line(&mut self, line: &MdLine) {
        let is_code = line.kind == LineKind::Code;
        if is_code != self.in_code {
            self.skip(2.0);
            self.in_code = is_code;
        }

        match &line.kind {
            LineKind::Blank => self.skip(4.0),
            LineKind::Rule => self.push_rule(),
            LineKind::Heading(_) => {
                if line.text.is_empty() {
                    return;
                }
                self.skip(4.0);
                self.push_text(line);
                self.skip(1.0);
            }
            _ => self.push_text(line),
        }
    }

    fn push_rule(&mut self) {
        self.skip(3.0);
        self.ensure_space(0.5);
        self.current.items.push(PageItem::Stroke {
            y_mm: self.y_pos,
            x_start_mm: self.geometry.left_mm(),
            x_end_mm: self.geometry.right_mm(),
            thickness_mm: 0.3,
            color: RULE_COLOR,
        });
        self.skip(3.0);
    }

    fn push_text(&mut self, line: &MdLine) {
        let style = block_style(&line.kind, self.geometry.base_font_size);
        let direction = style
            .forced
            .unwrap_or_else(|| line_direction(&plain_text(&line.text)));

        // Inline runs only for left-to-right lines
        let mut spans = if !style.inline {
            vec![Span {
                text: line.text.clone(),
                style: style.face,
            }]
        } else if direction == Direction::Ltr {
            inline_spans(&line.text, style.face)
        } else {
            vec![Span {
                text: plain_text(&line.text),
                style: style.face,
            }]
        };
        if let LineKind::ListItem { marker, .. } = &line.kind {
            spans.insert(
                0,
                Span {
                    text: format!("{} ", marker),
                    style: FontStyle::Regular,
                },
            );
        }

        let mut text = String::new();
        let mut runs = Vec::with_capacity(spans.len());
        for span in &spans {
            let piece = single_paragraph(&span.text);
            let start = text.len();
            text.push_str(&piece);
            runs.push(StyleRun {
                range: start..text.len(),
                style: span.style,
            });
        }
        let line_h = style.size_pt * LINE_HEIGHT * MM_PER_PT;
        if text.trim().is_empty() {
            if line.kind == LineKind::Code {
                // blank line inside a code block keeps its height
                self.ensure_space(line_h);
                self.push_code_band(line_h);
                self.y_pos -= line_h;
            }
            return;
        }

        let max_width = self.geometry.printable_width_mm() - style.indent_mm;
        let lines = wrap(&text, &runs, style.size_pt, self.measure, max_width);
        let reorderer = Reorderer::new(&text, direction);

        for range in lines {
            self.ensure_space(line_h);
            let fragments = reorderer.fragments(range, &runs);

            let mut placed = Vec::with_capacity(fragments.len());
            let mut total = 0.0;
            for fragment in fragments {
                let width = self.measure.width_mm(&fragment.text, fragment.style, style.size_pt);
                placed.push(PlacedFragment {
                    text: fragment.text,
                    style: fragment.style,
                    x_mm: total,
                    width_mm: width,
                });
                total += width;
            }

            let origin = match direction {
                Direction::Ltr => self.geometry.left_mm() + style.indent_mm,
                Direction::Rtl => self.geometry.right_mm() - style.indent_mm - total,
            };
            for fragment in &mut placed {
                fragment.x_mm += origin;
            }

            if line.kind == LineKind::Code {
                self.push_code_band(line_h);
            }

            self.current.items.push(PageItem::Text {
                baseline_mm: self.y_pos - style.size_pt * MM_PER_PT,
                size_pt: style.size_pt,
                color: style.color,
                direction,
                fragments: placed,
            });
            self.y_pos -= line_h;
        }
    }

    fn push_code_band(&mut self, line_h: f32) {
        self.current.items.push(PageItem::Stroke {
            y_mm: self.y_pos - line_h / 2.0,
            x_start_mm: self.geometry.left_mm(),
            x_end_mm: self.geometry.right_mm(),
            thickness_mm: line_h,
            color: CODE_BACKGROUND,
        });
    }

    /// Close the last page. There is always at least one page.
    pub fn finish(mut self) -> Vec<PageLayout> {
        if !self.current.items.is_empty() || self.pages.is_empty() {
            let page = std::mem::take(&mut self.current);
            self.pages.push(page);
        }
        self.pages
    }
}

/// Lay out a whole Markdown document.
pub fn compose(
    markdown: &str,
    measure: &dyn TextMeasure,
    geometry: &PageGeometry,
) -> Vec<PageLayout> {
    let mut composer = Composer::new(measure, geometry.clone());
    for line in classify_lines(markdown) {
        composer.push_line(&line);
    }
    composer.finish()
}

fn range_width(
    text: &str,
    runs: &[StyleRun],
    range: Range<usize>,
    size_pt: f32,
    measure: &dyn TextMeasure,
) -> f32 {
    runs.iter()
        .filter_map(|run| {
            let start = run.range.start.max(range.start);
            let end = run.range.end.min(range.end);
            (start < end).then(|| measure.width_mm(&text[start..end], run.style, size_pt))
        })
        .sum()
}

/// Break logical `text` into byte ranges no wider than `max_width_mm`.
///
/// Breaks happen at whitespace, which is dropped at the break. A word wider
/// than a whole line is split between characters. Leading whitespace of the
/// first line is kept.
pub fn wrap(
    text: &str,
    runs: &[StyleRun],
    size_pt: f32,
    measure: &dyn TextMeasure,
    max_width_mm: f32,
) -> Vec<Range<usize>> {
    let mut lines = Vec::new();
    let mut line: Option<Range<usize>> = None;
    let mut width = 0.0f32;
    let mut gap = 0.0f32;
    let mut has_word = false;

    for (token, is_space) in tokens(text) {
        let w = range_width(text, runs, token.clone(), size_pt, measure);
        if is_space {
            if lines.is_empty() && !has_word {
                line = Some(token);
                width = w;
            } else if has_word {
                gap += w;
            }
            continue;
        }

        if has_word && width + gap + w > max_width_mm {
            lines.extend(line.take());
            width = 0.0;
            has_word = false;
        } else if has_word {
            width += gap;
        }
        gap = 0.0;

        let start = line.as_ref().map_or(token.start, |l| l.start);
        if !has_word && width + w > max_width_mm {
            let mut piece_start = start;
            let mut piece_width = width;
            for (offset, c) in text[token.clone()].char_indices() {
                let at = token.start + offset;
                let cw = measure.width_mm(&text[at..at + c.len_utf8()], style_at(runs, at), size_pt);
                if piece_width + cw > max_width_mm && at > token.start {
                    lines.push(piece_start..at);
                    piece_start = at;
                    piece_width = 0.0;
                }
                piece_width += cw;
            }
            line = Some(piece_start..token.end);
            width = piece_width;
        } else {
            line = Some(start..token.end);
            width += w;
        }
        has_word = true;
    }

    if has_word {
        lines.extend(line);
    }
    lines
}

fn style_at(runs: &[StyleRun], at: usize) -> FontStyle {
    runs.iter()
        .find(|r| r.range.contains(&at))
        .map(|r| r.style)
        .unwrap_or(FontStyle::Regular)
}

/// Alternating whitespace and non-whitespace byte ranges.
fn tokens(text: &str) -> Vec<(Range<usize>, bool)> {
    let mut out: Vec<(Range<usize>, bool)> = Vec::new();
    for (i, c) in text.char_indices() {
        let space = c.is_whitespace();
        let next = i + c.len_utf8();
        match out.last_mut() {
            Some((range, kind)) if *kind == space => range.end = next,
            _ => out.push((i..next, space)),
        }
    }
    out
}
