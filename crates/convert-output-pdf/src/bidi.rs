//! Line direction and visual reordering via the Unicode Bidirectional Algorithm.

use std::ops::Range;

use unicode_bidi::{bidi_class, get_base_direction, BidiClass, BidiInfo, Level};

use crate::fonts::FontStyle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ltr,
    Rtl,
}

/// Direction of a line: the first strong character decides, and a line
/// without one (digits, punctuation, empty) is left-to-right.
pub fn line_direction(text: &str) -> Direction {
    match get_base_direction(text) {
        unicode_bidi::Direction::Rtl => Direction::Rtl,
        _ => Direction::Ltr,
    }
}

/// A style applied to a byte range of the logical text.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleRun {
    pub range: Range<usize>,
    pub style: FontStyle,
}

/// A piece of a line in visual order, drawn left to right.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub text: String,
    pub style: FontStyle,
}

/// Logical text prepared for reordering one wrapped line at a time.
pub struct Reorderer<'t> {
    info: BidiInfo<'t>,
}

impl<'t> Reorderer<'t> {
    /// `text` must not contain paragraph separators; see [`single_paragraph`].
    pub fn new(text: &'t str, direction: Direction) -> Self {
        let level = match direction {
            Direction::Ltr => Level::ltr(),
            Direction::Rtl => Level::rtl(),
        };
        Self {
            info: BidiInfo::new(text, Some(level)),
        }
    }

    /// Visual-order fragments for the logical byte range `line`.
    ///
    /// Right-to-left runs are reversed character by character with mirrored
    /// brackets; style boundaries inside a run are kept.
    pub fn fragments(&self, line: Range<usize>, styles: &[StyleRun]) -> Vec<Fragment> {
        let text = self.info.text;
        let Some(para) = self
            .info
            .paragraphs
            .iter()
            .find(|p| p.range.start <= line.start && line.end <= p.range.end)
        else {
            return styled_pieces(text, line, styles)
                .into_iter()
                .map(|(r, style)| Fragment {
                    text: text[r].to_string(),
                    style,
                })
                .collect();
        };

        let (levels, runs) = self.info.visual_runs(para, line);
        let mut out: Vec<Fragment> = Vec::new();
        for run in runs {
            let rtl = levels[run.start].is_rtl();
            let mut pieces = styled_pieces(text, run, styles);
            if rtl {
                pieces.reverse();
            }
            for (range, style) in pieces {
                let piece = &text[range];
                let drawn = if rtl {
                    piece.chars().rev().map(mirror).collect()
                } else {
                    piece.to_string()
                };
                push_fragment(&mut out, drawn, style);
            }
        }
        out
    }
}

/// Replace paragraph and segment separators (tabs included) with spaces so
/// the whole line is a single bidi paragraph.
pub fn single_paragraph(text: &str) -> String {
    text.chars()
        .map(|c| match bidi_class(c) {
            BidiClass::B | BidiClass::S => ' ',
            _ => c,
        })
        .collect()
}

/// Split `range` at style boundaries.
fn styled_pieces(
    text: &str,
    range: Range<usize>,
    styles: &[StyleRun],
) -> Vec<(Range<usize>, FontStyle)> {
    let mut pieces = Vec::new();
    for run in styles {
        let start = run.range.start.max(range.start);
        let end = run.range.end.min(range.end);
        if start < end && text.is_char_boundary(start) && text.is_char_boundary(end) {
            pieces.push((start..end, run.style));
        }
    }
    if pieces.is_empty() && !range.is_empty() {
        pieces.push((range, FontStyle::Regular));
    }
    pieces
}

fn push_fragment(out: &mut Vec<Fragment>, text: String, style: FontStyle) {
    if text.is_empty() {
        return;
    }
    match out.last_mut() {
        Some(last) if last.style == style => last.text.push_str(&text),
        _ => out.push(Fragment { text, style }),
    }
}

/// Bidi mirroring for the paired characters that commonly show up in text.
fn mirror(c: char) -> char {
    match c {
        '(' => ')',
        ')' => '(',
        '[' => ']',
        ']' => '[',
        '{' => '}',
        '}' => '{',
        '<' => '>',
        '>' => '<',
        '«' => '»',
        '»' => '«',
        '‹' => '›',
        '›' => '‹',
        _ => c,
    }
}
