//! Convert `word/document.xml` content to Markdown.
//!
//! Handles Word Open XML elements:
//! - `w:p` (paragraphs) → paragraphs, `#` headings, list items, `>` quotes
//! - `w:r` (runs) with `w:b` / `w:i` → `**bold**` / `*italic*`
//! - `w:t` (text), `w:br` (breaks), `w:tab`
//! - `w:tbl` (tables) → pipe tables, first row as header
//! - `a:blip` (images) → `![alt](media/..)`
//! - `w:hyperlink` → `[text](target)`

use std::collections::HashMap;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use convert_utils::markdown::pipe_table;
use convert_utils::xml::{attr, local_name, namespaced_attr};

use crate::styles::{self, Numbering, StyleInfo};

/// Convert the main document XML into Markdown.
pub fn convert_document(
    xml: &str,
    rels: &HashMap<String, String>,
    styles: &HashMap<String, StyleInfo>,
    numbering: &Numbering,
) -> String {
    let mut reader = Reader::from_str(xml);
    let mut state = ConvertState::new(rels, styles, numbering);

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => state.handle_start(&local_name(e), e),
            Ok(Event::Empty(ref e)) => {
                let local = local_name(e);
                state.handle_start(&local, e);
                state.handle_end(&local);
            }
            Ok(Event::Text(ref e)) => {
                if state.in_text {
                    if let Ok(text) = e.unescape() {
                        state.push_text(&text);
                    }
                }
            }
            Ok(Event::End(ref e)) => {
                let local = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                state.handle_end(&local);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                log::warn!("document.xml parse error: {}", e);
                break;
            }
            _ => {}
        }
    }

    state.finish()
}

struct Block {
    text: String,
    list_item: bool,
}

struct ConvertState<'a> {
    rels: &'a HashMap<String, String>,
    styles: &'a HashMap<String, StyleInfo>,
    numbering: &'a Numbering,

    blocks: Vec<Block>,

    // Run state
    in_run: bool,
    in_text: bool,
    run_bold: bool,
    run_italic: bool,
    /// Markers currently open in the paragraph buffer (bold, italic).
    open_bold: bool,
    open_italic: bool,

    // Paragraph state
    para_style_id: String,
    para_num_id: String,
    para_ilvl: u8,
    para_buffer: String,
    pending_alt: String,

    // Hyperlink: buffer offset where the link text starts, and its target
    hyperlink: Option<(usize, Option<String>)>,

    // Tables; only the outermost table becomes a pipe table
    table_depth: usize,
    rows: Vec<Vec<String>>,
    row: Vec<String>,
    cell: Vec<String>,

    /// Ordered-list counters keyed by (numId, ilvl).
    counters: HashMap<(String, u8), usize>,
}

impl<'a> ConvertState<'a> {
    fn new(
        rels: &'a HashMap<String, String>,
        styles: &'a HashMap<String, StyleInfo>,
        numbering: &'a Numbering,
    ) -> Self {
        Self {
            rels,
            styles,
            numbering,
            blocks: Vec::new(),
            in_run: false,
            in_text: false,
            run_bold: false,
            run_italic: false,
            open_bold: false,
            open_italic: false,
            para_style_id: String::new(),
            para_num_id: String::new(),
            para_ilvl: 0,
            para_buffer: String::new(),
            pending_alt: String::new(),
            hyperlink: None,
            table_depth: 0,
            rows: Vec::new(),
            row: Vec::new(),
            cell: Vec::new(),
            counters: HashMap::new(),
        }
    }

    fn handle_start(&mut self, local: &str, e: &BytesStart<'_>) {
        match local {
            "p" => {
                self.para_style_id.clear();
                self.para_num_id.clear();
                self.para_ilvl = 0;
                self.para_buffer.clear();
                self.open_bold = false;
                self.open_italic = false;
            }
            "pStyle" => self.para_style_id = attr(e, "val").unwrap_or_default(),
            "numId" => self.para_num_id = attr(e, "val").unwrap_or_default(),
            "ilvl" => self.para_ilvl = attr(e, "val").and_then(|v| v.parse().ok()).unwrap_or(0),
            "r" => {
                self.in_run = true;
                self.run_bold = false;
                self.run_italic = false;
            }
            "b" if self.in_run => self.run_bold = toggle_on(e),
            "i" if self.in_run => self.run_italic = toggle_on(e),
            "t" => self.in_text = true,
            "br" if self.in_run => {
                // Page and column breaks carry a type; only text wrapping breaks a line
                if attr(e, "type").map_or(true, |t| t == "textWrapping") {
                    self.push_raw("\n");
                }
            }
            "tab" if self.in_run => self.push_raw(" "),
            "hyperlink" => {
                self.close_formatting();
                let target = namespaced_attr(e, "id")
                    .and_then(|rid| self.rels.get(&rid).cloned())
                    .or_else(|| attr(e, "anchor").map(|a| format!("#{}", a)));
                self.hyperlink = Some((self.para_buffer.len(), target));
            }
            "docPr" => self.pending_alt = attr(e, "descr").unwrap_or_default(),
            "blip" => {
                if let Some(target) = attr(e, "embed").and_then(|rid| self.rels.get(&rid)) {
                    let image = format!("![{}]({})", self.pending_alt.trim(), target);
                    self.push_raw(&image);
                }
                self.pending_alt.clear();
            }
            "tbl" => {
                self.table_depth += 1;
                if self.table_depth == 1 {
                    self.rows.clear();
                }
            }
            "tr" if self.table_depth == 1 => self.row.clear(),
            "tc" if self.table_depth == 1 => self.cell.clear(),
            _ => {}
        }
    }

    fn handle_end(&mut self, local: &str) {
        match local {
            "t" => self.in_text = false,
            "r" => self.in_run = false,
            "hyperlink" => {
                self.close_formatting();
                if let Some((start, target)) = self.hyperlink.take() {
                    if let Some(target) = target {
                        let text = self.para_buffer.split_off(start.min(self.para_buffer.len()));
                        if !text.trim().is_empty() {
                            self.para_buffer
                                .push_str(&format!("[{}]({})", text.trim(), target));
                        }
                    }
                }
            }
            "p" => self.flush_paragraph(),
            "tc" if self.table_depth == 1 => {
                let cell = std::mem::take(&mut self.cell).join("\n");
                self.row.push(cell);
            }
            "tr" if self.table_depth == 1 => {
                let row = std::mem::take(&mut self.row);
                self.rows.push(row);
            }
            "tbl" => {
                self.table_depth = self.table_depth.saturating_sub(1);
                if self.table_depth == 0 {
                    let table = pipe_table(&self.rows);
                    self.rows.clear();
                    self.push_block(table.trim_end().to_string(), false);
                }
            }
            _ => {}
        }
    }

    /// Append run text, switching emphasis markers when the formatting changes.
    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let want = (self.run_bold && self.in_run, self.run_italic && self.in_run);
        if want != (self.open_bold, self.open_italic) {
            self.close_formatting();
            let trimmed = text.trim_start();
            self.para_buffer.push_str(&text[..text.len() - trimmed.len()]);
            if want.0 {
                self.para_buffer.push_str("**");
            }
            if want.1 {
                self.para_buffer.push('*');
            }
            self.open_bold = want.0;
            self.open_italic = want.1;
            self.para_buffer.push_str(trimmed);
        } else {
            self.para_buffer.push_str(text);
        }
    }

    fn push_raw(&mut self, text: &str) {
        self.close_formatting();
        self.para_buffer.push_str(text);
    }

    fn close_formatting(&mut self) {
        if !self.open_bold && !self.open_italic {
            return;
        }
        let content_len = self.para_buffer.trim_end().len();
        let trailing = self.para_buffer.split_off(content_len);
        if self.open_italic {
            self.para_buffer.push('*');
        }
        if self.open_bold {
            self.para_buffer.push_str("**");
        }
        self.para_buffer.push_str(&trailing);
        self.open_bold = false;
        self.open_italic = false;
    }

    fn flush_paragraph(&mut self) {
        self.close_formatting();
        let text = std::mem::take(&mut self.para_buffer);
        let text = text.trim();

        if self.table_depth > 0 {
            if !text.is_empty() {
                self.cell.push(text.to_string());
            }
            return;
        }
        if text.is_empty() {
            return;
        }

        let heading = if self.para_style_id.is_empty() {
            None
        } else {
            styles::heading_level(&self.para_style_id, self.styles)
        };
        let is_list = !self.para_num_id.is_empty() && self.para_num_id != "0";

        if let Some(level) = heading {
            let line = text.replace('\n', " ");
            self.push_block(format!("{} {}", "#".repeat(level as usize), line), false);
        } else if is_list {
            let marker = self.list_marker();
            let indent = "  ".repeat(self.para_ilvl as usize);
            self.push_block(format!("{}{} {}", indent, marker, text.replace('\n', " ")), true);
        } else if styles::is_quote(&self.para_style_id, self.styles) {
            let quoted: Vec<String> = text.lines().map(|l| format!("> {}", l)).collect();
            self.push_block(quoted.join("\n"), false);
        } else {
            self.push_block(text.to_string(), false);
        }
    }

    fn list_marker(&mut self) -> String {
        let num_id = self.para_num_id.clone();
        let ilvl = self.para_ilvl;
        // A shallower item restarts numbering of deeper levels
        self.counters
            .retain(|(id, lvl), _| *id != num_id || *lvl <= ilvl);
        if self.numbering.is_bullet(&num_id, ilvl) {
            "*".to_string()
        } else {
            let n = self.counters.entry((num_id, ilvl)).or_insert(0);
            *n += 1;
            format!("{}.", n)
        }
    }

    fn push_block(&mut self, text: String, list_item: bool) {
        if !text.trim().is_empty() {
            self.blocks.push(Block { text, list_item });
        }
    }

    fn finish(self) -> String {
        let mut out = String::new();
        let mut prev_list = false;
        for (i, block) in self.blocks.iter().enumerate() {
            if i > 0 {
                out.push_str(if prev_list && block.list_item { "\n" } else { "\n\n" });
            }
            out.push_str(&block.text);
            prev_list = block.list_item;
        }
        out
    }
}

/// `<w:b/>` turns formatting on; `<w:b w:val="0"/>` or `false` turns it off.
fn toggle_on(e: &BytesStart<'_>) -> bool {
    !matches!(attr(e, "val").as_deref(), Some("0") | Some("false") | Some("off"))
}
