//! Vertical-flow layout engine.
//!
//! The engine owns a list of pages and a cursor measured from the bottom of
//! the sheet (PDF user space). Callers hand it paragraphs and label/value rows;
//! it wraps text, decides where page breaks go and records every drawing
//! operation so the PDF writer can replay them afterwards.

use super::metrics::{text_width, Font, ASCENT, DESCENT};
use super::style::{PageGeometry, TextStyle};

const ELLIPSIS: &str = "...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

/// A single drawing instruction in PDF user space.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Text {
        x: f32,
        /// Baseline.
        y: f32,
        font: Font,
        size: f32,
        text: String,
    },
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        width: f32,
    },
    /// The logo; `x`/`y` is the lower-left corner.
    Image {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
}

/// Which part of the page an extent belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Header,
    Flow,
    Footer,
}

/// Vertical span occupied by one placed line or decoration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub region: Region,
    pub top: f32,
    pub bottom: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub ops: Vec<DrawOp>,
    pub extents: Vec<Extent>,
}

impl Page {
    /// All text drawn on this page, in drawing order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

/// One label/value pair of the detail block.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailRow {
    pub label: String,
    pub value: String,
}

impl DetailRow {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Horizontal placement of one data column of the detail block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnSpec {
    pub x: f32,
    pub label_width: f32,
    pub value_width: f32,
    pub padding: f32,
}

/// Greedy word wrap using the font's advance widths.
///
/// Explicit newlines always start a new line, and a word wider than
/// `max_width` is broken between characters. Blank input yields no lines.
pub fn wrap_text(text: &str, font: Font, size: f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let space = text_width(" ", font, size);

    for raw_line in text.lines() {
        let mut current = String::new();
        let mut current_width = 0.0;

        for word in raw_line.split_whitespace() {
            let word_width = text_width(word, font, size);

            if current.is_empty() {
                if word_width <= max_width {
                    current.push_str(word);
                    current_width = word_width;
                } else {
                    let (rest, rest_width) =
                        break_long_word(word, font, size, max_width, &mut lines);
                    current = rest;
                    current_width = rest_width;
                }
                continue;
            }

            if current_width + space + word_width <= max_width {
                current.push(' ');
                current.push_str(word);
                current_width += space + word_width;
            } else {
                lines.push(std::mem::take(&mut current));
                if word_width <= max_width {
                    current.push_str(word);
                    current_width = word_width;
                } else {
                    let (rest, rest_width) =
                        break_long_word(word, font, size, max_width, &mut lines);
                    current = rest;
                    current_width = rest_width;
                }
            }
        }

        if !current.is_empty() {
            lines.push(current);
        }
    }

    lines
}

/// `wrap_text` capped at `max_lines`. A cut-off tail ends in an ellipsis
/// that still fits `max_width`.
pub fn wrap_text_limited(
    text: &str,
    font: Font,
    size: f32,
    max_width: f32,
    max_lines: usize,
) -> Vec<String> {
    let mut lines = wrap_text(text, font, size, max_width);
    if lines.len() <= max_lines {
        return lines;
    }

    lines.truncate(max_lines);
    if let Some(last) = lines.last_mut() {
        let ellipsis_width = text_width(ELLIPSIS, font, size);
        while !last.is_empty() && text_width(last, font, size) + ellipsis_width > max_width {
            last.pop();
        }
        let kept = last.trim_end().len();
        last.truncate(kept);
        last.push_str(ELLIPSIS);
    }
    lines
}

/// Push full-width chunks of `word` onto `lines`, returning the remainder.
fn break_long_word(
    word: &str,
    font: Font,
    size: f32,
    max_width: f32,
    lines: &mut Vec<String>,
) -> (String, f32) {
    let mut chunk = String::new();
    let mut chunk_width = 0.0;

    for ch in word.chars() {
        let mut buf = [0u8; 4];
        let ch_width = text_width(ch.encode_utf8(&mut buf), font, size);
        if !chunk.is_empty() && chunk_width + ch_width > max_width {
            lines.push(std::mem::take(&mut chunk));
            chunk_width = 0.0;
        }
        chunk.push(ch);
        chunk_width += ch_width;
    }

    (chunk, chunk_width)
}

/// Baseline of a line whose box starts at `top`.
fn baseline(top: f32, style: TextStyle) -> f32 {
    let glyph_height = (ASCENT + DESCENT) * style.size;
    top - (style.leading - glyph_height).max(0.0) / 2.0 - ASCENT * style.size
}

pub struct LayoutEngine {
    geometry: PageGeometry,
    reserved_bottom: f32,
    pages: Vec<Page>,
    cursor: f32,
}

impl LayoutEngine {
    /// Start a document with one empty page.
    ///
    /// `reserved_bottom` is kept free above the bottom margin while flowing
    /// body text (room for signatures and the footer).
    pub fn new(geometry: PageGeometry, reserved_bottom: f32) -> Self {
        Self {
            geometry,
            reserved_bottom,
            pages: vec![Page::default()],
            cursor: geometry.top_y(),
        }
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    pub fn cursor(&self) -> f32 {
        self.cursor
    }

    pub fn set_cursor(&mut self, y: f32) {
        self.cursor = y;
    }

    /// Move the cursor down by `dy` points.
    pub fn advance(&mut self, dy: f32) {
        self.cursor -= dy;
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Lowest y a flowed block may reach.
    pub fn flow_limit(&self) -> f32 {
        self.geometry.margins.bottom + self.reserved_bottom
    }

    /// Usable height of an empty page for flowed text.
    pub fn page_capacity(&self) -> f32 {
        self.geometry.top_y() - self.flow_limit()
    }

    /// Whether a block of `height` plus `gap` fits below `cursor`.
    pub fn fits(&self, cursor: f32, height: f32, gap: f32) -> bool {
        cursor - height - gap >= self.flow_limit()
    }

    fn at_page_top(&self, cursor: f32) -> bool {
        cursor >= self.geometry.top_y()
    }

    /// Flush the current page and continue at the top of a new one.
    pub fn page_break(&mut self) {
        self.pages.push(Page::default());
        self.cursor = self.geometry.top_y();
        log::trace!("page break, now on page {}", self.pages.len());
    }

    /// Break the page unless `height` fits between the cursor and the bottom
    /// margin. Used for blocks that must stay together and may use the
    /// reserved footer band.
    pub fn keep_together(&mut self, height: f32) {
        if self.cursor - height < self.geometry.margins.bottom && !self.at_page_top(self.cursor) {
            self.page_break();
        }
    }

    /// Break the page unless `height` of flow text still fits above the
    /// reserved bottom band.
    pub fn ensure_flow_space(&mut self, height: f32) {
        if !self.fits(self.cursor, height, 0.0) && !self.at_page_top(self.cursor) {
            self.page_break();
        }
    }

    fn current_page(&mut self) -> &mut Page {
        // `pages` is never empty: `new` creates the first page and nothing
        // removes pages afterwards.
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    /// Draw one line of text whose line box starts at `top`.
    pub fn draw_line_of_text(
        &mut self,
        text: &str,
        style: TextStyle,
        x: f32,
        top: f32,
        region: Region,
    ) {
        let y = baseline(top, style);
        let page = self.current_page();
        page.ops.push(DrawOp::Text {
            x,
            y,
            font: style.font,
            size: style.size,
            text: text.to_string(),
        });
        page.extents.push(Extent {
            region,
            top,
            bottom: top - style.leading,
        });
    }

    pub fn draw_rule(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, width: f32) {
        self.current_page().ops.push(DrawOp::Line {
            x1,
            y1,
            x2,
            y2,
            width,
        });
    }

    pub fn draw_image(&mut self, x: f32, y: f32, width: f32, height: f32) {
        let page = self.current_page();
        page.ops.push(DrawOp::Image {
            x,
            y,
            width,
            height,
        });
        page.extents.push(Extent {
            region: Region::Header,
            top: y + height,
            bottom: y,
        });
    }

    fn aligned_x(&self, line: &str, style: TextStyle, x: f32, width: f32, align: Align) -> f32 {
        let line_width = text_width(line, style.font, style.size);
        match align {
            Align::Left => x,
            Align::Center => x + (width - line_width) / 2.0,
            Align::Right => x + width - line_width,
        }
    }

    /// Flow a paragraph at the cursor across the content width.
    pub fn paragraph(&mut self, text: &str, style: TextStyle, align: Align, gap_after: f32) {
        let x = self.geometry.left_x();
        let width = self.geometry.content_width();
        self.paragraph_in(text, style, align, x, width, gap_after);
    }

    /// Flow a paragraph inside the horizontal band `[x, x + width]`.
    ///
    /// The paragraph moves to a new page as a whole when it does not fit but
    /// would fit on an empty page; longer paragraphs are split between lines.
    pub fn paragraph_in(
        &mut self,
        text: &str,
        style: TextStyle,
        align: Align,
        x: f32,
        width: f32,
        gap_after: f32,
    ) {
        let lines = wrap_text(text, style.font, style.size, width);
        if lines.is_empty() {
            return;
        }

        let height = lines.len() as f32 * style.leading;
        if !self.fits(self.cursor, height, gap_after)
            && height <= self.page_capacity()
            && !self.at_page_top(self.cursor)
        {
            self.page_break();
        }

        for line in &lines {
            if !self.fits(self.cursor, style.leading, 0.0) && !self.at_page_top(self.cursor) {
                self.page_break();
            }
            let line_x = self.aligned_x(line, style, x, width, align);
            let top = self.cursor;
            self.draw_line_of_text(line, style, line_x, top, Region::Flow);
            self.cursor -= style.leading;
        }

        self.cursor -= gap_after;
    }

    /// Place text lines at a fixed position without touching the cursor.
    ///
    /// Returns the y just below the last line.
    pub fn anchored_text(
        &mut self,
        text: &str,
        style: TextStyle,
        align: Align,
        x: f32,
        width: f32,
        top: f32,
        region: Region,
    ) -> f32 {
        let lines = wrap_text(text, style.font, style.size, width);
        self.anchored_lines(&lines, style, align, x, width, top, region)
    }

    /// Place already wrapped lines at a fixed position.
    ///
    /// Returns the y just below the last line.
    pub fn anchored_lines(
        &mut self,
        lines: &[String],
        style: TextStyle,
        align: Align,
        x: f32,
        width: f32,
        top: f32,
        region: Region,
    ) -> f32 {
        let mut y = top;
        for line in lines {
            let line_x = self.aligned_x(line, style, x, width, align);
            self.draw_line_of_text(line, style, line_x, y, region);
            y -= style.leading;
        }
        y
    }

    /// Two data columns of label/value rows with independent cursors.
    ///
    /// Both cursors start at the current cursor. Each row advances its own
    /// column by `max(label_height, value_height) + gap`; a page break resets
    /// both columns to the top of the new page. The engine cursor ends at the
    /// lower of the two columns.
    pub fn detail_columns(
        &mut self,
        columns: [&[DetailRow]; 2],
        specs: [ColumnSpec; 2],
        label_style: TextStyle,
        value_style: TextStyle,
        gap: f32,
    ) {
        let mut cursors = [self.cursor; 2];
        let row_count = columns[0].len().max(columns[1].len());
        let leading = label_style.leading.max(value_style.leading);

        for index in 0..row_count {
            for column in 0..2 {
                let Some(row) = columns[column].get(index) else {
                    continue;
                };
                let spec = specs[column];
                let labels = wrap_text(
                    &row.label,
                    label_style.font,
                    label_style.size,
                    spec.label_width - spec.padding,
                );
                let values = wrap_text(
                    &row.value,
                    value_style.font,
                    value_style.size,
                    spec.value_width,
                );
                let line_count = labels.len().max(values.len()).max(1);
                let height = line_count as f32 * leading;

                if !self.fits(cursors[column], height, gap)
                    && height <= self.page_capacity()
                    && !self.at_page_top(cursors[column])
                {
                    self.page_break();
                    cursors = [self.cursor; 2];
                }

                for line in 0..line_count {
                    if !self.fits(cursors[column], leading, 0.0)
                        && !self.at_page_top(cursors[column])
                    {
                        self.page_break();
                        cursors = [self.cursor; 2];
                    }
                    let top = cursors[column];
                    if let Some(label) = labels.get(line) {
                        self.draw_line_of_text(label, label_style, spec.x, top, Region::Flow);
                    }
                    if let Some(value) = values.get(line) {
                        let value_x = spec.x + spec.label_width;
                        self.draw_line_of_text(value, value_style, value_x, top, Region::Flow);
                    }
                    cursors[column] -= leading;
                }

                cursors[column] -= gap;
            }
        }

        self.cursor = cursors[0].min(cursors[1]);
    }

    pub fn finish(self) -> Vec<Page> {
        self.pages
    }
}
