//! Page geometry, text measurement and the top-down layout cursor.
//!
//! All positions are millimetres from the top-left corner of an A4 page;
//! `y` is the text baseline. The PDF renderer flips to bottom-up
//! coordinates.

use super::{InvoicePage, Rgb8, Section, Shape, TextRun};

pub const PAGE_WIDTH: f32 = 210.0;
pub const PAGE_HEIGHT: f32 = 297.0;
pub const MARGIN_X: f32 = 14.0;
pub const TOP_MARGIN: f32 = 20.0;
pub const BOTTOM_MARGIN: f32 = 20.0;
pub const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN_X;
/// Lowest baseline available to flowing content.
pub const CONTENT_BOTTOM: f32 = PAGE_HEIGHT - BOTTOM_MARGIN;
/// Baseline of the thank-you footer.
pub const FOOTER_Y: f32 = PAGE_HEIGHT - 10.0;
/// Cursor step for body text.
pub const LINE_HEIGHT: f32 = 6.0;

const MM_PER_PT: f32 = 0.352_778;

/// Advance width used for characters outside the metrics tables.
const DEFAULT_ADVANCE: u16 = 556;

/// Helvetica advance widths for ASCII 32..=126, in 1/1000 em.
#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

/// Helvetica-Bold advance widths for ASCII 32..=126, in 1/1000 em.
#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// Font weight of a text run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Weight {
    #[default]
    Regular,
    Bold,
}

/// Rendered width of `text` in millimetres.
#[must_use]
pub fn text_width(text: &str, size_pt: f32, weight: Weight) -> f32 {
    let table = match weight {
        Weight::Regular => &HELVETICA,
        Weight::Bold => &HELVETICA_BOLD,
    };
    let units: u32 = text
        .chars()
        .map(|c| {
            u32::from(c)
                .checked_sub(32)
                .and_then(|i| table.get(i as usize))
                .copied()
                .unwrap_or(DEFAULT_ADVANCE)
        })
        .map(u32::from)
        .sum();
    #[allow(clippy::cast_precision_loss)] // widths stay far below f32 precision
    let em = units as f32 / 1000.0;
    em * size_pt * MM_PER_PT
}

/// Greedy word wrap to `max_width` millimetres.
///
/// Words wider than a whole line are split by character. Always returns at
/// least one (possibly empty) line.
#[must_use]
pub fn wrap_text(text: &str, max_width: f32, size_pt: f32, weight: Weight) -> Vec<String> {
    let fits = |s: &str| text_width(s, size_pt, weight) <= max_width;
    let mut out = Vec::new();
    let mut line = String::new();

    for word in text.split_whitespace() {
        let candidate = if line.is_empty() {
            word.to_string()
        } else {
            format!("{line} {word}")
        };
        if fits(&candidate) {
            line = candidate;
            continue;
        }
        if !line.is_empty() {
            out.push(std::mem::take(&mut line));
        }
        if fits(word) {
            line = word.to_string();
        } else {
            for c in word.chars() {
                line.push(c);
                if !fits(&line) && line.chars().count() > 1 {
                    line.pop();
                    out.push(std::mem::take(&mut line));
                    line.push(c);
                }
            }
        }
    }
    if !line.is_empty() {
        out.push(line);
    }
    if out.is_empty() {
        out.push(String::new());
    }
    out
}

/// Height of one wrapped line at `size_pt`.
#[must_use]
pub fn line_height_for(size_pt: f32) -> f32 {
    size_pt * MM_PER_PT * 1.2
}

/// Top-down writer that opens new pages as content runs past the bottom
/// margin.
#[derive(Debug)]
pub struct Canvas {
    finished: Vec<InvoicePage>,
    page: InvoicePage,
    y: f32,
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new()
    }
}

impl Canvas {
    #[must_use]
    pub fn new() -> Self {
        Self {
            finished: Vec::new(),
            page: InvoicePage::default(),
            y: TOP_MARGIN,
        }
    }

    /// Current baseline.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    pub const fn set_y(&mut self, y: f32) {
        self.y = y;
    }

    pub fn advance(&mut self, dy: f32) {
        self.y += dy;
    }

    /// Start a new page if `height` more millimetres would cross the bottom
    /// margin. Returns whether a page was added.
    pub fn ensure_space(&mut self, height: f32) -> bool {
        if self.y + height <= CONTENT_BOTTOM {
            return false;
        }
        self.new_page();
        true
    }

    pub fn new_page(&mut self) {
        self.finished.push(std::mem::take(&mut self.page));
        self.y = TOP_MARGIN;
    }

    /// Place a single run at an explicit position on the current page.
    #[allow(clippy::too_many_arguments)]
    pub fn text_at(
        &mut self,
        section: Section,
        x: f32,
        y: f32,
        size_pt: f32,
        weight: Weight,
        color: Rgb8,
        text: impl Into<String>,
    ) {
        let run = TextRun {
            section,
            text: text.into(),
            x,
            y,
            size_pt,
            weight,
            color,
        };
        self.page.texts.push(run);
    }

    /// Wrap `text` to the content width and write it line by line at the
    /// cursor, breaking pages as needed.
    pub fn paragraph(&mut self, section: Section, text: &str, size_pt: f32, weight: Weight) {
        for line in wrap_text(text, CONTENT_WIDTH, size_pt, weight) {
            self.ensure_space(0.0);
            let y = self.y;
            self.text_at(section, MARGIN_X, y, size_pt, weight, Rgb8::BLACK, line);
            self.y += LINE_HEIGHT;
        }
    }

    pub fn shape(&mut self, shape: Shape) {
        self.page.shapes.push(shape);
    }

    /// Finish layout and hand back the pages.
    #[must_use]
    pub fn into_pages(mut self) -> Vec<InvoicePage> {
        self.finished.push(self.page);
        self.finished
    }

    /// Number of pages opened so far.
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.finished.len() + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_width_is_182mm() {
        assert!((CONTENT_WIDTH - 182.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_text_width_scales_with_size() {
        let small = text_width("Invoice", 10.0, Weight::Regular);
        let large = text_width("Invoice", 20.0, Weight::Regular);
        assert!((large - 2.0 * small).abs() < 0.001);
        assert!(text_width("Invoice", 10.0, Weight::Bold) > small);
    }

    #[test]
    fn test_wrap_respects_width() {
        let text = "12, Lakeview Apartments, Outer Ring Road, Marathahalli, Bengaluru, Karnataka - 560037, India";
        let lines = wrap_text(text, 60.0, 10.0, Weight::Regular);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(text_width(line, 10.0, Weight::Regular) <= 60.0, "{line}");
        }
        assert_eq!(lines.join(" "), text);
    }

    #[test]
    fn test_wrap_breaks_overlong_word() {
        let word = "X".repeat(80);
        let lines = wrap_text(&word, 30.0, 10.0, Weight::Regular);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), word);
    }

    #[test]
    fn test_wrap_empty_is_one_blank_line() {
        assert_eq!(wrap_text("   ", 50.0, 10.0, Weight::Regular), vec![String::new()]);
    }

    #[test]
    fn test_canvas_breaks_page_past_bottom() {
        let mut canvas = Canvas::new();
        canvas.set_y(CONTENT_BOTTOM - 1.0);
        assert!(canvas.ensure_space(LINE_HEIGHT));
        assert!((canvas.y() - TOP_MARGIN).abs() < f32::EPSILON);
        assert_eq!(canvas.into_pages().len(), 2);
    }
}
