//! The line-item table.
//!
//! Cells wrap inside fixed-width columns and every row grows to its tallest
//! cell. A row that would cross the bottom margin moves to a new page, and
//! the header row is drawn again at the top of that page.

use super::layout::{
    CONTENT_BOTTOM, CONTENT_WIDTH, Canvas, MARGIN_X, TOP_MARGIN, Weight, line_height_for,
    wrap_text,
};
use super::{Rgb8, Section, Shape};

pub const HEADERS: [&str; 5] = ["Product", "Qty", "Price", "Specifications", "Customization"];

/// Column widths in mm, summing to the content width.
pub const COLUMN_WIDTHS: [f32; 5] = [50.0, 14.0, 26.0, 46.0, 46.0];

const FONT_SIZE: f32 = 9.0;
const CELL_PADDING: f32 = 2.0;
/// Baseline offset from the top of a text line.
const ASCENT: f32 = 0.8;

struct Row {
    cells: Vec<Vec<String>>,
    height: f32,
}

fn layout_row(cells: &[String], weight: Weight) -> Row {
    let cells: Vec<Vec<String>> = cells
        .iter()
        .zip(COLUMN_WIDTHS)
        .map(|(text, width)| wrap_text(text, width - 2.0 * CELL_PADDING, FONT_SIZE, weight))
        .collect();
    let lines = cells.iter().map(Vec::len).max().unwrap_or(1).max(1);
    #[allow(clippy::cast_precision_loss)]
    let height = lines as f32 * line_height_for(FONT_SIZE) + 2.0 * CELL_PADDING;
    Row { cells, height }
}

fn draw_cells(canvas: &mut Canvas, top: f32, row: &Row, weight: Weight, color: Rgb8) {
    let line_height = line_height_for(FONT_SIZE);
    let mut x = MARGIN_X;
    for (lines, width) in row.cells.iter().zip(COLUMN_WIDTHS) {
        let mut baseline = top + CELL_PADDING + line_height * ASCENT;
        for line in lines.iter().filter(|l| !l.is_empty()) {
            canvas.text_at(
                Section::Table,
                x + CELL_PADDING,
                baseline,
                FONT_SIZE,
                weight,
                color,
                line.clone(),
            );
            baseline += line_height;
        }
        x += width;
    }
}

/// Header band at `top`; returns its bottom edge.
fn draw_header(canvas: &mut Canvas, top: f32, header: &Row) -> f32 {
    canvas.shape(Shape::FilledRect {
        x: MARGIN_X,
        y: top,
        width: CONTENT_WIDTH,
        height: header.height,
        color: Rgb8::TEAL,
    });
    draw_cells(canvas, top, header, Weight::Bold, Rgb8::WHITE);
    top + header.height
}

/// Draw the header and `rows` starting with the table's top edge at
/// `start_y`. Returns the bottom edge of the last row and leaves the canvas
/// cursor there.
pub fn draw_table(canvas: &mut Canvas, start_y: f32, rows: &[[String; 5]]) -> f32 {
    let header = layout_row(&HEADERS.map(str::to_string), Weight::Bold);
    let rows: Vec<Row> = rows
        .iter()
        .map(|cells| layout_row(cells, Weight::Regular))
        .collect();

    // Keep the header together with the first row.
    let first_height = rows.first().map_or(0.0, |r| r.height);
    let mut top = start_y;
    if top + header.height + first_height > CONTENT_BOTTOM {
        canvas.new_page();
        top = TOP_MARGIN;
    }
    let mut y = draw_header(canvas, top, &header);
    let mut rows_on_page = 0usize;

    for row in &rows {
        // A row taller than a whole page is drawn as is on a fresh page.
        if y + row.height > CONTENT_BOTTOM && rows_on_page > 0 {
            canvas.new_page();
            y = draw_header(canvas, TOP_MARGIN, &header);
            rows_on_page = 0;
        }
        draw_cells(canvas, y, row, Weight::Regular, Rgb8::BLACK);
        y += row.height;
        canvas.shape(Shape::Rule {
            x: MARGIN_X,
            y,
            width: CONTENT_WIDTH,
            color: Rgb8::GREY,
        });
        rows_on_page += 1;
    }

    canvas.set_y(y);
    y
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn row(name: &str) -> [String; 5] {
        [
            name.to_string(),
            "1".to_string(),
            "₹100.00".to_string(),
            "-".to_string(),
            "-".to_string(),
        ]
    }

    #[test]
    fn test_columns_fill_content_width() {
        let total: f32 = COLUMN_WIDTHS.iter().sum();
        assert!((total - CONTENT_WIDTH).abs() < 0.001);
    }

    #[test]
    fn test_header_is_teal_with_white_bold_text() {
        let mut canvas = Canvas::new();
        draw_table(&mut canvas, 60.0, &[row("Mug")]);
        let pages = canvas.into_pages();
        let page = &pages[0];

        assert!(matches!(
            page.shapes.first(),
            Some(Shape::FilledRect { color: Rgb8::TEAL, .. })
        ));
        let header = page.texts.iter().find(|t| t.text == "Product").unwrap();
        assert_eq!(header.color, Rgb8::WHITE);
        assert_eq!(header.weight, Weight::Bold);
        assert!(header.y > 60.0);
    }

    #[test]
    fn test_each_row_gets_a_rule() {
        let mut canvas = Canvas::new();
        draw_table(&mut canvas, 60.0, &[row("Mug"), row("Keychain"), row("Sticker")]);
        let pages = canvas.into_pages();
        let rules = pages[0]
            .shapes
            .iter()
            .filter(|s| matches!(s, Shape::Rule { .. }))
            .count();
        assert_eq!(rules, 3);
    }

    #[test]
    fn test_long_cell_wraps_and_grows_row() {
        let short = layout_row(&row("Mug"), Weight::Regular);
        let long = layout_row(
            &row("Hand painted ceramic coffee mug with a personalised name and date"),
            Weight::Regular,
        );
        assert!(long.cells[0].len() > 1);
        assert!(long.height > short.height);
    }

    #[test]
    fn test_returns_bottom_of_last_row() {
        let mut canvas = Canvas::new();
        let end = draw_table(&mut canvas, 60.0, &[row("Mug")]);
        let header = layout_row(&HEADERS.map(str::to_string), Weight::Bold);
        let body = layout_row(&row("Mug"), Weight::Regular);
        assert!((end - (60.0 + header.height + body.height)).abs() < 0.001);
        assert!((canvas.y() - end).abs() < f32::EPSILON);
    }

    #[test]
    fn test_header_moves_with_first_row_near_bottom() {
        let mut canvas = Canvas::new();
        draw_table(&mut canvas, CONTENT_BOTTOM - 5.0, &[row("Mug")]);
        let pages = canvas.into_pages();
        assert_eq!(pages.len(), 2);
        assert!(pages[0].texts.is_empty());
        assert!(pages[1].texts.iter().any(|t| t.text == "Product"));
    }

    #[test]
    fn test_empty_table_draws_only_header() {
        let mut canvas = Canvas::new();
        draw_table(&mut canvas, 60.0, &[]);
        let pages = canvas.into_pages();
        assert_eq!(pages[0].texts.len(), HEADERS.len());
    }
}
