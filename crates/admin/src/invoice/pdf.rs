//! `printpdf` rendering of a laid-out invoice.

use std::borrow::Cow;

use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Point, Rect, Rgb,
};

use super::layout::{PAGE_HEIGHT, PAGE_WIDTH, Weight};
use super::{FontSource, InvoiceDocument, InvoiceError, Rgb8, Shape};

const LAYER: &str = "Layer 1";
const RULE_THICKNESS: f32 = 0.5;

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    builtin: bool,
}

impl Fonts {
    fn load(doc: &PdfDocumentReference, source: &FontSource) -> Result<Self, InvoiceError> {
        match source {
            FontSource::Builtin => Ok(Self {
                regular: doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_error)?,
                bold: doc
                    .add_builtin_font(BuiltinFont::HelveticaBold)
                    .map_err(pdf_error)?,
                builtin: true,
            }),
            FontSource::TrueType(bytes) => {
                let font = doc.add_external_font(bytes.as_slice()).map_err(pdf_error)?;
                Ok(Self {
                    regular: font.clone(),
                    bold: font,
                    builtin: false,
                })
            }
        }
    }

    const fn get(&self, weight: Weight) -> &IndirectFontRef {
        match weight {
            Weight::Regular => &self.regular,
            Weight::Bold => &self.bold,
        }
    }
}

fn pdf_error(e: impl std::fmt::Display) -> InvoiceError {
    InvoiceError::Pdf(e.to_string())
}

fn color(rgb: Rgb8) -> Color {
    let channel = |c: u8| f32::from(c) / 255.0;
    Color::Rgb(Rgb::new(channel(rgb.0), channel(rgb.1), channel(rgb.2), None))
}

/// Flip a top-down y to PDF's bottom-up space.
fn flip(y: f32) -> Mm {
    Mm(PAGE_HEIGHT - y)
}

/// The built-in fonts have no rupee glyph.
pub(super) fn printable(text: &str, builtin: bool) -> Cow<'_, str> {
    if builtin && text.contains('₹') {
        Cow::Owned(text.replace('₹', "Rs."))
    } else {
        Cow::Borrowed(text)
    }
}

/// Code points CP1252 adds on top of Latin-1.
const WIN_ANSI_EXTRA: &[char] = &[
    '\u{20AC}', '\u{201A}', '\u{0192}', '\u{201E}', '\u{2026}', '\u{2020}', '\u{2021}',
    '\u{02C6}', '\u{2030}', '\u{0160}', '\u{2039}', '\u{0152}', '\u{017D}', '\u{2018}',
    '\u{2019}', '\u{201C}', '\u{201D}', '\u{2022}', '\u{2013}', '\u{2014}', '\u{02DC}',
    '\u{2122}', '\u{0161}', '\u{203A}', '\u{0153}', '\u{017E}', '\u{0178}',
];

fn builtin_can_show(c: char) -> bool {
    matches!(c, ' '..='~' | '\u{A0}'..='\u{FF}') || WIN_ANSI_EXTRA.contains(&c)
}

/// Characters of `text` outside the builtin fonts' WinAnsi encoding, each
/// listed once.
pub(super) fn unshowable(text: &str) -> Vec<char> {
    let mut missing = Vec::new();
    for c in text.chars().filter(|c| !builtin_can_show(*c)) {
        if !missing.contains(&c) {
            missing.push(c);
        }
    }
    missing
}

fn draw_shape(layer: &PdfLayerReference, shape: &Shape) {
    match *shape {
        Shape::FilledRect {
            x,
            y,
            width,
            height,
            color: fill,
        } => {
            layer.set_fill_color(color(fill));
            layer.add_rect(Rect::new(Mm(x), flip(y + height), Mm(x + width), flip(y)));
        }
        Shape::Rule {
            x,
            y,
            width,
            color: stroke,
        } => {
            layer.set_outline_color(color(stroke));
            layer.set_outline_thickness(RULE_THICKNESS);
            layer.add_line(Line {
                points: vec![
                    (Point::new(Mm(x), flip(y)), false),
                    (Point::new(Mm(x + width), flip(y)), false),
                ],
                is_closed: false,
            });
        }
    }
}

pub(super) fn render(document: &InvoiceDocument, source: &FontSource) -> Result<Vec<u8>, InvoiceError> {
    let (doc, first_page, first_layer) =
        PdfDocument::new("Invoice", Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER);
    let fonts = Fonts::load(&doc, source)?;

    let mut missing: Vec<char> = Vec::new();
    let mut targets = vec![(first_page, first_layer)];
    for _ in 1..document.pages.len() {
        targets.push(doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER));
    }

    for (page, (page_index, layer_index)) in document.pages.iter().zip(targets) {
        let layer = doc.get_page(page_index).get_layer(layer_index);

        // Shapes first so text sits on top of fills.
        for shape in &page.shapes {
            draw_shape(&layer, shape);
        }
        for run in &page.texts {
            let text = printable(&run.text, fonts.builtin);
            if fonts.builtin {
                for c in unshowable(&text) {
                    if !missing.contains(&c) {
                        missing.push(c);
                    }
                }
            }
            layer.set_fill_color(color(run.color));
            layer.use_text(
                text,
                run.size_pt,
                Mm(run.x),
                flip(run.y),
                fonts.get(run.weight),
            );
        }
    }

    if !missing.is_empty() {
        tracing::warn!(
            characters = %missing.iter().collect::<String>(),
            "Invoice text has characters the builtin font cannot show; set INVOICE_FONT_PATH to a TrueType font"
        );
    }

    doc.save_to_bytes().map_err(pdf_error)
}
