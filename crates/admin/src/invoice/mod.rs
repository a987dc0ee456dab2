//! Invoice generation.
//!
//! Building an invoice is split in two:
//!
//! 1. [`InvoiceBuilder::build`] lays the order out into an
//!    [`InvoiceDocument`]: positioned, section-tagged text runs and shapes on
//!    A4 pages. This step is pure and is what the tests inspect.
//! 2. [`InvoiceDocument::render_pdf`] turns that model into PDF bytes with
//!    `printpdf`; [`InvoiceDocument::save_to`] writes `Invoice_<id>.pdf`.
//!
//! Layout is a single column with a top-down cursor. Only the title block
//! and the footer sit at fixed positions; everything else flows and breaks
//! onto new pages at the bottom margin.

pub mod layout;
pub mod pdf;
pub mod table;

use std::path::{Path, PathBuf};

use chrono::Local;
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::instrument;

use cuztory_core::text::{normalize_opt, normalize_text};
use cuztory_core::{CurrencyCode, format_amount};

use crate::line_items::{customization_text, specifications_text};
use crate::models::{LineItem, NOT_AVAILABLE, Order, ShippingInfo};
use layout::{Canvas, FOOTER_Y, MARGIN_X, PAGE_WIDTH, TOP_MARGIN, Weight, text_width};

/// Store name used when none is configured.
pub const DEFAULT_STORE_NAME: &str = "Cuztory";

/// Local-time format of the `Placed At` line.
pub const PLACED_AT_FORMAT: &str = "%d/%m/%Y, %I:%M:%S %p";

const STORE_NAME_SIZE: f32 = 18.0;
const TITLE_SIZE: f32 = 12.0;
const TITLE_Y: f32 = 28.0;
const DETAILS_Y: f32 = 40.0;
const BODY_SIZE: f32 = 10.0;
const SECTION_GAP: f32 = 4.0;
const SUMMARY_GAP: f32 = 10.0;

/// Errors from invoice generation.
#[derive(Debug, Error)]
pub enum InvoiceError {
    /// The order has no identifier to name the file after.
    #[error("order has no id")]
    MissingOrderId,

    /// The configured TrueType font could not be read.
    #[error("cannot load font {path}: {source}")]
    Font {
        path: PathBuf,
        source: std::io::Error,
    },

    /// `printpdf` rejected the document or a font.
    #[error("PDF encoding failed: {0}")]
    Pdf(String),

    /// The file could not be written.
    #[error("cannot write invoice: {0}")]
    Io(#[from] std::io::Error),
}

/// Which part of the invoice a text run belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Header,
    Order,
    Customer,
    Address,
    Table,
    Summary,
    Footer,
}

/// 8-bit RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb8(pub u8, pub u8, pub u8);

impl Rgb8 {
    pub const BLACK: Self = Self(0, 0, 0);
    pub const WHITE: Self = Self(255, 255, 255);
    /// Table header fill.
    pub const TEAL: Self = Self(22, 160, 133);
    pub const GREY: Self = Self(200, 200, 200);
}

/// One line of text at a fixed position.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub section: Section,
    pub text: String,
    /// Left edge, mm from the page's left side.
    pub x: f32,
    /// Baseline, mm from the page's top.
    pub y: f32,
    pub size_pt: f32,
    pub weight: Weight,
    pub color: Rgb8,
}

/// Non-text drawing.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Filled rectangle; `y` is the top edge.
    FilledRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Rgb8,
    },
    /// Horizontal rule at `y`.
    Rule {
        x: f32,
        y: f32,
        width: f32,
        color: Rgb8,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvoicePage {
    pub texts: Vec<TextRun>,
    pub shapes: Vec<Shape>,
}

/// A laid-out invoice, ready to render.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceDocument {
    pub file_name: String,
    pub pages: Vec<InvoicePage>,
}

impl InvoiceDocument {
    /// Every text run in reading order.
    pub fn texts(&self) -> impl Iterator<Item = &TextRun> {
        self.pages.iter().flat_map(|page| page.texts.iter())
    }

    /// Text of every run tagged with `section`, in reading order.
    #[must_use]
    pub fn section_text(&self, section: Section) -> Vec<&str> {
        self.texts()
            .filter(|run| run.section == section)
            .map(|run| run.text.as_str())
            .collect()
    }

    #[must_use]
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Encode as PDF.
    ///
    /// # Errors
    ///
    /// Returns `InvoiceError::Pdf` if `printpdf` fails.
    pub fn render_pdf(&self, fonts: &FontSource) -> Result<Vec<u8>, InvoiceError> {
        pdf::render(self, fonts)
    }

    /// Render and write `<dir>/Invoice_<id>.pdf`, creating `dir` if needed.
    ///
    /// # Errors
    ///
    /// Returns `InvoiceError::Pdf` if rendering fails or
    /// `InvoiceError::Io` if the file cannot be written.
    #[instrument(skip(self, fonts), fields(file = %self.file_name))]
    pub fn save_to(&self, dir: &Path, fonts: &FontSource) -> Result<PathBuf, InvoiceError> {
        let bytes = self.render_pdf(fonts)?;
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &bytes)?;
        tracing::info!(path = %path.display(), bytes = bytes.len(), "Invoice saved");
        Ok(path)
    }
}

/// Font used when rendering.
#[derive(Clone, Default)]
pub enum FontSource {
    /// PDF built-in Helvetica. Cannot show `₹`, which is written as `Rs.`.
    #[default]
    Builtin,
    /// A TrueType font embedded in the PDF.
    TrueType(Vec<u8>),
}

impl std::fmt::Debug for FontSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Builtin => write!(f, "Builtin"),
            Self::TrueType(bytes) => write!(f, "TrueType({} bytes)", bytes.len()),
        }
    }
}

impl FontSource {
    /// Load a TrueType font from disk.
    ///
    /// # Errors
    ///
    /// Returns `InvoiceError::Font` if the file cannot be read.
    pub fn from_path(path: &Path) -> Result<Self, InvoiceError> {
        std::fs::read(path)
            .map(Self::TrueType)
            .map_err(|source| InvoiceError::Font {
                path: path.to_path_buf(),
                source,
            })
    }

    /// The configured font, or the built-in one.
    ///
    /// # Errors
    ///
    /// Returns `InvoiceError::Font` if a path is given but cannot be read.
    pub fn from_config(path: Option<&Path>) -> Result<Self, InvoiceError> {
        path.map_or(Ok(Self::Builtin), Self::from_path)
    }
}

/// Invoice branding and money formatting.
#[derive(Debug, Clone)]
pub struct InvoiceSettings {
    pub store_name: String,
    pub currency: CurrencyCode,
}

impl Default for InvoiceSettings {
    fn default() -> Self {
        Self {
            store_name: DEFAULT_STORE_NAME.to_string(),
            currency: CurrencyCode::INR,
        }
    }
}

/// Lays out one order as an invoice.
#[derive(Debug, Clone, Default)]
pub struct InvoiceBuilder {
    settings: InvoiceSettings,
}

impl InvoiceBuilder {
    #[must_use]
    pub const fn new(settings: InvoiceSettings) -> Self {
        Self { settings }
    }

    /// File name for an order's invoice.
    #[must_use]
    pub fn file_name(order: &Order) -> String {
        format!("Invoice_{}.pdf", order.id)
    }

    /// Lay out `order`.
    ///
    /// # Errors
    ///
    /// Returns `InvoiceError::MissingOrderId` if the order id is blank.
    #[instrument(skip(self, order), fields(order_id = %order.id, items = order.items.len()))]
    pub fn build(&self, order: &Order) -> Result<InvoiceDocument, InvoiceError> {
        if order.id.is_empty() {
            return Err(InvoiceError::MissingOrderId);
        }

        let store = self.store_name();
        let mut canvas = Canvas::new();

        // Title block
        canvas.text_at(
            Section::Header,
            MARGIN_X,
            TOP_MARGIN,
            STORE_NAME_SIZE,
            Weight::Bold,
            Rgb8::BLACK,
            store.clone(),
        );
        canvas.text_at(
            Section::Header,
            MARGIN_X,
            TITLE_Y,
            TITLE_SIZE,
            Weight::Regular,
            Rgb8::BLACK,
            "Invoice",
        );
        canvas.set_y(DETAILS_Y);

        // Order and customer details
        let body = |canvas: &mut Canvas, section: Section, text: String| {
            canvas.paragraph(section, &text, BODY_SIZE, Weight::Regular);
        };
        body(&mut canvas, Section::Order, format!("Order ID: {}", order.id));
        body(&mut canvas, Section::Order, format!("Placed At: {}", placed_at(order)));
        body(&mut canvas, Section::Order, format!("Status: {}", order.status));
        body(&mut canvas, Section::Customer, format!("Customer: {}", order.customer_name()));
        body(&mut canvas, Section::Customer, format!("Email: {}", order.customer_email()));
        body(
            &mut canvas,
            Section::Customer,
            format!(
                "Mobile: {}",
                order
                    .customer_phone()
                    .unwrap_or_else(|| NOT_AVAILABLE.to_string())
            ),
        );

        // Shipping address
        canvas.advance(SECTION_GAP);
        canvas.paragraph(Section::Address, "Shipping Address:", BODY_SIZE, Weight::Bold);
        canvas.paragraph(
            Section::Address,
            &address_block(&order.shipping),
            BODY_SIZE,
            Weight::Regular,
        );

        // Items
        canvas.advance(SECTION_GAP);
        let rows: Vec<[String; 5]> = order
            .items
            .iter()
            .map(|item| self.table_row(item))
            .collect();
        let table_top = canvas.y();
        let final_y = table::draw_table(&mut canvas, table_top, &rows);

        // Payment summary
        canvas.set_y(final_y + SUMMARY_GAP);
        for line in self.summary_lines(order) {
            canvas.paragraph(Section::Summary, &line, BODY_SIZE, Weight::Regular);
        }

        // Footer on the last page
        let footer = format!("Thank you for shopping with {store}!");
        let footer_x = ((PAGE_WIDTH - text_width(&footer, BODY_SIZE, Weight::Regular)) / 2.0)
            .max(MARGIN_X);
        canvas.text_at(
            Section::Footer,
            footer_x,
            FOOTER_Y,
            BODY_SIZE,
            Weight::Regular,
            Rgb8::BLACK,
            footer,
        );

        let document = InvoiceDocument {
            file_name: Self::file_name(order),
            pages: canvas.into_pages(),
        };
        tracing::debug!(pages = document.page_count(), "Invoice laid out");
        Ok(document)
    }

    fn store_name(&self) -> String {
        let name = normalize_text(&self.settings.store_name);
        if name.is_empty() {
            DEFAULT_STORE_NAME.to_string()
        } else {
            name
        }
    }

    fn money(&self, amount: Decimal) -> String {
        format_amount(amount, self.settings.currency)
    }

    fn table_row(&self, item: &LineItem) -> [String; 5] {
        [
            normalize_text(&item.name),
            item.quantity.to_string(),
            self.money(item.price),
            specifications_text(item),
            customization_text(item),
        ]
    }

    fn summary_lines(&self, order: &Order) -> [String; 6] {
        let totals = &order.totals;
        [
            format!("Items Price: {}", self.money(totals.items_price)),
            format!("Shipping Charges: {}", self.money(totals.shipping_price)),
            format!("Discount: {}", self.money(totals.discount)),
            format!("Total Amount: {}", self.money(totals.total_price)),
            format!("Amount Paid: {}", self.money(totals.amount_paid)),
            format!("Amount Due: {}", self.money(totals.amount_due)),
        ]
    }
}

fn placed_at(order: &Order) -> String {
    order.created_at.map_or_else(
        || NOT_AVAILABLE.to_string(),
        |at| at.with_timezone(&Local).format(PLACED_AT_FORMAT).to_string(),
    )
}

/// `name, street, city, state - postal, country`, skipping blanks.
#[must_use]
pub fn address_block(shipping: &ShippingInfo) -> String {
    let clean = |value: &Option<String>| normalize_opt(value.as_deref());

    let city_state: Vec<String> = [clean(&shipping.city), clean(&shipping.state)]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect();
    let city_state = city_state.join(", ");
    let postal = clean(&shipping.postal_code);
    let locality = match (city_state.is_empty(), postal.is_empty()) {
        (false, false) => format!("{city_state} - {postal}"),
        (true, false) => postal,
        _ => city_state,
    };

    let segments: Vec<String> = [
        clean(&shipping.name),
        clean(&shipping.address),
        locality,
        clean(&shipping.country),
    ]
    .into_iter()
    .filter(|s| !s.is_empty())
    .collect();

    if segments.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        segments.join(", ")
    }
}
