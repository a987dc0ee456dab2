//! Catalog and store-settings entities.
//!
//! Collections, banners, products, shipping rates and the payment
//! configuration are independent CRUD records. Each editable record has a
//! matching form type whose `validate()` runs before any request is issued.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use cuztory_core::{BannerId, CollectionId, ProductId, ShippingRateId};

use crate::error::ValidationError;

// =============================================================================
// Media
// =============================================================================

/// A hosted image.
///
/// The backend sends images either as a bare URL or as `{url, public_id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "MediaRepr")]
pub struct Media {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MediaRepr {
    Url(String),
    Object {
        #[serde(default)]
        url: String,
        #[serde(default)]
        public_id: Option<String>,
    },
}

impl From<MediaRepr> for Media {
    fn from(repr: MediaRepr) -> Self {
        match repr {
            MediaRepr::Url(url) => Self {
                url,
                public_id: None,
            },
            MediaRepr::Object { url, public_id } => Self { url, public_id },
        }
    }
}

/// A file selected for upload in a multipart form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    /// Build an upload, guessing the MIME type from the file extension.
    #[must_use]
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = image_mime_type(&file_name).to_string();
        Self {
            file_name,
            content_type,
            bytes,
        }
    }
}

fn image_mime_type(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

// =============================================================================
// Collections
// =============================================================================

/// A named group of products.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    #[serde(rename = "_id")]
    pub id: CollectionId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<Media>,
    /// Only populated by the single-collection endpoint.
    #[serde(default)]
    pub products: Vec<CollectionProduct>,
}

/// Product summary embedded in a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionProduct {
    #[serde(rename = "_id")]
    pub id: ProductId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub price: Option<Decimal>,
}

/// Create/edit form for a collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionForm {
    pub name: String,
    pub description: String,
    /// Replacement image, sent as the multipart `file` field.
    pub image: Option<Upload>,
}

impl CollectionForm {
    /// # Errors
    ///
    /// Returns `ValidationError` if the name is blank.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("Name", &self.name)
    }
}

// =============================================================================
// Banners
// =============================================================================

/// A storefront hero banner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Banner {
    #[serde(rename = "_id")]
    pub id: BannerId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub image: Option<Media>,
    #[serde(default)]
    pub is_active: bool,
}

/// Create/edit form for a banner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BannerForm {
    pub title: String,
    pub subtitle: String,
    pub link: String,
    pub is_active: bool,
    pub image: Option<Upload>,
}

impl Default for BannerForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            subtitle: String::new(),
            link: String::new(),
            is_active: true,
            image: None,
        }
    }
}

impl BannerForm {
    /// # Errors
    ///
    /// Returns `ValidationError` if the title is blank.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("Title", &self.title)
    }
}

// =============================================================================
// Products
// =============================================================================

/// A sellable product as managed from the admin console.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: ProductId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Decimal,
    #[serde(default)]
    pub category: Option<String>,
    /// Associated collection id (informational).
    #[serde(default, deserialize_with = "reference_id")]
    pub collection: Option<String>,
    #[serde(default)]
    pub is_customizable: bool,
    #[serde(default)]
    pub customization_fields: Vec<CustomizationField>,
    #[serde(default)]
    pub specifications: Vec<ProductSpecification>,
    /// Simple stock, used when the product has no specifications.
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub images: Vec<Media>,
}

/// A reference that may arrive as a bare id or as a populated document.
fn reference_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Reference {
        Id(String),
        Document {
            #[serde(rename = "_id")]
            id: String,
        },
    }

    Ok(Option::<Reference>::deserialize(deserializer)?
        .map(|r| match r {
            Reference::Id(id) | Reference::Document { id } => id,
        })
        .filter(|id| !id.is_empty()))
}

impl Product {
    /// Stock across all specification values, or the simple stock.
    #[must_use]
    pub fn total_stock(&self) -> i64 {
        if self.specifications.is_empty() {
            return self.stock;
        }
        self.specifications
            .iter()
            .flat_map(|spec| spec.values.iter())
            .map(|v| v.stock)
            .sum()
    }
}

/// A personalization input offered to buyers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomizationField {
    pub label: String,
    #[serde(rename = "type", default)]
    pub kind: FieldKind,
}

/// Input kind of a [`CustomizationField`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    #[default]
    Text,
    Number,
    File,
}

/// A selectable product attribute with per-value stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSpecification {
    pub key: String,
    #[serde(default)]
    pub values: Vec<SpecificationValue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecificationValue {
    pub value: String,
    #[serde(default)]
    pub stock: i64,
}

/// Create/edit form for a product.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductForm {
    pub title: String,
    pub description: String,
    pub price: Decimal,
    pub category: String,
    pub collection: String,
    pub is_customizable: bool,
    pub customization_fields: Vec<CustomizationField>,
    pub specifications: Vec<ProductSpecification>,
    pub stock: i64,
    /// Images already hosted, in display order.
    pub existing_images: Vec<Media>,
    /// New images, sent as repeated `productImages` fields.
    pub new_images: Vec<Upload>,
}

impl ProductForm {
    /// Prefill the form from an existing product.
    #[must_use]
    pub fn from_product(product: &Product) -> Self {
        Self {
            title: product.title.clone(),
            description: product.description.clone().unwrap_or_default(),
            price: product.price,
            category: product.category.clone().unwrap_or_default(),
            collection: product.collection.clone().unwrap_or_default(),
            is_customizable: product.is_customizable,
            customization_fields: product.customization_fields.clone(),
            specifications: product.specifications.clone(),
            stock: product.stock,
            existing_images: product.images.clone(),
            new_images: Vec::new(),
        }
    }

    /// # Errors
    ///
    /// Returns `ValidationError` if the title is blank or a numeric field is
    /// negative.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("Title", &self.title)?;
        if self.price.is_sign_negative() {
            return Err(ValidationError::new("Price cannot be negative"));
        }
        if self.stock < 0 {
            return Err(ValidationError::new("Stock cannot be negative"));
        }
        Ok(())
    }
}

// =============================================================================
// Shipping rates
// =============================================================================

/// A flat shipping charge offered at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingRate {
    #[serde(rename = "_id")]
    pub id: ShippingRateId,
    pub name: String,
    #[serde(default)]
    pub rate: Decimal,
    #[serde(default)]
    pub enabled: bool,
}

/// Form for adding a shipping rate; also the request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShippingRateForm {
    pub name: String,
    /// `None` when the operator left the rate empty.
    #[serde(serialize_with = "rust_decimal::serde::float_option::serialize")]
    pub rate: Option<Decimal>,
    pub enabled: bool,
}

impl ShippingRateForm {
    /// # Errors
    ///
    /// Returns `ValidationError` unless both name and rate are filled in.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() || self.rate.is_none() {
            return Err(ValidationError::new("Please fill all fields"));
        }
        if self.rate.is_some_and(|r| r.is_sign_negative()) {
            return Err(ValidationError::new("Rate cannot be negative"));
        }
        Ok(())
    }
}

// =============================================================================
// Payment configuration
// =============================================================================

/// How a payment adjustment is expressed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdjustmentType {
    #[default]
    Percent,
    Amount,
}

/// Checkout payment options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentConfig {
    #[serde(default)]
    pub full_prepaid: FullPrepaid,
    #[serde(default)]
    pub partial_payment: PartialPayment,
    #[serde(default)]
    pub cod: CashOnDelivery,
}

/// Discount for paying the whole amount upfront.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FullPrepaid {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub discount_type: AdjustmentType,
    #[serde(default, serialize_with = "rust_decimal::serde::float::serialize")]
    pub discount_value: Decimal,
}

/// Advance payment with the remainder due on delivery.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialPayment {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub partial_type: AdjustmentType,
    #[serde(default, serialize_with = "rust_decimal::serde::float::serialize")]
    pub partial_value: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashOnDelivery {
    #[serde(default)]
    pub enabled: bool,
}

impl PaymentConfig {
    /// # Errors
    ///
    /// Returns `ValidationError` if a value is negative or a percentage
    /// exceeds 100.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_adjustment(
            "Discount value",
            self.full_prepaid.discount_type,
            self.full_prepaid.discount_value,
        )?;
        check_adjustment(
            "Partial value",
            self.partial_payment.partial_type,
            self.partial_payment.partial_value,
        )
    }
}

fn check_adjustment(
    field: &str,
    kind: AdjustmentType,
    value: Decimal,
) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ValidationError::new(format!("{field} cannot be negative")));
    }
    if kind == AdjustmentType::Percent && value > Decimal::ONE_HUNDRED {
        return Err(ValidationError::new(format!(
            "{field} cannot exceed 100 percent"
        )));
    }
    Ok(())
}

// =============================================================================
// Analytics
// =============================================================================

/// Read-only dashboard summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    #[serde(default)]
    pub total_users: u64,
    #[serde(default)]
    pub total_orders: u64,
    #[serde(default)]
    pub total_revenue: Decimal,
    #[serde(default)]
    pub pending_orders: u64,
    #[serde(default)]
    pub charts: AnalyticsCharts,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsCharts {
    #[serde(default)]
    pub monthly_revenue: Vec<ChartPoint>,
    #[serde(default)]
    pub top_selling_products: Vec<ChartPoint>,
}

/// One labelled data point.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub value: Decimal,
}

fn require(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(format!("{field} is required")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_media_accepts_url_or_object() {
        let plain: Media = serde_json::from_value(json!("https://cdn/x.png")).expect("url");
        assert_eq!(plain.url, "https://cdn/x.png");
        assert_eq!(plain.public_id, None);

        let object: Media =
            serde_json::from_value(json!({"url": "https://cdn/y.png", "public_id": "y"}))
                .expect("object");
        assert_eq!(object.public_id.as_deref(), Some("y"));
    }

    #[test]
    fn test_collection_form_requires_name() {
        let form = CollectionForm {
            name: "  ".to_string(),
            ..CollectionForm::default()
        };
        assert_eq!(
            form.validate(),
            Err(ValidationError::new("Name is required"))
        );
    }

    #[test]
    fn test_banner_form_requires_title() {
        assert!(BannerForm::default().validate().is_err());
        let form = BannerForm {
            title: "Diwali Sale".to_string(),
            ..BannerForm::default()
        };
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_shipping_rate_requires_name_and_rate() {
        let mut form = ShippingRateForm {
            name: "Express".to_string(),
            rate: None,
            enabled: true,
        };
        assert!(form.validate().is_err());
        form.rate = Some(Decimal::from(99));
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_payment_percent_capped_at_hundred() {
        let mut config = PaymentConfig::default();
        config.full_prepaid.discount_value = Decimal::from(101);
        assert!(config.validate().is_err());

        config.full_prepaid.discount_type = AdjustmentType::Amount;
        assert!(config.validate().is_ok());

        config.partial_payment.partial_value = Decimal::from(-5);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_payment_config_wire_names() {
        let config: PaymentConfig = serde_json::from_value(json!({
            "fullPrepaid": {"enabled": true, "discountType": "amount", "discountValue": 50},
            "partialPayment": {"enabled": false, "partialType": "percent", "partialValue": 20},
            "cod": {"enabled": true}
        }))
        .expect("config");
        assert_eq!(config.full_prepaid.discount_type, AdjustmentType::Amount);
        assert!(config.cod.enabled);
    }

    #[test]
    fn test_product_total_stock() {
        let product: Product = serde_json::from_value(json!({
            "_id": "p1",
            "title": "Mug",
            "price": 199,
            "stock": 3,
            "specifications": [
                {"key": "Color", "values": [{"value": "Red", "stock": 2}, {"value": "Blue", "stock": 5}]}
            ],
            "customizationFields": [{"label": "Name", "type": "text"}]
        }))
        .expect("product");
        assert_eq!(product.total_stock(), 7);
        assert_eq!(product.customization_fields[0].kind, FieldKind::Text);
    }

    #[test]
    fn test_upload_guesses_mime() {
        assert_eq!(Upload::new("hero.JPG", vec![]).content_type, "image/jpeg");
        assert_eq!(
            Upload::new("notes", vec![]).content_type,
            "application/octet-stream"
        );
    }

    #[test]
    fn test_product_collection_id_or_document() {
        let bare: Product =
            serde_json::from_value(json!({"_id": "p1", "collection": "c1"})).expect("bare");
        assert_eq!(bare.collection.as_deref(), Some("c1"));

        let populated: Product = serde_json::from_value(
            json!({"_id": "p2", "collection": {"_id": "c2", "name": "Mugs"}}),
        )
        .expect("populated");
        assert_eq!(populated.collection.as_deref(), Some("c2"));

        let missing: Product = serde_json::from_value(json!({"_id": "p3"})).expect("missing");
        assert_eq!(missing.collection, None);
    }

    #[test]
    fn test_shipping_rate_body_sends_number() {
        let form = ShippingRateForm {
            name: "Express".to_string(),
            rate: Some(Decimal::new(9950, 2)),
            enabled: true,
        };
        let body = serde_json::to_value(&form).expect("serialize");
        assert_eq!(body, json!({"name": "Express", "rate": 99.5, "enabled": true}));
    }
}
