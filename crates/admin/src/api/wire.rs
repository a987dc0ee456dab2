//! Raw JSON shapes returned by the backend.
//!
//! These mirror the backend documents loosely: most fields are optional and
//! several accept more than one representation. Nothing outside
//! [`super::conversions`] should read them.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An order document.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOrder {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub user: Option<RawUser>,
    #[serde(default)]
    pub guest_name: Option<String>,
    #[serde(default)]
    pub guest_email: Option<String>,
    #[serde(default)]
    pub shipping_info: Option<RawShippingInfo>,
    #[serde(default)]
    pub order_items: Vec<RawOrderItem>,
    #[serde(default)]
    pub items_price: Option<Decimal>,
    #[serde(default)]
    pub shipping_price: Option<Decimal>,
    #[serde(default)]
    pub discount: Option<Decimal>,
    #[serde(default)]
    pub total_price: Option<Decimal>,
    #[serde(default)]
    pub amount_paid: Option<Decimal>,
    #[serde(default)]
    pub amount_due: Option<Decimal>,
    #[serde(default)]
    pub order_status: Option<String>,
    #[serde(default)]
    pub shiprocket_order_id: Option<Value>,
    #[serde(default)]
    pub awb_code: Option<Value>,
    #[serde(default)]
    pub shipment_id: Option<Value>,
    #[serde(default)]
    pub tracking_data: Option<Value>,
}

/// `user` is populated on most endpoints but may be a bare id.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawUser {
    Populated {
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        email: Option<String>,
        #[serde(default)]
        phone: Option<String>,
    },
    Id(String),
}

/// Shipping details with the backend's three postal-code spellings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawShippingInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<Value>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub postal_code: Option<Value>,
    #[serde(default)]
    pub pincode: Option<Value>,
    #[serde(default)]
    pub postcode: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawOrderItem {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub quantity: Option<u32>,
    #[serde(default)]
    pub specifications: Option<Vec<RawSpecification>>,
    #[serde(default)]
    pub customization: Option<RawCustomization>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawSpecification {
    #[serde(default)]
    pub key: Option<Value>,
    #[serde(default)]
    pub value: Option<Value>,
}

/// Customization arrives as a list of labelled entries or as a plain map.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawCustomization {
    List(Vec<RawCustomizationEntry>),
    Map(Map<String, Value>),
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawCustomizationEntry {
    #[serde(default)]
    pub label: Option<Value>,
    #[serde(default)]
    pub key: Option<Value>,
    #[serde(default)]
    pub value: Option<Value>,
}

/// Single-order endpoints answer either with the order or `{order: ...}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OrderEnvelope {
    Wrapped { order: RawOrder },
    Bare(RawOrder),
}

impl OrderEnvelope {
    pub fn into_inner(self) -> RawOrder {
        match self {
            Self::Wrapped { order } | Self::Bare(order) => order,
        }
    }
}

/// Response of `POST /orders/admin/shiprocket/:id`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateShipmentResponse {
    pub ship_data: RawShipData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawShipData {
    pub order_id: Value,
    #[serde(default)]
    pub awb_code: Option<Value>,
    #[serde(default)]
    pub shipment_id: Option<Value>,
}

/// Response of `POST /orders/admin/shiprocket/bulk`.
#[derive(Debug, Clone, Deserialize)]
pub struct BulkShipmentResponse {
    #[serde(default)]
    pub results: Vec<RawBulkResult>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBulkResult {
    #[serde(default)]
    pub order_id: Option<Value>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

// =============================================================================
// Request bodies
// =============================================================================

#[derive(Debug, Serialize)]
pub struct StatusUpdate<'a> {
    pub status: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingEdit<'a> {
    pub shipping_info: ShippingInfoBody<'a>,
}

/// Outgoing shipping info. The postal code is sent under `postalCode`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingInfoBody<'a> {
    pub name: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub email: Option<&'a str>,
    pub address: Option<&'a str>,
    pub city: Option<&'a str>,
    pub state: Option<&'a str>,
    pub country: Option<&'a str>,
    pub postal_code: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkShipmentRequest<'a> {
    pub order_ids: Vec<&'a str>,
}
