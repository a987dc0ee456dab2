//! Order domain types.
//!
//! These are the canonical, already-normalized shapes produced by
//! [`crate::api::conversions`]. Field-name inconsistencies and polymorphic
//! attribute shapes coming from the backend are resolved before data reaches
//! this module.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use cuztory_core::text::normalize_text;
use cuztory_core::{OrderId, OrderStatus};

/// Fallback shown when no customer name is known.
pub const GUEST_NAME: &str = "Guest";

/// Fallback shown when a contact field is unknown.
pub const NOT_AVAILABLE: &str = "N/A";

/// One customer purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Backend identifier.
    pub id: OrderId,
    /// When the order was placed.
    pub created_at: Option<DateTime<Utc>>,
    /// Registered user or guest details.
    pub customer: Customer,
    /// Delivery details.
    pub shipping: ShippingInfo,
    /// Purchased products, in order.
    pub items: Vec<LineItem>,
    /// Monetary summary as computed by the backend.
    pub totals: OrderTotals,
    /// Current status label.
    pub status: OrderStatus,
    /// External carrier shipment sub-state.
    pub shipment: Shipment,
}

/// Who placed the order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// Linked registered user, if any.
    pub user: Option<UserRef>,
    /// Name captured at guest checkout.
    pub guest_name: Option<String>,
    /// Email captured at guest checkout.
    pub guest_email: Option<String>,
}

/// A registered user as embedded in an order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Delivery details for an order.
///
/// `postal_code` is the single canonical field; the backend's alternate names
/// are resolved at ingestion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingInfo {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
}

/// A purchased product within an order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    /// Unit price.
    pub price: Decimal,
    pub quantity: u32,
    /// Fixed product attributes chosen at purchase time.
    pub specifications: Vec<Specification>,
    /// Buyer-supplied personalization fields.
    pub customization: Vec<CustomizationEntry>,
}

/// A `key: value` product attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Specification {
    pub key: String,
    pub value: String,
}

/// A personalization value, optionally labelled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomizationEntry {
    pub label: Option<String>,
    pub value: String,
}

/// Monetary summary. Missing amounts are zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTotals {
    pub items_price: Decimal,
    pub shipping_price: Decimal,
    pub discount: Decimal,
    pub total_price: Decimal,
    pub amount_paid: Decimal,
    pub amount_due: Decimal,
}

/// External shipment fields as last reported by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Shipment {
    /// Carrier-side order identifier; present once a shipment is created.
    pub external_order_id: Option<String>,
    /// Air waybill tracking code.
    pub awb_code: Option<String>,
    /// Carrier-side shipment identifier.
    pub shipment_id: Option<String>,
    /// Tracking history from the last sync.
    pub tracking: Option<serde_json::Value>,
}

impl Shipment {
    /// Drop every carrier-side field.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

impl Order {
    /// Customer name: registered user, then guest field, then shipping name.
    #[must_use]
    pub fn customer_name(&self) -> String {
        first_present([
            self.customer.user.as_ref().and_then(|u| u.name.as_deref()),
            self.customer.guest_name.as_deref(),
            self.shipping.name.as_deref(),
        ])
        .unwrap_or_else(|| GUEST_NAME.to_string())
    }

    /// Customer email: registered user, then guest field, then shipping info.
    #[must_use]
    pub fn customer_email(&self) -> String {
        first_present([
            self.customer.user.as_ref().and_then(|u| u.email.as_deref()),
            self.customer.guest_email.as_deref(),
            self.shipping.email.as_deref(),
        ])
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    }

    /// Contact phone, if any is known (shipping phone first).
    #[must_use]
    pub fn customer_phone(&self) -> Option<String> {
        first_present([
            self.shipping.phone.as_deref(),
            self.customer.user.as_ref().and_then(|u| u.phone.as_deref()),
        ])
    }

    /// Whether any line item carries at least one customization entry.
    #[must_use]
    pub fn has_customization(&self) -> bool {
        self.items.iter().any(crate::line_items::has_customization)
    }
}

/// First candidate that is non-empty after normalization.
pub(crate) fn first_present<'a>(
    candidates: impl IntoIterator<Item = Option<&'a str>>,
) -> Option<String> {
    candidates
        .into_iter()
        .flatten()
        .map(normalize_text)
        .find(|s| !s.is_empty())
}


#[cfg(test)]
mod tests {
    use super::fixtures::sample_order;
    use super::*;

    #[test]
    fn test_name_prefers_registered_user() {
        let mut order = sample_order();
        order.customer.user = Some(UserRef {
            name: Some("Registered Name".to_string()),
            ..UserRef::default()
        });
        assert_eq!(order.customer_name(), "Registered Name");
    }

    #[test]
    fn test_email_fallback_chain() {
        let mut order = sample_order();
        assert_eq!(order.customer_email(), "asha@example.com");

        order.customer.guest_email = Some("   ".to_string());
        order.shipping.email = Some("ship@example.com".to_string());
        assert_eq!(order.customer_email(), "ship@example.com");

        order.shipping.email = None;
        assert_eq!(order.customer_email(), NOT_AVAILABLE);
    }

    #[test]
    fn test_name_falls_back_to_guest_label() {
        let mut order = sample_order();
        order.customer = Customer::default();
        order.shipping.name = None;
        assert_eq!(order.customer_name(), GUEST_NAME);
    }

    #[test]
    fn test_phone_absent_when_blank() {
        let mut order = sample_order();
        order.shipping.phone = Some(String::new());
        assert_eq!(order.customer_phone(), None);
    }

    #[test]
    fn test_has_customization() {
        let mut order = sample_order();
        assert!(order.has_customization());
        order.items.iter_mut().for_each(|i| i.customization.clear());
        assert!(!order.has_customization());
    }
}
