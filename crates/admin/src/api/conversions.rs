//! Ingestion: raw backend documents into the domain model.
//!
//! Every shape inconsistency is resolved here exactly once:
//! - postal code: `postalCode`, then `pincode`, then `postcode`
//! - customization: list of `{label|key, value}` or a plain object, both into
//!   one ordered list
//! - missing or `null` amounts become zero
//! - numeric ids and codes become strings

use rust_decimal::Decimal;
use serde_json::Value;

use cuztory_core::text::{normalize_text, normalize_value};
use cuztory_core::{OrderId, OrderStatus, ShipmentOutcome};

use super::wire::{
    RawBulkResult, RawCustomization, RawOrder, RawOrderItem, RawShipData, RawShippingInfo,
    RawUser,
};
use crate::models::{
    Customer, CustomizationEntry, LineItem, Order, OrderTotals, Shipment, ShippingInfo,
    Specification, UserRef,
};
use crate::shipment::{BulkResult, CreatedShipment};

impl From<RawOrder> for Order {
    fn from(raw: RawOrder) -> Self {
        let user = raw.user.and_then(|user| match user {
            RawUser::Populated { name, email, phone } => Some(UserRef { name, email, phone }),
            RawUser::Id(_) => None,
        });

        Self {
            id: OrderId::new(raw.id),
            created_at: raw.created_at,
            customer: Customer {
                user,
                guest_name: raw.guest_name,
                guest_email: raw.guest_email,
            },
            shipping: raw.shipping_info.map(ShippingInfo::from).unwrap_or_default(),
            items: raw.order_items.into_iter().map(LineItem::from).collect(),
            totals: OrderTotals {
                items_price: amount(raw.items_price),
                shipping_price: amount(raw.shipping_price),
                discount: amount(raw.discount),
                total_price: amount(raw.total_price),
                amount_paid: amount(raw.amount_paid),
                amount_due: amount(raw.amount_due),
            },
            status: raw
                .order_status
                .as_deref()
                .map(OrderStatus::from_label)
                .unwrap_or_default(),
            shipment: Shipment {
                external_order_id: text_value(raw.shiprocket_order_id.as_ref()),
                awb_code: text_value(raw.awb_code.as_ref()),
                shipment_id: text_value(raw.shipment_id.as_ref()),
                tracking: raw.tracking_data.filter(has_content),
            },
        }
    }
}

impl From<RawShippingInfo> for ShippingInfo {
    fn from(raw: RawShippingInfo) -> Self {
        let postal_code = [&raw.postal_code, &raw.pincode, &raw.postcode]
            .into_iter()
            .find_map(|candidate| text_value(candidate.as_ref()));

        Self {
            name: raw.name,
            phone: text_value(raw.phone.as_ref()),
            email: raw.email,
            address: raw.address,
            city: raw.city,
            state: raw.state,
            country: raw.country,
            postal_code,
        }
    }
}

impl From<RawOrderItem> for LineItem {
    fn from(raw: RawOrderItem) -> Self {
        let specifications = raw
            .specifications
            .unwrap_or_default()
            .into_iter()
            .map(|spec| Specification {
                key: spec.key.as_ref().map(normalize_value).unwrap_or_default(),
                value: spec.value.as_ref().map(normalize_value).unwrap_or_default(),
            })
            .collect();

        Self {
            name: raw.name.as_deref().map(normalize_text).unwrap_or_default(),
            price: amount(raw.price),
            quantity: raw.quantity.unwrap_or_default(),
            specifications,
            customization: raw.customization.map(customization_entries).unwrap_or_default(),
        }
    }
}

/// Flatten either customization shape into the canonical list.
///
/// Object maps come out in key order.
fn customization_entries(raw: RawCustomization) -> Vec<CustomizationEntry> {
    match raw {
        RawCustomization::List(entries) => entries
            .into_iter()
            .map(|entry| CustomizationEntry {
                label: text_value(entry.label.as_ref()).or_else(|| text_value(entry.key.as_ref())),
                value: entry.value.as_ref().map(normalize_value).unwrap_or_default(),
            })
            .collect(),
        RawCustomization::Map(map) => {
            let mut pairs: Vec<_> = map.into_iter().collect();
            pairs.sort_by(|(a, _), (b, _)| a.cmp(b));
            pairs
                .into_iter()
                .map(|(label, value)| CustomizationEntry {
                    label: Some(normalize_text(&label)).filter(|l| !l.is_empty()),
                    value: normalize_value(&value),
                })
                .collect()
        }
    }
}

impl From<RawShipData> for CreatedShipment {
    fn from(raw: RawShipData) -> Self {
        Self {
            external_order_id: normalize_value(&raw.order_id),
            awb_code: text_value(raw.awb_code.as_ref()),
            shipment_id: text_value(raw.shipment_id.as_ref()),
        }
    }
}

impl From<RawBulkResult> for BulkResult {
    fn from(raw: RawBulkResult) -> Self {
        let outcome = match raw.status.as_deref().map(str::trim) {
            Some(s) if s.eq_ignore_ascii_case("success") => ShipmentOutcome::Success,
            Some(s) if s.eq_ignore_ascii_case("skipped") => ShipmentOutcome::Skipped,
            _ => ShipmentOutcome::Failed,
        };
        Self {
            order_id: text_value(raw.order_id.as_ref()).map(OrderId::new),
            outcome,
            message: raw.message,
        }
    }
}

fn amount(value: Option<Decimal>) -> Decimal {
    value.unwrap_or(Decimal::ZERO)
}

/// Normalized text for a loosely typed value, `None` when blank.
fn text_value(value: Option<&Value>) -> Option<String> {
    value.map(normalize_value).filter(|s| !s.is_empty())
}

fn has_content(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Object(map) => !map.is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ => true,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw_order(value: Value) -> RawOrder {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_postal_code_from_pincode_string_or_number() {
        let order = Order::from(raw_order(json!({
            "_id": "o1",
            "shippingInfo": {"pincode": 560_001}
        })));
        assert_eq!(order.shipping.postal_code.as_deref(), Some("560001"));

        let order = Order::from(raw_order(json!({
            "_id": "o2",
            "shippingInfo": {"postalCode": "", "postcode": "SW1A 1AA"}
        })));
        assert_eq!(order.shipping.postal_code.as_deref(), Some("SW1A 1AA"));
    }

    #[test]
    fn test_postal_code_prefers_postal_code_field() {
        let order = Order::from(raw_order(json!({
            "_id": "o1",
            "shippingInfo": {"postalCode": "110001", "pincode": "400001"}
        })));
        assert_eq!(order.shipping.postal_code.as_deref(), Some("110001"));
    }

    #[test]
    fn test_customization_list_with_label_or_key() {
        let order = Order::from(raw_order(json!({
            "_id": "o1",
            "orderItems": [{
                "name": "Mug",
                "price": 200,
                "quantity": 1,
                "customization": [
                    {"label": "Size", "value": "M"},
                    {"key": "Note", "value": ""},
                    {"value": "Gift wrap"}
                ]
            }]
        })));
        let entries = &order.items[0].customization;
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].label.as_deref(), Some("Size"));
        assert_eq!(entries[1].label.as_deref(), Some("Note"));
        assert_eq!(entries[2].label, None);
    }

    #[test]
    fn test_customization_object_becomes_sorted_list() {
        let order = Order::from(raw_order(json!({
            "_id": "o1",
            "orderItems": [{"name": "Tee", "customization": {"Size": "M", "Note": ""}}]
        })));
        let entries = &order.items[0].customization;
        assert_eq!(
            entries,
            &vec![
                CustomizationEntry {
                    label: Some("Note".to_string()),
                    value: String::new(),
                },
                CustomizationEntry {
                    label: Some("Size".to_string()),
                    value: "M".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_missing_amounts_are_zero() {
        let order = Order::from(raw_order(json!({
            "_id": "o1",
            "itemsPrice": 500,
            "discount": null
        })));
        assert_eq!(order.totals.items_price, Decimal::from(500));
        assert_eq!(order.totals.discount, Decimal::ZERO);
        assert_eq!(order.totals.amount_due, Decimal::ZERO);
    }

    #[test]
    fn test_status_and_shipment_fields() {
        let order = Order::from(raw_order(json!({
            "_id": "o1",
            "orderStatus": "Out for Delivery",
            "shiprocketOrderId": 987_654,
            "awbCode": "",
            "trackingData": {}
        })));
        assert_eq!(order.status, OrderStatus::OutForDelivery);
        assert_eq!(order.shipment.external_order_id.as_deref(), Some("987654"));
        assert_eq!(order.shipment.awb_code, None);
        assert_eq!(order.shipment.tracking, None);
    }

    #[test]
    fn test_unpopulated_user_is_ignored() {
        let order = Order::from(raw_order(json!({
            "_id": "o1",
            "user": "64ff00aa",
            "guestName": "Ravi"
        })));
        assert!(order.customer.user.is_none());
        assert_eq!(order.customer_name(), "Ravi");
    }

    #[test]
    fn test_bulk_result_status_mapping() {
        let result: RawBulkResult =
            serde_json::from_value(json!({"orderId": "o1", "status": "skipped"})).unwrap();
        assert_eq!(BulkResult::from(result).outcome, ShipmentOutcome::Skipped);

        let result: RawBulkResult =
            serde_json::from_value(json!({"orderId": "o2", "status": "weird"})).unwrap();
        assert_eq!(BulkResult::from(result).outcome, ShipmentOutcome::Failed);
    }
}
