//! Customer messaging deep links.
//!
//! The console never sends messages itself. It composes the text from
//! normalized order fields and hands the operator a
//! `https://wa.me/<digits>?text=<encoded>` link to open.

use thiserror::Error;

use cuztory_core::OrderId;
use cuztory_core::text::{normalize_phone, normalize_text};

use crate::invoice::DEFAULT_STORE_NAME;
use crate::models::Order;

/// Default base of the customer tracking page.
pub const DEFAULT_TRACKING_URL: &str = "https://cuztory.in/track-order";

const WHATSAPP_BASE: &str = "https://wa.me";

const CUSTOMIZATION_FOLLOW_UP: &str =
    "Our team will contact you shortly to confirm your customization details.";

#[derive(Debug, Error)]
pub enum MessagingError {
    /// Neither the shipping info nor the linked user has a phone number.
    #[error("order {0} has no customer phone number")]
    MissingPhone(OrderId),
}

/// Which template to compose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Confirm,
    Status,
    Cancel,
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Confirm => "confirm",
            Self::Status => "status",
            Self::Cancel => "cancel",
        };
        f.write_str(name)
    }
}

/// Builds message text and deep links for an order.
#[derive(Debug, Clone)]
pub struct MessageComposer {
    store_name: String,
    tracking_base: String,
}

impl Default for MessageComposer {
    fn default() -> Self {
        Self::new(DEFAULT_STORE_NAME, DEFAULT_TRACKING_URL)
    }
}

impl MessageComposer {
    #[must_use]
    pub fn new(store_name: impl Into<String>, tracking_base: impl Into<String>) -> Self {
        Self {
            store_name: store_name.into(),
            tracking_base: tracking_base.into(),
        }
    }

    /// `<tracking base>?order_id=<id>`
    #[must_use]
    pub fn tracking_link(&self, id: &OrderId) -> String {
        let base = self.tracking_base.trim_end_matches('/');
        let separator = if base.contains('?') { '&' } else { '?' };
        format!(
            "{base}{separator}order_id={}",
            urlencoding::encode(id.as_str())
        )
    }

    /// Plain message text for `kind`.
    #[must_use]
    pub fn compose(&self, order: &Order, kind: MessageKind) -> String {
        let name = order.customer_name();
        let store = normalize_text(&self.store_name);
        let link = self.tracking_link(&order.id);
        let id = &order.id;

        match kind {
            MessageKind::Confirm => {
                let items = order
                    .items
                    .iter()
                    .map(|item| normalize_text(&item.name))
                    .filter(|name| !name.is_empty())
                    .collect::<Vec<_>>()
                    .join(", ");
                let mut text = format!(
                    "Hi {name}, thank you for shopping with {store}! \
                     Your order {id} for {items} has been confirmed."
                );
                if order.has_customization() {
                    text.push(' ');
                    text.push_str(CUSTOMIZATION_FOLLOW_UP);
                }
                format!("{text} Track your order here: {link}")
            }
            MessageKind::Status => format!(
                "Hi {name}, your {store} order {id} is now {status}. Track your order here: {link}",
                status = order.status
            ),
            MessageKind::Cancel => format!(
                "Hi {name}, your {store} order {id} has been cancelled. \
                 For details, visit: {link}"
            ),
        }
    }

    /// `https://wa.me/<digits>?text=<encoded message>`
    ///
    /// # Errors
    ///
    /// Returns `MessagingError::MissingPhone` when the order has no usable
    /// phone number; no link is produced.
    pub fn deep_link(&self, order: &Order, kind: MessageKind) -> Result<String, MessagingError> {
        let phone = order
            .customer_phone()
            .map(|raw| normalize_phone(&raw))
            .filter(|digits| !digits.is_empty())
            .ok_or_else(|| MessagingError::MissingPhone(order.id.clone()))?;

        let text = self.compose(order, kind);
        tracing::debug!(order_id = %order.id, %kind, "Composed customer message");
        Ok(format!(
            "{WHATSAPP_BASE}/{phone}?text={}",
            urlencoding::encode(&text)
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::models::fixtures::sample_order;
    use crate::models::{LineItem, ShippingInfo};

    #[test]
    fn test_deep_link_normalizes_ten_digit_phone() {
        let link = MessageComposer::default()
            .deep_link(&sample_order(), MessageKind::Status)
            .unwrap();
        assert!(link.starts_with("https://wa.me/919876543210?text="), "{link}");
    }

    #[test]
    fn test_deep_link_keeps_international_number() {
        let mut order = sample_order();
        order.shipping.phone = Some("+44 20 7946 0958".to_string());
        let link = MessageComposer::default()
            .deep_link(&order, MessageKind::Cancel)
            .unwrap();
        assert!(link.starts_with("https://wa.me/442079460958?text="));
    }

    #[test]
    fn test_missing_phone_blocks_link() {
        let mut order = sample_order();
        order.shipping = ShippingInfo::default();
        order.customer.user = None;
        let err = MessageComposer::default()
            .deep_link(&order, MessageKind::Confirm)
            .unwrap_err();
        assert!(matches!(err, MessagingError::MissingPhone(id) if id == order.id));
    }

    #[test]
    fn test_text_is_url_encoded() {
        let link = MessageComposer::default()
            .deep_link(&sample_order(), MessageKind::Status)
            .unwrap();
        let (_, text) = link.split_once("?text=").unwrap();
        assert!(!text.contains(' '));
        let decoded = urlencoding::decode(text).unwrap();
        assert!(decoded.contains("is now Processing"));
    }

    #[test]
    fn test_confirm_lists_items_and_follow_up() {
        let order = sample_order();
        let text = MessageComposer::default().compose(&order, MessageKind::Confirm);
        assert!(text.contains("Photo Mug, Keychain, Sticker Pack"));
        assert!(text.contains(CUSTOMIZATION_FOLLOW_UP));
        assert!(text.ends_with(&format!(
            "https://cuztory.in/track-order?order_id={}",
            order.id
        )));
    }

    #[test]
    fn test_confirm_omits_follow_up_without_customization() {
        let mut order = sample_order();
        order.items = vec![LineItem {
            name: "Keychain".to_string(),
            quantity: 1,
            ..LineItem::default()
        }];
        let text = MessageComposer::default().compose(&order, MessageKind::Confirm);
        assert!(!text.contains(CUSTOMIZATION_FOLLOW_UP));
    }

    #[test]
    fn test_cancel_has_greeting_id_and_link() {
        let order = sample_order();
        let text = MessageComposer::default().compose(&order, MessageKind::Cancel);
        assert!(text.starts_with("Hi Asha Rao,"));
        assert!(text.contains(order.id.as_str()));
        assert!(text.contains("cancelled"));
        assert!(text.contains("track-order?order_id="));
    }

    #[test]
    fn test_tracking_link_uses_configured_base() {
        let composer = MessageComposer::new("Cuztory", "https://shop.test/track/");
        assert_eq!(
            composer.tracking_link(&OrderId::new("a b")),
            "https://shop.test/track?order_id=a%20b"
        );
    }
}
