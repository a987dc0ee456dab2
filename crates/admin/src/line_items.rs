//! Display strings for line-item attributes.
//!
//! Used by the invoice table and the order detail view.

use cuztory_core::text::normalize_text;

use crate::models::LineItem;

/// Shown when an item has nothing to list.
pub const EMPTY_FIELD: &str = "-";

/// `"key: value"` pairs joined with `", "`.
///
/// Pairs with an empty key or value are dropped.
#[must_use]
pub fn specifications_text(item: &LineItem) -> String {
    let parts: Vec<String> = item
        .specifications
        .iter()
        .filter_map(|spec| {
            let key = normalize_text(&spec.key);
            let value = normalize_text(&spec.value);
            (!key.is_empty() && !value.is_empty()).then(|| format!("{key}: {value}"))
        })
        .collect();
    join_or_placeholder(&parts, ", ")
}

/// Customization entries joined with `" | "`.
///
/// Entries with an empty value are dropped; unlabelled entries show the bare
/// value.
#[must_use]
pub fn customization_text(item: &LineItem) -> String {
    let parts: Vec<String> = item
        .customization
        .iter()
        .filter_map(|entry| {
            let value = normalize_text(&entry.value);
            if value.is_empty() {
                return None;
            }
            let label = entry.label.as_deref().map(normalize_text).unwrap_or_default();
            Some(if label.is_empty() {
                value
            } else {
                format!("{label}: {value}")
            })
        })
        .collect();
    join_or_placeholder(&parts, " | ")
}

/// Whether the item carries any customization entry.
#[must_use]
pub fn has_customization(item: &LineItem) -> bool {
    !item.customization.is_empty()
}

fn join_or_placeholder(parts: &[String], separator: &str) -> String {
    if parts.is_empty() {
        EMPTY_FIELD.to_string()
    } else {
        parts.join(separator)
    }
}
