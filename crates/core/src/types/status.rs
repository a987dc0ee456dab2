//! Status enums for orders and shipments.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Order status label.
///
/// Purely a label: the console enforces no transition rules and any value may
/// be replaced by any other. Labels the backend sends that are not in the
/// known list are preserved verbatim in [`OrderStatus::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Confirmed,
    Packed,
    InTransit,
    ArrivingTomorrow,
    OutForDelivery,
    Delivered,
    FailedDelivery,
    Cancelled,
    Returned,
    /// A label outside the known list.
    Other(String),
}

impl OrderStatus {
    /// The selectable statuses, in display order.
    pub const ALL: [Self; 11] = [
        Self::Pending,
        Self::Processing,
        Self::Confirmed,
        Self::Packed,
        Self::InTransit,
        Self::ArrivingTomorrow,
        Self::OutForDelivery,
        Self::Delivered,
        Self::FailedDelivery,
        Self::Cancelled,
        Self::Returned,
    ];

    /// The exact label used on the wire and on screen.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Pending => "Pending",
            Self::Processing => "Processing",
            Self::Confirmed => "Confirmed",
            Self::Packed => "Packed",
            Self::InTransit => "In Transit",
            Self::ArrivingTomorrow => "Arriving Tomorrow",
            Self::OutForDelivery => "Out for Delivery",
            Self::Delivered => "Delivered",
            Self::FailedDelivery => "Failed Delivery",
            Self::Cancelled => "Cancelled",
            Self::Returned => "Returned",
            Self::Other(label) => label,
        }
    }

    /// Parse a label, keeping unknown labels as [`OrderStatus::Other`].
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        Self::ALL
            .iter()
            .find(|s| s.label().eq_ignore_ascii_case(label.trim()))
            .cloned()
            .unwrap_or_else(|| Self::Other(label.trim().to_string()))
    }

    /// Whether this is one of the selectable statuses.
    #[must_use]
    pub const fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    /// Strict parse used for operator input: only the known labels (or their
    /// kebab/snake spellings, e.g. `out-for-delivery`) are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace(['-', '_'], " ");
        Self::ALL
            .iter()
            .find(|status| status.label().eq_ignore_ascii_case(&wanted))
            .cloned()
            .ok_or_else(|| {
                let valid: Vec<&str> = Self::ALL.iter().map(Self::label).collect();
                format!("invalid order status: {s}. Valid statuses: {}", valid.join(", "))
            })
    }
}

impl Serialize for OrderStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for OrderStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = Option::<String>::deserialize(deserializer)?;
        Ok(label.map_or(Self::Pending, |l| Self::from_label(&l)))
    }
}

/// Per-order outcome reported by a bulk shipment request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShipmentOutcome {
    /// Shipment created.
    Success,
    /// Order already had a shipment.
    Skipped,
    /// Shipment creation failed for this order.
    Failed,
}

impl std::fmt::Display for ShipmentOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "Success"),
            Self::Skipped => write!(f, "Skipped"),
            Self::Failed => write!(f, "Failed"),
        }
    }
}
