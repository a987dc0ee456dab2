//! Carrier shipment lifecycle for orders.
//!
//! The lifecycle is a three-state machine derived from what the backend last
//! reported:
//!
//! ```text
//! NoShipment --create--> Created --sync--> Synced
//!      ^                    |                |
//!      +-------reset--------+-------reset----+
//! ```
//!
//! States only change on confirmed backend responses. A sync is guarded per
//! order so at most one is outstanding; extra requests while one is running
//! are ignored rather than queued.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::instrument;

use cuztory_core::{OrderId, ShipmentOutcome};

use crate::api::ApiError;
use crate::backend::OrderBackend;
use crate::models::{Order, Shipment};

/// Errors from shipment actions.
#[derive(Debug, Error)]
pub enum ShipmentError {
    /// The action is not allowed from the order's current state.
    #[error("Cannot {action} shipment for order {order_id}: order is in state {state}")]
    InvalidTransition {
        order_id: OrderId,
        action: ShipmentAction,
        state: &'static str,
    },

    /// The backend rejected or failed the call.
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Operator-triggered shipment actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShipmentAction {
    Create,
    Sync,
    Reset,
}

impl std::fmt::Display for ShipmentAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Create => write!(f, "create"),
            Self::Sync => write!(f, "sync"),
            Self::Reset => write!(f, "reset"),
        }
    }
}

/// Where an order is in the shipment lifecycle.
#[derive(Debug, Clone, PartialEq)]
pub enum ShipmentState {
    /// No carrier order exists.
    NoShipment,
    /// Carrier order created; the waybill may not be assigned yet.
    Created {
        external_order_id: String,
        awb: Option<String>,
    },
    /// Tracking data has been pulled from the carrier.
    Synced {
        external_order_id: String,
        awb: Option<String>,
        tracking: Value,
    },
}

impl ShipmentState {
    /// Derive the state from the backend-reported shipment fields.
    #[must_use]
    pub fn of(shipment: &Shipment) -> Self {
        match (&shipment.external_order_id, &shipment.tracking) {
            (None, _) => Self::NoShipment,
            (Some(id), None) => Self::Created {
                external_order_id: id.clone(),
                awb: shipment.awb_code.clone(),
            },
            (Some(id), Some(tracking)) => Self::Synced {
                external_order_id: id.clone(),
                awb: shipment.awb_code.clone(),
                tracking: tracking.clone(),
            },
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::NoShipment => "NoShipment",
            Self::Created { .. } => "Created",
            Self::Synced { .. } => "Synced",
        }
    }

    /// Whether `action` may be taken from this state.
    #[must_use]
    pub const fn allows(&self, action: ShipmentAction) -> bool {
        matches!(
            (self, action),
            (Self::NoShipment, ShipmentAction::Create)
                | (
                    Self::Created { .. } | Self::Synced { .. },
                    ShipmentAction::Sync | ShipmentAction::Reset
                )
        )
    }
}

/// Shipment identifiers returned by a successful create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedShipment {
    pub external_order_id: String,
    pub awb_code: Option<String>,
    pub shipment_id: Option<String>,
}

impl CreatedShipment {
    /// Merge the new identifiers into an order's shipment fields.
    pub fn apply_to(&self, shipment: &mut Shipment) {
        shipment.external_order_id = Some(self.external_order_id.clone());
        if self.awb_code.is_some() {
            shipment.awb_code.clone_from(&self.awb_code);
        }
        if self.shipment_id.is_some() {
            shipment.shipment_id.clone_from(&self.shipment_id);
        }
    }
}

/// Result of a sync request.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    /// The backend returned fresh tracking data.
    Refreshed(Value),
    /// A sync for this order was already running; nothing was sent.
    AlreadyInFlight,
}

/// Per-order result of a bulk create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkResult {
    pub order_id: Option<OrderId>,
    pub outcome: ShipmentOutcome,
    pub message: Option<String>,
}

/// Three-way tally of a bulk create.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkSummary {
    pub success: usize,
    pub skipped: usize,
    pub failed: usize,
    pub outcomes: Vec<BulkResult>,
}

impl BulkSummary {
    #[must_use]
    pub fn from_results(outcomes: Vec<BulkResult>) -> Self {
        let count = |wanted: ShipmentOutcome| outcomes.iter().filter(|r| r.outcome == wanted).count();
        Self {
            success: count(ShipmentOutcome::Success),
            skipped: count(ShipmentOutcome::Skipped),
            failed: count(ShipmentOutcome::Failed),
            outcomes,
        }
    }
}

impl std::fmt::Display for BulkSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Success: {}, Skipped: {}, Failed: {}",
            self.success, self.skipped, self.failed
        )
    }
}

/// Drives shipment actions against an [`OrderBackend`].
#[derive(Debug, Default)]
pub struct ShipmentWorkflow {
    syncing: Mutex<HashSet<OrderId>>,
}

impl ShipmentWorkflow {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a carrier shipment for an order that has none.
    ///
    /// The caller merges the returned identifiers into its local state.
    ///
    /// # Errors
    ///
    /// Returns `ShipmentError::InvalidTransition` if the order already has a
    /// shipment, or `ShipmentError::Api` if the backend call fails.
    #[instrument(skip(self, backend, order), fields(order_id = %order.id))]
    pub async fn create<B: OrderBackend>(
        &self,
        backend: &B,
        order: &Order,
    ) -> Result<CreatedShipment, ShipmentError> {
        ensure_allowed(order, ShipmentAction::Create)?;
        let created = backend.create_shipment(&order.id).await?;
        tracing::info!(
            order_id = %order.id,
            external_order_id = %created.external_order_id,
            awb = ?created.awb_code,
            "Shipment created"
        );
        Ok(created)
    }

    /// Pull fresh tracking data for an order with a shipment.
    ///
    /// Returns [`SyncOutcome::AlreadyInFlight`] without contacting the
    /// backend if a sync for the same order is still running.
    ///
    /// # Errors
    ///
    /// Returns `ShipmentError::InvalidTransition` if the order has no
    /// shipment, or `ShipmentError::Api` if the backend call fails.
    #[instrument(skip(self, backend, order), fields(order_id = %order.id))]
    pub async fn sync<B: OrderBackend>(
        &self,
        backend: &B,
        order: &Order,
    ) -> Result<SyncOutcome, ShipmentError> {
        ensure_allowed(order, ShipmentAction::Sync)?;

        let Some(_guard) = self.begin_sync(&order.id) else {
            tracing::debug!(order_id = %order.id, "Sync already in flight, ignoring");
            return Ok(SyncOutcome::AlreadyInFlight);
        };

        let payload = backend.sync_shipment(&order.id).await?;
        tracing::info!(order_id = %order.id, "Shipment synced");
        Ok(SyncOutcome::Refreshed(payload))
    }

    /// Drop the carrier shipment so it can be created again.
    ///
    /// Confirmation is the caller's job.
    ///
    /// # Errors
    ///
    /// Returns `ShipmentError::InvalidTransition` if the order has no
    /// shipment, or `ShipmentError::Api` if the backend call fails.
    #[instrument(skip(self, backend, order), fields(order_id = %order.id))]
    pub async fn reset<B: OrderBackend>(
        &self,
        backend: &B,
        order: &Order,
    ) -> Result<(), ShipmentError> {
        ensure_allowed(order, ShipmentAction::Reset)?;
        backend.reset_shipment(&order.id).await?;
        tracing::info!(order_id = %order.id, "Shipment reset");
        Ok(())
    }

    /// Create shipments for several orders in one request.
    ///
    /// Individual failures are counted, never raised.
    ///
    /// # Errors
    ///
    /// Returns `ShipmentError::Api` only if the bulk request itself fails.
    #[instrument(skip(self, backend, ids), fields(count = ids.len()))]
    pub async fn bulk_create<B: OrderBackend>(
        &self,
        backend: &B,
        ids: &[OrderId],
    ) -> Result<BulkSummary, ShipmentError> {
        if ids.is_empty() {
            return Ok(BulkSummary::default());
        }

        let summary = BulkSummary::from_results(backend.bulk_create_shipments(ids).await?);

        if summary.failed == 0 {
            tracing::info!(
                success = summary.success,
                skipped = summary.skipped,
                "Bulk shipment creation completed"
            );
        } else {
            let errors: Vec<String> = summary
                .outcomes
                .iter()
                .filter(|r| r.outcome == ShipmentOutcome::Failed)
                .map(|r| {
                    format!(
                        "{}: {}",
                        r.order_id.as_ref().map_or("?", OrderId::as_str),
                        r.message.as_deref().unwrap_or("failed")
                    )
                })
                .collect();
            tracing::warn!(
                success = summary.success,
                skipped = summary.skipped,
                failed = summary.failed,
                errors = ?errors,
                "Bulk shipment creation completed with errors"
            );
        }

        Ok(summary)
    }

    /// Whether a sync for `id` is currently running.
    #[must_use]
    pub fn is_syncing(&self, id: &OrderId) -> bool {
        self.syncing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(id)
    }

    fn begin_sync(&self, id: &OrderId) -> Option<SyncGuard<'_>> {
        let inserted = self
            .syncing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.clone());
        inserted.then(|| SyncGuard {
            syncing: &self.syncing,
            id: id.clone(),
        })
    }
}

/// Releases the in-flight mark when the sync finishes, however it ends.
struct SyncGuard<'a> {
    syncing: &'a Mutex<HashSet<OrderId>>,
    id: OrderId,
}

impl Drop for SyncGuard<'_> {
    fn drop(&mut self) {
        self.syncing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.id);
    }
}

fn ensure_allowed(order: &Order, action: ShipmentAction) -> Result<(), ShipmentError> {
    let state = ShipmentState::of(&order.shipment);
    if state.allows(action) {
        Ok(())
    } else {
        Err(ShipmentError::InvalidTransition {
            order_id: order.id.clone(),
            action,
            state: state.name(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::backend::mock::MockBackend;
    use crate::models::fixtures::sample_order;
    use serde_json::json;

    #[test]
    fn test_state_derivation() {
        let mut shipment = Shipment::default();
        assert_eq!(ShipmentState::of(&shipment), ShipmentState::NoShipment);

        shipment.external_order_id = Some("SR-1".to_string());
        assert_eq!(
            ShipmentState::of(&shipment),
            ShipmentState::Created {
                external_order_id: "SR-1".to_string(),
                awb: None,
            }
        );

        shipment.tracking = Some(json!({"status": "PICKED UP"}));
        assert_eq!(ShipmentState::of(&shipment).name(), "Synced");
    }

    #[test]
    fn test_allowed_transitions() {
        let none = ShipmentState::NoShipment;
        assert!(none.allows(ShipmentAction::Create));
        assert!(!none.allows(ShipmentAction::Sync));
        assert!(!none.allows(ShipmentAction::Reset));

        let created = ShipmentState::Created {
            external_order_id: "SR-1".to_string(),
            awb: None,
        };
        assert!(!created.allows(ShipmentAction::Create));
        assert!(created.allows(ShipmentAction::Sync));
        assert!(created.allows(ShipmentAction::Reset));
    }

    #[tokio::test]
    async fn test_create_moves_to_created_with_returned_id() {
        let order = sample_order();
        let backend = MockBackend::with_orders(vec![order.clone()]);
        let workflow = ShipmentWorkflow::new();

        let created = workflow.create(&backend, &order).await.unwrap();
        let mut local = order.clone();
        created.apply_to(&mut local.shipment);

        assert_eq!(
            ShipmentState::of(&local.shipment),
            ShipmentState::Created {
                external_order_id: format!("SR-{}", order.id),
                awb: Some(format!("AWB{}", order.id)),
            }
        );
    }

    #[tokio::test]
    async fn test_create_twice_is_rejected_before_backend_call() {
        let mut order = sample_order();
        order.shipment.external_order_id = Some("SR-1".to_string());
        let backend = MockBackend::with_orders(vec![order.clone()]);
        let workflow = ShipmentWorkflow::new();

        let err = workflow.create(&backend, &order).await.unwrap_err();
        assert!(matches!(err, ShipmentError::InvalidTransition { .. }));
        assert_eq!(backend.calls("create_shipment"), 0);
    }

    #[tokio::test]
    async fn test_sync_without_shipment_is_rejected() {
        let order = sample_order();
        let backend = MockBackend::with_orders(vec![order.clone()]);
        let err = ShipmentWorkflow::new()
            .sync(&backend, &order)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ShipmentError::InvalidTransition {
                action: ShipmentAction::Sync,
                ..
            }
        ));
        assert_eq!(backend.calls("sync_shipment"), 0);
    }

    #[tokio::test]
    async fn test_concurrent_sync_issues_one_call() {
        let mut order = sample_order();
        order.shipment.external_order_id = Some("SR-1".to_string());
        let backend = MockBackend::with_orders(vec![order.clone()]);
        let workflow = ShipmentWorkflow::new();

        let (first, second) = tokio::join!(
            workflow.sync(&backend, &order),
            workflow.sync(&backend, &order)
        );

        assert!(matches!(first.unwrap(), SyncOutcome::Refreshed(_)));
        assert_eq!(second.unwrap(), SyncOutcome::AlreadyInFlight);
        assert_eq!(backend.calls("sync_shipment"), 1);
        assert!(!workflow.is_syncing(&order.id));

        // Once the first completes, syncing again is allowed.
        let third = workflow.sync(&backend, &order).await.unwrap();
        assert!(matches!(third, SyncOutcome::Refreshed(_)));
        assert_eq!(backend.calls("sync_shipment"), 2);
    }

    #[tokio::test]
    async fn test_failed_sync_releases_guard() {
        let mut order = sample_order();
        order.shipment.external_order_id = Some("SR-1".to_string());
        let backend = MockBackend::with_orders(vec![order.clone()]);
        backend.fail_on("sync_shipment", "Carrier unavailable");
        let workflow = ShipmentWorkflow::new();

        let err = workflow.sync(&backend, &order).await.unwrap_err();
        assert_eq!(err.to_string(), "Carrier unavailable");
        assert!(!workflow.is_syncing(&order.id));
    }

    #[tokio::test]
    async fn test_bulk_summary_counts_each_outcome() {
        let backend = MockBackend::default();
        backend.set_bulk_results(vec![
            BulkResult {
                order_id: Some(OrderId::new("a")),
                outcome: ShipmentOutcome::Success,
                message: None,
            },
            BulkResult {
                order_id: Some(OrderId::new("b")),
                outcome: ShipmentOutcome::Skipped,
                message: Some("Shipment already exists".to_string()),
            },
            BulkResult {
                order_id: Some(OrderId::new("c")),
                outcome: ShipmentOutcome::Failed,
                message: Some("Invalid pincode".to_string()),
            },
        ]);

        let ids = [OrderId::new("a"), OrderId::new("b"), OrderId::new("c")];
        let summary = ShipmentWorkflow::new()
            .bulk_create(&backend, &ids)
            .await
            .unwrap();

        assert_eq!((summary.success, summary.skipped, summary.failed), (1, 1, 1));
        assert_eq!(summary.to_string(), "Success: 1, Skipped: 1, Failed: 1");
    }

    #[tokio::test]
    async fn test_bulk_with_no_ids_skips_backend() {
        let backend = MockBackend::default();
        let summary = ShipmentWorkflow::new()
            .bulk_create(&backend, &[])
            .await
            .unwrap();
        assert_eq!(summary, BulkSummary::default());
        assert_eq!(backend.calls("bulk_create_shipments"), 0);
    }
}
