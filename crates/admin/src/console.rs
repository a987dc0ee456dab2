//! Order list and detail orchestration.
//!
//! [`OrderConsole`] owns the in-memory order list, the open detail record
//! and the bulk selection. Every operator action goes through it: it calls
//! the backend, merges confirmed results into local state and reports the
//! outcome through an [`Operator`].
//!
//! Failures are reported to the operator and returned; nothing is retried.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::instrument;

use cuztory_core::text::normalize_text;
use cuztory_core::{CurrencyCode, OrderId, OrderStatus, format_amount};

use crate::backend::OrderBackend;
use crate::error::{AppError, ValidationError};
use crate::invoice::{FontSource, InvoiceBuilder, PLACED_AT_FORMAT};
use crate::messaging::{MessageComposer, MessageKind};
use crate::models::{NOT_AVAILABLE, Order, Shipment, ShippingInfo};
use crate::shipment::{
    BulkSummary, CreatedShipment, ShipmentError, ShipmentState, ShipmentWorkflow, SyncOutcome,
};

/// A message for the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Success(String),
    Error(String),
}

impl Notice {
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Info(m) | Self::Success(m) | Self::Error(m) => m,
        }
    }
}

/// The human driving the console.
pub trait Operator {
    /// Ask a yes/no question; `true` means go ahead.
    fn confirm(&self, prompt: &str) -> bool;

    /// Show a notice.
    fn notify(&self, notice: Notice);
}

/// Asked before deleting an order.
pub const DELETE_PROMPT: &str = "Delete this order?";
/// Asked before resetting a shipment.
pub const RESET_PROMPT: &str =
    "Reset the Shiprocket shipment for this order? Its shipment id, AWB and tracking history will be cleared.";

/// One line of the order list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRow {
    pub id: OrderId,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub postal_code: String,
    pub total: String,
    pub status: OrderStatus,
    pub placed_at: String,
    pub shipment: &'static str,
}

impl OrderRow {
    fn project(order: &Order, currency: CurrencyCode) -> Self {
        let or_na = |value: Option<String>| value.unwrap_or_else(|| NOT_AVAILABLE.to_string());
        Self {
            id: order.id.clone(),
            customer_name: order.customer_name(),
            customer_email: order.customer_email(),
            customer_phone: or_na(order.customer_phone()),
            postal_code: or_na(
                order
                    .shipping
                    .postal_code
                    .as_deref()
                    .map(normalize_text)
                    .filter(|p| !p.is_empty()),
            ),
            total: format_amount(order.totals.total_price, currency),
            status: order.status.clone(),
            placed_at: order.created_at.map_or_else(
                || NOT_AVAILABLE.to_string(),
                |at| {
                    at.with_timezone(&chrono::Local)
                        .format(PLACED_AT_FORMAT)
                        .to_string()
                },
            ),
            shipment: ShipmentState::of(&order.shipment).name(),
        }
    }
}

/// Presentation settings for the console.
#[derive(Debug, Clone, Default)]
pub struct ConsoleSettings {
    pub invoices: InvoiceBuilder,
    pub fonts: FontSource,
    pub messages: MessageComposer,
    pub currency: CurrencyCode,
}

/// Order list/detail view state plus the actions that change it.
pub struct OrderConsole<B, O> {
    backend: B,
    operator: O,
    settings: ConsoleSettings,
    workflow: ShipmentWorkflow,
    orders: Vec<Order>,
    detail: Option<Order>,
    selection: BTreeSet<OrderId>,
}

impl<B: OrderBackend, O: Operator> OrderConsole<B, O> {
    pub fn new(backend: B, operator: O, settings: ConsoleSettings) -> Self {
        Self {
            backend,
            operator,
            settings,
            workflow: ShipmentWorkflow::new(),
            orders: Vec::new(),
            detail: None,
            selection: BTreeSet::new(),
        }
    }

    pub const fn backend(&self) -> &B {
        &self.backend
    }

    pub const fn operator(&self) -> &O {
        &self.operator
    }

    /// Orders as last fetched, with local patches applied.
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    /// The open detail record.
    pub const fn detail(&self) -> Option<&Order> {
        self.detail.as_ref()
    }

    pub const fn selection(&self) -> &BTreeSet<OrderId> {
        &self.selection
    }

    /// Row projections of the order list.
    pub fn rows(&self) -> Vec<OrderRow> {
        self.orders
            .iter()
            .map(|order| OrderRow::project(order, self.settings.currency))
            .collect()
    }

    /// Report `error` to the operator and hand it back.
    fn fail<T>(&self, error: impl Into<AppError>) -> Result<T, AppError> {
        let error = error.into();
        error.report();
        self.operator.notify(Notice::Error(error.operator_message()));
        Err(error)
    }

    fn open_order(&self) -> Result<&Order, AppError> {
        self.detail
            .as_ref()
            .ok_or_else(|| AppError::NotFound("no order is open".to_string()))
    }

    // =========================================================================
    // List
    // =========================================================================

    /// Replace the list with the backend's.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Api` if the fetch fails; the old list is kept.
    #[instrument(skip(self))]
    pub async fn refresh(&mut self) -> Result<usize, AppError> {
        match self.backend.list_orders().await {
            Ok(orders) => {
                self.orders = orders;
                tracing::debug!(count = self.orders.len(), "Order list refreshed");
                Ok(self.orders.len())
            }
            Err(e) => self.fail(e),
        }
    }

    /// Set an order's status.
    ///
    /// The row and the open detail are patched before the call; if the
    /// backend refuses, both go back to their previous status.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Api` if the backend call fails.
    #[instrument(skip(self, status), fields(order_id = %id, status = %status))]
    pub async fn update_status(&mut self, id: &OrderId, status: OrderStatus) -> Result<(), AppError> {
        let previous_row = self.patch_status(id, &status);

        match self.backend.update_status(id, &status).await {
            Ok(()) => {
                tracing::info!(order_id = %id, status = %status, "Order status updated");
                self.operator
                    .notify(Notice::Success(format!("Order status updated to {status}")));
                Ok(())
            }
            Err(e) => {
                if let Some(previous) = previous_row {
                    self.patch_status(id, &previous);
                    tracing::warn!(order_id = %id, restored = %previous, "Status update failed, reverted");
                }
                self.fail(e)
            }
        }
    }

    /// Write `status` into the row and open detail for `id`, returning the
    /// status it replaced.
    fn patch_status(&mut self, id: &OrderId, status: &OrderStatus) -> Option<OrderStatus> {
        let mut previous = None;
        if let Some(order) = self.orders.iter_mut().find(|o| &o.id == id) {
            previous = Some(std::mem::replace(&mut order.status, status.clone()));
        }
        if let Some(order) = self.detail.as_mut().filter(|o| &o.id == id) {
            let old = std::mem::replace(&mut order.status, status.clone());
            previous.get_or_insert(old);
        }
        previous
    }

    /// Delete an order after confirmation.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Cancelled` if the operator declines (no call is
    /// made), or `AppError::Api` carrying the backend's refusal; the row is
    /// kept in that case.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn delete(&mut self, id: &OrderId) -> Result<(), AppError> {
        if !self.operator.confirm(DELETE_PROMPT) {
            return Err(AppError::Cancelled("order not deleted".to_string()));
        }

        if let Err(e) = self.backend.delete_order(id).await {
            return self.fail(e);
        }

        self.orders.retain(|o| &o.id != id);
        self.selection.remove(id);
        if self.detail.as_ref().is_some_and(|o| &o.id == id) {
            self.detail = None;
        }
        tracing::info!(order_id = %id, "Order deleted");
        self.operator
            .notify(Notice::Success(format!("Order {id} deleted")));
        Ok(())
    }

    // =========================================================================
    // Detail
    // =========================================================================

    /// Fetch the full record for `id` and make it the open detail.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Api` if the fetch fails.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn open(&mut self, id: &OrderId) -> Result<&Order, AppError> {
        match self.backend.get_order(id).await {
            Ok(order) => Ok(self.detail.insert(order)),
            Err(e) => self.fail(e),
        }
    }

    pub fn close(&mut self) {
        self.detail = None;
    }

    /// Write the open order's invoice to `dir`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if no order is open, or
    /// `AppError::Invoice` if layout, rendering or writing fails.
    pub fn download_invoice(&self, dir: &Path) -> Result<PathBuf, AppError> {
        let order = self.open_order()?;
        let saved = self
            .settings
            .invoices
            .build(order)
            .and_then(|doc| doc.save_to(dir, &self.settings.fonts));
        match saved {
            Ok(path) => {
                self.operator
                    .notify(Notice::Success(format!("Invoice saved to {}", path.display())));
                Ok(path)
            }
            Err(e) => self.fail(e),
        }
    }

    /// Messaging deep link for the open order.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if no order is open, or
    /// `AppError::Messaging` if the order has no phone number.
    pub fn message_link(&self, kind: MessageKind) -> Result<String, AppError> {
        let order = self.open_order()?;
        match self.settings.messages.deep_link(order, kind) {
            Ok(link) => Ok(link),
            Err(e) => self.fail(e),
        }
    }

    /// Replace the open order's shipping info.
    ///
    /// Name, phone and address are required; nothing is sent otherwise.
    /// The backend's response replaces the detail and patches the row.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` or `AppError::Api`.
    #[instrument(skip(self, shipping))]
    pub async fn edit_shipping(&mut self, shipping: ShippingInfo) -> Result<(), AppError> {
        let id = self.open_order()?.id.clone();
        if let Err(e) = validate_shipping(&shipping) {
            return self.fail(e);
        }

        match self.backend.edit_shipping(&id, &shipping).await {
            Ok(updated) => {
                if let Some(row) = self.orders.iter_mut().find(|o| o.id == id) {
                    row.shipping = updated.shipping.clone();
                }
                self.detail = Some(updated);
                tracing::info!(order_id = %id, "Shipping info updated");
                self.operator
                    .notify(Notice::Success("Shipping info updated".to_string()));
                Ok(())
            }
            Err(e) => self.fail(e),
        }
    }

    // =========================================================================
    // Shipment lifecycle
    // =========================================================================

    /// Create a carrier shipment for the open order.
    ///
    /// The identifiers the backend returns are merged into the detail and
    /// the row before the reload, so a failed reload still shows them.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Shipment` if the action is not allowed or the
    /// backend call fails.
    pub async fn create_shipment(&mut self) -> Result<CreatedShipment, AppError> {
        let order = self.open_order()?.clone();
        let result = self.workflow.create(&self.backend, &order).await;
        if let Ok(created) = &result {
            self.merge_shipment(&order.id, |shipment| created.apply_to(shipment));
        }
        if !refused_locally(&result) {
            self.reload(&order.id).await;
        }

        match result {
            Ok(created) => {
                let awb = created.awb_code.as_deref().unwrap_or("pending");
                self.operator.notify(Notice::Success(format!(
                    "Shipment created: {} (AWB: {awb})",
                    created.external_order_id
                )));
                Ok(created)
            }
            Err(e) => self.fail(e),
        }
    }

    /// Refresh carrier tracking for the open order.
    ///
    /// Holding `&mut self` keeps console syncs one at a time, so the
    /// workflow's in-flight guard only matters to callers that share a
    /// [`ShipmentWorkflow`].
    ///
    /// # Errors
    ///
    /// Returns `AppError::Shipment` if the action is not allowed or the
    /// backend call fails.
    pub async fn sync_shipment(&mut self) -> Result<SyncOutcome, AppError> {
        let order = self.open_order()?.clone();
        let result = self.workflow.sync(&self.backend, &order).await;
        if let Ok(SyncOutcome::Refreshed(payload)) = &result {
            self.merge_shipment(&order.id, |shipment| {
                shipment.tracking = Some(payload.clone());
            });
        }
        if !refused_locally(&result) {
            self.reload(&order.id).await;
        }

        match result {
            Ok(outcome) => {
                self.operator
                    .notify(Notice::Success("Tracking updated".to_string()));
                Ok(outcome)
            }
            Err(e) => self.fail(e),
        }
    }

    /// Clear the open order's carrier shipment after confirmation.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Cancelled` if the operator declines (no call is
    /// made), or `AppError::Shipment`.
    pub async fn reset_shipment(&mut self) -> Result<(), AppError> {
        let order = self.open_order()?.clone();
        if !self.operator.confirm(RESET_PROMPT) {
            return Err(AppError::Cancelled("shipment not reset".to_string()));
        }

        let result = self.workflow.reset(&self.backend, &order).await;
        if result.is_ok() {
            self.merge_shipment(&order.id, Shipment::clear);
        }
        if !refused_locally(&result) {
            self.reload(&order.id).await;
        }

        match result {
            Ok(()) => {
                self.operator
                    .notify(Notice::Success("Shipment reset".to_string()));
                Ok(())
            }
            Err(e) => self.fail(e),
        }
    }

    /// Apply a backend-confirmed shipment change to the open detail and the
    /// matching row.
    fn merge_shipment(&mut self, id: &OrderId, apply: impl Fn(&mut Shipment)) {
        if let Some(detail) = self.detail.as_mut().filter(|o| &o.id == id) {
            apply(&mut detail.shipment);
        }
        if let Some(row) = self.orders.iter_mut().find(|o| &o.id == id) {
            apply(&mut row.shipment);
        }
    }

    /// Re-fetch the detail for `id` and the list after a shipment action.
    ///
    /// Failures here are reported but do not change the action's outcome.
    async fn reload(&mut self, id: &OrderId) {
        match self.backend.get_order(id).await {
            Ok(order) => self.detail = Some(order),
            Err(e) => {
                tracing::warn!(order_id = %id, error = %e, "Failed to reload order");
                self.operator
                    .notify(Notice::Error(format!("Failed to reload order: {e}")));
            }
        }
        match self.backend.list_orders().await {
            Ok(orders) => self.orders = orders,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to reload order list");
                self.operator
                    .notify(Notice::Error(format!("Failed to reload orders: {e}")));
            }
        }
    }

    // =========================================================================
    // Bulk
    // =========================================================================

    /// Add an order to the bulk selection. Returns `false` if it was
    /// already selected.
    pub fn select(&mut self, id: OrderId) -> bool {
        self.selection.insert(id)
    }

    pub fn deselect(&mut self, id: &OrderId) -> bool {
        self.selection.remove(id)
    }

    /// Create shipments for every selected order in one request.
    ///
    /// The selection is cleared whatever the outcome, and the list is
    /// refreshed afterwards.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Shipment` only if the bulk request itself fails.
    #[instrument(skip(self), fields(selected = self.selection.len()))]
    pub async fn bulk_create_shipments(&mut self) -> Result<BulkSummary, AppError> {
        let ids: Vec<OrderId> = std::mem::take(&mut self.selection).into_iter().collect();
        if ids.is_empty() {
            self.operator
                .notify(Notice::Info("No orders selected".to_string()));
            return Ok(BulkSummary::default());
        }

        let result = self.workflow.bulk_create(&self.backend, &ids).await;
        match self.backend.list_orders().await {
            Ok(orders) => self.orders = orders,
            Err(e) => tracing::warn!(error = %e, "Failed to reload order list"),
        }

        match result {
            Ok(summary) => {
                let notice = if summary.failed == 0 {
                    Notice::Success(summary.to_string())
                } else {
                    Notice::Info(summary.to_string())
                };
                self.operator.notify(notice);
                Ok(summary)
            }
            Err(e) => self.fail(e),
        }
    }
}

/// A transition refused by the state machine never reached the backend,
/// so there is nothing to reload.
const fn refused_locally<T>(result: &Result<T, ShipmentError>) -> bool {
    matches!(result, Err(ShipmentError::InvalidTransition { .. }))
}

fn validate_shipping(shipping: &ShippingInfo) -> Result<(), ValidationError> {
    let blank = |value: &Option<String>| value.as_deref().is_none_or(|v| v.trim().is_empty());
    let missing: Vec<&str> = [
        ("name", &shipping.name),
        ("phone", &shipping.phone),
        ("address", &shipping.address),
    ]
    .into_iter()
    .filter(|(_, value)| blank(value))
    .map(|(field, _)| field)
    .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::new(format!(
            "Shipping {} required",
            match missing.as_slice() {
                [one] => format!("{one} is"),
                many => format!("{} are", many.join(", ")),
            }
        )))
    }
}
