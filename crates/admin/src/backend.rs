//! The order operations the console needs from the backend.
//!
//! [`crate::api::AdminApiClient`] is the real implementation; tests swap in
//! an in-memory one.

use std::future::Future;

use cuztory_core::{OrderId, OrderStatus};

use crate::api::ApiError;
use crate::models::{Order, ShippingInfo};
use crate::shipment::{BulkResult, CreatedShipment};

/// Order and shipment endpoints, one method per backend call.
pub trait OrderBackend: Send + Sync {
    /// `GET /orders/admin/all`
    fn list_orders(&self) -> impl Future<Output = Result<Vec<Order>, ApiError>> + Send;

    /// `GET /orders/admin/order/:id`
    fn get_order(&self, id: &OrderId) -> impl Future<Output = Result<Order, ApiError>> + Send;

    /// `PUT /orders/admin/update/:id`
    fn update_status(
        &self,
        id: &OrderId,
        status: &OrderStatus,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// `PUT /orders/admin/edit/:id`, returning the updated order.
    fn edit_shipping(
        &self,
        id: &OrderId,
        shipping: &ShippingInfo,
    ) -> impl Future<Output = Result<Order, ApiError>> + Send;

    /// `DELETE /orders/admin/delete/:id`
    fn delete_order(&self, id: &OrderId) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// `POST /orders/admin/shiprocket/:id`
    fn create_shipment(
        &self,
        id: &OrderId,
    ) -> impl Future<Output = Result<CreatedShipment, ApiError>> + Send;

    /// `POST /orders/admin/shiprocket/bulk`
    fn bulk_create_shipments(
        &self,
        ids: &[OrderId],
    ) -> impl Future<Output = Result<Vec<BulkResult>, ApiError>> + Send;

    /// `POST /orders/admin/sync-shiprocket/:id`, returning the tracking payload.
    fn sync_shipment(
        &self,
        id: &OrderId,
    ) -> impl Future<Output = Result<serde_json::Value, ApiError>> + Send;

    /// `PUT /orders/admin/shiprocket/reset/:id`
    fn reset_shipment(&self, id: &OrderId) -> impl Future<Output = Result<(), ApiError>> + Send;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod mock {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use serde_json::json;

    use super::*;

    /// In-memory backend that records every call.
    #[derive(Default)]
    pub struct MockBackend {
        orders: Mutex<Vec<Order>>,
        calls: Mutex<Vec<&'static str>>,
        failures: Mutex<HashMap<&'static str, String>>,
        bulk_results: Mutex<Vec<BulkResult>>,
    }

    impl MockBackend {
        pub fn with_orders(orders: Vec<Order>) -> Self {
            Self {
                orders: Mutex::new(orders),
                ..Self::default()
            }
        }

        /// Make `operation` fail with a backend refusal carrying `message`.
        pub fn fail_on(&self, operation: &'static str, message: &str) {
            self.failures
                .lock()
                .unwrap()
                .insert(operation, message.to_string());
        }

        pub fn set_bulk_results(&self, results: Vec<BulkResult>) {
            *self.bulk_results.lock().unwrap() = results;
        }

        pub fn calls(&self, operation: &str) -> usize {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|c| **c == operation)
                .count()
        }

        pub fn stored(&self, id: &OrderId) -> Option<Order> {
            self.orders
                .lock()
                .unwrap()
                .iter()
                .find(|o| &o.id == id)
                .cloned()
        }

        fn enter(&self, operation: &'static str) -> Result<(), ApiError> {
            self.calls.lock().unwrap().push(operation);
            match self.failures.lock().unwrap().get(operation) {
                Some(message) => Err(ApiError::Backend {
                    status: 400,
                    message: message.clone(),
                }),
                None => Ok(()),
            }
        }

        fn with_order<T>(
            &self,
            id: &OrderId,
            f: impl FnOnce(&mut Order) -> T,
        ) -> Result<T, ApiError> {
            let mut orders = self.orders.lock().unwrap();
            orders
                .iter_mut()
                .find(|o| &o.id == id)
                .map(f)
                .ok_or_else(|| ApiError::NotFound("Order not found".to_string()))
        }
    }

    impl OrderBackend for MockBackend {
        async fn list_orders(&self) -> Result<Vec<Order>, ApiError> {
            self.enter("list_orders")?;
            Ok(self.orders.lock().unwrap().clone())
        }

        async fn get_order(&self, id: &OrderId) -> Result<Order, ApiError> {
            self.enter("get_order")?;
            self.with_order(id, |o| o.clone())
        }

        async fn update_status(&self, id: &OrderId, status: &OrderStatus) -> Result<(), ApiError> {
            self.enter("update_status")?;
            self.with_order(id, |o| o.status = status.clone())
        }

        async fn edit_shipping(
            &self,
            id: &OrderId,
            shipping: &ShippingInfo,
        ) -> Result<Order, ApiError> {
            self.enter("edit_shipping")?;
            self.with_order(id, |o| {
                o.shipping = shipping.clone();
                o.clone()
            })
        }

        async fn delete_order(&self, id: &OrderId) -> Result<(), ApiError> {
            self.enter("delete_order")?;
            self.orders.lock().unwrap().retain(|o| &o.id != id);
            Ok(())
        }

        async fn create_shipment(&self, id: &OrderId) -> Result<CreatedShipment, ApiError> {
            self.enter("create_shipment")?;
            self.with_order(id, |o| {
                let created = CreatedShipment {
                    external_order_id: format!("SR-{id}"),
                    awb_code: Some(format!("AWB{id}")),
                    shipment_id: Some("77".to_string()),
                };
                o.shipment.external_order_id = Some(created.external_order_id.clone());
                o.shipment.awb_code.clone_from(&created.awb_code);
                o.shipment.shipment_id.clone_from(&created.shipment_id);
                created
            })
        }

        async fn bulk_create_shipments(&self, _ids: &[OrderId]) -> Result<Vec<BulkResult>, ApiError> {
            self.enter("bulk_create_shipments")?;
            Ok(self.bulk_results.lock().unwrap().clone())
        }

        async fn sync_shipment(&self, id: &OrderId) -> Result<serde_json::Value, ApiError> {
            self.enter("sync_shipment")?;
            tokio::task::yield_now().await;
            let payload = json!({"current_status": "IN TRANSIT", "activities": ["Picked up"]});
            self.with_order(id, |o| o.shipment.tracking = Some(payload.clone()))?;
            Ok(payload)
        }

        async fn reset_shipment(&self, id: &OrderId) -> Result<(), ApiError> {
            self.enter("reset_shipment")?;
            self.with_order(id, |o| o.shipment.clear())
        }
    }
}
