//! Order and shipment endpoints.

use reqwest::Method;
use tracing::instrument;

use cuztory_core::{OrderId, OrderStatus};

use super::wire::{
    BulkShipmentRequest, BulkShipmentResponse, CreateShipmentResponse, OrderEnvelope, RawOrder,
    ShippingEdit, ShippingInfoBody, StatusUpdate,
};
use super::{AdminApiClient, ApiError};
use crate::backend::OrderBackend;
use crate::models::{Order, ShippingInfo};
use crate::shipment::{BulkResult, CreatedShipment};

fn order_path(prefix: &str, id: &OrderId) -> String {
    format!("{prefix}/{}", urlencoding::encode(id.as_str()))
}

impl OrderBackend for AdminApiClient {
    #[instrument(skip(self))]
    async fn list_orders(&self) -> Result<Vec<Order>, ApiError> {
        let raw: Vec<RawOrder> = self.get_json("/orders/admin/all").await?;
        tracing::debug!(count = raw.len(), "Fetched orders");
        Ok(raw.into_iter().map(Order::from).collect())
    }

    #[instrument(skip(self), fields(order_id = %id))]
    async fn get_order(&self, id: &OrderId) -> Result<Order, ApiError> {
        let envelope: OrderEnvelope = self.get_json(&order_path("/orders/admin/order", id)).await?;
        Ok(envelope.into_inner().into())
    }

    #[instrument(skip(self), fields(order_id = %id, status = %status))]
    async fn update_status(&self, id: &OrderId, status: &OrderStatus) -> Result<(), ApiError> {
        let request = self
            .request(Method::PUT, &order_path("/orders/admin/update", id))
            .json(&StatusUpdate {
                status: status.label(),
            });
        self.send_empty(request).await?;
        tracing::debug!(order_id = %id, status = %status, "Order status updated");
        Ok(())
    }

    #[instrument(skip(self, shipping), fields(order_id = %id))]
    async fn edit_shipping(&self, id: &OrderId, shipping: &ShippingInfo) -> Result<Order, ApiError> {
        let body = ShippingEdit {
            shipping_info: ShippingInfoBody {
                name: shipping.name.as_deref(),
                phone: shipping.phone.as_deref(),
                email: shipping.email.as_deref(),
                address: shipping.address.as_deref(),
                city: shipping.city.as_deref(),
                state: shipping.state.as_deref(),
                country: shipping.country.as_deref(),
                postal_code: shipping.postal_code.as_deref(),
            },
        };
        let request = self
            .request(Method::PUT, &order_path("/orders/admin/edit", id))
            .json(&body);
        let envelope: OrderEnvelope = self.send_json(request).await?;
        tracing::debug!(order_id = %id, "Shipping info updated");
        Ok(envelope.into_inner().into())
    }

    #[instrument(skip(self), fields(order_id = %id))]
    async fn delete_order(&self, id: &OrderId) -> Result<(), ApiError> {
        let request = self.request(Method::DELETE, &order_path("/orders/admin/delete", id));
        self.send_empty(request).await?;
        tracing::debug!(order_id = %id, "Order deleted");
        Ok(())
    }

    #[instrument(skip(self), fields(order_id = %id))]
    async fn create_shipment(&self, id: &OrderId) -> Result<CreatedShipment, ApiError> {
        let request = self.request(Method::POST, &order_path("/orders/admin/shiprocket", id));
        let response: CreateShipmentResponse = self.send_json(request).await?;
        let created = CreatedShipment::from(response.ship_data);
        tracing::debug!(
            order_id = %id,
            shiprocket_order_id = %created.external_order_id,
            awb = created.awb_code.as_deref().unwrap_or("pending"),
            "Shipment created"
        );
        Ok(created)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn bulk_create_shipments(&self, ids: &[OrderId]) -> Result<Vec<BulkResult>, ApiError> {
        let body = BulkShipmentRequest {
            order_ids: ids.iter().map(OrderId::as_str).collect(),
        };
        let request = self
            .request(Method::POST, "/orders/admin/shiprocket/bulk")
            .json(&body);
        let response: BulkShipmentResponse = self.send_json(request).await?;
        Ok(response.results.into_iter().map(BulkResult::from).collect())
    }

    #[instrument(skip(self), fields(order_id = %id))]
    async fn sync_shipment(&self, id: &OrderId) -> Result<serde_json::Value, ApiError> {
        let request = self.request(Method::POST, &order_path("/orders/admin/sync-shiprocket", id));
        let payload: serde_json::Value = self.send_json(request).await?;
        tracing::debug!(order_id = %id, "Shipment tracking synced");
        Ok(payload)
    }

    #[instrument(skip(self), fields(order_id = %id))]
    async fn reset_shipment(&self, id: &OrderId) -> Result<(), ApiError> {
        let request = self.request(Method::PUT, &order_path("/orders/admin/shiprocket/reset", id));
        self.send_empty(request).await?;
        tracing::debug!(order_id = %id, "Shipment reset");
        Ok(())
    }
}
