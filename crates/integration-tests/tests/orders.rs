//! Order list and detail flows against the fake backend.

#![allow(clippy::unwrap_used)]

use axum::http::Method;
use serde_json::json;

use cuztory_admin::console::DELETE_PROMPT;
use cuztory_admin::models::ShippingInfo;
use cuztory_admin::{ApiError, AppError, ConsoleSettings, Notice, OrderBackend, OrderConsole};
use cuztory_core::{OrderId, OrderStatus};
use cuztory_integration_tests::{FakeBackend, FakeState, ScriptedOperator, raw_order};

async fn backend() -> FakeBackend {
    FakeBackend::start(FakeState {
        orders: vec![raw_order("665f1c2ab1d4"), raw_order("665f1c2ab1d5")],
        ..FakeState::default()
    })
    .await
}

fn console(
    fake: &FakeBackend,
    operator: ScriptedOperator,
) -> OrderConsole<cuztory_admin::AdminApiClient, ScriptedOperator> {
    OrderConsole::new(fake.client(), operator, ConsoleSettings::default())
}

fn id() -> OrderId {
    OrderId::new("665f1c2ab1d4")
}

#[tokio::test]
async fn test_list_projects_rows() {
    let fake = backend().await;
    let mut console = console(&fake, ScriptedOperator::accepting());

    assert_eq!(console.refresh().await.unwrap(), 2);

    let rows = console.rows();
    let row = &rows[0];
    assert_eq!(row.id, id());
    assert_eq!(row.customer_name, "Asha Rao");
    assert_eq!(row.customer_email, "asha@example.com");
    assert_eq!(row.postal_code, "560001");
    assert_eq!(row.total, "₹450.00");
    assert_eq!(row.status, OrderStatus::Processing);
    assert_eq!(row.shipment, "NoShipment");
    assert_eq!(fake.count(&Method::GET, "/orders/admin/all"), 1);
}

#[tokio::test]
async fn test_detail_is_fetched_separately_and_normalized() {
    let fake = backend().await;
    let mut console = console(&fake, ScriptedOperator::accepting());

    let order = console.open(&id()).await.unwrap();

    assert_eq!(order.shipping.postal_code.as_deref(), Some("560001"));
    let mug = &order.items[0];
    assert_eq!(
        cuztory_admin::line_items::customization_text(mug),
        "Name: Asha"
    );
    assert_eq!(
        cuztory_admin::line_items::specifications_text(mug),
        "Color: Red"
    );
    assert_eq!(fake.count(&Method::GET, "/orders/admin/order/665f1c2ab1d4"), 1);
}

#[tokio::test]
async fn test_status_update_sends_label() {
    let fake = backend().await;
    let mut console = console(&fake, ScriptedOperator::accepting());
    console.refresh().await.unwrap();

    console
        .update_status(&id(), OrderStatus::OutForDelivery)
        .await
        .unwrap();

    let request = fake
        .last(&Method::PUT, "/orders/admin/update/665f1c2ab1d4")
        .unwrap();
    assert_eq!(request.json(), json!({"status": "Out for Delivery"}));
    assert_eq!(console.rows()[0].status, OrderStatus::OutForDelivery);
}

#[tokio::test]
async fn test_refused_status_update_reverts_row() {
    let fake = backend().await;
    fake.refuse(
        Method::PUT,
        "/orders/admin/update/665f1c2ab1d4",
        400,
        json!({"message": "Cancelled orders cannot change status"}),
    );
    let mut console = console(&fake, ScriptedOperator::accepting());
    console.refresh().await.unwrap();

    let err = console
        .update_status(&id(), OrderStatus::Delivered)
        .await
        .unwrap_err();

    assert_eq!(err.operator_message(), "Cancelled orders cannot change status");
    assert_eq!(console.rows()[0].status, OrderStatus::Processing);
}

#[tokio::test]
async fn test_delete_refusal_is_shown_verbatim() {
    let fake = backend().await;
    fake.refuse(
        Method::DELETE,
        "/orders/admin/delete/665f1c2ab1d4",
        400,
        json!({"message": "Only cancelled orders can be deleted"}),
    );
    let operator = ScriptedOperator::accepting();
    let mut console = console(&fake, operator);
    console.refresh().await.unwrap();

    let err = console.delete(&id()).await.unwrap_err();

    assert!(matches!(
        &err,
        AppError::Api(ApiError::Backend { status: 400, .. })
    ));
    assert_eq!(
        console.operator().last_notice(),
        Some(Notice::Error("Only cancelled orders can be deleted".to_string()))
    );
    assert_eq!(console.orders().len(), 2);
}

#[tokio::test]
async fn test_declined_delete_sends_nothing() {
    let fake = backend().await;
    let mut console = console(&fake, ScriptedOperator::declining());

    let err = console.delete(&id()).await.unwrap_err();

    assert!(matches!(err, AppError::Cancelled(_)));
    assert_eq!(console.operator().prompts(), vec![DELETE_PROMPT.to_string()]);
    assert_eq!(fake.count(&Method::DELETE, "/orders/admin/delete/665f1c2ab1d4"), 0);
}

#[tokio::test]
async fn test_delete_removes_order() {
    let fake = backend().await;
    let mut console = console(&fake, ScriptedOperator::accepting());
    console.refresh().await.unwrap();

    console.delete(&id()).await.unwrap();

    assert_eq!(console.orders().len(), 1);
    assert_eq!(fake.with_state(|s| s.orders.len()), 1);
}

#[tokio::test]
async fn test_edit_shipping_validates_before_sending() {
    let fake = backend().await;
    let mut console = console(&fake, ScriptedOperator::accepting());
    console.open(&id()).await.unwrap();

    let err = console
        .edit_shipping(ShippingInfo {
            name: Some("Asha Rao".to_string()),
            phone: Some("   ".to_string()),
            address: Some("12, MG Road".to_string()),
            ..ShippingInfo::default()
        })
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(fake.count(&Method::PUT, "/orders/admin/edit/665f1c2ab1d4"), 0);
}

#[tokio::test]
async fn test_edit_shipping_sends_postal_code_and_uses_response() {
    let fake = backend().await;
    let mut console = console(&fake, ScriptedOperator::accepting());
    console.refresh().await.unwrap();
    let mut shipping = console.open(&id()).await.unwrap().shipping.clone();
    shipping.city = Some("Mysuru".to_string());
    shipping.postal_code = Some("570001".to_string());

    console.edit_shipping(shipping).await.unwrap();

    let body = fake
        .last(&Method::PUT, "/orders/admin/edit/665f1c2ab1d4")
        .unwrap()
        .json();
    assert_eq!(body["shippingInfo"]["postalCode"], "570001");
    assert_eq!(body["shippingInfo"]["city"], "Mysuru");
    assert_eq!(
        console.detail().unwrap().shipping.city.as_deref(),
        Some("Mysuru")
    );
    assert_eq!(console.rows()[0].postal_code, "570001");
}

#[tokio::test]
async fn test_wrong_token_is_unauthorized() {
    let fake = backend().await;
    let client = fake.client_with_token("expired-token");

    let err = client.list_orders().await.unwrap_err();

    assert!(matches!(err, ApiError::Unauthorized(m) if m == "Not authorized, token failed"));
}

#[tokio::test]
async fn test_missing_order_is_not_found() {
    let fake = backend().await;
    let err = fake
        .client()
        .get_order(&OrderId::new("nope"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(m) if m == "Order not found"));
}
