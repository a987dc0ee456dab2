//! Integration tests for the Cuztory admin console.
//!
//! The tests drive the real [`AdminApiClient`] over HTTP against
//! [`FakeBackend`], an in-process `axum` server on an ephemeral port that
//! speaks the backend's REST contract and records every request it sees.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p cuztory-integration-tests
//! ```
//!
//! No database, network access or credentials are needed.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use axum::Json;
use secrecy::SecretString;
use serde_json::{Value, json};
use tokio::task::JoinHandle;
use url::Url;

use cuztory_admin::session::Session;
use cuztory_admin::{AdminApiClient, Notice, Operator};

/// The only bearer token the fake backend accepts.
pub const TEST_TOKEN: &str = "cz-integration-7Hq2mVx9LpR4";

/// One request as seen by the fake backend.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    /// Path below `/api`, including any query string.
    pub path: String,
    pub body: Bytes,
}

impl Recorded {
    /// The body parsed as JSON, `Null` if it is not JSON.
    #[must_use]
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or(Value::Null)
    }

    #[must_use]
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Backend documents served by the fake.
#[derive(Debug, Default)]
pub struct FakeState {
    pub orders: Vec<Value>,
    pub collections: Vec<Value>,
    /// `None` is served as `null`.
    pub banners: Option<Vec<Value>>,
    pub products: Vec<Value>,
    pub shipping_rates: Vec<Value>,
    pub payment_config: Value,
    pub analytics: Value,
    pub bulk_results: Vec<Value>,
    pub refusals: HashMap<(Method, String), (StatusCode, Value)>,
    pub requests: Vec<Recorded>,
    pub next_id: u32,
}

impl FakeState {
    fn new_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }
}

type Shared = Arc<Mutex<FakeState>>;

/// In-process fake of the Cuztory REST backend.
pub struct FakeBackend {
    addr: SocketAddr,
    state: Shared,
    server: JoinHandle<()>,
}

impl Drop for FakeBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

impl FakeBackend {
    /// Serve `state` on `127.0.0.1:<ephemeral>`.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn start(state: FakeState) -> Self {
        let state: Shared = Arc::new(Mutex::new(state));
        let app = Router::new().fallback(handle).with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .unwrap_or_else(|e| panic!("failed to bind fake backend: {e}"));
        let addr = listener
            .local_addr()
            .unwrap_or_else(|e| panic!("fake backend has no address: {e}"));
        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            addr,
            state,
            server,
        }
    }

    /// Base URL the client should use, ending in `/api`.
    ///
    /// # Panics
    ///
    /// Never in practice; the address always forms a valid URL.
    #[must_use]
    pub fn api_url(&self) -> Url {
        Url::parse(&format!("http://{}/api", self.addr))
            .unwrap_or_else(|e| panic!("invalid fake backend URL: {e}"))
    }

    /// A client authenticated with [`TEST_TOKEN`].
    #[must_use]
    pub fn client(&self) -> AdminApiClient {
        self.client_with_token(TEST_TOKEN)
    }

    /// # Panics
    ///
    /// Panics if the client cannot be built.
    #[must_use]
    pub fn client_with_token(&self, token: &str) -> AdminApiClient {
        let session = Session::new(SecretString::from(token.to_string()));
        AdminApiClient::new(&self.api_url(), session)
            .unwrap_or_else(|e| panic!("failed to build client: {e}"))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Answer `method path` with `status` and `body` instead of handling it.
    pub fn refuse(&self, method: Method, path: &str, status: u16, body: Value) {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_REQUEST);
        self.lock()
            .refusals
            .insert((method, path.to_string()), (status, body));
    }

    /// Every request received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<Recorded> {
        self.lock().requests.clone()
    }

    /// How many requests matched `method` and `path` (query ignored).
    #[must_use]
    pub fn count(&self, method: &Method, path: &str) -> usize {
        self.lock()
            .requests
            .iter()
            .filter(|r| &r.method == method && strip_query(&r.path) == path)
            .count()
    }

    /// The last request to `method path`.
    #[must_use]
    pub fn last(&self, method: &Method, path: &str) -> Option<Recorded> {
        self.lock()
            .requests
            .iter()
            .rev()
            .find(|r| &r.method == method && strip_query(&r.path) == path)
            .cloned()
    }

    /// Inspect or change the served documents.
    pub fn with_state<T>(&self, f: impl FnOnce(&mut FakeState) -> T) -> T {
        f(&mut self.lock())
    }
}

fn strip_query(path: &str) -> &str {
    path.split_once('?').map_or(path, |(p, _)| p)
}

async fn handle(
    State(state): State<Shared>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().strip_prefix("/api").unwrap_or(uri.path()).to_string();
    let recorded_path = uri
        .query()
        .map_or_else(|| path.clone(), |q| format!("{path}?{q}"));

    let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
    state.requests.push(Recorded {
        method: method.clone(),
        path: recorded_path,
        body: body.clone(),
    });

    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {TEST_TOKEN}"));
    if !authorized {
        return reply(
            StatusCode::UNAUTHORIZED,
            json!({"message": "Not authorized, token failed"}),
        );
    }

    if let Some((status, body)) = state.refusals.get(&(method.clone(), path.clone())) {
        return reply(*status, body.clone());
    }

    let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
    route(&mut state, &method, &segments, &body)
}

fn reply(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

fn ok(body: Value) -> Response {
    reply(StatusCode::OK, body)
}

fn message(text: &str) -> Response {
    ok(json!({ "message": text }))
}

fn not_found(what: &str) -> Response {
    reply(
        StatusCode::NOT_FOUND,
        json!({ "message": format!("{what} not found") }),
    )
}

fn find<'a>(docs: &'a mut [Value], id: &str) -> Option<&'a mut Value> {
    docs.iter_mut().find(|d| d["_id"] == id)
}

#[allow(clippy::too_many_lines)]
fn route(state: &mut FakeState, method: &Method, segments: &[&str], body: &[u8]) -> Response {
    let json_body: Value = serde_json::from_slice(body).unwrap_or(Value::Null);

    match (method.as_str(), segments) {
        // Orders
        ("GET", ["orders", "admin", "all"]) => ok(Value::Array(state.orders.clone())),
        ("GET", ["orders", "admin", "order", id]) => match find(&mut state.orders, id) {
            Some(order) => ok(json!({ "order": order })),
            None => not_found("Order"),
        },
        ("PUT", ["orders", "admin", "update", id]) => match find(&mut state.orders, id) {
            Some(order) => {
                order["orderStatus"] = json_body["status"].clone();
                message("Order status updated")
            }
            None => not_found("Order"),
        },
        ("PUT", ["orders", "admin", "edit", id]) => match find(&mut state.orders, id) {
            Some(order) => {
                order["shippingInfo"] = json_body["shippingInfo"].clone();
                ok(json!({ "message": "Order updated", "order": order }))
            }
            None => not_found("Order"),
        },
        ("DELETE", ["orders", "admin", "delete", id]) => {
            let before = state.orders.len();
            state.orders.retain(|o| o["_id"] != *id);
            if state.orders.len() == before {
                not_found("Order")
            } else {
                message("Order deleted")
            }
        }
        ("POST", ["orders", "admin", "shiprocket", "bulk"]) => {
            ok(json!({ "results": state.bulk_results }))
        }
        ("POST", ["orders", "admin", "shiprocket", id]) => match find(&mut state.orders, id) {
            Some(order) => {
                let ship_data = json!({
                    "order_id": 5_550_001,
                    "shipment_id": 8_810_042,
                    "awb_code": format!("AWB{id}"),
                });
                order["shiprocketOrderId"] = ship_data["order_id"].clone();
                order["shipmentId"] = ship_data["shipment_id"].clone();
                order["awbCode"] = ship_data["awb_code"].clone();
                ok(json!({ "message": "Shipment created", "shipData": ship_data }))
            }
            None => not_found("Order"),
        },
        ("POST", ["orders", "admin", "sync-shiprocket", id]) => {
            match find(&mut state.orders, id) {
                Some(order) => {
                    let tracking = json!({
                        "current_status": "IN TRANSIT",
                        "shipment_track_activities": [{"activity": "Picked up"}],
                    });
                    order["trackingData"] = tracking.clone();
                    ok(json!({ "tracking_data": tracking }))
                }
                None => not_found("Order"),
            }
        }
        ("PUT", ["orders", "admin", "shiprocket", "reset", id]) => {
            match find(&mut state.orders, id).and_then(Value::as_object_mut) {
                Some(order) => {
                    for key in ["shiprocketOrderId", "shipmentId", "awbCode", "trackingData"] {
                        order.remove(key);
                    }
                    message("Shiprocket data reset")
                }
                None => not_found("Order"),
            }
        }

        // Collections
        ("GET", ["collections"]) => ok(Value::Array(
            state
                .collections
                .iter()
                .map(|c| {
                    let mut summary = c.clone();
                    if let Some(fields) = summary.as_object_mut() {
                        fields.remove("products");
                    }
                    summary
                })
                .collect(),
        )),
        ("GET", ["collections", id]) => match find(&mut state.collections, id) {
            Some(collection) => ok(collection.clone()),
            None => not_found("Collection"),
        },
        ("POST", ["collections", "admin", "create"]) => {
            let id = state.new_id("col");
            state.collections.push(json!({
                "_id": id,
                "name": multipart_text(body, "name").unwrap_or_default(),
                "description": multipart_text(body, "description"),
                "products": [],
            }));
            message("Collection created")
        }
        ("PUT", ["collections", "admin", "edit", id]) => match find(&mut state.collections, id) {
            Some(collection) => {
                collection["name"] = json!(multipart_text(body, "name"));
                collection["description"] = json!(multipart_text(body, "description"));
                message("Collection updated")
            }
            None => not_found("Collection"),
        },
        ("DELETE", ["collections", "admin", "delete", id]) => {
            state.collections.retain(|c| c["_id"] != *id);
            message("Collection deleted")
        }

        // Banners
        ("GET", ["banners"]) => ok(json!(state.banners)),
        ("POST", ["banners", "admin", "create"]) => {
            let id = state.new_id("ban");
            state.banners.get_or_insert_with(Vec::new).push(json!({
                "_id": id,
                "title": multipart_text(body, "title").unwrap_or_default(),
                "link": multipart_text(body, "link"),
                "isActive": multipart_text(body, "isActive").as_deref() == Some("true"),
            }));
            message("Banner created")
        }
        ("PUT", ["banners", "admin", "edit", _]) => message("Banner updated"),
        ("DELETE", ["banners", "admin", "delete", id]) => {
            if let Some(banners) = &mut state.banners {
                banners.retain(|b| b["_id"] != *id);
            }
            message("Banner deleted")
        }

        // Products
        ("GET", ["products"]) => ok(Value::Array(state.products.clone())),
        ("POST", ["products", "add"]) => {
            let id = state.new_id("prod");
            state.products.push(json!({
                "_id": id,
                "title": multipart_text(body, "title").unwrap_or_default(),
                "price": multipart_text(body, "price").unwrap_or_default(),
            }));
            message("Product created")
        }
        ("PUT", ["products", "admin", "edit", _]) => message("Product updated"),
        ("DELETE", ["products", "admin", "delete", id]) => {
            state.products.retain(|p| p["_id"] != *id);
            message("Product deleted")
        }

        // Settings
        ("GET", ["shipping-rates"]) => ok(Value::Array(state.shipping_rates.clone())),
        ("POST", ["shipping-rates", "add"]) => {
            let mut rate = json_body;
            rate["_id"] = json!(state.new_id("rate"));
            state.shipping_rates.push(rate);
            message("Shipping rate added")
        }
        ("DELETE", ["shipping-rates", id]) => {
            state.shipping_rates.retain(|r| r["_id"] != *id);
            message("Shipping rate deleted")
        }
        ("GET", ["payment-config", "get"]) => ok(state.payment_config.clone()),
        ("POST", ["payment-config", "set"]) => {
            state.payment_config = json_body;
            message("Payment configuration saved")
        }
        ("GET", ["admin", "analytics"]) => ok(state.analytics.clone()),

        _ => not_found("Route"),
    }
}

/// Value of a text field in a `multipart/form-data` body.
fn multipart_text(body: &[u8], field: &str) -> Option<String> {
    let text = String::from_utf8_lossy(body);
    let marker = format!("name=\"{field}\"\r\n\r\n");
    let start = text.find(&marker)? + marker.len();
    let rest = text.get(start..)?;
    let end = rest.find("\r\n")?;
    rest.get(..end).map(str::to_string)
}

// =============================================================================
// Fixtures
// =============================================================================

/// A raw order document the way the backend stores it.
///
/// The postal code is only present as a numeric `pincode` and the
/// customization is a plain object, as older orders have them.
#[must_use]
pub fn raw_order(id: &str) -> Value {
    json!({
        "_id": id,
        "createdAt": "2024-06-04T09:30:00.000Z",
        "user": {
            "_id": "u-1",
            "name": "Asha Rao",
            "email": "asha@example.com",
            "phone": "98765 43210"
        },
        "shippingInfo": {
            "name": "Asha Rao",
            "phone": "98765 43210",
            "address": "12, MG Road",
            "city": "Bengaluru",
            "state": "Karnataka",
            "country": "India",
            "pincode": 560_001
        },
        "orderItems": [
            {
                "name": "Photo Mug",
                "price": 200,
                "quantity": 1,
                "specifications": [{"key": "Color", "value": "Red"}],
                "customization": {"Name": "Asha", "Note": ""}
            },
            {
                "name": "Keychain",
                "price": 100,
                "quantity": 2
            }
        ],
        "itemsPrice": 400,
        "shippingPrice": 50,
        "discount": 0,
        "totalPrice": 450,
        "amountPaid": 450,
        "amountDue": 0,
        "orderStatus": "Processing"
    })
}

/// Operator with a fixed answer that keeps every notice.
#[derive(Debug, Default)]
pub struct ScriptedOperator {
    answer: bool,
    prompts: Mutex<Vec<String>>,
    notices: Mutex<Vec<Notice>>,
}

impl ScriptedOperator {
    #[must_use]
    pub fn accepting() -> Self {
        Self {
            answer: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn declining() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn notices(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn last_notice(&self) -> Option<Notice> {
        self.notices().pop()
    }
}

impl Operator for ScriptedOperator {
    fn confirm(&self, prompt: &str) -> bool {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(prompt.to_string());
        self.answer
    }

    fn notify(&self, notice: Notice) {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notice);
    }
}
