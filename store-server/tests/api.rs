//! HTTP API integration tests
//!
//! Drive the full router with `tower::ServiceExt::oneshot` over an
//! in-memory database.

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use store_server::{Config, ServerState, build_router};

fn test_state() -> ServerState {
    ServerState::in_memory(Config::with_overrides("/tmp/store-test", 0)).unwrap()
}

fn app(state: &ServerState) -> Router {
    build_router(state.clone())
}

fn seed_product(state: &ServerState, title: &str, stock: u32, price: i64) -> String {
    state
        .engine
        .ledger()
        .insert(shared::models::ProductCreate {
            title: title.into(),
            price: rust_decimal::Decimal::from(price),
            discount_price: None,
            stock: Some(stock),
            image: None,
        })
        .unwrap()
        .id
}

fn order_body(product_id: &str, quantity: u32) -> Value {
    json!({
        "items": [{"product_id": product_id, "quantity": quantity}],
        "shipping_address": {
            "full_name": "Ana Buyer",
            "phone": "555-0100",
            "address_line1": "1 Main St",
            "city": "Town",
            "region": "Region",
            "postal_code": "0000"
        },
        "payment_method": "COD"
    })
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-user-id", "u1")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_create_order_happy_path() {
    let state = test_state();
    let pid = seed_product(&state, "Widget", 10, 100);

    let (status, body) = send(app(&state), post_json("/api/orders", &order_body(&pid, 2))).await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(body["order_no"].as_str().unwrap().starts_with("SO-"));
    assert_eq!(body["status"], "PENDING");
    assert_eq!(body["payment_status"], "PENDING");
    assert_eq!(body["subtotal"], "200");
    assert_eq!(body["shipping_fee"], "150");
    assert_eq!(body["tax"], "10.00");
    assert_eq!(body["total"], "360.00");

    // Stock actually moved
    let product = state.engine.ledger().get(&pid).unwrap().unwrap();
    assert_eq!(product.stock, 8);
}

#[tokio::test]
async fn test_create_order_insufficient_stock() {
    let state = test_state();
    let pid = seed_product(&state, "Widget", 1, 100);

    let (status, body) = send(app(&state), post_json("/api/orders", &order_body(&pid, 5))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 6002);

    // Nothing was reserved
    let product = state.engine.ledger().get(&pid).unwrap().unwrap();
    assert_eq!(product.stock, 1);
}

#[tokio::test]
async fn test_anonymous_checkout_requires_guest_info() {
    let state = test_state();
    let pid = seed_product(&state, "Widget", 10, 100);

    let request = Request::builder()
        .method("POST")
        .uri("/api/orders")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(order_body(&pid, 1).to_string()))
        .unwrap();
    let (status, _body) = send(app(&state), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // With guest contact info the same request succeeds
    let mut body = order_body(&pid, 1);
    body["guest"] = json!({
        "full_name": "Gia Guest",
        "email": "gia@example.com",
        "phone": "555-0101"
    });
    let request = Request::builder()
        .method("POST")
        .uri("/api/orders")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let (status, body) = send(app(&state), request).await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["user_id"].is_null());
}

#[tokio::test]
async fn test_authenticated_checkout_rejects_guest_info() {
    let state = test_state();
    let pid = seed_product(&state, "Widget", 10, 100);

    // An order carries exactly one buyer: a signed-in checkout with a
    // guest block on top is a conflict, not a fallback
    let mut body = order_body(&pid, 1);
    body["guest"] = json!({
        "full_name": "Gia Guest",
        "email": "gia@example.com",
        "phone": "555-0101"
    });
    let (status, body) = send(app(&state), post_json("/api/orders", &body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 4004);

    // Nothing was reserved
    let product = state.engine.ledger().get(&pid).unwrap().unwrap();
    assert_eq!(product.stock, 10);
}

#[tokio::test]
async fn test_customer_cannot_advance_order_status() {
    let state = test_state();
    let pid = seed_product(&state, "Widget", 10, 100);
    let (_, created) = send(app(&state), post_json("/api/orders", &order_body(&pid, 1))).await;
    let order_no = created["order_no"].as_str().unwrap();

    let request = Request::builder()
        .method("PUT")
        .uri(format!("/api/orders/{}/status", order_no))
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-user-id", "u1")
        .body(Body::from(json!({"status": "PROCESSING"}).to_string()))
        .unwrap();
    let (status, body) = send(app(&state), request).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], 2002);
}

#[tokio::test]
async fn test_admin_advances_and_owner_cancels() {
    let state = test_state();
    let pid = seed_product(&state, "Widget", 10, 100);
    let (_, created) = send(app(&state), post_json("/api/orders", &order_body(&pid, 3))).await;
    let order_no = created["order_no"].as_str().unwrap().to_string();

    // Admin moves the order forward
    let request = Request::builder()
        .method("PUT")
        .uri(format!("/api/orders/{}/status", order_no))
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-role", "admin")
        .body(Body::from(json!({"status": "PROCESSING"}).to_string()))
        .unwrap();
    let (status, body) = send(app(&state), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "PROCESSING");

    // Owner cancels from Processing; stock comes back
    let request = Request::builder()
        .method("PUT")
        .uri(format!("/api/orders/{}/status", order_no))
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-user-id", "u1")
        .body(Body::from(json!({"status": "CANCELLED"}).to_string()))
        .unwrap();
    let (status, body) = send(app(&state), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "CANCELLED");

    let product = state.engine.ledger().get(&pid).unwrap().unwrap();
    assert_eq!(product.stock, 10);
}

#[tokio::test]
async fn test_order_reads_are_scoped_to_owner() {
    let state = test_state();
    let pid = seed_product(&state, "Widget", 10, 100);
    let (_, created) = send(app(&state), post_json("/api/orders", &order_body(&pid, 1))).await;
    let order_no = created["order_no"].as_str().unwrap();

    let request = Request::builder()
        .uri(format!("/api/orders/{}", order_no))
        .header("x-user-id", "someone-else")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(app(&state), request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let request = Request::builder()
        .uri(format!("/api/orders/{}", order_no))
        .header("x-role", "admin")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(app(&state), request).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_product_writes_require_admin() {
    let state = test_state();

    let payload = json!({"title": "Widget", "price": "100", "stock": 5});
    let request = Request::builder()
        .method("POST")
        .uri("/api/products")
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-user-id", "u1")
        .body(Body::from(payload.to_string()))
        .unwrap();
    let (status, _) = send(app(&state), request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let request = Request::builder()
        .method("POST")
        .uri("/api/products")
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-role", "admin")
        .body(Body::from(payload.to_string()))
        .unwrap();
    let (status, body) = send(app(&state), request).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["stock"], 5);
}

#[tokio::test]
async fn test_dashboard_admin_only() {
    let state = test_state();

    let request = Request::builder()
        .uri("/api/dashboard")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(app(&state), request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let pid = seed_product(&state, "Widget", 10, 100);
    send(app(&state), post_json("/api/orders", &order_body(&pid, 2))).await;

    let request = Request::builder()
        .uri("/api/dashboard")
        .header("x-role", "admin")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app(&state), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_orders"], 1);
    assert_eq!(body["total_products"], 1);
}

#[tokio::test]
async fn test_checkout_rate_limit() {
    let mut config = Config::with_overrides("/tmp/store-test", 0);
    config.checkout_rate_limit = 1;
    let state = ServerState::in_memory(config).unwrap();
    let pid = seed_product(&state, "Widget", 10, 100);

    let (status, _) = send(app(&state), post_json("/api/orders", &order_body(&pid, 1))).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(app(&state), post_json("/api/orders", &order_body(&pid, 1))).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["code"], 9);

    // Other callers are unaffected
    let request = Request::builder()
        .method("POST")
        .uri("/api/orders")
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-user-id", "u2")
        .body(Body::from(order_body(&pid, 1).to_string()))
        .unwrap();
    let (status, _) = send(app(&state), request).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_health_endpoints() {
    let state = test_state();

    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app(&state), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let request = Request::builder()
        .uri("/health/detailed")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app(&state), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["checks"]["database"]["status"], "ok");
    assert_eq!(body["checks"]["event_bus"]["dropped_events"], 0);
}
