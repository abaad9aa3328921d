//! HTTP round trips against the full router with in-process backends

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use sales_api::{router, ApiServer, ApiServerConfig};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

async fn app() -> (Router, TempDir) {
    let temp = TempDir::new().unwrap();
    let server = ApiServer::new(ApiServerConfig {
        data_dir: temp.path().to_path_buf(),
        ..ApiServerConfig::default()
    });
    let state = server.build_state().await.unwrap();
    (router(state), temp)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn sale_request(customer_name: &str) -> Value {
    json!({
        "saleNumber": "S20001",
        "saleDate": "2024-03-01T10:00:00Z",
        "customer": {
            "customerName": customer_name,
            "email": "buyer@example.com",
            "phone": "11987654321"
        },
        "branch": { "branchName": "Central", "location": "Main Street" },
        "items": [
            { "quantity": 4, "product": { "productName": "Beer", "price": 10.0 } }
        ]
    })
}

#[tokio::test]
async fn test_health() {
    let (app, _temp) = app().await;
    let (status, body) = send(&app, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["cache"]["hit_rate"], 0.0);
}

#[tokio::test]
async fn test_health_reports_cache_hits() {
    let (app, _temp) = app().await;
    let (_, body) = send(&app, post("/api/sales", sale_request("Ana Souza"))).await;
    let id = body["data"]["id"].as_str().unwrap().to_string();

    // First read misses the id query key, the second is served from cache
    for _ in 0..2 {
        let (status, _) = send(&app, get(&format!("/api/sales/{}", id))).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, body) = send(&app, get("/health")).await;
    assert_eq!(body["cache"]["hits"], 1);
    assert!(body["cache"]["writes"].as_u64().unwrap() >= 2);
    assert!(body["cache"]["hit_rate"].as_f64().unwrap() > 0.0);
}

#[tokio::test]
async fn test_create_and_get_sale() {
    let (app, _temp) = app().await;

    let (status, body) = send(&app, post("/api/sales", sale_request("Ana Souza"))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    // 4 units at 10.0 with the 10% tier
    assert_eq!(body["data"]["totalAmount"], 36.0);

    let id = body["data"]["id"].as_str().unwrap().to_string();
    let (status, body) = send(&app, get(&format!("/api/sales/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], id.as_str());
    assert_eq!(body["data"]["items"][0]["saleId"], id.as_str());
    assert_eq!(body["data"]["customer"]["customerName"], "Ana Souza");
}

#[tokio::test]
async fn test_get_sale_errors() {
    let (app, _temp) = app().await;

    let (status, body) = send(&app, get("/api/sales/not-a-uuid")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, _) = send(&app, get("/api/sales/00000000-0000-0000-0000-000000000000")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        get("/api/sales/6f9619ff-8b86-d011-b42d-00cf4fc964ff"),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["message"].as_str().unwrap().contains("not found"));
}

#[tokio::test]
async fn test_create_sale_validation_errors() {
    let (app, _temp) = app().await;
    let mut request = sale_request("Ana Souza");
    request["items"][0]["quantity"] = json!(25);
    request["customer"]["email"] = json!("broken");

    let (status, body) = send(&app, post("/api/sales", request)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let errors = body["errors"].as_array().unwrap();
    assert!(errors.iter().any(|e| e["error"] == "SaleItems"));
    assert!(errors.iter().any(|e| e["error"] == "Customer.Email"));
}

#[tokio::test]
async fn test_list_sales_by_customer() {
    let (app, _temp) = app().await;
    for name in ["Ana Souza", "Bruno Lima", "Ana Costa"] {
        let (status, _) = send(&app, post("/api/sales", sale_request(name))).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(&app, get("/api/sales?customer=ana&page=1&pageSize=10")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 2);
    assert_eq!(body["data"]["pageSize"], 10);

    let (status, _) = send(&app, get("/api/sales?pageSize=1000")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_users() {
    let (app, _temp) = app().await;
    let user = json!({
        "username": "carla",
        "email": "carla@example.com",
        "phone": "11987654321",
        "password": "hunter22pass",
        "role": "Manager"
    });

    let (status, body) = send(&app, post("/api/users", user.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, _) = send(&app, post("/api/users", user)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(&app, get(&format!("/api/users/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["role"], "Manager");
    assert!(body["data"].get("passwordHash").is_none());
}
