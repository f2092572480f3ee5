//! End-to-end HTTP behaviour over the in-memory store and shared tier.

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use catalog_server::cache::{ALL_PRODUCTS, CacheTiers, InMemorySharedCache, LocalCache, product_key};
use catalog_server::{AppConfig, AppState, build_app, registry_from_parts};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

struct TestApp {
    router: Router,
    local: Arc<LocalCache<catalog_core::ProductDto>>,
    shared: Arc<InMemorySharedCache>,
}

fn test_app() -> TestApp {
    let config = AppConfig::default();
    let local = Arc::new(LocalCache::new());
    let shared = Arc::new(InMemorySharedCache::new());
    let tiers = CacheTiers::new(local.clone(), shared.clone());
    let store = catalog_db_memory::create_product_store();
    let store_backend = store.backend_name();
    let registry = registry_from_parts(store, tiers.clone(), &config.cache).expect("registry");

    let state = AppState {
        registry,
        tiers,
        store_backend,
    };
    TestApp {
        router: build_app(state, &config),
        local,
        shared,
    }
}

async fn call(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, axum::http::HeaderMap, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).expect("request"))
        .await
        .expect("infallible");

    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, headers, value)
}

async fn create(app: &Router, name: &str, price: &str, stock: i32) -> Value {
    let (status, headers, body) = call(
        app,
        Method::POST,
        "/api/products",
        Some(json!({ "name": name, "description": "desc", "price": price, "stock": stock })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["data"]["id"].as_str().expect("id").to_string();
    assert_eq!(
        headers.get(header::LOCATION).and_then(|v| v.to_str().ok()),
        Some(format!("/api/products/{id}").as_str())
    );
    body["data"].clone()
}

#[tokio::test]
async fn create_then_read_by_id() {
    let app = test_app();
    let created = create(&app.router, "Keyboard", "49.99", 10).await;
    let id = created["id"].as_str().unwrap();

    let (status, headers, body) =
        call(&app.router, Method::GET, &format!("/api/products/{id}"), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers.get("x-cache-source").unwrap(), "Memory");
    assert_eq!(body["isSuccess"], true);
    assert_eq!(body["data"]["name"], "Keyboard");
    assert_eq!(body["data"]["stock"], 10);
    assert!(body["data"]["createdAt"].is_string());
    assert!(body["data"]["updatedAt"].is_null());

    let parsed: Uuid = id.parse().unwrap();
    assert!(app.local.contains(&product_key(parsed)));
}

#[tokio::test]
async fn list_is_served_through_shared_tier() {
    let app = test_app();
    create(&app.router, "A", "1.00", 1).await;
    create(&app.router, "B", "2.00", 2).await;

    let (status, headers, body) = call(&app.router, Method::GET, "/api/products", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers.get("x-cache-source").unwrap(), "Redis");
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    assert!(app.shared.contains(ALL_PRODUCTS));

    create(&app.router, "C", "3.00", 3).await;
    assert!(!app.shared.contains(ALL_PRODUCTS));

    let (_, _, body) = call(&app.router, Method::GET, "/api/products", None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn empty_catalog_lists_nothing() {
    let app = test_app();
    let (status, _, body) = call(&app.router, Method::GET, "/api/products", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn unknown_id_is_404() {
    let app = test_app();
    let uri = format!("/api/products/{}", Uuid::new_v4());

    let (status, _, body) = call(&app.router, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["isSuccess"], false);
    assert_eq!(body["errors"], json!(["Product not found"]));

    let (status, _, _) = call(
        &app.router,
        Method::PUT,
        &uri,
        Some(json!({ "name": "x", "price": "1", "stock": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, headers, body) = call(&app.router, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(headers.get(header::CONTENT_TYPE).unwrap(), "application/json");
    assert_eq!(body, json!({ "errors": ["Product not found"] }));
}

#[tokio::test]
async fn numeric_price_keeps_its_decimal_digits() {
    let app = test_app();
    let payload: Value = serde_json::from_str(
        r#"{ "name": "Cable", "description": "usb", "price": 19.99, "stock": 5 }"#,
    )
    .unwrap();

    let (status, _, body) = call(&app.router, Method::POST, "/api/products", Some(payload)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["price"], "19.99");

    let id = body["data"]["id"].as_str().unwrap();
    let (_, _, read) = call(&app.router, Method::GET, &format!("/api/products/{id}"), None).await;
    assert_eq!(read["data"]["price"], "19.99");
    assert_eq!(read["data"]["createdAt"], body["data"]["createdAt"]);

    let update: Value =
        serde_json::from_str(r#"{ "name": "Cable", "price": 0.1, "stock": 5 }"#).unwrap();
    let (status, _, updated) =
        call(&app.router, Method::PUT, &format!("/api/products/{id}"), Some(update)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["data"]["price"], "0.10");
}

#[tokio::test]
async fn malformed_id_is_400() {
    let app = test_app();
    let (status, _, body) = call(&app.router, Method::GET, "/api/products/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"][0].as_str().unwrap().contains("not-a-uuid"));
}

#[tokio::test]
async fn invalid_create_body_is_400() {
    let app = test_app();
    let (status, _, body) = call(
        &app.router,
        Method::POST,
        "/api/products",
        Some(json!({ "description": "no name or price" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"].is_array());

    let (_, _, list) = call(&app.router, Method::GET, "/api/products", None).await;
    assert_eq!(list["data"], json!([]));
}

#[tokio::test]
async fn update_and_delete_round_trip() {
    let app = test_app();
    let created = create(&app.router, "Mouse", "19.90", 5).await;
    let uri = format!("/api/products/{}", created["id"].as_str().unwrap());

    // Warm the item entry so the update has something to clear.
    call(&app.router, Method::GET, &uri, None).await;

    let (status, _, body) = call(
        &app.router,
        Method::PUT,
        &uri,
        Some(json!({ "name": "Mouse Pro", "description": "wireless", "price": "29.90", "stock": 8 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Mouse Pro");
    assert_eq!(body["data"]["createdAt"], created["createdAt"]);
    assert!(body["data"]["updatedAt"].is_string());

    let (_, _, fresh) = call(&app.router, Method::GET, &uri, None).await;
    assert_eq!(fresh["data"]["name"], "Mouse Pro");
    assert_eq!(fresh["data"]["stock"], 8);

    let (status, _, body) = call(&app.router, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, _, _) = call(&app.router, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn healthz_reports_backends() {
    let app = test_app();
    let (status, _, body) = call(&app.router, Method::GET, "/healthz", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["store"], "memory");
    assert_eq!(body["cache"], "memory");
}

#[tokio::test]
async fn serves_over_a_real_socket() {
    let app = test_app();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().unwrap();
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    let server = tokio::spawn(async move {
        axum::serve(listener, app.router)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
            .expect("serve");
    });

    let client = reqwest::Client::new();
    let base = format!("http://{addr}/api/products");

    let created: Value = client
        .post(&base)
        .json(&json!({ "name": "Socket", "price": "5.00", "stock": 1 }))
        .send()
        .await
        .expect("post")
        .json()
        .await
        .expect("json");
    let id = created["data"]["id"].as_str().unwrap();

    let resp = client.get(format!("{base}/{id}")).send().await.expect("get");
    assert_eq!(resp.status(), reqwest::StatusCode::OK);
    assert_eq!(resp.headers()["x-cache-source"], "Memory");

    let resp = client.get(&base).send().await.expect("list");
    assert_eq!(resp.headers()["x-cache-source"], "Redis");
    let list: Value = resp.json().await.expect("json");
    assert_eq!(list["data"].as_array().unwrap().len(), 1);

    let _ = shutdown_tx.send(());
    server.await.expect("server task");
}
