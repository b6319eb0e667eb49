mod common;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use shopeasy_api::{
    routes::create_router,
    seed::{SAMPLE_ITEMS, SAMPLE_PASSWORD, SAMPLE_USERNAME, seed_sample_data},
};
use tower::ServiceExt;

async fn seeded_app() -> anyhow::Result<Router> {
    let state = common::setup_state().await?;
    assert!(seed_sample_data(&state.orm).await?);
    Ok(create_router(state))
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn login_token(app: &Router, username: &str, password: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/users/login",
        None,
        Some(json!({ "username": username, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["token"].as_str().expect("token").to_string()
}

#[tokio::test]
async fn register_login_cart_order_end_to_end() -> anyhow::Result<()> {
    let app = seeded_app().await?;

    let (status, user) = send(
        &app,
        "POST",
        "/users",
        None,
        Some(json!({ "username": "u", "password": "p" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(user["username"], "u");
    assert!(user.get("password_hash").is_none());

    let (status, login) = send(
        &app,
        "POST",
        "/users/login",
        None,
        Some(json!({ "username": "u", "password": "p" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(login["username"], "u");
    assert_eq!(login["user_id"], user["id"]);
    let token = login["token"].as_str().expect("token").to_string();

    let (status, items) = send(&app, "GET", "/items", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = items
        .as_array()
        .expect("item list")
        .iter()
        .filter_map(|item| item["name"].as_str())
        .collect();
    assert_eq!(names, SAMPLE_ITEMS.to_vec());

    let (status, cart) = send(
        &app,
        "POST",
        "/carts",
        Some(&token),
        Some(json!({ "item_ids": [1] })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(cart["status"], "active");
    assert_eq!(cart["items"].as_array().map(Vec::len), Some(1));
    assert_eq!(cart["items"][0]["item_id"], 1);
    assert_eq!(cart["items"][0]["item"]["name"], "Laptop");
    let cart_id = cart["id"].as_i64().expect("cart id");

    let (status, order) = send(
        &app,
        "POST",
        "/orders",
        Some(&token),
        Some(json!({ "cart_id": cart_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(order["cart_id"], cart_id);
    assert_eq!(order["cart"]["status"], "ordered");
    assert_eq!(order["cart"]["items"][0]["item"]["name"], "Laptop");

    let (status, carts) = send(&app, "GET", "/carts", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(carts[0]["id"], cart_id);
    assert_eq!(carts[0]["status"], "ordered");

    let (status, orders) = send(&app, "GET", "/orders", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(orders.as_array().map(Vec::len), Some(1));

    let (status, err) = send(
        &app,
        "POST",
        "/orders",
        Some(&token),
        Some(json!({ "cart_id": cart_id })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err["error"], "Cart not found or already ordered");
    Ok(())
}

#[tokio::test]
async fn merging_into_an_active_cart_returns_ok() -> anyhow::Result<()> {
    let app = seeded_app().await?;
    let token = login_token(&app, SAMPLE_USERNAME, SAMPLE_PASSWORD).await;

    let (status, first) = send(
        &app,
        "POST",
        "/carts",
        Some(&token),
        Some(json!({ "item_ids": [2] })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, merged) = send(
        &app,
        "POST",
        "/carts",
        Some(&token),
        Some(json!({ "item_ids": [2, 3] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(merged["id"], first["id"]);
    assert_eq!(merged["items"].as_array().map(Vec::len), Some(2));
    Ok(())
}

#[tokio::test]
async fn protected_routes_require_a_valid_bearer_token() -> anyhow::Result<()> {
    let app = seeded_app().await?;

    let (status, body) = send(&app, "GET", "/carts", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Authorization header required");

    let (status, body) = send(&app, "GET", "/orders", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid token");

    let request = Request::builder()
        .method("GET")
        .uri("/carts")
        .header(header::AUTHORIZATION, "Token abc")
        .body(Body::empty())?;
    let response = app.clone().oneshot(request).await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn bad_credentials_are_unauthorized() -> anyhow::Result<()> {
    let app = seeded_app().await?;

    let (status, wrong) = send(
        &app,
        "POST",
        "/users/login",
        None,
        Some(json!({ "username": SAMPLE_USERNAME, "password": "nope" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, unknown) = send(
        &app,
        "POST",
        "/users/login",
        None,
        Some(json!({ "username": "ghost", "password": "nope" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong, unknown);
    Ok(())
}

#[tokio::test]
async fn malformed_bodies_are_bad_requests() -> anyhow::Result<()> {
    let app = seeded_app().await?;

    let (status, body) = send(&app, "POST", "/users", None, Some(json!({ "username": "x" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let request = Request::builder()
        .method("POST")
        .uri("/items")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))?;
    let response = app.clone().oneshot(request).await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let token = login_token(&app, SAMPLE_USERNAME, SAMPLE_PASSWORD).await;
    let (status, body) = send(
        &app,
        "POST",
        "/carts",
        Some(&token),
        Some(json!({ "item_ids": "1" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = send(
        &app,
        "POST",
        "/users",
        None,
        Some(json!({ "username": SAMPLE_USERNAME, "password": "again" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn inactive_items_are_created_but_not_listed() -> anyhow::Result<()> {
    let app = seeded_app().await?;

    let (status, item) = send(
        &app,
        "POST",
        "/items",
        None,
        Some(json!({ "name": "Fax Machine", "status": "inactive" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(item["status"], "inactive");

    let (status, defaulted) = send(&app, "POST", "/items", None, Some(json!({ "name": "Router" }))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(defaulted["status"], "active");

    let (_, items) = send(&app, "GET", "/items", None, None).await;
    let names: Vec<&str> = items
        .as_array()
        .expect("item list")
        .iter()
        .filter_map(|item| item["name"].as_str())
        .collect();
    assert!(names.contains(&"Router"));
    assert!(!names.contains(&"Fax Machine"));
    Ok(())
}

#[tokio::test]
async fn user_listing_and_fallback() -> anyhow::Result<()> {
    let app = seeded_app().await?;

    let (status, users) = send(&app, "GET", "/users", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(users[0]["username"], SAMPLE_USERNAME);
    assert!(users[0].get("password_hash").is_none());
    assert!(users[0].get("token").is_none());

    let (status, body) = send(&app, "GET", "/nowhere", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not Found");

    let (status, body) = send(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    Ok(())
}
