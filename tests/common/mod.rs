#![allow(dead_code)]

use chrono::Duration;
use shopeasy_api::{
    db::{create_orm_conn, run_migrations},
    dto::{
        auth::{LoginRequest, RegisterRequest},
        items::CreateItemRequest,
    },
    middleware::auth::AuthUser,
    models::Item,
    services::{auth_service, item_service},
    state::AppState,
    token::TokenKeys,
};

pub const TEST_SECRET: &str = "integration-test-secret";

/// Fresh in-memory database with the schema applied. A single connection keeps
/// every query on the same SQLite memory database.
pub async fn setup_state() -> anyhow::Result<AppState> {
    let orm = create_orm_conn("sqlite::memory:", 1).await?;
    run_migrations(&orm).await?;
    Ok(AppState::new(
        orm,
        TokenKeys::new(TEST_SECRET, Duration::hours(24)),
    ))
}

/// File-backed database under `dir`, opened the way the server opens its
/// default store.
pub async fn setup_file_state(
    dir: &std::path::Path,
    max_connections: u32,
) -> anyhow::Result<AppState> {
    let url = format!("sqlite://{}?mode=rwc", dir.join("shop.db").display());
    let orm = create_orm_conn(&url, max_connections).await?;
    run_migrations(&orm).await?;
    Ok(AppState::new(
        orm,
        TokenKeys::new(TEST_SECRET, Duration::hours(24)),
    ))
}

/// Register `username` and resolve the caller identity through a real login.
pub async fn signed_in_user(state: &AppState, username: &str) -> anyhow::Result<AuthUser> {
    auth_service::register_user(
        state,
        RegisterRequest {
            username: username.into(),
            password: "hunter2".into(),
        },
    )
    .await?;
    let login = auth_service::login_user(
        state,
        LoginRequest {
            username: username.into(),
            password: "hunter2".into(),
        },
    )
    .await?;
    Ok(auth_service::authenticate(state, &login.token)?)
}

pub async fn create_item(state: &AppState, name: &str, status: Option<&str>) -> anyhow::Result<Item> {
    let item = item_service::create_item(
        state,
        CreateItemRequest {
            name: name.into(),
            status: status.map(str::to_string),
        },
    )
    .await?;
    Ok(item)
}
