use axum::{Json, Router, http::StatusCode, http::Uri, routing::get};

use crate::{response::ErrorBody, state::AppState};

pub mod carts;
pub mod doc;
pub mod health;
pub mod items;
pub mod orders;
pub mod users;

/// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/users", users::router())
        .nest("/items", items::router())
        .nest("/carts", carts::router())
        .nest("/orders", orders::router())
}

/// Full application: API routes, health, docs and the JSON 404 fallback.
/// Transport middleware (tracing, CORS, limits) is layered on by the binary.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .merge(create_api_router())
        .merge(doc::scalar_docs())
        .fallback(not_found)
        .with_state(state)
}

async fn not_found(uri: Uri) -> (StatusCode, Json<ErrorBody>) {
    tracing::debug!(path = %uri.path(), "no route");
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody {
            error: "Not Found".to_string(),
        }),
    )
}
