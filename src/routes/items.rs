use axum::{Json, Router, extract::State, http::StatusCode, routing::get};

use crate::{
    dto::items::CreateItemRequest,
    error::AppResult,
    extract::AppJson,
    models::Item,
    response::ErrorBody,
    services::item_service::{create_item, list_active_items},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(item_list).post(item_create))
}

#[utoipa::path(
    post,
    path = "/items",
    request_body = CreateItemRequest,
    responses(
        (status = 201, description = "Item created", body = Item),
        (status = 400, description = "Invalid payload", body = ErrorBody),
        (status = 500, description = "Storage failure", body = ErrorBody)
    ),
    tag = "Items"
)]
pub async fn item_create(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateItemRequest>,
) -> AppResult<(StatusCode, Json<Item>)> {
    let item = create_item(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

#[utoipa::path(
    get,
    path = "/items",
    responses(
        (status = 200, description = "Active catalog items", body = Vec<Item>)
    ),
    tag = "Items"
)]
pub async fn item_list(State(state): State<AppState>) -> AppResult<Json<Vec<Item>>> {
    let items = list_active_items(&state).await?;
    Ok(Json(items))
}
