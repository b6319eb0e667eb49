use axum::{Json, Router, extract::State, http::StatusCode, routing::get};

use crate::{
    dto::orders::PlaceOrderRequest,
    error::AppResult,
    extract::AppJson,
    middleware::auth::AuthUser,
    models::Order,
    response::ErrorBody,
    services::order_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(order_list).post(place_order))
}

#[utoipa::path(
    post,
    path = "/orders",
    request_body = PlaceOrderRequest,
    responses(
        (status = 201, description = "Order placed", body = Order),
        (status = 400, description = "Invalid payload", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 404, description = "Cart not found or already ordered", body = ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn place_order(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<PlaceOrderRequest>,
) -> AppResult<(StatusCode, Json<Order>)> {
    let order = order_service::place_order(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

#[utoipa::path(
    get,
    path = "/orders",
    responses(
        (status = 200, description = "Orders of the caller", body = Vec<Order>),
        (status = 401, description = "Missing or invalid token", body = ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn order_list(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<Vec<Order>>> {
    let orders = order_service::list_orders(&state, &user).await?;
    Ok(Json(orders))
}
