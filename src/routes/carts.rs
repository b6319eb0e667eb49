use axum::{Json, Router, extract::State, http::StatusCode, routing::get};

use crate::{
    dto::cart::AddToCartRequest,
    error::AppResult,
    extract::AppJson,
    middleware::auth::AuthUser,
    models::Cart,
    response::ErrorBody,
    services::cart_service::{self, CartOutcome},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(cart_list).post(add_to_cart))
}

#[utoipa::path(
    post,
    path = "/carts",
    request_body = AddToCartRequest,
    responses(
        (status = 200, description = "Items merged into the active cart", body = Cart),
        (status = 201, description = "New cart opened", body = Cart),
        (status = 400, description = "Invalid payload or unavailable item", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "Carts"
)]
pub async fn add_to_cart(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<AddToCartRequest>,
) -> AppResult<(StatusCode, Json<Cart>)> {
    let (cart, outcome) = cart_service::add_items(&state, &user, payload).await?;
    let status = match outcome {
        CartOutcome::Created => StatusCode::CREATED,
        CartOutcome::Merged => StatusCode::OK,
    };
    Ok((status, Json(cart)))
}

#[utoipa::path(
    get,
    path = "/carts",
    responses(
        (status = 200, description = "All carts of the caller", body = Vec<Cart>),
        (status = 401, description = "Missing or invalid token", body = ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "Carts"
)]
pub async fn cart_list(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<Vec<Cart>>> {
    let carts = cart_service::list_carts(&state, &user).await?;
    Ok(Json(carts))
}
