use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
    sea_query::Expr,
};

use crate::{
    dto::orders::PlaceOrderRequest,
    entity::{
        carts::{Column as CartCol, Entity as Carts},
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
        users::{Column as UserCol, Entity as Users},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{CART_ACTIVE, CART_ORDERED, Cart, Order},
    services::cart_service::resolve_carts,
    state::AppState,
};

const CART_UNAVAILABLE: &str = "Cart not found or already ordered";

/// Turn the caller's active cart into an order.
///
/// Unknown carts, carts owned by someone else and carts that were already
/// ordered all fail with the same 404.
pub async fn place_order(
    state: &AppState,
    user: &AuthUser,
    payload: PlaceOrderRequest,
) -> AppResult<Order> {
    if payload.cart_id <= 0 {
        return Err(AppError::Validation("cart_id is required".into()));
    }

    let txn = state.orm.begin().await?;

    // Guarded transition: only one caller can move a given cart out of `active`.
    let transitioned = Carts::update_many()
        .col_expr(CartCol::Status, Expr::value(CART_ORDERED))
        .filter(CartCol::Id.eq(payload.cart_id))
        .filter(CartCol::UserId.eq(user.user_id))
        .filter(CartCol::Status.eq(CART_ACTIVE))
        .exec(&txn)
        .await?;
    if transitioned.rows_affected == 0 {
        return Err(AppError::NotFound(CART_UNAVAILABLE.into()));
    }

    let order = OrderActive {
        cart_id: Set(payload.cart_id),
        user_id: Set(user.user_id),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    Users::update_many()
        .col_expr(UserCol::CartId, Expr::value(Option::<i32>::None))
        .filter(UserCol::Id.eq(user.user_id))
        .exec(&txn)
        .await?;

    let cart = Carts::find_by_id(order.cart_id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound(CART_UNAVAILABLE.into()))?;
    let cart = resolve_carts(&txn, vec![cart])
        .await?
        .pop()
        .ok_or_else(|| AppError::NotFound(CART_UNAVAILABLE.into()))?;

    txn.commit().await?;

    tracing::info!(
        user_id = user.user_id,
        order_id = order.id,
        cart_id = order.cart_id,
        lines = cart.items.len(),
        "order placed"
    );
    Ok(order_from_entity(order, cart))
}

pub async fn list_orders(state: &AppState, user: &AuthUser) -> AppResult<Vec<Order>> {
    let orders = Orders::find()
        .filter(OrderCol::UserId.eq(user.user_id))
        .order_by_asc(OrderCol::Id)
        .all(&state.orm)
        .await?;
    if orders.is_empty() {
        return Ok(Vec::new());
    }

    let cart_ids: Vec<i32> = orders.iter().map(|o| o.cart_id).collect();
    let carts = Carts::find()
        .filter(CartCol::Id.is_in(cart_ids))
        .all(&state.orm)
        .await?;
    let mut carts: HashMap<i32, Cart> = resolve_carts(&state.orm, carts)
        .await?
        .into_iter()
        .map(|cart| (cart.id, cart))
        .collect();

    orders
        .into_iter()
        .map(|order| {
            let cart = carts.remove(&order.cart_id).ok_or_else(|| {
                AppError::Internal(anyhow::anyhow!("order {} references a missing cart", order.id))
            })?;
            Ok(order_from_entity(order, cart))
        })
        .collect()
}

fn order_from_entity(model: OrderModel, cart: Cart) -> Order {
    Order {
        id: model.id,
        cart_id: model.cart_id,
        user_id: model.user_id,
        created_at: model.created_at.with_timezone(&Utc),
        cart,
    }
}
