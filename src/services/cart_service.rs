use std::collections::{HashMap, HashSet};

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbBackend, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
    sea_query::{Expr, OnConflict},
};

use crate::{
    dto::cart::AddToCartRequest,
    entity::{
        cart_items::{ActiveModel as CartItemActive, Column as CartItemCol, Entity as CartItems},
        carts::{ActiveModel as CartActive, Column as CartCol, Entity as Carts, Model as CartModel},
        items::{Column as ItemCol, Entity as Items},
        users::{Column as UserCol, Entity as Users},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{CART_ACTIVE, Cart, CartLineItem, ITEM_ACTIVE},
    services::item_service::item_from_entity,
    state::AppState,
};

/// Whether an add-to-cart call opened a new cart or merged into the active one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartOutcome {
    Created,
    Merged,
}

/// Add items to the caller's active cart, opening one if none exists.
///
/// Re-adding an item already in the cart is a no-op. The whole operation runs
/// in one transaction; a partial unique index on `carts(user_id)` for active
/// carts backs the one-active-cart rule. When a concurrent request wins the race
/// to open the cart, this call is replayed once and merges into that cart.
pub async fn add_items(
    state: &AppState,
    user: &AuthUser,
    payload: AddToCartRequest,
) -> AppResult<(Cart, CartOutcome)> {
    let item_ids = dedup_ids(payload.item_ids);

    match add_items_once(state, user, &item_ids).await {
        Err(err) if err.is_unique_violation() => {
            tracing::debug!(user_id = user.user_id, "active cart opened concurrently, merging");
            add_items_once(state, user, &item_ids).await
        }
        other => other,
    }
}

async fn add_items_once(
    state: &AppState,
    user: &AuthUser,
    item_ids: &[i32],
) -> AppResult<(Cart, CartOutcome)> {
    let txn = state.orm.begin().await?;

    if Users::find_by_id(user.user_id).one(&txn).await?.is_none() {
        return Err(AppError::Unauthorized("Invalid token".into()));
    }

    ensure_items_available(&txn, item_ids).await?;

    let mut finder = Carts::find()
        .filter(CartCol::UserId.eq(user.user_id))
        .filter(CartCol::Status.eq(CART_ACTIVE));
    // SQLite has no row locks; its pool holds a single connection instead.
    if txn.get_database_backend() == DbBackend::Postgres {
        finder = finder.lock_exclusive();
    }
    let existing = finder.one(&txn).await?;

    let (cart, outcome) = match existing {
        Some(cart) => (cart, CartOutcome::Merged),
        None => {
            let cart = CartActive {
                user_id: Set(user.user_id),
                name: Set(format!("Cart for User {}", user.user_id)),
                status: Set(CART_ACTIVE.to_string()),
                created_at: Set(Utc::now().into()),
                ..Default::default()
            }
            .insert(&txn)
            .await?;

            Users::update_many()
                .col_expr(UserCol::CartId, Expr::value(cart.id))
                .filter(UserCol::Id.eq(user.user_id))
                .exec(&txn)
                .await?;

            (cart, CartOutcome::Created)
        }
    };

    insert_line_items(&txn, cart.id, item_ids).await?;

    let cart = resolve_carts(&txn, vec![cart])
        .await?
        .pop()
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("cart missing after insert")))?;

    txn.commit().await?;

    tracing::info!(
        user_id = user.user_id,
        cart_id = cart.id,
        outcome = ?outcome,
        added = item_ids.len(),
        "cart updated"
    );
    Ok((cart, outcome))
}

pub async fn list_carts(state: &AppState, user: &AuthUser) -> AppResult<Vec<Cart>> {
    let carts = Carts::find()
        .filter(CartCol::UserId.eq(user.user_id))
        .order_by_asc(CartCol::Id)
        .all(&state.orm)
        .await?;
    resolve_carts(&state.orm, carts).await
}

/// Attach line items, joined with their catalog entries, to each cart.
pub(crate) async fn resolve_carts<C>(conn: &C, carts: Vec<CartModel>) -> AppResult<Vec<Cart>>
where
    C: ConnectionTrait,
{
    if carts.is_empty() {
        return Ok(Vec::new());
    }

    let cart_ids: Vec<i32> = carts.iter().map(|c| c.id).collect();
    let rows = CartItems::find()
        .find_also_related(Items)
        .filter(CartItemCol::CartId.is_in(cart_ids))
        .order_by_asc(CartItemCol::CartId)
        .order_by_asc(CartItemCol::ItemId)
        .all(conn)
        .await?;

    let mut lines: HashMap<i32, Vec<CartLineItem>> = HashMap::new();
    for (line, item) in rows {
        let Some(item) = item else {
            continue;
        };
        lines.entry(line.cart_id).or_default().push(CartLineItem {
            cart_id: line.cart_id,
            item_id: line.item_id,
            item: item_from_entity(item),
        });
    }

    Ok(carts
        .into_iter()
        .map(|cart| {
            let items = lines.remove(&cart.id).unwrap_or_default();
            cart_from_entity(cart, items)
        })
        .collect())
}

async fn ensure_items_available<C>(conn: &C, item_ids: &[i32]) -> AppResult<()>
where
    C: ConnectionTrait,
{
    if item_ids.is_empty() {
        return Ok(());
    }

    let found: Vec<i32> = Items::find()
        .select_only()
        .column(ItemCol::Id)
        .filter(ItemCol::Id.is_in(item_ids.iter().copied()))
        .filter(ItemCol::Status.eq(ITEM_ACTIVE))
        .into_tuple()
        .all(conn)
        .await?;

    if let Some(missing) = item_ids.iter().find(|id| !found.contains(*id)) {
        return Err(AppError::Validation(format!(
            "Item {missing} is not available"
        )));
    }
    Ok(())
}

async fn insert_line_items<C>(conn: &C, cart_id: i32, item_ids: &[i32]) -> AppResult<()>
where
    C: ConnectionTrait,
{
    if item_ids.is_empty() {
        return Ok(());
    }

    let rows = item_ids.iter().map(|&item_id| CartItemActive {
        cart_id: Set(cart_id),
        item_id: Set(item_id),
    });

    CartItems::insert_many(rows)
        .on_conflict(
            OnConflict::columns([CartItemCol::CartId, CartItemCol::ItemId])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;
    Ok(())
}

fn dedup_ids(ids: Vec<i32>) -> Vec<i32> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

fn cart_from_entity(model: CartModel, items: Vec<CartLineItem>) -> Cart {
    Cart {
        id: model.id,
        user_id: model.user_id,
        name: model.name,
        status: model.status,
        created_at: model.created_at.with_timezone(&Utc),
        items,
    }
}
