use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const ITEM_ACTIVE: &str = "active";
pub const CART_ACTIVE: &str = "active";
pub const CART_ORDERED: &str = "ordered";

/// Public view of a user. Credentials and tokens never leave the service layer.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Item {
    pub id: i32,
    pub name: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CartLineItem {
    pub cart_id: i32,
    pub item_id: i32,
    pub item: Item,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Cart {
    pub id: i32,
    pub user_id: i32,
    pub name: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub items: Vec<CartLineItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: i32,
    pub cart_id: i32,
    pub user_id: i32,
    pub created_at: DateTime<Utc>,
    pub cart: Cart,
}
