use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set, TransactionTrait,
};

use crate::{
    db::OrmConn,
    entity::{
        items::{ActiveModel as ItemActive, Entity as Items},
        users::{ActiveModel as UserActive, Column as UserCol, Entity as Users},
    },
    error::AppResult,
    models::ITEM_ACTIVE,
    services::auth_service::hash_password,
};

pub const SAMPLE_ITEMS: [&str; 8] = [
    "Laptop",
    "Mouse",
    "Keyboard",
    "Monitor",
    "Headphones",
    "Webcam",
    "Smartphone",
    "Tablet",
];

pub const SAMPLE_USERNAME: &str = "testuser";
pub const SAMPLE_PASSWORD: &str = "password";

/// Populate an empty catalog with sample items and the demo account.
///
/// Returns `false` without touching anything when the catalog already has items.
pub async fn seed_sample_data(orm: &OrmConn) -> AppResult<bool> {
    if Items::find().count(orm).await? > 0 {
        tracing::debug!("catalog not empty, skipping seed");
        return Ok(false);
    }

    let txn = orm.begin().await?;

    for name in SAMPLE_ITEMS {
        ItemActive {
            name: Set(name.to_string()),
            status: Set(ITEM_ACTIVE.to_string()),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
    }

    let exists = Users::find()
        .filter(UserCol::Username.eq(SAMPLE_USERNAME))
        .one(&txn)
        .await?;
    if exists.is_none() {
        UserActive {
            username: Set(SAMPLE_USERNAME.to_string()),
            password_hash: Set(hash_password(SAMPLE_PASSWORD)?),
            token: Set(None),
            cart_id: Set(None),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
    }

    txn.commit().await?;

    tracing::info!(items = SAMPLE_ITEMS.len(), "sample data seeded");
    Ok(true)
}
