use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::{
    dto::items::CreateItemRequest,
    entity::items::{ActiveModel as ItemActive, Column as ItemCol, Entity as Items, Model as ItemModel},
    error::{AppError, AppResult},
    models::{ITEM_ACTIVE, Item},
    state::AppState,
};

pub async fn create_item(state: &AppState, payload: CreateItemRequest) -> AppResult<Item> {
    let CreateItemRequest { name, status } = payload;
    let name = name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::Validation("name is required".into()));
    }
    let status = status
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| ITEM_ACTIVE.to_string());

    let item = ItemActive {
        name: Set(name),
        status: Set(status),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    }
    .insert(&state.orm)
    .await?;

    tracing::info!(item_id = item.id, status = %item.status, "item created");
    Ok(item_from_entity(item))
}

pub async fn list_active_items(state: &AppState) -> AppResult<Vec<Item>> {
    let items = Items::find()
        .filter(ItemCol::Status.eq(ITEM_ACTIVE))
        .order_by_asc(ItemCol::Id)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(item_from_entity)
        .collect();
    Ok(items)
}

pub(crate) fn item_from_entity(model: ItemModel) -> Item {
    Item {
        id: model.id,
        name: model.name,
        status: model.status,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
