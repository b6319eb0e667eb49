use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct PlaceOrderRequest {
    pub cart_id: i32,
}
