use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateItemRequest {
    pub name: String,
    /// Defaults to `active` when omitted or blank.
    pub status: Option<String>,
}
