use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body returned for every failed request.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct ErrorBody {
    pub error: String,
}

