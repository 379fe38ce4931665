use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A user's declared attendance at an event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Assistance {
    pub user_id: String,
    pub event_id: i64,
}
