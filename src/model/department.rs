use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(example = json!({ "id": 1, "name": "Engineering" }))]
pub struct Department {
    pub id: u64,
    pub name: String,
}
