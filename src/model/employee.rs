use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "full_name": "John Doe",
        "department_id": 10
    })
)]
pub struct Employee {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "John Doe")]
    pub full_name: String,

    /// Employees keep existing when their department is deleted
    #[schema(example = 10, nullable = true)]
    pub department_id: Option<u64>,
}
