use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Shared reference data, not scoped to an institute.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow, ToSchema)]
pub struct Subject {
    #[schema(example = 2)]
    pub id: u64,
    #[schema(example = "Physics")]
    pub name: String,
    #[schema(example = "PHY-11")]
    pub code: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct SubjectInput {
    #[schema(example = "Physics")]
    pub name: String,
    #[schema(example = "PHY-11")]
    pub code: Option<String>,
    pub description: Option<String>,
}
