use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Batch {
    #[schema(example = 3)]
    pub id: u64,
    #[schema(example = "Morning JEE")]
    pub name: String,
    pub description: Option<String>,
    pub institute_id: u64,
    /// Associated subjects, a set ordered by id.
    pub subject_ids: Vec<u64>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct BatchInput {
    #[schema(example = "Morning JEE")]
    pub name: String,
    #[schema(example = "Weekday 7am batch", nullable = true)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddSubjectRequest {
    #[schema(example = 2)]
    pub subject_id: u64,
}
