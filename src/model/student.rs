use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString, IntoStaticStr};
use utoipa::ToSchema;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, IntoStaticStr, ToSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum StudentStatus {
    Active,
    Inactive,
}

impl StudentStatus {
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[schema(example = json!({
    "id": 7,
    "name": "Asha Rao",
    "roll_no": "R-101",
    "mobile": "+919876543210",
    "email": "asha@example.com",
    "address": "12 MG Road",
    "dob": "2008-04-12",
    "gender": "F",
    "stream": "Science",
    "status": "ACTIVE",
    "institute_id": 1,
    "batch_ids": [3]
}))]
pub struct Student {
    pub id: u64,
    pub name: String,
    pub roll_no: Option<String>,
    pub mobile: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    #[schema(value_type = Option<String>, format = "date")]
    pub dob: Option<NaiveDate>,
    pub gender: Option<String>,
    pub stream: Option<String>,
    pub status: StudentStatus,
    pub institute_id: u64,
    pub batch_ids: Vec<u64>,
}

/// Create and update payload. Updates replace every field listed here;
/// a missing optional field is cleared and a missing `batch_ids` empties
/// the memberships. Any client-sent status is ignored.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct StudentInput {
    #[schema(example = "Asha Rao")]
    pub name: String,
    #[schema(example = "R-101")]
    pub roll_no: Option<String>,
    pub mobile: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    #[schema(example = "2008-04-12", value_type = Option<String>, format = "date")]
    pub dob: Option<NaiveDate>,
    pub gender: Option<String>,
    #[schema(example = "Science")]
    pub stream: Option<String>,
    #[serde(default)]
    pub batch_ids: Vec<u64>,
}
