use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString, IntoStaticStr};
use utoipa::{IntoParams, ToSchema};

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, IntoStaticStr, ToSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
    Leave,
}

impl AttendanceStatus {
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// One sitting of a batch (optionally for a subject) on a date.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Attendance {
    #[schema(example = 11)]
    pub id: u64,
    #[schema(example = "2026-01-15", value_type = String, format = "date")]
    pub date: NaiveDate,
    pub batch_id: u64,
    pub subject_id: Option<u64>,
    pub institute_id: u64,
    pub details: Vec<AttendanceDetail>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct AttendanceDetail {
    pub id: u64,
    pub student_id: u64,
    pub status: AttendanceStatus,
}

/// A validated sitting ready to be persisted as one unit.
#[derive(Debug, Clone)]
pub struct NewAttendance {
    pub date: NaiveDate,
    pub batch_id: u64,
    pub subject_id: Option<u64>,
    pub institute_id: u64,
    pub details: Vec<(u64, AttendanceStatus)>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[schema(example = json!({
    "batch_id": 3,
    "subject_id": 2,
    "attendance_date": "2026-01-15",
    "attendance_details": [
        { "student_id": 7, "status": "PRESENT" },
        { "student_id": 8, "status": "LATE" }
    ]
}))]
pub struct MarkAttendanceRequest {
    pub batch_id: u64,
    pub subject_id: Option<u64>,
    #[schema(value_type = String, format = "date")]
    pub attendance_date: NaiveDate,
    #[serde(default)]
    pub attendance_details: Vec<AttendanceDetailRequest>,
}

/// Status stays a raw string so unknown values reach validation as a 400.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AttendanceDetailRequest {
    pub student_id: u64,
    #[schema(example = "PRESENT")]
    pub status: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AttendanceQuery {
    /// Day of the sitting (YYYY-MM-DD)
    #[param(value_type = String, format = "date")]
    pub date: NaiveDate,
    /// Keep only this batch
    pub batch_id: Option<u64>,
    /// Keep only this subject; sittings without a subject are dropped
    pub subject_id: Option<u64>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StatsQuery {
    /// Inclusive lower bound
    #[param(value_type = Option<String>, format = "date")]
    pub from: Option<NaiveDate>,
    /// Inclusive upper bound
    #[param(value_type = Option<String>, format = "date")]
    pub to: Option<NaiveDate>,
}

/// Detail totals for an institute over a date range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub total: i64,
    pub present: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct OverallStats {
    pub total_students: i64,
    pub total_batches: i64,
    pub total_records: i64,
    pub present_count: i64,
    /// Percentage of PRESENT details, null when nothing has been marked.
    #[schema(example = 92.5, nullable = true)]
    pub attendance_rate: Option<f64>,
}
