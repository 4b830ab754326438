use crate::model::attendance::{
    Attendance, AttendanceDetail, AttendanceDetailRequest, AttendanceStatus, MarkAttendanceRequest,
    OverallStats,
};
use crate::model::batch::{AddSubjectRequest, Batch, BatchInput};
use crate::model::role::Role;
use crate::model::student::{Student, StudentInput, StudentStatus};
use crate::model::subject::{Subject, SubjectInput};
use crate::model::user::{UpdateProfile, User};
use crate::models::{AuthResponse, LoginReqDto, RegisterReq};
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

/// Registers the `bearer_auth` scheme referenced by protected paths.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Attendify API",
        version = "1.0.0",
        description = r#"
## Attendify: Institute Attendance Tracking

Multi-tenant backend for coaching institutes and schools. Every institute is a
tenant; managers act on behalf of exactly one institute.

### Key Features
- **Accounts**
  - Institute and manager registration, role-specific login
- **Roster**
  - Students with activate/deactivate, batches and shared subjects
- **Attendance**
  - Per-sitting marking (date + batch + optional subject), date queries and statistics

### Security
All endpoints except registration, login and the reference lists require a
**JWT Bearer** token. Data is always scoped to the caller's institute.

### Errors
Failures return `{"error": "<message>"}` with 400, 401, 403, 404, 409 or 500.
"#,
    ),
    paths(
        crate::auth::handlers::register_institute,
        crate::auth::handlers::register_manager,
        crate::auth::handlers::login_institute,
        crate::auth::handlers::login_manager,
        crate::auth::handlers::verify,
        crate::auth::handlers::me,

        crate::api::institute::list_institutes,
        crate::api::institute::get_institute,
        crate::api::institute::update_institute,
        crate::api::institute::delete_institute,

        crate::api::student::list_students,
        crate::api::student::get_student,
        crate::api::student::create_student,
        crate::api::student::update_student,
        crate::api::student::delete_student,
        crate::api::student::activate_student,
        crate::api::student::deactivate_student,
        crate::api::student::search_students,

        crate::api::batch::list_batches,
        crate::api::batch::get_batch,
        crate::api::batch::create_batch,
        crate::api::batch::update_batch,
        crate::api::batch::delete_batch,
        crate::api::batch::batch_subjects,
        crate::api::batch::add_subject,
        crate::api::batch::remove_subject,

        crate::api::subject::list_subjects,
        crate::api::subject::get_subject,
        crate::api::subject::create_subject,
        crate::api::subject::update_subject,
        crate::api::subject::delete_subject,

        crate::api::attendance::mark_attendance,
        crate::api::attendance::attendance_by_date,
        crate::api::attendance::overall_stats,

        crate::api::master_data::class_levels,
        crate::api::master_data::boards,
        crate::api::master_data::streams
    ),
    components(
        schemas(
            RegisterReq,
            LoginReqDto,
            AuthResponse,
            Role,
            User,
            UpdateProfile,
            Student,
            StudentInput,
            StudentStatus,
            Batch,
            BatchInput,
            AddSubjectRequest,
            Subject,
            SubjectInput,
            Attendance,
            AttendanceDetail,
            AttendanceStatus,
            MarkAttendanceRequest,
            AttendanceDetailRequest,
            OverallStats
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Registration, login and session APIs"),
        (name = "Institute", description = "Institute account APIs"),
        (name = "Student", description = "Student roster APIs"),
        (name = "Batch", description = "Batch and batch-subject APIs"),
        (name = "Subject", description = "Shared subject APIs"),
        (name = "Attendance", description = "Attendance marking and reporting APIs"),
        (name = "Master Data", description = "Static reference lists"),
    )
)]
pub struct ApiDoc;
