use crate::{
    auth::{auth::AuthUser, identity::Tenant},
    model::attendance::{
        Attendance, AttendanceQuery, MarkAttendanceRequest, OverallStats, StatsQuery,
    },
    service::attendance,
    store::Store,
};
use actix_web::{HttpResponse, Responder, web};

/// Mark attendance for a batch sitting
#[utoipa::path(
    post,
    path = "/api/attendance",
    request_body = MarkAttendanceRequest,
    responses(
        (status = 201, description = "Sitting stored with all its details", body = Attendance),
        (status = 400, description = "Unknown status or repeated student", body = Object, example = json!({
            "error": "Unknown attendance status: MAYBE"
        })),
        (status = 404, description = "Batch, subject or student not found"),
        (status = 409, description = "Same sitting marked concurrently; retry"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Attendance",
    security(("bearer_auth" = []))
)]
pub async fn mark_attendance(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    payload: web::Json<MarkAttendanceRequest>,
) -> actix_web::Result<impl Responder> {
    let tenant = Tenant::of(store.get_ref(), &auth).await?;
    let saved = attendance::mark(store.get_ref(), tenant, payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(saved))
}

#[utoipa::path(
    get,
    path = "/api/attendance",
    params(AttendanceQuery),
    responses(
        (status = 200, description = "Sittings on the date, possibly empty", body = [Attendance]),
        (status = 400, description = "Missing or malformed date")
    ),
    tag = "Attendance",
    security(("bearer_auth" = []))
)]
pub async fn attendance_by_date(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    query: web::Query<AttendanceQuery>,
) -> actix_web::Result<impl Responder> {
    let tenant = Tenant::of(store.get_ref(), &auth).await?;
    let records = attendance::by_date(
        store.get_ref(),
        tenant,
        query.date,
        query.batch_id,
        query.subject_id,
    )
    .await?;
    Ok(HttpResponse::Ok().json(records))
}

#[utoipa::path(
    get,
    path = "/api/attendance/stats/overall",
    params(StatsQuery),
    responses(
        (status = 200, description = "Roster totals and attendance rate", body = OverallStats),
        (status = 400, description = "from is after to")
    ),
    tag = "Attendance",
    security(("bearer_auth" = []))
)]
pub async fn overall_stats(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    query: web::Query<StatsQuery>,
) -> actix_web::Result<impl Responder> {
    let tenant = Tenant::of(store.get_ref(), &auth).await?;
    let stats = attendance::overall_stats(store.get_ref(), tenant, query.from, query.to).await?;
    Ok(HttpResponse::Ok().json(stats))
}
