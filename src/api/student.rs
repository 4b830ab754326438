use crate::{
    auth::{auth::AuthUser, identity::Tenant},
    model::student::{Student, StudentInput},
    service::student,
    store::Store,
};
use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Exact roll number
    pub q: String,
}

#[utoipa::path(
    get,
    path = "/api/students",
    responses(
        (status = 200, description = "Students of the caller's institute", body = [Student]),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Student",
    security(("bearer_auth" = []))
)]
pub async fn list_students(
    auth: AuthUser,
    store: web::Data<dyn Store>,
) -> actix_web::Result<impl Responder> {
    let tenant = Tenant::of(store.get_ref(), &auth).await?;
    let students = student::list(store.get_ref(), tenant).await?;
    Ok(HttpResponse::Ok().json(students))
}

#[utoipa::path(
    get,
    path = "/api/students/{id}",
    params(("id" = u64, Path, description = "Student id")),
    responses(
        (status = 200, description = "Student", body = Student),
        (status = 404, description = "Student not found", body = Object, example = json!({"error": "Student not found"}))
    ),
    tag = "Student",
    security(("bearer_auth" = []))
)]
pub async fn get_student(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let tenant = Tenant::of(store.get_ref(), &auth).await?;
    let found = student::get(store.get_ref(), tenant, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(found))
}

/// Create a student; it always starts ACTIVE
#[utoipa::path(
    post,
    path = "/api/students",
    request_body = StudentInput,
    responses(
        (status = 201, description = "Student created", body = Student),
        (status = 400, description = "Name missing", body = Object, example = json!({"error": "name must not be empty"})),
        (status = 404, description = "A listed batch does not exist")
    ),
    tag = "Student",
    security(("bearer_auth" = []))
)]
pub async fn create_student(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    payload: web::Json<StudentInput>,
) -> actix_web::Result<impl Responder> {
    let tenant = Tenant::of(store.get_ref(), &auth).await?;
    let created = student::create(store.get_ref(), tenant, payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(created))
}

/// Replace a student's fields and batch memberships
#[utoipa::path(
    put,
    path = "/api/students/{id}",
    params(("id" = u64, Path, description = "Student id")),
    request_body = StudentInput,
    responses(
        (status = 200, description = "Student updated", body = Student),
        (status = 400, description = "Name missing"),
        (status = 404, description = "Student or batch not found")
    ),
    tag = "Student",
    security(("bearer_auth" = []))
)]
pub async fn update_student(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
    payload: web::Json<StudentInput>,
) -> actix_web::Result<impl Responder> {
    let tenant = Tenant::of(store.get_ref(), &auth).await?;
    let updated =
        student::update(store.get_ref(), tenant, path.into_inner(), payload.into_inner()).await?;
    Ok(HttpResponse::Ok().json(updated))
}

#[utoipa::path(
    delete,
    path = "/api/students/{id}",
    params(("id" = u64, Path, description = "Student id")),
    responses(
        (status = 200, description = "Student deleted"),
        (status = 404, description = "Student not found")
    ),
    tag = "Student",
    security(("bearer_auth" = []))
)]
pub async fn delete_student(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let tenant = Tenant::of(store.get_ref(), &auth).await?;
    student::delete(store.get_ref(), tenant, path.into_inner()).await?;
    Ok(HttpResponse::Ok().finish())
}

#[utoipa::path(
    patch,
    path = "/api/students/{id}/activate",
    params(("id" = u64, Path, description = "Student id")),
    responses(
        (status = 200, description = "Student is ACTIVE", body = Student),
        (status = 404, description = "Student not found")
    ),
    tag = "Student",
    security(("bearer_auth" = []))
)]
pub async fn activate_student(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let tenant = Tenant::of(store.get_ref(), &auth).await?;
    let updated = student::activate(store.get_ref(), tenant, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(updated))
}

#[utoipa::path(
    patch,
    path = "/api/students/{id}/deactivate",
    params(("id" = u64, Path, description = "Student id")),
    responses(
        (status = 200, description = "Student is INACTIVE", body = Student),
        (status = 404, description = "Student not found")
    ),
    tag = "Student",
    security(("bearer_auth" = []))
)]
pub async fn deactivate_student(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let tenant = Tenant::of(store.get_ref(), &auth).await?;
    let updated = student::deactivate(store.get_ref(), tenant, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(updated))
}

/// Look up students by exact roll number
#[utoipa::path(
    get,
    path = "/api/students/search",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching students, possibly empty", body = [Student]),
        (status = 400, description = "Empty query")
    ),
    tag = "Student",
    security(("bearer_auth" = []))
)]
pub async fn search_students(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    query: web::Query<SearchQuery>,
) -> actix_web::Result<impl Responder> {
    let tenant = Tenant::of(store.get_ref(), &auth).await?;
    let hits = student::search(store.get_ref(), tenant, &query.q).await?;
    Ok(HttpResponse::Ok().json(hits))
}
