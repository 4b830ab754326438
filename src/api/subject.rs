use crate::{
    auth::auth::AuthUser,
    model::subject::{Subject, SubjectInput},
    service::subject,
    store::Store,
};
use actix_web::{HttpResponse, Responder, web};

#[utoipa::path(
    get,
    path = "/api/subjects",
    responses((status = 200, description = "All subjects", body = [Subject])),
    tag = "Subject",
    security(("bearer_auth" = []))
)]
pub async fn list_subjects(
    _auth: AuthUser,
    store: web::Data<dyn Store>,
) -> actix_web::Result<impl Responder> {
    Ok(HttpResponse::Ok().json(subject::list(store.get_ref()).await?))
}

#[utoipa::path(
    get,
    path = "/api/subjects/{id}",
    params(("id" = u64, Path, description = "Subject id")),
    responses(
        (status = 200, description = "Subject", body = Subject),
        (status = 404, description = "Subject not found")
    ),
    tag = "Subject",
    security(("bearer_auth" = []))
)]
pub async fn get_subject(
    _auth: AuthUser,
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    Ok(HttpResponse::Ok().json(subject::get(store.get_ref(), path.into_inner()).await?))
}

#[utoipa::path(
    post,
    path = "/api/subjects",
    request_body = SubjectInput,
    responses(
        (status = 201, description = "Subject created", body = Subject),
        (status = 400, description = "Name missing")
    ),
    tag = "Subject",
    security(("bearer_auth" = []))
)]
pub async fn create_subject(
    _auth: AuthUser,
    store: web::Data<dyn Store>,
    payload: web::Json<SubjectInput>,
) -> actix_web::Result<impl Responder> {
    let created = subject::create(store.get_ref(), payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(created))
}

#[utoipa::path(
    put,
    path = "/api/subjects/{id}",
    params(("id" = u64, Path, description = "Subject id")),
    request_body = SubjectInput,
    responses(
        (status = 200, description = "Subject updated", body = Subject),
        (status = 404, description = "Subject not found")
    ),
    tag = "Subject",
    security(("bearer_auth" = []))
)]
pub async fn update_subject(
    _auth: AuthUser,
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
    payload: web::Json<SubjectInput>,
) -> actix_web::Result<impl Responder> {
    let updated = subject::update(store.get_ref(), path.into_inner(), payload.into_inner()).await?;
    Ok(HttpResponse::Ok().json(updated))
}

#[utoipa::path(
    delete,
    path = "/api/subjects/{id}",
    params(("id" = u64, Path, description = "Subject id")),
    responses(
        (status = 200, description = "Subject deleted"),
        (status = 404, description = "Subject not found"),
        (status = 409, description = "Subject is referenced by attendance")
    ),
    tag = "Subject",
    security(("bearer_auth" = []))
)]
pub async fn delete_subject(
    _auth: AuthUser,
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    subject::delete(store.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().finish())
}
