use crate::{
    auth::{auth::AuthUser, identity::Tenant},
    model::{
        batch::{AddSubjectRequest, Batch, BatchInput},
        subject::Subject,
    },
    service::batch,
    store::Store,
};
use actix_web::{HttpResponse, Responder, web};

#[utoipa::path(
    get,
    path = "/api/batches",
    responses(
        (status = 200, description = "Batches of the caller's institute", body = [Batch]),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Batch",
    security(("bearer_auth" = []))
)]
pub async fn list_batches(
    auth: AuthUser,
    store: web::Data<dyn Store>,
) -> actix_web::Result<impl Responder> {
    let tenant = Tenant::of(store.get_ref(), &auth).await?;
    Ok(HttpResponse::Ok().json(batch::list(store.get_ref(), tenant).await?))
}

#[utoipa::path(
    get,
    path = "/api/batches/{id}",
    params(("id" = u64, Path, description = "Batch id")),
    responses(
        (status = 200, description = "Batch", body = Batch),
        (status = 404, description = "Batch not found", body = Object, example = json!({"error": "Batch not found"}))
    ),
    tag = "Batch",
    security(("bearer_auth" = []))
)]
pub async fn get_batch(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let tenant = Tenant::of(store.get_ref(), &auth).await?;
    Ok(HttpResponse::Ok().json(batch::get(store.get_ref(), tenant, path.into_inner()).await?))
}

#[utoipa::path(
    post,
    path = "/api/batches",
    request_body = BatchInput,
    responses(
        (status = 201, description = "Batch created", body = Batch),
        (status = 400, description = "Name missing")
    ),
    tag = "Batch",
    security(("bearer_auth" = []))
)]
pub async fn create_batch(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    payload: web::Json<BatchInput>,
) -> actix_web::Result<impl Responder> {
    let tenant = Tenant::of(store.get_ref(), &auth).await?;
    let created = batch::create(store.get_ref(), tenant, payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(created))
}

#[utoipa::path(
    put,
    path = "/api/batches/{id}",
    params(("id" = u64, Path, description = "Batch id")),
    request_body = BatchInput,
    responses(
        (status = 200, description = "Batch updated", body = Batch),
        (status = 404, description = "Batch not found")
    ),
    tag = "Batch",
    security(("bearer_auth" = []))
)]
pub async fn update_batch(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
    payload: web::Json<BatchInput>,
) -> actix_web::Result<impl Responder> {
    let tenant = Tenant::of(store.get_ref(), &auth).await?;
    let updated =
        batch::update(store.get_ref(), tenant, path.into_inner(), payload.into_inner()).await?;
    Ok(HttpResponse::Ok().json(updated))
}

#[utoipa::path(
    delete,
    path = "/api/batches/{id}",
    params(("id" = u64, Path, description = "Batch id")),
    responses(
        (status = 200, description = "Batch deleted"),
        (status = 404, description = "Batch not found")
    ),
    tag = "Batch",
    security(("bearer_auth" = []))
)]
pub async fn delete_batch(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let tenant = Tenant::of(store.get_ref(), &auth).await?;
    batch::delete(store.get_ref(), tenant, path.into_inner()).await?;
    Ok(HttpResponse::Ok().finish())
}

#[utoipa::path(
    get,
    path = "/api/batches/{id}/subjects",
    params(("id" = u64, Path, description = "Batch id")),
    responses(
        (status = 200, description = "Subjects taught in the batch", body = [Subject]),
        (status = 404, description = "Batch not found")
    ),
    tag = "Batch",
    security(("bearer_auth" = []))
)]
pub async fn batch_subjects(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let tenant = Tenant::of(store.get_ref(), &auth).await?;
    let subjects = batch::subjects(store.get_ref(), tenant, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(subjects))
}

/// Associate a subject with a batch (idempotent)
#[utoipa::path(
    post,
    path = "/api/batches/{id}/subjects",
    params(("id" = u64, Path, description = "Batch id")),
    request_body = AddSubjectRequest,
    responses(
        (status = 200, description = "Batch with its subjects", body = Batch),
        (status = 404, description = "Batch or subject not found")
    ),
    tag = "Batch",
    security(("bearer_auth" = []))
)]
pub async fn add_subject(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
    payload: web::Json<AddSubjectRequest>,
) -> actix_web::Result<impl Responder> {
    let tenant = Tenant::of(store.get_ref(), &auth).await?;
    let updated =
        batch::add_subject(store.get_ref(), tenant, path.into_inner(), payload.subject_id).await?;
    Ok(HttpResponse::Ok().json(updated))
}

/// Drop a subject from a batch; unassociated subjects are ignored
#[utoipa::path(
    delete,
    path = "/api/batches/{id}/subjects/{subject_id}",
    params(
        ("id" = u64, Path, description = "Batch id"),
        ("subject_id" = u64, Path, description = "Subject id")
    ),
    responses(
        (status = 200, description = "Batch with its subjects", body = Batch),
        (status = 404, description = "Batch or subject not found")
    ),
    tag = "Batch",
    security(("bearer_auth" = []))
)]
pub async fn remove_subject(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    path: web::Path<(u64, u64)>,
) -> actix_web::Result<impl Responder> {
    let (id, subject_id) = path.into_inner();
    let tenant = Tenant::of(store.get_ref(), &auth).await?;
    let updated = batch::remove_subject(store.get_ref(), tenant, id, subject_id).await?;
    Ok(HttpResponse::Ok().json(updated))
}
