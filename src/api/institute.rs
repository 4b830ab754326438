use crate::{
    auth::auth::AuthUser,
    model::user::{UpdateProfile, User},
    service::account,
    store::Store,
    utils::EmailIndex,
};
use actix_web::{HttpResponse, Responder, web};

#[utoipa::path(
    get,
    path = "/api/institute",
    responses((status = 200, description = "Every registered institute", body = [User])),
    tag = "Institute",
    security(("bearer_auth" = []))
)]
pub async fn list_institutes(
    _auth: AuthUser,
    store: web::Data<dyn Store>,
) -> actix_web::Result<impl Responder> {
    Ok(HttpResponse::Ok().json(account::list_institutes(store.get_ref()).await?))
}

#[utoipa::path(
    get,
    path = "/api/institute/{id}",
    params(("id" = u64, Path, description = "Institute id")),
    responses(
        (status = 200, description = "Institute", body = User),
        (status = 404, description = "Institute not found")
    ),
    tag = "Institute",
    security(("bearer_auth" = []))
)]
pub async fn get_institute(
    _auth: AuthUser,
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let institute = account::get_institute(store.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(institute))
}

/// Replace the caller's own institute profile
#[utoipa::path(
    put,
    path = "/api/institute/{id}",
    params(("id" = u64, Path, description = "Institute id")),
    request_body = UpdateProfile,
    responses(
        (status = 200, description = "Institute updated", body = User),
        (status = 403, description = "Not the caller's own institute"),
        (status = 404, description = "Institute not found"),
        (status = 409, description = "Email belongs to another account")
    ),
    tag = "Institute",
    security(("bearer_auth" = []))
)]
pub async fn update_institute(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    index: web::Data<EmailIndex>,
    path: web::Path<u64>,
    payload: web::Json<UpdateProfile>,
) -> actix_web::Result<impl Responder> {
    let updated = account::update_institute(
        store.get_ref(),
        &index,
        &auth,
        path.into_inner(),
        payload.into_inner(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(updated))
}

/// Delete the caller's own institute with its managers, roster and attendance
#[utoipa::path(
    delete,
    path = "/api/institute/{id}",
    params(("id" = u64, Path, description = "Institute id")),
    responses(
        (status = 200, description = "Institute deleted"),
        (status = 403, description = "Not the caller's own institute"),
        (status = 404, description = "Institute not found")
    ),
    tag = "Institute",
    security(("bearer_auth" = []))
)]
pub async fn delete_institute(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    index: web::Data<EmailIndex>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    account::delete_institute(store.get_ref(), &index, &auth, path.into_inner()).await?;
    Ok(HttpResponse::Ok().finish())
}
