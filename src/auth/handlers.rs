use crate::{
    auth::auth::AuthUser,
    config::Config,
    model::{role::Role, user::User},
    models::{AuthResponse, LoginReqDto, RegisterReq},
    service::account,
    store::Store,
    utils::EmailIndex,
};
use actix_web::{HttpResponse, Responder, web};
use serde_json::json;
use tracing::info;

async fn register(
    req: web::Json<RegisterReq>,
    store: web::Data<dyn Store>,
    index: web::Data<EmailIndex>,
    config: web::Data<Config>,
    role: Role,
) -> actix_web::Result<HttpResponse> {
    let body = account::register(store.get_ref(), &index, &config, &req, role).await?;
    Ok(HttpResponse::Created().json(body))
}

async fn login(
    req: web::Json<LoginReqDto>,
    store: web::Data<dyn Store>,
    config: web::Data<Config>,
    role: Role,
) -> actix_web::Result<HttpResponse> {
    info!("Login request received");
    let body = account::login(store.get_ref(), &config, &req, role).await?;
    Ok(HttpResponse::Ok().json(body))
}

/// Register an institute
#[utoipa::path(
    post,
    path = "/api/institute/register",
    request_body = RegisterReq,
    responses(
        (status = 201, description = "Institute registered", body = AuthResponse),
        (status = 400, description = "Email or password missing", body = Object, example = json!({"error": "email must not be empty"})),
        (status = 409, description = "Email already registered", body = Object, example = json!({"error": "Email already exists"}))
    ),
    tag = "Auth"
)]
pub async fn register_institute(
    req: web::Json<RegisterReq>,
    store: web::Data<dyn Store>,
    index: web::Data<EmailIndex>,
    config: web::Data<Config>,
) -> actix_web::Result<HttpResponse> {
    register(req, store, index, config, Role::Institute).await
}

/// Register a manager under an existing institute
#[utoipa::path(
    post,
    path = "/api/manager/register",
    request_body = RegisterReq,
    responses(
        (status = 201, description = "Manager registered", body = AuthResponse),
        (status = 400, description = "institute_id missing", body = Object, example = json!({"error": "institute_id is required for managers"})),
        (status = 404, description = "Institute does not exist", body = Object, example = json!({"error": "Institute not found"})),
        (status = 409, description = "Email already registered", body = Object, example = json!({"error": "Email already exists"}))
    ),
    tag = "Auth"
)]
pub async fn register_manager(
    req: web::Json<RegisterReq>,
    store: web::Data<dyn Store>,
    index: web::Data<EmailIndex>,
    config: web::Data<Config>,
) -> actix_web::Result<HttpResponse> {
    register(req, store, index, config, Role::Manager).await
}

#[utoipa::path(
    post,
    path = "/api/institute/login",
    request_body = LoginReqDto,
    responses(
        (status = 200, description = "Session token issued", body = AuthResponse),
        (status = 401, description = "Invalid credentials", body = Object, example = json!({"error": "Invalid credentials"}))
    ),
    tag = "Auth"
)]
pub async fn login_institute(
    req: web::Json<LoginReqDto>,
    store: web::Data<dyn Store>,
    config: web::Data<Config>,
) -> actix_web::Result<HttpResponse> {
    login(req, store, config, Role::Institute).await
}

#[utoipa::path(
    post,
    path = "/api/manager/login",
    request_body = LoginReqDto,
    responses(
        (status = 200, description = "Session token issued", body = AuthResponse),
        (status = 401, description = "Invalid credentials", body = Object, example = json!({"error": "Invalid credentials"}))
    ),
    tag = "Auth"
)]
pub async fn login_manager(
    req: web::Json<LoginReqDto>,
    store: web::Data<dyn Store>,
    config: web::Data<Config>,
) -> actix_web::Result<HttpResponse> {
    login(req, store, config, Role::Manager).await
}

/// Token liveness; reaching the handler means the middleware accepted it.
#[utoipa::path(
    get,
    path = "/api/auth/verify",
    responses(
        (status = 200, description = "Token is valid", body = Object, example = json!({"valid": true})),
        (status = 401, description = "Missing or invalid token")
    ),
    tag = "Auth",
    security(("bearer_auth" = []))
)]
pub async fn verify(_auth: AuthUser) -> impl Responder {
    HttpResponse::Ok().json(json!({ "valid": true }))
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Profile of the caller", body = User),
        (status = 401, description = "Missing, invalid or stale token"),
        (status = 404, description = "Account no longer exists")
    ),
    tag = "Auth",
    security(("bearer_auth" = []))
)]
pub async fn me(auth: AuthUser, store: web::Data<dyn Store>) -> actix_web::Result<impl Responder> {
    let user = account::profile(store.get_ref(), &auth).await?;
    Ok(HttpResponse::Ok().json(user))
}
