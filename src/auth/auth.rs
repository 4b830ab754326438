use crate::error::AppError;
use crate::model::role::Role;
use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload};
use futures::future::{Ready, ready};

/// Authenticated principal, placed in request extensions by the auth middleware.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: u64,
    pub email: String,
    pub role: Role,
}

impl FromRequest for AuthUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        match req.extensions().get::<AuthUser>() {
            Some(user) => ready(Ok(user.clone())),
            None => ready(Err(AppError::Unauthorized("Missing token".to_string()))),
        }
    }
}

impl AuthUser {
    /// Institute accounts may only manage themselves.
    pub fn require_self_institute(&self, institute_id: u64) -> Result<(), AppError> {
        if self.role == Role::Institute && self.user_id == institute_id {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "Only the institute itself may change this account".to_string(),
            ))
        }
    }
}
