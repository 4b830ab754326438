use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct RegisterReq {
    #[schema(example = "admin@acme.edu")]
    pub email: String,
    #[schema(example = "s3cret")]
    pub password: String,
    #[schema(example = "Acme Academy")]
    pub name: Option<String>,
    #[schema(example = "+911234567890")]
    pub mobile: Option<String>,
    /// Required for manager registration
    #[schema(example = 1)]
    pub institute_id: Option<u64>,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginReqDto {
    #[schema(example = "admin@acme.edu")]
    pub email: String,
    #[schema(example = "s3cret")]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    #[schema(example = "INSTITUTE")]
    pub role: String,
    pub name: Option<String>,
    pub id: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: u64,
    /// Account email
    pub sub: String,
    pub role: String,
    pub exp: usize,
    pub jti: String,
}
