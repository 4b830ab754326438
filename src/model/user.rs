use crate::model::role::Role;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// An institute or manager account.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct User {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "admin@acme.edu")]
    pub email: String,
    /// PHC-formatted argon2 hash, never serialized.
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[schema(example = "Acme Academy")]
    pub name: Option<String>,
    pub role: Role,
    #[schema(example = "+911234567890", nullable = true)]
    pub mobile: Option<String>,
    /// Parent institute, set only for managers.
    #[schema(example = json!(null), nullable = true)]
    pub institute_id: Option<u64>,
}

/// Values needed to create an account; the password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub name: Option<String>,
    pub role: Role,
    pub mobile: Option<String>,
    pub institute_id: Option<u64>,
}

/// Full-replace payload for an institute profile.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateProfile {
    #[schema(example = "Acme Academy")]
    pub name: String,
    #[schema(example = "admin@acme.edu")]
    pub email: String,
    #[schema(example = "+911234567890", nullable = true)]
    pub mobile: Option<String>,
}
