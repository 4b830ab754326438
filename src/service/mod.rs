//! Request-independent business rules. Tenant-scoped functions take the
//! resolved [`Tenant`](crate::auth::identity::Tenant) explicitly.

pub mod account;
pub mod attendance;
pub mod batch;
pub mod student;
pub mod subject;

use crate::error::AppError;

pub(crate) fn require_text(value: &str, field: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::InvalidArgument(format!("{field} must not be empty")));
    }
    Ok(())
}
