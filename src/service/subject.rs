use crate::error::AppError;
use crate::model::subject::{Subject, SubjectInput};
use crate::service::require_text;
use crate::store::Store;

pub async fn list(store: &dyn Store) -> Result<Vec<Subject>, AppError> {
    store.list_subjects().await
}

pub async fn get(store: &dyn Store, id: u64) -> Result<Subject, AppError> {
    store
        .find_subject(id)
        .await?
        .ok_or_else(|| AppError::not_found("Subject"))
}

pub async fn create(store: &dyn Store, input: SubjectInput) -> Result<Subject, AppError> {
    require_text(&input.name, "name")?;
    store.insert_subject(&input).await
}

pub async fn update(store: &dyn Store, id: u64, input: SubjectInput) -> Result<Subject, AppError> {
    require_text(&input.name, "name")?;
    store
        .update_subject(id, &input)
        .await?
        .ok_or_else(|| AppError::not_found("Subject"))
}

/// Drops the subject from every batch. Refused with Conflict while attendance
/// still refers to it.
pub async fn delete(store: &dyn Store, id: u64) -> Result<(), AppError> {
    if !store.delete_subject(id).await? {
        return Err(AppError::not_found("Subject"));
    }
    Ok(())
}
