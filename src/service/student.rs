use crate::auth::identity::Tenant;
use crate::error::AppError;
use crate::model::student::{Student, StudentInput, StudentStatus};
use crate::service::require_text;
use crate::store::Store;
use tracing::info;

/// Trims the name, dedupes batch ids and checks each batch belongs to the tenant.
async fn validated(
    store: &dyn Store,
    tenant: Tenant,
    mut input: StudentInput,
) -> Result<StudentInput, AppError> {
    require_text(&input.name, "name")?;
    input.name = input.name.trim().to_string();

    input.batch_ids.sort_unstable();
    input.batch_ids.dedup();
    for batch_id in &input.batch_ids {
        if store.find_batch(tenant.institute_id, *batch_id).await?.is_none() {
            return Err(AppError::not_found("Batch"));
        }
    }
    Ok(input)
}

pub async fn list(store: &dyn Store, tenant: Tenant) -> Result<Vec<Student>, AppError> {
    store.list_students(tenant.institute_id).await
}

pub async fn get(store: &dyn Store, tenant: Tenant, id: u64) -> Result<Student, AppError> {
    store
        .find_student(tenant.institute_id, id)
        .await?
        .ok_or_else(|| AppError::not_found("Student"))
}

pub async fn create(
    store: &dyn Store,
    tenant: Tenant,
    input: StudentInput,
) -> Result<Student, AppError> {
    let input = validated(store, tenant, input).await?;
    let student = store.insert_student(tenant.institute_id, &input).await?;
    info!(student_id = student.id, institute_id = tenant.institute_id, "Student created");
    Ok(student)
}

/// Replaces every editable field and the batch memberships; status is untouched.
pub async fn update(
    store: &dyn Store,
    tenant: Tenant,
    id: u64,
    input: StudentInput,
) -> Result<Student, AppError> {
    get(store, tenant, id).await?;
    let input = validated(store, tenant, input).await?;
    store
        .update_student(tenant.institute_id, id, &input)
        .await?
        .ok_or_else(|| AppError::not_found("Student"))
}

async fn set_status(
    store: &dyn Store,
    tenant: Tenant,
    id: u64,
    status: StudentStatus,
) -> Result<Student, AppError> {
    let student = store
        .set_student_status(tenant.institute_id, id, status)
        .await?
        .ok_or_else(|| AppError::not_found("Student"))?;
    info!(student_id = id, status = %status, "Student status changed");
    Ok(student)
}

pub async fn activate(store: &dyn Store, tenant: Tenant, id: u64) -> Result<Student, AppError> {
    set_status(store, tenant, id, StudentStatus::Active).await
}

pub async fn deactivate(store: &dyn Store, tenant: Tenant, id: u64) -> Result<Student, AppError> {
    set_status(store, tenant, id, StudentStatus::Inactive).await
}

pub async fn delete(store: &dyn Store, tenant: Tenant, id: u64) -> Result<(), AppError> {
    if !store.delete_student(tenant.institute_id, id).await? {
        return Err(AppError::not_found("Student"));
    }
    info!(student_id = id, institute_id = tenant.institute_id, "Student deleted");
    Ok(())
}

/// Exact roll number match within the tenant.
pub async fn search(
    store: &dyn Store,
    tenant: Tenant,
    roll_no: &str,
) -> Result<Vec<Student>, AppError> {
    let roll_no = roll_no.trim();
    require_text(roll_no, "roll_no")?;
    store.find_students_by_roll_no(tenant.institute_id, roll_no).await
}
