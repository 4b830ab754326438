use crate::auth::identity::Tenant;
use crate::error::AppError;
use crate::model::batch::{Batch, BatchInput};
use crate::model::subject::Subject;
use crate::service::require_text;
use crate::store::Store;
use tracing::info;

fn validated(mut input: BatchInput) -> Result<BatchInput, AppError> {
    require_text(&input.name, "name")?;
    input.name = input.name.trim().to_string();
    Ok(input)
}

pub async fn list(store: &dyn Store, tenant: Tenant) -> Result<Vec<Batch>, AppError> {
    store.list_batches(tenant.institute_id).await
}

pub async fn get(store: &dyn Store, tenant: Tenant, id: u64) -> Result<Batch, AppError> {
    store
        .find_batch(tenant.institute_id, id)
        .await?
        .ok_or_else(|| AppError::not_found("Batch"))
}

pub async fn create(store: &dyn Store, tenant: Tenant, input: BatchInput) -> Result<Batch, AppError> {
    let batch = store
        .insert_batch(tenant.institute_id, &validated(input)?)
        .await?;
    info!(batch_id = batch.id, institute_id = tenant.institute_id, "Batch created");
    Ok(batch)
}

pub async fn update(
    store: &dyn Store,
    tenant: Tenant,
    id: u64,
    input: BatchInput,
) -> Result<Batch, AppError> {
    let input = validated(input)?;
    store
        .update_batch(tenant.institute_id, id, &input)
        .await?
        .ok_or_else(|| AppError::not_found("Batch"))
}

/// Also drops the batch's memberships, subject links and attendance.
pub async fn delete(store: &dyn Store, tenant: Tenant, id: u64) -> Result<(), AppError> {
    if !store.delete_batch(tenant.institute_id, id).await? {
        return Err(AppError::not_found("Batch"));
    }
    info!(batch_id = id, institute_id = tenant.institute_id, "Batch deleted");
    Ok(())
}

pub async fn subjects(store: &dyn Store, tenant: Tenant, id: u64) -> Result<Vec<Subject>, AppError> {
    let batch = get(store, tenant, id).await?;
    store.batch_subjects(batch.id).await
}

async fn subject_exists(store: &dyn Store, subject_id: u64) -> Result<(), AppError> {
    match store.find_subject(subject_id).await? {
        Some(_) => Ok(()),
        None => Err(AppError::not_found("Subject")),
    }
}

/// Set insert: adding an associated subject again changes nothing.
pub async fn add_subject(
    store: &dyn Store,
    tenant: Tenant,
    id: u64,
    subject_id: u64,
) -> Result<Batch, AppError> {
    let batch = get(store, tenant, id).await?;
    subject_exists(store, subject_id).await?;
    store.link_subject(batch.id, subject_id).await?;
    get(store, tenant, id).await
}

/// Set remove: an unassociated subject is left alone without error.
pub async fn remove_subject(
    store: &dyn Store,
    tenant: Tenant,
    id: u64,
    subject_id: u64,
) -> Result<Batch, AppError> {
    let batch = get(store, tenant, id).await?;
    subject_exists(store, subject_id).await?;
    store.unlink_subject(batch.id, subject_id).await?;
    get(store, tenant, id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::subject::SubjectInput;
    use crate::store::InMemoryStore;

    const A: Tenant = Tenant { institute_id: 1 };
    const B: Tenant = Tenant { institute_id: 2 };

    fn named(name: &str) -> BatchInput {
        BatchInput {
            name: name.to_string(),
            description: Some("weekday".to_string()),
        }
    }

    async fn subject(store: &InMemoryStore, name: &str) -> u64 {
        store
            .insert_subject(&SubjectInput {
                name: name.to_string(),
                ..Default::default()
            })
            .await
            .unwrap()
            .id
    }

    #[actix_web::test]
    async fn batch_of_one_institute_is_invisible_to_another() {
        let store = InMemoryStore::new();
        let batch = create(&store, A, named("Batch1")).await.unwrap();

        assert!(list(&store, B).await.unwrap().iter().all(|b| b.name != "Batch1"));
        assert_eq!(list(&store, A).await.unwrap(), vec![batch.clone()]);

        for err in [
            get(&store, B, batch.id).await.unwrap_err(),
            update(&store, B, batch.id, named("Hijack")).await.unwrap_err(),
            delete(&store, B, batch.id).await.unwrap_err(),
        ] {
            assert!(matches!(err, AppError::NotFound(_)));
        }
        assert_eq!(get(&store, A, batch.id).await.unwrap().name, "Batch1");
    }

    #[actix_web::test]
    async fn update_clears_missing_description() {
        let store = InMemoryStore::new();
        let batch = create(&store, A, named("Batch1")).await.unwrap();

        let updated = update(
            &store,
            A,
            batch.id,
            BatchInput {
                name: "Batch One".to_string(),
                description: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.name, "Batch One");
        assert_eq!(updated.description, None);
    }

    #[actix_web::test]
    async fn adding_a_subject_twice_is_idempotent() {
        let store = InMemoryStore::new();
        let batch = create(&store, A, named("Batch1")).await.unwrap();
        let physics = subject(&store, "Physics").await;

        let once = add_subject(&store, A, batch.id, physics).await.unwrap();
        let twice = add_subject(&store, A, batch.id, physics).await.unwrap();
        assert_eq!(once.subject_ids, vec![physics]);
        assert_eq!(twice, once);

        let listed = subjects(&store, A, batch.id).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "Physics");
    }

    #[actix_web::test]
    async fn removing_an_unassociated_subject_is_a_no_op() {
        let store = InMemoryStore::new();
        let batch = create(&store, A, named("Batch1")).await.unwrap();
        let physics = subject(&store, "Physics").await;
        let chemistry = subject(&store, "Chemistry").await;
        add_subject(&store, A, batch.id, physics).await.unwrap();

        let after = remove_subject(&store, A, batch.id, chemistry).await.unwrap();
        assert_eq!(after.subject_ids, vec![physics]);

        let emptied = remove_subject(&store, A, batch.id, physics).await.unwrap();
        assert!(emptied.subject_ids.is_empty());
    }

    #[actix_web::test]
    async fn unknown_subject_or_foreign_batch_is_not_found() {
        let store = InMemoryStore::new();
        let batch = create(&store, A, named("Batch1")).await.unwrap();
        let physics = subject(&store, "Physics").await;

        let missing = add_subject(&store, A, batch.id, 999).await.unwrap_err();
        assert!(matches!(missing, AppError::NotFound(_)));

        let foreign = add_subject(&store, B, batch.id, physics).await.unwrap_err();
        assert!(matches!(foreign, AppError::NotFound(_)));
        assert!(get(&store, A, batch.id).await.unwrap().subject_ids.is_empty());
    }
}
