use crate::auth::auth::AuthUser;
use crate::error::AppError;
use crate::model::role::Role;
use crate::model::user::User;
use crate::store::Store;
use tracing::{error, warn};

/// The institute on whose behalf a request acts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tenant {
    pub institute_id: u64,
}

/// Loads the account a token was issued for, by id. A stored email or role
/// that differs from the claims marks the token as stale.
pub async fn current_user(store: &dyn Store, auth: &AuthUser) -> Result<User, AppError> {
    let user = store
        .find_user(auth.user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;

    if !user.email.eq_ignore_ascii_case(&auth.email) || user.role != auth.role {
        warn!(user_id = user.id, "Token no longer matches its account");
        return Err(AppError::Unauthorized("Session is no longer valid".to_string()));
    }
    Ok(user)
}

/// Resolves the effective institute of a principal: the institute itself,
/// or the parent of a manager. This is the only tenant-isolation step, so
/// every tenant-scoped handler calls it before touching the store.
pub async fn resolve_effective_institute(
    store: &dyn Store,
    principal: &AuthUser,
) -> Result<Tenant, AppError> {
    let user = current_user(store, principal).await?;

    match user.role {
        Role::Institute => Ok(Tenant {
            institute_id: user.id,
        }),
        Role::Manager => match user.institute_id {
            Some(institute_id) => Ok(Tenant { institute_id }),
            None => {
                error!(user_id = user.id, "Manager has no linked institute");
                Err(AppError::DataIntegrity(format!(
                    "manager {} has no institute",
                    user.id
                )))
            }
        },
    }
}

impl Tenant {
    pub async fn of(store: &dyn Store, auth: &AuthUser) -> Result<Tenant, AppError> {
        resolve_effective_institute(store, auth).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::user::{NewUser, UpdateProfile};
    use crate::store::InMemoryStore;

    fn account(email: &str, role: Role, institute_id: Option<u64>) -> NewUser {
        NewUser {
            email: email.to_string(),
            password_hash: "hash".to_string(),
            name: None,
            role,
            mobile: None,
            institute_id,
        }
    }

    fn principal(user: &User) -> AuthUser {
        AuthUser {
            user_id: user.id,
            email: user.email.clone(),
            role: user.role,
        }
    }

    #[actix_web::test]
    async fn institute_resolves_to_itself_and_manager_to_parent() {
        let store = InMemoryStore::new();
        let institute = store
            .insert_user(account("a@x.com", Role::Institute, None))
            .await
            .unwrap();
        let manager = store
            .insert_user(account("m@x.com", Role::Manager, Some(institute.id)))
            .await
            .unwrap();

        let direct = Tenant::of(&store, &principal(&institute)).await.unwrap();
        let via_manager = Tenant::of(&store, &principal(&manager)).await.unwrap();

        assert_eq!(direct.institute_id, institute.id);
        assert_eq!(via_manager, direct);
    }

    #[actix_web::test]
    async fn unknown_principal_is_not_found() {
        let store = InMemoryStore::new();
        let ghost = AuthUser {
            user_id: 42,
            email: "ghost@x.com".to_string(),
            role: Role::Institute,
        };
        let err = Tenant::of(&store, &ghost).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[actix_web::test]
    async fn orphaned_manager_is_a_data_integrity_error() {
        let store = InMemoryStore::new();
        let manager = store
            .insert_user(account("m@x.com", Role::Manager, None))
            .await
            .unwrap();

        let err = Tenant::of(&store, &principal(&manager)).await.unwrap_err();
        assert!(matches!(err, AppError::DataIntegrity(_)));
    }

    #[actix_web::test]
    async fn token_for_a_changed_email_never_follows_the_old_address() {
        let store = InMemoryStore::new();
        let first = store
            .insert_user(account("a@x.com", Role::Institute, None))
            .await
            .unwrap();
        let stale = principal(&first);

        store
            .update_user(
                first.id,
                &UpdateProfile {
                    name: "First".to_string(),
                    email: "new@x.com".to_string(),
                    mobile: None,
                },
            )
            .await
            .unwrap();
        let second = store
            .insert_user(account("a@x.com", Role::Institute, None))
            .await
            .unwrap();

        let err = Tenant::of(&store, &stale).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
        let err = current_user(&store, &stale).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));

        let tenant = Tenant::of(&store, &principal(&second)).await.unwrap();
        assert_eq!(tenant.institute_id, second.id);
    }

    #[actix_web::test]
    async fn role_mismatch_is_unauthorized() {
        let store = InMemoryStore::new();
        let institute = store
            .insert_user(account("a@x.com", Role::Institute, None))
            .await
            .unwrap();
        let forged = AuthUser {
            role: Role::Manager,
            ..principal(&institute)
        };

        let err = Tenant::of(&store, &forged).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }
}
