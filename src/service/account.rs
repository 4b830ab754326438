use crate::auth::auth::AuthUser;
use crate::auth::identity;
use crate::auth::jwt::generate_access_token;
use crate::auth::password::{hash_password, verify_password};
use crate::config::Config;
use crate::error::AppError;
use crate::model::role::Role;
use crate::model::user::{NewUser, UpdateProfile, User};
use crate::models::{AuthResponse, LoginReqDto, RegisterReq};
use crate::service::require_text;
use crate::store::Store;
use crate::utils::EmailIndex;
use crate::utils::email_filter::normalize;
use tracing::{debug, error, info, instrument};

fn issue_token(user: &User, config: &Config) -> Result<AuthResponse, AppError> {
    let token = generate_access_token(
        user.id,
        &user.email,
        user.role,
        &config.jwt_secret,
        config.access_token_ttl,
    )
    .map_err(|e| {
        error!(error = %e, user_id = user.id, "Failed to sign token");
        AppError::Internal("Failed to issue token".to_string())
    })?;

    Ok(AuthResponse {
        token,
        role: user.role.as_str().to_string(),
        name: user.name.clone(),
        id: user.id,
    })
}

/// Creates an institute or manager account and signs a session token for it.
#[instrument(
    name = "account_register",
    skip(store, index, config, req),
    fields(email = %req.email)
)]
pub async fn register(
    store: &dyn Store,
    index: &EmailIndex,
    config: &Config,
    req: &RegisterReq,
    role: Role,
) -> Result<AuthResponse, AppError> {
    let email = normalize(&req.email);
    require_text(&email, "email")?;
    if req.password.is_empty() {
        return Err(AppError::InvalidArgument("password must not be empty".to_string()));
    }

    if !index.is_available(&email, store).await {
        info!("Registration rejected: email already exists");
        return Err(AppError::Conflict("Email already exists".to_string()));
    }

    let institute_id = match role {
        Role::Institute => None,
        Role::Manager => {
            let id = req.institute_id.ok_or_else(|| {
                AppError::InvalidArgument("institute_id is required for managers".to_string())
            })?;
            match store.find_user(id).await? {
                Some(parent) if parent.role == Role::Institute => Some(parent.id),
                _ => return Err(AppError::not_found("Institute")),
            }
        }
    };

    let password_hash = hash_password(&req.password).map_err(|e| {
        error!(error = %e, "Password hashing failed");
        AppError::Internal("Failed to register user".to_string())
    })?;

    let user = store
        .insert_user(NewUser {
            email,
            password_hash,
            name: req.name.clone(),
            role,
            mobile: req.mobile.clone(),
            institute_id,
        })
        .await?;
    index.record(&user.email).await;

    info!(user_id = user.id, "Account registered");
    issue_token(&user, config)
}

/// Verifies credentials for the given role; any mismatch is Unauthorized.
#[instrument(name = "account_login", skip(store, config, req), fields(email = %req.email))]
pub async fn login(
    store: &dyn Store,
    config: &Config,
    req: &LoginReqDto,
    role: Role,
) -> Result<AuthResponse, AppError> {
    let invalid = || AppError::Unauthorized("Invalid credentials".to_string());

    let email = normalize(&req.email);
    if email.is_empty() || req.password.is_empty() {
        return Err(invalid());
    }

    let user = match store.find_user_by_email(&email).await? {
        Some(user) if user.role == role => user,
        Some(_) => {
            info!("Invalid credentials: role mismatch");
            return Err(invalid());
        }
        None => {
            info!("Invalid credentials: user not found");
            return Err(invalid());
        }
    };

    debug!(user_id = user.id, "Verifying password");
    if let Err(e) = verify_password(&req.password, &user.password_hash) {
        info!(error = %e, "Invalid credentials: password mismatch");
        return Err(invalid());
    }

    info!(user_id = user.id, "Login successful");
    issue_token(&user, config)
}

pub async fn profile(store: &dyn Store, auth: &AuthUser) -> Result<User, AppError> {
    identity::current_user(store, auth).await
}

pub async fn list_institutes(store: &dyn Store) -> Result<Vec<User>, AppError> {
    store.list_institutes().await
}

pub async fn get_institute(store: &dyn Store, id: u64) -> Result<User, AppError> {
    match store.find_user(id).await? {
        Some(user) if user.role == Role::Institute => Ok(user),
        _ => Err(AppError::not_found("Institute")),
    }
}

/// Full replace of name, email and mobile; only the institute itself may do it.
pub async fn update_institute(
    store: &dyn Store,
    index: &EmailIndex,
    auth: &AuthUser,
    id: u64,
    profile: UpdateProfile,
) -> Result<User, AppError> {
    let existing = get_institute(store, id).await?;
    auth.require_self_institute(id)?;
    identity::current_user(store, auth).await?;

    require_text(&profile.name, "name")?;
    let profile = UpdateProfile {
        email: normalize(&profile.email),
        ..profile
    };
    require_text(&profile.email, "email")?;

    let updated = store
        .update_user(id, &profile)
        .await?
        .ok_or_else(|| AppError::not_found("Institute"))?;

    if existing.email != updated.email {
        index.release(&existing.email).await;
        index.record(&updated.email).await;
    }
    Ok(updated)
}

/// Deletes the institute together with its managers and everything it owns.
pub async fn delete_institute(
    store: &dyn Store,
    index: &EmailIndex,
    auth: &AuthUser,
    id: u64,
) -> Result<(), AppError> {
    let existing = get_institute(store, id).await?;
    auth.require_self_institute(id)?;
    identity::current_user(store, auth).await?;

    let managers = store.list_managers(id).await?;
    if !store.delete_user(id).await? {
        return Err(AppError::not_found("Institute"));
    }

    index.release(&existing.email).await;
    for manager in managers {
        index.release(&manager.email).await;
    }
    info!(institute_id = id, "Institute deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::verify_token;
    use crate::store::InMemoryStore;

    fn register_req(email: &str, institute_id: Option<u64>) -> RegisterReq {
        RegisterReq {
            email: email.to_string(),
            password: "p".to_string(),
            name: Some("Acme".to_string()),
            mobile: None,
            institute_id,
        }
    }

    fn login_req(email: &str, password: &str) -> LoginReqDto {
        LoginReqDto {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    fn principal(user: &AuthResponse, email: &str, role: Role) -> AuthUser {
        AuthUser {
            user_id: user.id,
            email: email.to_string(),
            role,
        }
    }

    #[actix_web::test]
    async fn duplicate_registration_conflicts_without_new_row() {
        let store = InMemoryStore::new();
        let index = EmailIndex::default();
        let config = Config::for_tests();

        let first = register(&store, &index, &config, &register_req("a@x.com", None), Role::Institute)
            .await
            .unwrap();
        assert_eq!(first.role, "INSTITUTE");
        assert_eq!(first.name.as_deref(), Some("Acme"));
        assert_eq!(verify_token(&first.token, &config.jwt_secret).unwrap().sub, "a@x.com");

        let again = register(&store, &index, &config, &register_req("A@x.com ", None), Role::Institute)
            .await
            .unwrap_err();
        assert!(matches!(again, AppError::Conflict(_)));
        assert_eq!(store.list_institutes().await.unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn store_is_authoritative_when_index_is_cold() {
        let store = InMemoryStore::new();
        let config = Config::for_tests();
        register(&store, &EmailIndex::default(), &config, &register_req("a@x.com", None), Role::Institute)
            .await
            .unwrap();

        let cold = EmailIndex::default();
        let err = register(&store, &cold, &config, &register_req("a@x.com", None), Role::Institute)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[actix_web::test]
    async fn manager_needs_an_existing_institute() {
        let store = InMemoryStore::new();
        let index = EmailIndex::default();
        let config = Config::for_tests();

        let missing = register(&store, &index, &config, &register_req("m@x.com", Some(99)), Role::Manager)
            .await
            .unwrap_err();
        assert!(matches!(missing, AppError::NotFound(_)));

        let institute = register(&store, &index, &config, &register_req("a@x.com", None), Role::Institute)
            .await
            .unwrap();
        let manager = register(
            &store,
            &index,
            &config,
            &register_req("m@x.com", Some(institute.id)),
            Role::Manager,
        )
        .await
        .unwrap();

        let stored = store.find_user(manager.id).await.unwrap().unwrap();
        assert_eq!(stored.institute_id, Some(institute.id));
        assert_ne!(stored.password_hash, "p");
    }

    #[actix_web::test]
    async fn login_checks_password_and_role() {
        let store = InMemoryStore::new();
        let index = EmailIndex::default();
        let config = Config::for_tests();
        register(&store, &index, &config, &register_req("a@x.com", None), Role::Institute)
            .await
            .unwrap();

        let ok = login(&store, &config, &login_req("a@x.com", "p"), Role::Institute)
            .await
            .unwrap();
        assert_eq!(ok.role, "INSTITUTE");

        for (req, role) in [
            (login_req("a@x.com", "nope"), Role::Institute),
            (login_req("a@x.com", "p"), Role::Manager),
            (login_req("ghost@x.com", "p"), Role::Institute),
        ] {
            let err = login(&store, &config, &req, role).await.unwrap_err();
            assert!(matches!(err, AppError::Unauthorized(_)));
        }
    }

    #[actix_web::test]
    async fn institute_updates_only_itself_and_frees_old_email() {
        let store = InMemoryStore::new();
        let index = EmailIndex::default();
        let config = Config::for_tests();
        let a = register(&store, &index, &config, &register_req("a@x.com", None), Role::Institute)
            .await
            .unwrap();
        let b = register(&store, &index, &config, &register_req("b@x.com", None), Role::Institute)
            .await
            .unwrap();

        let changes = UpdateProfile {
            name: "Acme Two".to_string(),
            email: "new@x.com".to_string(),
            mobile: None,
        };
        let forbidden = update_institute(
            &store,
            &index,
            &principal(&b, "b@x.com", Role::Institute),
            a.id,
            changes.clone(),
        )
        .await
        .unwrap_err();
        assert!(matches!(forbidden, AppError::Forbidden(_)));

        let updated = update_institute(
            &store,
            &index,
            &principal(&a, "a@x.com", Role::Institute),
            a.id,
            changes,
        )
        .await
        .unwrap();
        assert_eq!(updated.email, "new@x.com");
        assert_eq!(updated.name.as_deref(), Some("Acme Two"));

        let stale = principal(&a, "a@x.com", Role::Institute);
        let err = delete_institute(&store, &index, &stale, a.id).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
        let err = profile(&store, &stale).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));

        assert!(index.is_available("a@x.com", &store).await);
        register(&store, &index, &config, &register_req("a@x.com", None), Role::Institute)
            .await
            .unwrap();
    }

    #[actix_web::test]
    async fn deleting_institute_removes_its_managers() {
        let store = InMemoryStore::new();
        let index = EmailIndex::default();
        let config = Config::for_tests();
        let a = register(&store, &index, &config, &register_req("a@x.com", None), Role::Institute)
            .await
            .unwrap();
        register(&store, &index, &config, &register_req("m@x.com", Some(a.id)), Role::Manager)
            .await
            .unwrap();

        delete_institute(&store, &index, &principal(&a, "a@x.com", Role::Institute), a.id)
            .await
            .unwrap();

        assert!(store.find_user_by_email("m@x.com").await.unwrap().is_none());
        assert!(index.is_available("m@x.com", &store).await);
        let gone = get_institute(&store, a.id).await.unwrap_err();
        assert!(matches!(gone, AppError::NotFound(_)));
    }
}
