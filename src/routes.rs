use crate::{
    api::{attendance, batch, institute, master_data, student, subject},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{
    middleware::{Condition, from_fn},
    web,
};
use anyhow::anyhow;
use std::sync::Arc;

type Limiter = Arc<Governor<PeerIpKeyExtractor, NoOpMiddleware>>;

/// Per-IP quotas, built once so every worker shares the same buckets.
#[derive(Clone)]
pub struct Limiters {
    enabled: bool,
    login: Limiter,
    register: Limiter,
    protected: Limiter,
}

impl Limiters {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        fn build_limiter(requests_per_min: u32) -> anyhow::Result<Limiter> {
            let requests_per_min = requests_per_min.max(1);
            let per_ms = (60_000 / requests_per_min as u64).max(1);
            let cfg = GovernorConfigBuilder::default()
                .per_millisecond(per_ms)
                .burst_size(requests_per_min)
                .key_extractor(PeerIpKeyExtractor)
                .finish()
                .ok_or_else(|| anyhow!("invalid rate limit: {requests_per_min}/min"))?;
            Ok(Arc::new(Governor::new(&cfg)))
        }

        Ok(Self {
            enabled: config.rate_limit_enabled,
            login: build_limiter(config.rate_login_per_min)?,
            register: build_limiter(config.rate_register_per_min)?,
            protected: build_limiter(config.rate_protected_per_min)?,
        })
    }

    fn guard(&self, limiter: &Limiter) -> Condition<Limiter> {
        Condition::new(self.enabled, limiter.clone())
    }
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config, limiters: &Limiters) {
    let prefix = config.api_prefix.as_str();

    // Public routes
    cfg.service(
        web::resource(format!("{prefix}/institute/register"))
            .wrap(limiters.guard(&limiters.register))
            .route(web::post().to(handlers::register_institute)),
    )
    .service(
        web::resource(format!("{prefix}/manager/register"))
            .wrap(limiters.guard(&limiters.register))
            .route(web::post().to(handlers::register_manager)),
    )
    .service(
        web::resource(format!("{prefix}/institute/login"))
            .wrap(limiters.guard(&limiters.login))
            .route(web::post().to(handlers::login_institute)),
    )
    .service(
        web::resource(format!("{prefix}/manager/login"))
            .wrap(limiters.guard(&limiters.login))
            .route(web::post().to(handlers::login_manager)),
    )
    .service(
        web::resource(format!("{prefix}/class-levels"))
            .route(web::get().to(master_data::class_levels)),
    )
    .service(web::resource(format!("{prefix}/boards")).route(web::get().to(master_data::boards)))
    .service(web::resource(format!("{prefix}/streams")).route(web::get().to(master_data::streams)));

    // Protected routes
    cfg.service(
        web::scope(prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(limiters.guard(&limiters.protected)) // rate limiting
            .service(
                web::scope("/auth")
                    .service(web::resource("/verify").route(web::get().to(handlers::verify)))
                    .service(web::resource("/me").route(web::get().to(handlers::me))),
            )
            .service(
                web::scope("/institute")
                    // /institute
                    .service(web::resource("").route(web::get().to(institute::list_institutes)))
                    // /institute/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(institute::get_institute))
                            .route(web::put().to(institute::update_institute))
                            .route(web::delete().to(institute::delete_institute)),
                    ),
            )
            .service(
                web::scope("/students")
                    // /students
                    .service(
                        web::resource("")
                            .route(web::get().to(student::list_students))
                            .route(web::post().to(student::create_student)),
                    )
                    // /students/search, ahead of /{id}
                    .service(
                        web::resource("/search").route(web::get().to(student::search_students)),
                    )
                    // /students/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(student::get_student))
                            .route(web::put().to(student::update_student))
                            .route(web::delete().to(student::delete_student)),
                    )
                    .service(
                        web::resource("/{id}/activate")
                            .route(web::patch().to(student::activate_student)),
                    )
                    .service(
                        web::resource("/{id}/deactivate")
                            .route(web::patch().to(student::deactivate_student)),
                    ),
            )
            .service(
                web::scope("/batches")
                    // /batches
                    .service(
                        web::resource("")
                            .route(web::get().to(batch::list_batches))
                            .route(web::post().to(batch::create_batch)),
                    )
                    // /batches/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(batch::get_batch))
                            .route(web::put().to(batch::update_batch))
                            .route(web::delete().to(batch::delete_batch)),
                    )
                    // /batches/{id}/subjects
                    .service(
                        web::resource("/{id}/subjects")
                            .route(web::get().to(batch::batch_subjects))
                            .route(web::post().to(batch::add_subject)),
                    )
                    .service(
                        web::resource("/{id}/subjects/{subject_id}")
                            .route(web::delete().to(batch::remove_subject)),
                    ),
            )
            .service(
                web::scope("/subjects")
                    .service(
                        web::resource("")
                            .route(web::get().to(subject::list_subjects))
                            .route(web::post().to(subject::create_subject)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(subject::get_subject))
                            .route(web::put().to(subject::update_subject))
                            .route(web::delete().to(subject::delete_subject)),
                    ),
            )
            .service(
                web::scope("/attendance")
                    // /attendance
                    .service(
                        web::resource("")
                            .route(web::get().to(attendance::attendance_by_date))
                            .route(web::post().to(attendance::mark_attendance)),
                    )
                    .service(
                        web::resource("/stats/overall")
                            .route(web::get().to(attendance::overall_stats)),
                    ),
            ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AuthResponse;
    use crate::store::{InMemoryStore, Store};
    use crate::utils::EmailIndex;
    use actix_web::{
        App,
        http::{StatusCode, header},
        test,
        web::Data,
    };
    use serde_json::{Value, json};

    macro_rules! test_app {
        () => {{
            let config = Config::for_tests();
            let limiters = Limiters::from_config(&config).unwrap();
            let store: Arc<dyn Store> = Arc::new(InMemoryStore::new());
            test::init_service(
                App::new()
                    .app_data(Data::from(store))
                    .app_data(Data::new(EmailIndex::default()))
                    .app_data(Data::new(config.clone()))
                    .configure(|cfg| configure(cfg, &config, &limiters)),
            )
            .await
        }};
    }

    macro_rules! register {
        ($app:expr, $path:expr, $body:expr) => {{
            let req = test::TestRequest::post()
                .uri($path)
                .set_json($body)
                .to_request();
            let resp = test::call_service(&$app, req).await;
            assert_eq!(resp.status(), StatusCode::CREATED);
            let account: AuthResponse = test::read_body_json(resp).await;
            account
        }};
    }

    fn bearer(token: &str) -> (header::HeaderName, String) {
        (header::AUTHORIZATION, format!("Bearer {token}"))
    }

    #[actix_web::test]
    async fn registration_returns_created_then_conflict() {
        let app = test_app!();
        let body = json!({"email": "a@x.com", "password": "p", "name": "Acme"});

        let created = register!(app, "/api/institute/register", body.clone());
        assert_eq!(created.role, "INSTITUTE");
        assert!(!created.token.is_empty());

        let req = test::TestRequest::post()
            .uri("/api/institute/register")
            .set_json(body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        let err: Value = test::read_body_json(resp).await;
        assert_eq!(err["error"], "Email already exists");
    }

    #[actix_web::test]
    async fn protected_routes_need_a_valid_token() {
        let app = test_app!();

        let req = test::TestRequest::get().uri("/api/students").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::get()
            .uri("/api/auth/verify")
            .insert_header(bearer("not-a-jwt"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let account = register!(
            app,
            "/api/institute/register",
            json!({"email": "a@x.com", "password": "p"})
        );
        let req = test::TestRequest::get()
            .uri("/api/auth/verify")
            .insert_header(bearer(&account.token))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, json!({"valid": true}));

        let req = test::TestRequest::get()
            .uri("/api/auth/me")
            .insert_header(bearer(&account.token))
            .to_request();
        let me: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(me["email"], "a@x.com");
        assert!(me.get("password_hash").is_none());
    }

    #[actix_web::test]
    async fn reference_lists_are_public() {
        let app = test_app!();
        let req = test::TestRequest::get().uri("/api/streams").to_request();
        let body: Vec<String> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, vec!["Science", "Commerce", "Arts"]);

        let req = test::TestRequest::get().uri("/api/class-levels").to_request();
        let body: Vec<String> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.len(), 5);
    }

    #[actix_web::test]
    async fn manager_shares_its_institute_and_others_see_nothing() {
        let app = test_app!();
        let a = register!(
            app,
            "/api/institute/register",
            json!({"email": "a@x.com", "password": "p"})
        );
        let b = register!(
            app,
            "/api/institute/register",
            json!({"email": "b@x.com", "password": "p"})
        );
        let manager = register!(
            app,
            "/api/manager/register",
            json!({"email": "m@x.com", "password": "p", "institute_id": a.id})
        );

        let req = test::TestRequest::post()
            .uri("/api/batches")
            .insert_header(bearer(&a.token))
            .set_json(json!({"name": "Batch1"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let list = |token: &str| {
            test::TestRequest::get()
                .uri("/api/batches")
                .insert_header(bearer(token))
                .to_request()
        };
        let seen_by_a: Value = test::call_and_read_body_json(&app, list(&a.token)).await;
        let seen_by_manager: Value = test::call_and_read_body_json(&app, list(&manager.token)).await;
        let seen_by_b: Value = test::call_and_read_body_json(&app, list(&b.token)).await;

        assert_eq!(seen_by_a[0]["name"], "Batch1");
        assert_eq!(seen_by_manager, seen_by_a);
        assert_eq!(seen_by_b, json!([]));
    }

    #[actix_web::test]
    async fn login_is_gated_by_role() {
        let app = test_app!();
        register!(
            app,
            "/api/institute/register",
            json!({"email": "a@x.com", "password": "p"})
        );

        let login = |path: &str| {
            test::TestRequest::post()
                .uri(path)
                .set_json(json!({"email": "a@x.com", "password": "p"}))
                .to_request()
        };
        let ok = test::call_service(&app, login("/api/institute/login")).await;
        assert_eq!(ok.status(), StatusCode::OK);
        let wrong_role = test::call_service(&app, login("/api/manager/login")).await;
        assert_eq!(wrong_role.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn bad_status_is_a_bad_request_and_stores_nothing() {
        let app = test_app!();
        let a = register!(
            app,
            "/api/institute/register",
            json!({"email": "a@x.com", "password": "p"})
        );

        let req = test::TestRequest::post()
            .uri("/api/batches")
            .insert_header(bearer(&a.token))
            .set_json(json!({"name": "Batch1"}))
            .to_request();
        let batch: Value = test::call_and_read_body_json(&app, req).await;
        let req = test::TestRequest::post()
            .uri("/api/students")
            .insert_header(bearer(&a.token))
            .set_json(json!({"name": "Asha", "batch_ids": [batch["id"]]}))
            .to_request();
        let student: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(student["status"], "ACTIVE");

        let req = test::TestRequest::post()
            .uri("/api/attendance")
            .insert_header(bearer(&a.token))
            .set_json(json!({
                "batch_id": batch["id"],
                "attendance_date": "2026-01-15",
                "attendance_details": [{"student_id": student["id"], "status": "MAYBE"}]
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::get()
            .uri("/api/attendance?date=2026-01-15")
            .insert_header(bearer(&a.token))
            .to_request();
        let records: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(records, json!([]));
    }

    #[actix_web::test]
    async fn search_route_is_not_shadowed_by_student_id() {
        let app = test_app!();
        let a = register!(
            app,
            "/api/institute/register",
            json!({"email": "a@x.com", "password": "p"})
        );

        let req = test::TestRequest::post()
            .uri("/api/students")
            .insert_header(bearer(&a.token))
            .set_json(json!({"name": "Asha", "roll_no": "R-1"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let req = test::TestRequest::get()
            .uri("/api/students/search?q=R-1")
            .insert_header(bearer(&a.token))
            .to_request();
        let hits: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(hits[0]["name"], "Asha");
    }

    #[actix_web::test]
    async fn stale_token_does_not_follow_a_reused_email() {
        let app = test_app!();
        let a = register!(
            app,
            "/api/institute/register",
            json!({"email": "a@x.com", "password": "p", "name": "Acme"})
        );

        let req = test::TestRequest::put()
            .uri(&format!("/api/institute/{}", a.id))
            .insert_header(bearer(&a.token))
            .set_json(json!({"name": "Acme", "email": "new@x.com"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let c = register!(
            app,
            "/api/institute/register",
            json!({"email": "a@x.com", "password": "p"})
        );
        let req = test::TestRequest::post()
            .uri("/api/students")
            .insert_header(bearer(&c.token))
            .set_json(json!({"name": "C-secret"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        for uri in ["/api/students", "/api/auth/me"] {
            let req = test::TestRequest::get()
                .uri(uri)
                .insert_header(bearer(&a.token))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{uri}");
        }

        let req = test::TestRequest::post()
            .uri("/api/institute/login")
            .set_json(json!({"email": "new@x.com", "password": "p"}))
            .to_request();
        let fresh: AuthResponse = test::call_and_read_body_json(&app, req).await;
        let req = test::TestRequest::get()
            .uri("/api/students")
            .insert_header(bearer(&fresh.token))
            .to_request();
        let roster: Vec<Value> = test::call_and_read_body_json(&app, req).await;
        assert!(roster.is_empty());
    }
}
