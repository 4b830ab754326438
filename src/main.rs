use actix_cors::Cors;
use actix_web::middleware::{Logger, NormalizePath};
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use std::sync::Arc;

mod api;
mod auth;
mod config;
mod db;
mod docs;
mod error;
mod model;
mod models;
mod routes;
mod service;
mod store;
mod utils;

use config::Config;
use db::init_db;
use routes::Limiters;
use store::{InMemoryStore, MySqlStore, Store};
use utils::EmailIndex;

use crate::docs::ApiDoc;
use tracing::{error, info, warn};
use tracing_appender::rolling;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

const EMAIL_WARMUP_BATCH: usize = 500;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(config.log_level)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("Server starting...");

    let store: Arc<dyn Store> = match &config.database_url {
        Some(url) => Arc::new(MySqlStore::new(init_db(url).await?)),
        None => {
            warn!("DATABASE_URL not set, using the in-memory store; data is lost on restart");
            Arc::new(InMemoryStore::new())
        }
    };

    let email_index = Data::new(EmailIndex::default());
    let limiters = Limiters::from_config(&config)?;

    let warmup_store = store.clone();
    let warmup_index = email_index.clone();
    actix_web::rt::spawn(async move {
        if let Err(e) = warmup_index
            .warmup(warmup_store.as_ref(), EMAIL_WARMUP_BATCH)
            .await
        {
            error!(error = %e, "Failed to warm up email index");
        }
    });

    let server_addr = config.server_addr.clone();
    let store_data: Data<dyn Store> = Data::from(store);

    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .wrap(NormalizePath::trim())
            .wrap(Logger::default())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(store_data.clone())
            .app_data(email_index.clone())
            .app_data(Data::new(config.clone()))
            // Public and protected API routes with rate limiting
            .configure(|cfg| routes::configure(cfg, &config, &limiters))
    })
    .bind(server_addr)?
    .run()
    .await?;

    Ok(())
}
