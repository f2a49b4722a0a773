use std::time::Duration;

use actix_web::middleware::{Logger, NormalizePath};
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_appender::rolling;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use payroll_admin::{
    AppService,
    auth::{password::hash_password, session::SessionStore},
    config::{Config, StoreBackend},
    db::init_db,
    docs::ApiDoc,
    model::{role::Role, user::User},
    payroll::{engine::PayPolicy, service::PayrollService},
    routes::{self, RateLimits},
    store::{Backend, MemoryStore, MySqlStore},
};

async fn open_store(config: &Config) -> Result<Backend> {
    match config.store_backend {
        StoreBackend::MySql => {
            let url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL must be set when STORE_BACKEND=mysql")?;
            let pool = init_db(url).await?;
            Ok(Backend::MySql(MySqlStore::new(pool)))
        }
        StoreBackend::Memory => {
            let store = MemoryStore::new();
            let Some(password) = config.admin_password.as_deref() else {
                warn!("ADMIN_PASSWORD not set; memory store has no accounts and logins will fail");
                return Ok(Backend::Memory(store));
            };

            let password_hash = hash_password(password)
                .map_err(|e| anyhow::anyhow!("Failed to hash admin password: {e}"))?;
            info!(username = %config.admin_username, "Seeding admin account");

            Ok(Backend::Memory(store.with_user(User {
                id: 1,
                username: config.admin_username.clone(),
                password_hash,
                full_name: "Administrator".to_string(),
                role: Role::Admin,
            })))
        }
    }
}

#[actix_web::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(
            EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!(
        backend = %config.store_backend,
        overtime = %config.overtime_mode,
        "Server starting..."
    );

    let backend = open_store(&config).await?;
    let service: Data<AppService> = Data::new(PayrollService::new(
        backend,
        PayPolicy::with_overtime(config.overtime_mode),
    ));
    let sessions = Data::new(SessionStore::new(Duration::from_secs(config.session_ttl)));
    let limits = RateLimits::from_config(&config)?;

    let server_addr = config.server_addr.clone();
    let api_prefix = config.api_prefix.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // wildcard to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(service.clone())
            .app_data(sessions.clone())
            .configure(|cfg| routes::configure(cfg, &api_prefix, &limits))
    })
    .bind(&server_addr)
    .with_context(|| format!("Failed to bind {server_addr}"))?
    .run()
    .await?;

    Ok(())
}
