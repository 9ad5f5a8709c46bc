use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use std::sync::Arc;
use std::time::Duration;

mod api;
mod auth;
mod config;
mod db;
mod docs;
mod error;
mod model;
mod models;
mod overlay;
mod realtime;
mod routes;
mod session;
mod store;
mod utils;

use config::Config;
use db::{init_db, seed_protected_admins};

use crate::auth::magic_link::{LinkSender, LogLinkSender};
use crate::docs::ApiDoc;
use crate::realtime::ChangeFeed;
use crate::session::SessionStore;
use anyhow::Context;
use tracing::{info, warn};
use tracing_appender::rolling;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    "Leave Desk"
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("Server starting...");
    if !config.auth_configured() {
        warn!("MAGIC_LINK_BASE_URL is not set; sign-in is disabled");
    }

    let pool = init_db(&config.database_url).await?;
    seed_protected_admins(&pool, &config.protected_admin_emails).await?;

    let sessions = SessionStore::with_revoked_capacity(
        Duration::from_secs(config.magic_link_ttl),
        Duration::from_secs(config.access_token_ttl as u64),
        config.revoked_session_capacity,
    );
    let feed = ChangeFeed::new();
    let link_sender: Arc<dyn LinkSender> = Arc::new(LogLinkSender);

    let server_addr = config.server_addr.clone();
    let config_data = config.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // wildcard {_:.*} matches JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(Data::new(pool.clone()))
            .app_data(Data::new(config.clone()))
            .app_data(Data::new(sessions.clone()))
            .app_data(Data::new(feed.clone()))
            .app_data(Data::from(link_sender.clone()))
            .service(index)
            // Public, sign-in and session routes with rate limiting
            .configure(|cfg| routes::configure(cfg, config_data.clone()))
    })
    .bind(&server_addr)
    .with_context(|| format!("Failed to bind {server_addr}"))?
    .run()
    .await?;

    Ok(())
}
