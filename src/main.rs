use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use anyhow::{Context, Result};
use dotenvy::dotenv;

mod api;
mod auth;
mod calendar;
mod config;
mod db;
mod docs;
mod error;
mod leave;
mod model;
mod models;
mod routes;

use config::{Config, LeaveSourceConfig};
use db::init_db;
use leave::token::TokenManager;
use leave::{HttpLeaveClient, LeaveBackend, MySqlLeaveRepository};

use crate::docs::ApiDoc;
use tracing::info;
use tracing_appender::rolling;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    "Attendance calendar service"
}

async fn leave_backend(config: &Config) -> Result<LeaveBackend> {
    match &config.leave_source {
        LeaveSourceConfig::Database { database_url } => {
            info!("Reading leave records from the HR database");
            let pool = init_db(database_url).await?;
            Ok(LeaveBackend::Database(MySqlLeaveRepository::new(pool)))
        }
        LeaveSourceConfig::Remote(api) => {
            info!(base_url = %api.base_url, "Reading leave records from the leave API");
            let client = HttpLeaveClient::new(
                &api.base_url,
                api.timeout,
                api.max_retries,
                TokenManager::new(api.access_token.clone(), api.refresh_token.clone()),
            )
            .context("Failed to build leave API client")?;
            Ok(LeaveBackend::Remote(client))
        }
    }
}

#[actix_web::main]
async fn main() -> Result<()> {
    dotenv().ok();

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

    let backend = leave_backend(&config).await?;

    let server_addr = config.server_addr.clone();
    let config_data = config.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(Data::new(backend.clone()))
            .app_data(Data::new(config.clone()))
            .service(index)
            .configure(|cfg| routes::configure(cfg, config_data.clone()))
    })
    .bind(&server_addr)
    .with_context(|| format!("Failed to bind {server_addr}"))?
    .run()
    .await?;

    Ok(())
}
