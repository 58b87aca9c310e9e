mod api;
mod config;
mod database;
mod middleware;
mod models;
mod services;
mod state;
#[cfg(test)]
mod test_support;
mod utils;

use actix_cors::Cors;
use actix_web::{
    http::header,
    middleware::{Compress, Logger},
    web, App, HttpServer,
};
use dotenv::dotenv;
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::AppConfig;
use crate::database::{MemoryStore, MongoDB, Store};
use crate::services::{CloudinaryClient, DisabledImageStore, ImageStore, StripeClient};
use crate::state::AppState;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("❌ Invalid configuration: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()));
        }
    };

    log::info!("🚀 Starting Course Store...");

    let store: Arc<dyn Store> = match &config.database_url {
        Some(url) => match MongoDB::new(url).await {
            Ok(db) => {
                log::info!("✅ MongoDB connected successfully");
                Arc::new(db)
            }
            Err(e) => {
                log::error!("❌ Failed to connect to MongoDB: {}", e);
                return Err(std::io::Error::new(std::io::ErrorKind::ConnectionRefused, e.to_string()));
            }
        },
        None => {
            log::warn!("⚠️  DATABASE_URL not set, using the in-memory store (data is lost on restart)");
            Arc::new(MemoryStore::new())
        }
    };

    let images: Arc<dyn ImageStore> = match config.cloudinary.clone() {
        Some(settings) => {
            log::info!("🖼️  Image uploads go to cloud {}", settings.cloud_name);
            Arc::new(CloudinaryClient::new(settings))
        }
        None => {
            log::warn!("⚠️  Cloudinary credentials missing, course image uploads will fail");
            Arc::new(DisabledImageStore)
        }
    };

    let state = web::Data::new(AppState {
        store,
        payments: Arc::new(StripeClient::new(&config.stripe)),
        images,
        auth: config.auth.clone(),
    });

    let host = config.host.clone();
    let port = config.port;
    let allowed_origins = config.allowed_origins.clone();

    log::info!("🌐 Server starting on {}:{}", host, port);
    log::info!("📚 Swagger UI available at: http://{}:{}/swagger-ui/", host, port);
    log::info!("📄 OpenAPI spec at: http://{}:{}/api-docs/openapi.json", host, port);

    // Generate OpenAPI specification
    let openapi = api::swagger::ApiDoc::openapi();

    HttpServer::new(move || {
        let cors = allowed_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .app_data(state.clone())
            .wrap(cors)
            .wrap(middleware::SecurityHeaders)
            .wrap(Compress::default())
            .wrap(Logger::default())
            .service(SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi.clone()))
            .configure(api::configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
