use std::env;

use actix_web::{middleware, web, App, HttpServer};
use anyhow::Result;
use tracing_subscriber::EnvFilter;

use studio_docs::api::{configure_routes, ApiState, AppConfig};

#[actix_web::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Starting studio document service");

    // Load configuration
    let config = load_config()?;
    let max_payload = config.max_payload_bytes;

    // Initialize application state
    let state = web::Data::new(ApiState::new(config)?);

    // Get server settings
    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = env::var("PORT").unwrap_or_else(|_| "8080".to_string()).parse::<u16>()?;

    tracing::info!("Listening on {}:{}", host, port);

    // Start HTTP server
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(web::JsonConfig::default().limit(max_payload))
            .wrap(middleware::Logger::default())
            .wrap(middleware::NormalizePath::trim())
            .configure(configure_routes)
    })
    .bind((host.as_str(), port))?
    .run()
    .await?;

    Ok(())
}

fn load_config() -> Result<AppConfig> {
    let defaults = AppConfig::default();
    let config = AppConfig {
        max_payload_bytes: env::var("MAX_PAYLOAD_BYTES")
            .unwrap_or_else(|_| defaults.max_payload_bytes.to_string())
            .parse()?,
        fetch_timeout_ms: env::var("IMAGE_FETCH_TIMEOUT_MS")
            .unwrap_or_else(|_| defaults.fetch_timeout_ms.to_string())
            .parse()?,
    };
    Ok(config)
}
