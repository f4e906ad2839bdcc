use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{web, HttpResponse};

use super::handlers;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg
        // Health check
        .route("/health", web::get().to(health_check))
        // API v1
        .service(
            web::scope("/api/v1")
                .wrap(Logger::default())
                .wrap(
                    Cors::default()
                        .allowed_origin_fn(|origin, _req_head| {
                            origin.as_bytes().starts_with(b"http://localhost")
                                || origin.as_bytes().starts_with(b"https://")
                        })
                        .allowed_methods(vec!["GET", "POST"])
                        .allowed_headers(vec!["Content-Type"])
                        .max_age(3600),
                )
                .service(
                    web::scope("/documents")
                        .route("/generate", web::post().to(handlers::generate)),
                ),
        );
}

async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy"
    }))
}
