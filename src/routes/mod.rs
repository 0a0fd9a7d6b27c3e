//! Gateway routes for the four front-end surfaces. Every route mirrors its
//! inbound path on the backend origin and declares its own auth policy.

use actix_web::{get, web, HttpResponse, Responder};
use serde_json::json;

pub mod admin;
pub mod app;
pub mod auth;
pub mod site;

#[get("/health")]
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Register every route. Mount under the `/api` scope.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health_check);
    auth::configure(cfg);
    site::configure(cfg);
    app::configure(cfg);
    admin::configure(cfg);
}
