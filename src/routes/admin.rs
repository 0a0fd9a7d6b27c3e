//! Backoffice routes. All of them require the credential cookie; the backend
//! decides whether the caller's roles grant the permission.

use crate::credentials::AuthPolicy;
use crate::errors::GatewayError;
use crate::gateway::Gateway;
use crate::request::BackendCall;
use actix_web::{delete, get, patch, post, put, web, HttpRequest, HttpResponse};

const ADMIN_EVENT_QUERY: &[&str] = &["page", "limit", "status"];
const ADMIN_RESERVATION_QUERY: &[&str] = &["status", "eventId"];

#[get("/admin/events")]
async fn list_events(
    gateway: web::Data<Gateway>,
    req: HttpRequest,
) -> Result<HttpResponse, GatewayError> {
    let call = BackendCall::get("/api/admin/events").allow_query(ADMIN_EVENT_QUERY);
    gateway.forward(&req, call, AuthPolicy::Hard).await
}

#[post("/admin/events")]
async fn create_event(
    gateway: web::Data<Gateway>,
    req: HttpRequest,
    body: web::Bytes,
) -> Result<HttpResponse, GatewayError> {
    let call = BackendCall::post("/api/admin/events").body(body);
    gateway.forward(&req, call, AuthPolicy::Hard).await
}

#[put("/admin/events/{id}")]
async fn update_event(
    gateway: web::Data<Gateway>,
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Bytes,
) -> Result<HttpResponse, GatewayError> {
    let call = BackendCall::put("/api/admin/events/:id")
        .param("id", path.into_inner())
        .body(body);
    gateway.forward(&req, call, AuthPolicy::Hard).await
}

#[delete("/admin/events/{id}")]
async fn delete_event(
    gateway: web::Data<Gateway>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse, GatewayError> {
    let call = BackendCall::delete("/api/admin/events/:id").param("id", path.into_inner());
    gateway.forward(&req, call, AuthPolicy::Hard).await
}

#[patch("/admin/events/{id}/featured")]
async fn set_event_featured(
    gateway: web::Data<Gateway>,
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Bytes,
) -> Result<HttpResponse, GatewayError> {
    let call = BackendCall::patch("/api/admin/events/:id/featured")
        .param("id", path.into_inner())
        .body(body);
    gateway.forward(&req, call, AuthPolicy::Hard).await
}

#[get("/admin/reservations")]
async fn list_reservations(
    gateway: web::Data<Gateway>,
    req: HttpRequest,
) -> Result<HttpResponse, GatewayError> {
    let call = BackendCall::get("/api/admin/reservations").allow_query(ADMIN_RESERVATION_QUERY);
    gateway.forward(&req, call, AuthPolicy::Hard).await
}

#[get("/admin/users")]
async fn list_users(
    gateway: web::Data<Gateway>,
    req: HttpRequest,
) -> Result<HttpResponse, GatewayError> {
    gateway.forward(&req, BackendCall::get("/api/admin/users"), AuthPolicy::Hard).await
}

#[post("/admin/users/{id}/roles")]
async fn assign_role(
    gateway: web::Data<Gateway>,
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Bytes,
) -> Result<HttpResponse, GatewayError> {
    let call = BackendCall::post("/api/admin/users/:id/roles")
        .param("id", path.into_inner())
        .body(body);
    gateway.forward(&req, call, AuthPolicy::Hard).await
}

#[get("/admin/roles")]
async fn list_roles(
    gateway: web::Data<Gateway>,
    req: HttpRequest,
) -> Result<HttpResponse, GatewayError> {
    gateway.forward(&req, BackendCall::get("/api/admin/roles"), AuthPolicy::Hard).await
}

#[get("/admin/permissions")]
async fn list_permissions(
    gateway: web::Data<Gateway>,
    req: HttpRequest,
) -> Result<HttpResponse, GatewayError> {
    gateway.forward(&req, BackendCall::get("/api/admin/permissions"), AuthPolicy::Hard).await
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_events)
        .service(create_event)
        .service(update_event)
        .service(delete_event)
        .service(set_event_featured)
        .service(list_reservations)
        .service(list_users)
        .service(assign_role)
        .service(list_roles)
        .service(list_permissions);
}
