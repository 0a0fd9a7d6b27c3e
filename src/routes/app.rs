use crate::credentials::AuthPolicy;
use crate::errors::GatewayError;
use crate::gateway::Gateway;
use crate::request::BackendCall;
use actix_web::{get, post, web, HttpRequest, HttpResponse};

const RESERVATION_LIST_QUERY: &[&str] = &["status"];

#[get("/users/me")]
async fn current_user(
    gateway: web::Data<Gateway>,
    req: HttpRequest,
) -> Result<HttpResponse, GatewayError> {
    gateway.forward(&req, BackendCall::get("/api/users/me"), AuthPolicy::Hard).await
}

#[post("/events/{id}/reserve")]
async fn reserve_event(
    gateway: web::Data<Gateway>,
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Bytes,
) -> Result<HttpResponse, GatewayError> {
    let call = BackendCall::post("/api/events/:id/reserve")
        .param("id", path.into_inner())
        .body(body);
    gateway.forward(&req, call, AuthPolicy::Hard).await
}

#[get("/reservations")]
async fn list_reservations(
    gateway: web::Data<Gateway>,
    req: HttpRequest,
) -> Result<HttpResponse, GatewayError> {
    let call = BackendCall::get("/api/reservations").allow_query(RESERVATION_LIST_QUERY);
    gateway.forward(&req, call, AuthPolicy::Hard).await
}

#[get("/reservations/{id}")]
async fn get_reservation(
    gateway: web::Data<Gateway>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse, GatewayError> {
    let call = BackendCall::get("/api/reservations/:id").param("id", path.into_inner());
    gateway.forward(&req, call, AuthPolicy::Hard).await
}

#[post("/reservations/{id}/confirm")]
async fn confirm_reservation(
    gateway: web::Data<Gateway>,
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Bytes,
) -> Result<HttpResponse, GatewayError> {
    let call = BackendCall::post("/api/reservations/:id/confirm")
        .param("id", path.into_inner())
        .body(body);
    gateway.forward(&req, call, AuthPolicy::Hard).await
}

#[post("/reservations/{id}/cancel")]
async fn cancel_reservation(
    gateway: web::Data<Gateway>,
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Bytes,
) -> Result<HttpResponse, GatewayError> {
    let call = BackendCall::post("/api/reservations/:id/cancel")
        .param("id", path.into_inner())
        .body(body);
    gateway.forward(&req, call, AuthPolicy::Hard).await
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(current_user)
        .service(reserve_event)
        .service(list_reservations)
        .service(get_reservation)
        .service(confirm_reservation)
        .service(cancel_reservation);
}
