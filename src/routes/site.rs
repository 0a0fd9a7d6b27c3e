use crate::credentials::AuthPolicy;
use crate::errors::GatewayError;
use crate::gateway::Gateway;
use crate::request::BackendCall;
use actix_web::{get, web, HttpRequest, HttpResponse};

const EVENT_LIST_QUERY: &[&str] = &["page", "limit", "search", "featured"];

#[get("/events")]
async fn list_events(
    gateway: web::Data<Gateway>,
    req: HttpRequest,
) -> Result<HttpResponse, GatewayError> {
    let call = BackendCall::get("/api/events").allow_query(EVENT_LIST_QUERY);
    gateway.forward(&req, call, AuthPolicy::Soft).await
}

#[get("/events/featured")]
async fn featured_events(
    gateway: web::Data<Gateway>,
    req: HttpRequest,
) -> Result<HttpResponse, GatewayError> {
    let call = BackendCall::get("/api/events/featured");
    gateway.forward(&req, call, AuthPolicy::Soft).await
}

#[get("/events/{id}")]
async fn get_event(
    gateway: web::Data<Gateway>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse, GatewayError> {
    let call = BackendCall::get("/api/events/:id").param("id", path.into_inner());
    gateway.forward(&req, call, AuthPolicy::Soft).await
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    // featured before {id} so it isn't captured as an id
    cfg.service(list_events)
        .service(featured_events)
        .service(get_event);
}
