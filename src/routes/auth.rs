use crate::credentials::AuthPolicy;
use crate::errors::GatewayError;
use crate::gateway::Gateway;
use crate::request::BackendCall;
use actix_web::{get, post, web, HttpRequest, HttpResponse, ResponseError};
use log::info;

#[post("/auth/login")]
async fn login(
    gateway: web::Data<Gateway>,
    req: HttpRequest,
    body: web::Bytes,
) -> Result<HttpResponse, GatewayError> {
    let call = BackendCall::post("/api/auth/login").body(body);
    let normalized = gateway.exchange(&req, call, AuthPolicy::Soft).await?;

    let cookie = gateway.login_cookie(&normalized);
    let mut response = normalized.into_response();
    if let Some(cookie) = cookie {
        info!("Issuing {} cookie after successful login", cookie.name());
        gateway.attach_cookie(&mut response, &cookie);
    }
    Ok(response)
}

#[post("/auth/register")]
async fn register(
    gateway: web::Data<Gateway>,
    req: HttpRequest,
    body: web::Bytes,
) -> Result<HttpResponse, GatewayError> {
    let call = BackendCall::post("/api/auth/register").body(body);
    gateway.forward(&req, call, AuthPolicy::Soft).await
}

#[get("/auth/check-auth")]
async fn check_auth(
    gateway: web::Data<Gateway>,
    req: HttpRequest,
) -> Result<HttpResponse, GatewayError> {
    let call = BackendCall::get("/api/auth/check-auth");
    gateway.forward(&req, call, AuthPolicy::Soft).await
}

#[post("/auth/logout")]
async fn logout(
    gateway: web::Data<Gateway>,
    req: HttpRequest,
) -> Result<HttpResponse, GatewayError> {
    let call = BackendCall::post("/api/auth/logout");
    // The browser session ends whatever the backend said, even if it was unreachable
    let mut response = match gateway.forward(&req, call, AuthPolicy::Soft).await {
        Ok(response) => response,
        Err(e) => e.error_response(),
    };
    gateway.attach_cookie(&mut response, &gateway.removal_cookie());
    Ok(response)
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(login)
        .service(register)
        .service(check_auth)
        .service(logout);
}
