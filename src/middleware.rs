use actix_cors::Cors;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{HeaderName, HeaderValue};
use actix_web::{Error, HttpMessage};
use log::{info, warn, error};
use std::future::{ready, Ready, Future};
use std::pin::Pin;
use std::rc::Rc;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Id assigned to each inbound request, stored in request extensions.
#[derive(Clone, Debug)]
pub struct RequestId(pub String);

// Logs every gateway request and its outcome, tagged with a request id
pub struct RequestLogger;

impl<S, B> Transform<S, ServiceRequest> for RequestLogger
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = RequestLoggerMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestLoggerMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct RequestLoggerMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequestLoggerMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + 'static>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let request_id = Uuid::new_v4().to_string();
        let method = req.method().clone();
        let path = req.path().to_owned();

        req.extensions_mut().insert(RequestId(request_id.clone()));
        info!("[{}] → {} {}", request_id, method, path);

        let service = self.service.clone();

        Box::pin(async move {
            let start = std::time::Instant::now();
            let mut res = service.call(req).await?;
            let elapsed = start.elapsed();

            if let Ok(value) = HeaderValue::from_str(&request_id) {
                res.headers_mut()
                    .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
            }

            let status = res.status();
            if status.is_success() || status.is_redirection() {
                info!("[{}] ← {} for {} {} in {:.2?}", request_id, status, method, path, elapsed);
            } else if status.is_client_error() {
                warn!("[{}] ← {} for {} {} in {:.2?}", request_id, status, method, path, elapsed);
            } else {
                error!("[{}] ← {} for {} {} in {:.2?}", request_id, status, method, path, elapsed);
            }

            Ok(res)
        })
    }
}

/// CORS for the browser apps served from `site_url`, credentials allowed.
pub fn cors(site_url: &str) -> Cors {
    Cors::default()
        .allowed_origin(site_url.trim_end_matches('/'))
        .supports_credentials()
        .allow_any_method()
        .allow_any_header()
        .max_age(3600)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, web, App, HttpRequest, HttpResponse};

    #[actix_web::test]
    async fn response_carries_request_id() {
        let app = test::init_service(
            App::new().wrap(RequestLogger).route(
                "/ping",
                web::get().to(|req: HttpRequest| async move {
                    let id = req.extensions().get::<RequestId>().map(|r| r.0.clone());
                    HttpResponse::Ok().body(id.unwrap_or_default())
                }),
            ),
        )
        .await;

        let res = test::call_service(&app, test::TestRequest::get().uri("/ping").to_request()).await;
        let header = res.headers().get(REQUEST_ID_HEADER).unwrap().to_str().unwrap().to_string();
        let body = test::read_body(res).await;

        assert!(Uuid::parse_str(&header).is_ok());
        assert_eq!(body, header.as_bytes());
    }
}
