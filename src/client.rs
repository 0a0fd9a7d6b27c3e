use crate::errors::GatewayError;
use crate::request::BackendCall;
use actix_web::web::Bytes;
use log::{debug, error};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Url;

/// Raw backend reply. The body is read once and kept as bytes so it can be
/// decoded more than one way.
#[derive(Debug, Clone)]
pub struct BackendResponse {
    pub status: u16,
    pub body: Bytes,
}

#[derive(Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base: Url,
}

impl BackendClient {
    pub fn new(api_url: &str) -> Result<Self, GatewayError> {
        let base = Url::parse(api_url)
            .map_err(|e| GatewayError::InvalidBackendUrl(format!("{}: {}", api_url, e)))?;

        // No timeout or retry: a call lives as long as the platform allows.
        let http = reqwest::Client::builder().build()?;

        Ok(Self { http, base })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub async fn send(
        &self,
        mut call: BackendCall,
        token: Option<&str>,
        inbound_query: &str,
    ) -> Result<BackendResponse, GatewayError> {
        let url = call.build_url(&self.base, inbound_query)?;
        debug!("Forwarding {} {}", call.method(), url);

        let mut request = self
            .http
            .request(call.method().clone(), url.clone())
            .header(CONTENT_TYPE, "application/json");

        if let Some(token) = token {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token));
        }

        if let Some(body) = call.take_body() {
            request = request.body(body);
        }

        let response = request.send().await.map_err(|e| {
            error!("Backend call {} {} failed: {}", call.method(), url, e);
            GatewayError::Backend(e)
        })?;

        let status = response.status().as_u16();
        let body = response.bytes().await?;

        debug!("Backend answered {} with {} bytes for {}", status, body.len(), call.template());
        Ok(BackendResponse { status, body })
    }
}
