use crate::client::BackendClient;
use crate::config::AppConfig;
use crate::credentials::{resolve_token, AuthPolicy};
use crate::errors::GatewayError;
use crate::normalize::{normalize, Normalized};
use crate::request::BackendCall;
use actix_web::cookie::{Cookie, SameSite};
use actix_web::{HttpRequest, HttpResponse};
use log::{debug, warn};

/// Shared per-process gateway state: configuration plus one backend client.
#[derive(Clone)]
pub struct Gateway {
    config: AppConfig,
    client: BackendClient,
}

impl Gateway {
    pub fn new(config: AppConfig) -> Result<Self, GatewayError> {
        let client = BackendClient::new(&config.api_url)?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Resolve credentials, call the backend once and normalize its reply.
    pub async fn exchange(
        &self,
        req: &HttpRequest,
        call: BackendCall,
        policy: AuthPolicy,
    ) -> Result<Normalized, GatewayError> {
        let token = resolve_token(req, &self.config.cookie_name, policy)?;
        let response = self
            .client
            .send(call, token.as_deref(), req.query_string())
            .await?;
        normalize(response.status, &response.body)
    }

    pub async fn forward(
        &self,
        req: &HttpRequest,
        call: BackendCall,
        policy: AuthPolicy,
    ) -> Result<HttpResponse, GatewayError> {
        Ok(self.exchange(req, call, policy).await?.into_response())
    }

    /// Cookie carrying the bearer token back to the browser.
    pub fn auth_cookie(&self, token: String) -> Cookie<'static> {
        let mut builder = Cookie::build(self.config.cookie_name.clone(), token)
            .path("/")
            .http_only(true)
            .secure(self.config.secure_cookies())
            .same_site(SameSite::Lax);

        if let Some(domain) = &self.config.cookie_domain {
            builder = builder.domain(domain.clone());
        }

        builder.finish()
    }

    pub fn removal_cookie(&self) -> Cookie<'static> {
        let mut cookie = self.auth_cookie(String::new());
        cookie.make_removal();
        cookie
    }

    /// Cookie for a login reply whose JSON body carries a token.
    pub fn login_cookie(&self, normalized: &Normalized) -> Option<Cookie<'static>> {
        let token = normalized.body().and_then(|body| {
            ["access_token", "accessToken", "token"]
                .iter()
                .find_map(|key| body.get(*key).and_then(|v| v.as_str()))
        });

        if token.is_none() && normalized.is_success() {
            debug!("Login succeeded without a token in the body, no cookie set");
        }

        token.map(|t| self.auth_cookie(t.to_string()))
    }

    pub fn attach_cookie(&self, response: &mut HttpResponse, cookie: &Cookie<'_>) {
        if let Err(e) = response.add_cookie(cookie) {
            warn!("Failed to set {} cookie: {}", self.config.cookie_name, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn gateway(environment: &str, domain: Option<&str>) -> Gateway {
        Gateway::new(AppConfig {
            environment: environment.to_string(),
            cookie_domain: domain.map(str::to_string),
            ..AppConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn auth_cookie_flags_follow_environment() {
        let dev = gateway("development", None).auth_cookie("t".into());
        assert_eq!(dev.name(), "access_token");
        assert_eq!(dev.secure(), Some(false));
        assert_eq!(dev.http_only(), Some(true));
        assert_eq!(dev.domain(), None);

        let prod = gateway("production", Some("example.com")).auth_cookie("t".into());
        assert_eq!(prod.secure(), Some(true));
        assert_eq!(prod.domain(), Some("example.com"));
        assert_eq!(prod.path(), Some("/"));
    }

    #[test]
    fn login_cookie_reads_known_token_keys() {
        let gw = gateway("development", None);
        for key in ["access_token", "accessToken", "token"] {
            let normalized = Normalized::Success { status: 200, body: json!({ key: "tok" }) };
            let cookie = gw.login_cookie(&normalized).unwrap();
            assert_eq!(cookie.value(), "tok");
        }
    }

    #[test]
    fn no_login_cookie_on_failure_or_missing_token() {
        let gw = gateway("development", None);
        let ok_without_token = Normalized::Success { status: 200, body: json!({ "user": {} }) };
        assert!(gw.login_cookie(&ok_without_token).is_none());

        let failed = Normalized::Failure {
            status: 401,
            error: crate::normalize::BackendError::Structured(json!({ "token": "nope" })),
        };
        assert!(gw.login_cookie(&failed).is_none());
    }

    #[test]
    fn removal_cookie_is_empty() {
        let cookie = gateway("development", None).removal_cookie();
        assert_eq!(cookie.name(), "access_token");
        assert_eq!(cookie.value(), "");
    }
}
