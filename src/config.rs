use log::{info, warn};
use std::env;

pub const DEFAULT_API_URL: &str = "http://localhost:3000";
pub const DEFAULT_COOKIE_NAME: &str = "access_token";
pub const DEFAULT_SITE_URL: &str = "http://localhost:3001";

// Config
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api_url: String,
    pub cookie_name: String,
    pub cookie_domain: Option<String>,
    pub site_url: String,
    pub environment: String,
    pub host: String,
    pub port: u16,
    pub database_url: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            cookie_domain: None,
            site_url: DEFAULT_SITE_URL.to_string(),
            environment: "development".to_string(),
            host: "0.0.0.0".to_string(),
            port: 8080,
            database_url: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let api_url = env::var("API_URL").unwrap_or_else(|_| {
            warn!("API_URL not set, falling back to {}", DEFAULT_API_URL);
            defaults.api_url.clone()
        });

        let cookie_name = env::var("COOKIE_NAME").unwrap_or(defaults.cookie_name);

        let cookie_domain = env::var("COOKIE_DOMAIN")
            .ok()
            .filter(|d| !d.trim().is_empty());

        let site_url = env::var("SITE_URL").unwrap_or_else(|_| {
            warn!("SITE_URL not set, falling back to {}", DEFAULT_SITE_URL);
            defaults.site_url.clone()
        });

        // APP_ENV wins; NODE_ENV is still honoured for existing deployments
        let environment = env::var("APP_ENV")
            .or_else(|_| env::var("NODE_ENV"))
            .unwrap_or(defaults.environment);

        let host = env::var("HOST").unwrap_or(defaults.host);

        let port = env::var("PORT")
            .ok()
            .and_then(|v| match v.parse::<u16>() {
                Ok(p) => Some(p),
                Err(e) => {
                    warn!("Invalid PORT value {:?}: {}", v, e);
                    None
                }
            })
            .unwrap_or(defaults.port);

        let database_url = env::var("DATABASE_URL").ok();
        if database_url.is_none() {
            info!("DATABASE_URL not set, schema initialisation will be skipped");
        }

        Self {
            api_url,
            cookie_name,
            cookie_domain,
            site_url,
            environment,
            host,
            port,
            database_url,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        let url = reqwest::Url::parse(&self.api_url)
            .map_err(|e| format!("API_URL is not a valid URL: {}", e))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(format!("API_URL must use http or https, got {}", url.scheme()));
        }

        if url.cannot_be_a_base() {
            return Err("API_URL must be an absolute origin".to_string());
        }

        let site = reqwest::Url::parse(&self.site_url)
            .map_err(|e| format!("SITE_URL is not a valid URL: {}", e))?;
        if site.scheme() != "http" && site.scheme() != "https" {
            return Err(format!("SITE_URL must use http or https, got {}", site.scheme()));
        }

        if self.cookie_name.trim().is_empty() {
            return Err("COOKIE_NAME must not be empty".to_string());
        }

        if self.is_production() && self.cookie_domain.is_none() {
            warn!("COOKIE_DOMAIN is not set in production, cookies will be host-only");
        }

        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    /// Auth cookies are only marked `Secure` in production.
    pub fn secure_cookies(&self) -> bool {
        self.is_production()
    }
}
