use crate::errors::GatewayError;
use actix_web::web::{self, Bytes};
use log::debug;
use reqwest::{Method, Url};

/// Description of one downstream call: verb, path template, the inbound
/// query keys allowed through, and an optional passthrough body.
///
/// Templates use `:name` segments, e.g. `/api/events/:id/reserve`.
#[derive(Debug, Clone)]
pub struct BackendCall {
    method: Method,
    template: &'static str,
    params: Vec<(&'static str, String)>,
    allowed_query: &'static [&'static str],
    body: Option<Bytes>,
}

impl BackendCall {
    pub fn new(method: Method, template: &'static str) -> Self {
        Self {
            method,
            template,
            params: Vec::new(),
            allowed_query: &[],
            body: None,
        }
    }

    pub fn get(template: &'static str) -> Self {
        Self::new(Method::GET, template)
    }

    pub fn post(template: &'static str) -> Self {
        Self::new(Method::POST, template)
    }

    pub fn put(template: &'static str) -> Self {
        Self::new(Method::PUT, template)
    }

    pub fn patch(template: &'static str) -> Self {
        Self::new(Method::PATCH, template)
    }

    pub fn delete(template: &'static str) -> Self {
        Self::new(Method::DELETE, template)
    }

    pub fn param(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.params.push((name, value.into()));
        self
    }

    pub fn allow_query(mut self, keys: &'static [&'static str]) -> Self {
        self.allowed_query = keys;
        self
    }

    /// Attach a request body. Ignored for verbs that don't carry one.
    pub fn body(mut self, body: Bytes) -> Self {
        if self.carries_body() && !body.is_empty() {
            self.body = Some(body);
        }
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn template(&self) -> &'static str {
        self.template
    }

    pub fn take_body(&mut self) -> Option<Bytes> {
        self.body.take()
    }

    fn carries_body(&self) -> bool {
        matches!(self.method, Method::POST | Method::PUT | Method::PATCH)
    }

    fn param_value(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
            .filter(|v| !v.is_empty())
    }

    /// Resolve the template against `base`, keeping only allow-listed pairs
    /// from the inbound query string.
    pub fn build_url(&self, base: &Url, inbound_query: &str) -> Result<Url, GatewayError> {
        let mut url = base.clone();
        url.set_query(None);
        url.set_fragment(None);

        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| GatewayError::InvalidBackendUrl(base.to_string()))?;
            segments.pop_if_empty();

            for segment in self.template.split('/').filter(|s| !s.is_empty()) {
                match segment.strip_prefix(':') {
                    Some(name) => {
                        let value = self
                            .param_value(name)
                            .ok_or_else(|| GatewayError::MissingPathParam(name.to_string()))?;
                        // push() percent-encodes the value as a single segment
                        segments.push(value);
                    },
                    None => {
                        segments.push(segment);
                    },
                }
            }
        }

        let kept = self.filter_query(inbound_query);
        if !kept.is_empty() {
            url.query_pairs_mut().extend_pairs(kept);
        }

        Ok(url)
    }

    fn filter_query(&self, inbound_query: &str) -> Vec<(String, String)> {
        if self.allowed_query.is_empty() || inbound_query.is_empty() {
            return Vec::new();
        }

        let pairs = match web::Query::<Vec<(String, String)>>::from_query(inbound_query) {
            Ok(q) => q.into_inner(),
            Err(e) => {
                debug!("Dropping unparsable query string {:?}: {}", inbound_query, e);
                return Vec::new();
            }
        };

        pairs
            .into_iter()
            .filter(|(key, _)| self.allowed_query.contains(&key.as_str()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("http://localhost:3000").unwrap()
    }

    #[test]
    fn substitutes_path_parameter_once() {
        let url = BackendCall::post("/api/events/:id/reserve")
            .param("id", "42")
            .build_url(&base(), "")
            .unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/api/events/42/reserve");
        assert_eq!(url.as_str().matches("/api/events/42/reserve").count(), 1);
    }

    #[test]
    fn encodes_parameter_values_as_single_segment() {
        let url = BackendCall::get("/api/events/:id")
            .param("id", "a b/c")
            .build_url(&base(), "")
            .unwrap();
        assert_eq!(url.path(), "/api/events/a%20b%2Fc");
    }

    #[test]
    fn keeps_base_path_prefix() {
        let base = Url::parse("http://backend.internal:8000/v1/").unwrap();
        let url = BackendCall::get("/api/users/me").build_url(&base, "").unwrap();
        assert_eq!(url.as_str(), "http://backend.internal:8000/v1/api/users/me");
    }

    #[test]
    fn missing_parameter_is_an_error() {
        let err = BackendCall::get("/api/reservations/:id")
            .build_url(&base(), "")
            .unwrap_err();
        assert!(matches!(err, GatewayError::MissingPathParam(name) if name == "id"));
    }

    #[test]
    fn only_allow_listed_query_keys_survive() {
        let url = BackendCall::get("/api/reservations")
            .allow_query(&["status"])
            .build_url(&base(), "status=confirmed&foo=bar")
            .unwrap();
        assert_eq!(url.query(), Some("status=confirmed"));
    }

    #[test]
    fn query_dropped_without_allow_list() {
        let url = BackendCall::get("/api/users/me")
            .build_url(&base(), "debug=true")
            .unwrap();
        assert_eq!(url.query(), None);
    }

    #[test]
    fn allow_listed_keys_keep_inbound_order() {
        let url = BackendCall::get("/api/events")
            .allow_query(&["page", "limit", "search"])
            .build_url(&base(), "limit=10&x=1&page=2&search=jazz+night")
            .unwrap();
        assert_eq!(url.query(), Some("limit=10&page=2&search=jazz+night"));
    }

    #[test]
    fn body_only_kept_for_mutating_verbs() {
        let mut get = BackendCall::get("/api/events").body(Bytes::from_static(b"{}"));
        assert!(get.take_body().is_none());

        let mut post = BackendCall::post("/api/events").body(Bytes::from_static(b"{}"));
        assert_eq!(post.take_body().as_deref(), Some(&b"{}"[..]));

        let mut empty = BackendCall::put("/api/events/:id").body(Bytes::new());
        assert!(empty.take_body().is_none());
    }
}
