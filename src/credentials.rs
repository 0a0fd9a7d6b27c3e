use crate::errors::GatewayError;
use actix_web::HttpRequest;
use log::debug;

/// What a route does when the credential cookie is missing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthPolicy {
    /// Forward without an `Authorization` header.
    Soft,
    /// Reject with 401 before the backend is contacted.
    Hard,
}

pub fn extract_token(req: &HttpRequest, cookie_name: &str) -> Option<String> {
    req.cookie(cookie_name)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}

pub fn resolve_token(
    req: &HttpRequest,
    cookie_name: &str,
    policy: AuthPolicy,
) -> Result<Option<String>, GatewayError> {
    match (extract_token(req, cookie_name), policy) {
        (Some(token), _) => Ok(Some(token)),
        (None, AuthPolicy::Soft) => {
            debug!("No {} cookie on {}, forwarding unauthenticated", cookie_name, req.path());
            Ok(None)
        },
        (None, AuthPolicy::Hard) => Err(GatewayError::AuthenticationRequired),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::cookie::Cookie;
    use actix_web::test::TestRequest;

    #[test]
    fn reads_named_cookie() {
        let req = TestRequest::default()
            .cookie(Cookie::new("access_token", "abc"))
            .cookie(Cookie::new("other", "zzz"))
            .to_http_request();
        assert_eq!(extract_token(&req, "access_token").as_deref(), Some("abc"));
    }

    #[test]
    fn empty_cookie_counts_as_absent() {
        let req = TestRequest::default()
            .cookie(Cookie::new("access_token", ""))
            .to_http_request();
        assert_eq!(extract_token(&req, "access_token"), None);
    }

    #[test]
    fn soft_policy_allows_missing_token() {
        let req = TestRequest::default().to_http_request();
        assert!(matches!(resolve_token(&req, "access_token", AuthPolicy::Soft), Ok(None)));
    }

    #[test]
    fn hard_policy_rejects_missing_token() {
        let req = TestRequest::default()
            .cookie(Cookie::new("session", "abc"))
            .to_http_request();
        assert!(matches!(
            resolve_token(&req, "access_token", AuthPolicy::Hard),
            Err(GatewayError::AuthenticationRequired)
        ));
    }

    #[test]
    fn hard_policy_passes_present_token() {
        let req = TestRequest::default()
            .cookie(Cookie::new("access_token", "abc"))
            .to_http_request();
        let token = resolve_token(&req, "access_token", AuthPolicy::Hard).unwrap();
        assert_eq!(token.as_deref(), Some("abc"));
    }
}
