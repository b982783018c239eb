//! Session cookie handling and the access gate middlewares.

use axum::{
    extract::{Extension, Request},
    http::{
        HeaderMap, HeaderValue,
        header::{COOKIE, InvalidHeaderValue},
    },
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;

use super::{AuthConfig, AuthState, error::AppError};
use crate::auth::{AuthError, SessionContext, SessionToken};

pub const SESSION_COOKIE_NAME: &str = "UserSessionId";
pub const LOGIN_PATH: &str = "/login";
pub const HOME_PATH: &str = "/";

/// Read the session token from the `Cookie` header(s).
#[must_use]
pub fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    for header in headers.get_all(COOKIE) {
        let Ok(value) = header.to_str() else {
            continue;
        };
        for pair in value.split(';') {
            let Some((key, val)) = pair.trim().split_once('=') else {
                continue;
            };
            if key.trim() == SESSION_COOKIE_NAME {
                return Some(val.trim().to_string());
            }
        }
    }
    None
}

/// Build the `HttpOnly` session cookie.
///
/// # Errors
/// Returns an error if the cookie is not a valid header value.
pub fn session_cookie(
    config: &AuthConfig,
    token: &SessionToken,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!(
        "{SESSION_COOKIE_NAME}={}; Path=/; HttpOnly; SameSite=Lax",
        token.as_str()
    );
    if let Some(ttl) = config.session_ttl() {
        cookie.push_str(&format!("; Max-Age={}", ttl.as_secs()));
    }
    if config.cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Build a cookie that makes the browser drop the session.
///
/// # Errors
/// Returns an error if the cookie is not a valid header value.
pub fn clear_session_cookie(config: &AuthConfig) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!("{SESSION_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    if config.cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Hard gate: continue with the identity attached, or redirect to the login page.
pub async fn require_session(
    Extension(auth_state): Extension<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = extract_session_token(request.headers());
    match auth_state.gate().authorize(token.as_deref()).await {
        Ok(identity) => {
            request
                .extensions_mut()
                .insert(SessionContext::authenticated(identity));
            next.run(request).await
        }
        Err(AuthError::Internal(err)) => AppError::Internal(err).into_response(),
        Err(_) => Redirect::to(LOGIN_PATH).into_response(),
    }
}

/// Soft gate: always continue, annotating whether a valid session exists.
pub async fn attach_session(
    Extension(auth_state): Extension<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = extract_session_token(request.headers());
    let context = auth_state.gate().annotate(token.as_deref()).await;
    request.extensions_mut().insert(context);
    next.run(request).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn headers_with_cookie(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn extract_picks_session_cookie_among_others() {
        let headers = headers_with_cookie("theme=dark; UserSessionId=abc123; lang=de");
        assert_eq!(extract_session_token(&headers), Some("abc123".to_string()));
    }

    #[test]
    fn extract_ignores_similar_names() {
        let headers = headers_with_cookie("XUserSessionId=nope; UserSessionIdOld=nope");
        assert_eq!(extract_session_token(&headers), None);
    }

    #[test]
    fn extract_handles_missing_and_empty() {
        assert_eq!(extract_session_token(&HeaderMap::new()), None);
        let headers = headers_with_cookie("UserSessionId=");
        assert_eq!(extract_session_token(&headers), Some(String::new()));
    }

    #[test]
    fn extract_reads_across_multiple_cookie_headers() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("theme=dark"));
        headers.append(COOKIE, HeaderValue::from_static("UserSessionId=xyz"));
        assert_eq!(extract_session_token(&headers), Some("xyz".to_string()));
    }

    #[test]
    fn session_cookie_without_ttl_is_a_browser_session_cookie() {
        let token = crate::auth::token::generate_session_token().unwrap();
        let cookie = session_cookie(&AuthConfig::new(), &token).unwrap();
        let cookie = cookie.to_str().unwrap();
        assert!(cookie.starts_with(&format!("UserSessionId={}", token.as_str())));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(!cookie.contains("Max-Age"));
        assert!(!cookie.contains("Secure"));
    }

    #[test]
    fn session_cookie_carries_ttl_and_secure() {
        let token = crate::auth::token::generate_session_token().unwrap();
        let config = AuthConfig::new()
            .with_session_ttl(Some(Duration::from_secs(3600)))
            .with_cookie_secure(true);
        let cookie = session_cookie(&config, &token).unwrap();
        let cookie = cookie.to_str().unwrap();
        assert!(cookie.contains("Max-Age=3600"));
        assert!(cookie.ends_with("; Secure"));
    }

    #[test]
    fn clear_cookie_expires_immediately() {
        let cookie = clear_session_cookie(&AuthConfig::new()).unwrap();
        assert_eq!(
            cookie.to_str().unwrap(),
            "UserSessionId=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0"
        );
    }
}
