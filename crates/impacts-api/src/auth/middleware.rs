use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use impacts_core::AppError;
use subtle::ConstantTimeEq;

use crate::error::HttpAppError;

/// Alternative header for clients that cannot set `Authorization`
pub const API_KEY_HEADER: &str = "X-API-Key";

#[derive(Clone)]
pub struct AdminAuthState {
    pub admin_api_key: String,
}

fn secure_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

fn presented_key(headers: &HeaderMap) -> Option<&str> {
    if let Some(value) = headers.get(AUTHORIZATION).and_then(|h| h.to_str().ok()) {
        return value.strip_prefix("Bearer ").map(str::trim);
    }
    headers
        .get(API_KEY_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
}

pub async fn admin_key_middleware(
    State(auth): State<Arc<AdminAuthState>>,
    request: Request,
    next: Next,
) -> Response {
    let Some(key) = presented_key(request.headers()) else {
        tracing::debug!(path = %request.uri().path(), "Missing admin key");
        return HttpAppError(AppError::Unauthorized(
            "Missing Authorization header".to_string(),
        ))
        .into_response();
    };

    if !secure_compare(key, &auth.admin_api_key) {
        tracing::warn!(path = %request.uri().path(), "Rejected invalid admin key");
        return HttpAppError(AppError::Unauthorized("Invalid API key".to_string()))
            .into_response();
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn compare_requires_equal_length_and_bytes() {
        assert!(secure_compare("abc", "abc"));
        assert!(!secure_compare("abc", "abd"));
        assert!(!secure_compare("abc", "abcd"));
    }

    #[test]
    fn key_from_bearer_or_api_key_header() {
        let mut headers = HeaderMap::new();
        assert_eq!(presented_key(&headers), None);

        headers.insert(API_KEY_HEADER, HeaderValue::from_static("k1"));
        assert_eq!(presented_key(&headers), Some("k1"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer k2"));
        assert_eq!(presented_key(&headers), Some("k2"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(presented_key(&headers), None);
    }
}
