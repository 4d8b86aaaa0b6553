use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::{Claims, JwtService};
use crate::error::ApiError;

/// Authenticated user context extracted from a validated bearer token.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.user_id,
            email: claims.email,
        }
    }
}

/// Bearer-token middleware. Rejects the request before any handler runs
/// unless the Authorization header carries a token the [`JwtService`]
/// accepts; on success the resolved [`AuthUser`] is attached to the
/// request's extensions. Never touches the store.
pub async fn require_auth(
    State(jwt): State<Arc<JwtService>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(request.headers())?;

    let claims = jwt
        .validate(&token)
        .map_err(|_| ApiError::unauthenticated("invalid or expired token"))?;

    request.extensions_mut().insert(AuthUser::from(claims));

    Ok(next.run(request).await)
}

fn extract_bearer_token(headers: &HeaderMap) -> Result<String, ApiError> {
    let auth_header = headers
        .get("authorization")
        .ok_or_else(|| ApiError::unauthenticated("authorization header required"))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| ApiError::unauthenticated("invalid authorization header format"))?;

    let token = auth_str
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::unauthenticated("invalid authorization header format"))?;

    if token.trim().is_empty() {
        return Err(ApiError::unauthenticated("invalid authorization header format"));
    }

    Ok(token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_missing_header_is_rejected() {
        let err = extract_bearer_token(&HeaderMap::new()).unwrap_err();
        assert_eq!(err.message(), "authorization header required");
    }

    #[test]
    fn test_non_bearer_scheme_is_rejected() {
        assert!(extract_bearer_token(&headers_with("Basic dXNlcjpwdw==")).is_err());
        assert!(extract_bearer_token(&headers_with("Bearer ")).is_err());
        assert!(extract_bearer_token(&headers_with("bearer token")).is_err());
    }

    #[test]
    fn test_bearer_token_is_extracted() {
        let token = extract_bearer_token(&headers_with("Bearer abc.def.ghi")).unwrap();
        assert_eq!(token, "abc.def.ghi");
    }
}
