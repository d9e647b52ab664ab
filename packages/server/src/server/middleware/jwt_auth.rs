use axum::{middleware::Next, response::Response};
use std::sync::Arc;
use tracing::debug;

use crate::common::AuthUser;
use crate::domains::auth::JwtService;

/// JWT authentication middleware
///
/// Extracts the bearer token from the Authorization header, verifies it,
/// and adds AuthUser to request extensions. If no token or an invalid
/// token, the request continues without AuthUser; protected handlers
/// reject it with 401 themselves.
pub async fn jwt_auth_middleware(
    jwt_service: Arc<JwtService>,
    mut request: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let auth_user = extract_auth_user(&request, &jwt_service);

    if let Some(user) = auth_user {
        debug!(sub = %user.sub, "authenticated caller");
        request.extensions_mut().insert(user);
    } else {
        debug!("no valid authentication token");
    }

    next.run(request).await
}

/// Extract and verify the bearer token from a request
fn extract_auth_user(
    request: &axum::http::Request<axum::body::Body>,
    jwt_service: &JwtService,
) -> Option<AuthUser> {
    let auth_header = request.headers().get("authorization")?;
    let auth_str = auth_header.to_str().ok()?;

    // Handle both "Bearer <token>" and a raw token
    let token = auth_str.strip_prefix("Bearer ").unwrap_or(auth_str);

    let claims = jwt_service.verify_token(token).ok()?;

    Some(AuthUser {
        sub: claims.sub,
        email: claims.email,
        groups: claims.groups,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_token_with_bearer_prefix() {
        let jwt_service = JwtService::new("test_secret", "test_issuer".to_string());
        let token = jwt_service
            .create_token("sub-1", None, vec!["Admin".to_string()])
            .unwrap();

        let request = axum::http::Request::builder()
            .header("authorization", format!("Bearer {}", token))
            .body(axum::body::Body::empty())
            .unwrap();

        let user = extract_auth_user(&request, &jwt_service).unwrap();
        assert_eq!(user.sub, "sub-1");
        assert!(user.is_admin());
    }

    #[test]
    fn invalid_token_yields_no_user() {
        let jwt_service = JwtService::new("test_secret", "test_issuer".to_string());
        let request = axum::http::Request::builder()
            .header("authorization", "Bearer garbage")
            .body(axum::body::Body::empty())
            .unwrap();

        assert!(extract_auth_user(&request, &jwt_service).is_none());
    }

    #[test]
    fn missing_header_yields_no_user() {
        let jwt_service = JwtService::new("test_secret", "test_issuer".to_string());
        let request = axum::http::Request::builder()
            .body(axum::body::Body::empty())
            .unwrap();

        assert!(extract_auth_user(&request, &jwt_service).is_none());
    }
}
