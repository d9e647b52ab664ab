use axum::http::Method;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use super::auth::AuthUser;
use super::errors::ApiError;

/// One inbound logical operation, as seen by the request router.
///
/// `route_path` is the normalized resource path with the `{id}` placeholder
/// restored (path parameters are extracted by the entry point, not by the
/// router), `path_id` the extracted parameter if any.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub route_path: String,
    pub path_id: Option<String>,
    pub body: Option<String>,
    pub auth: Option<AuthUser>,
}

impl ApiRequest {
    /// Parse the JSON body into a typed payload.
    ///
    /// Unknown fields are rejected by the payload types themselves
    /// (`deny_unknown_fields`), so a bad merge never reaches the store.
    pub fn json_body<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        let body = self
            .body
            .as_deref()
            .ok_or_else(|| ApiError::Validation("Request body is required".to_string()))?;
        serde_json::from_str(body)
            .map_err(|e| ApiError::Validation(format!("Invalid request body: {}", e)))
    }

    /// Caller identity, or 401 when the request carried no verified token.
    pub fn require_user(&self) -> Result<&AuthUser, ApiError> {
        self.auth
            .as_ref()
            .ok_or_else(|| ApiError::Unauthorized("Authentication required".to_string()))
    }

    /// Caller identity with the Admin group, or 403.
    pub fn require_admin(&self) -> Result<&AuthUser, ApiError> {
        let user = self.require_user()?;
        if !user.is_admin() {
            return Err(ApiError::Forbidden(
                "You are not authorized to perform this action".to_string(),
            ));
        }
        Ok(user)
    }

    /// The `{id}` path parameter, or a validation error when the route
    /// should have carried one.
    pub fn require_path_id(&self) -> Result<&str, ApiError> {
        self.path_id
            .as_deref()
            .ok_or_else(|| ApiError::Validation("Missing path parameter".to_string()))
    }
}

/// Uniform `{statusCode, body}` response shape.
///
/// Every body is a JSON object with at least a `message` field; error
/// bodies additionally carry the error detail.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status_code: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn new(status_code: u16, body: Value) -> Self {
        Self { status_code, body }
    }

    pub fn ok(body: Value) -> Self {
        Self::new(200, body)
    }

    pub fn created(body: Value) -> Self {
        Self::new(201, body)
    }

    pub fn message(&self) -> Option<&str> {
        self.body.get("message").and_then(Value::as_str)
    }
}

impl From<&ApiError> for ApiResponse {
    fn from(err: &ApiError) -> Self {
        ApiResponse::new(
            err.status_code(),
            json!({
                "message": err.to_string(),
            }),
        )
    }
}
