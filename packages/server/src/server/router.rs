//! Request router - the single entry point for all inbound operations.
//!
//! A static table maps (method, resource path) pairs to handler function
//! pointers; dependencies are passed explicitly into every handler, never
//! captured. Matching is exact on both fields: path parameters are
//! restored to their `{id}` placeholder by the entry point before routing
//! (see `normalize_path`), so the router itself does no pattern matching.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use axum::http::Method;
use serde_json::json;
use tracing::error;

use crate::common::{ApiError, ApiRequest, ApiResponse};
use crate::domains::{devices, motion, notifications, users};
use crate::kernel::ServerDeps;

pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<ApiResponse, ApiError>> + Send>>;

/// A route handler: a pure function reference taking the request and the
/// shared dependency container.
pub type Handler = fn(ApiRequest, Arc<ServerDeps>) -> HandlerFuture;

pub struct Route {
    pub method: Method,
    pub path: &'static str,
    pub handler: Handler,
}

pub static ROUTES: &[Route] = &[
    Route {
        method: Method::POST,
        path: "/smart-home/register",
        handler: |req, deps| Box::pin(users::handlers::register(req, deps)),
    },
    Route {
        method: Method::POST,
        path: "/smart-home/verify-user",
        handler: |req, deps| Box::pin(users::handlers::verify(req, deps)),
    },
    Route {
        method: Method::POST,
        path: "/smart-home/login",
        handler: |req, deps| Box::pin(users::handlers::login(req, deps)),
    },
    Route {
        method: Method::GET,
        path: "/smart-home",
        handler: |req, deps| Box::pin(users::handlers::get(req, deps)),
    },
    Route {
        method: Method::PATCH,
        path: "/smart-home",
        handler: |req, deps| Box::pin(users::handlers::update(req, deps)),
    },
    Route {
        method: Method::DELETE,
        path: "/smart-home/{id}",
        handler: |req, deps| Box::pin(users::handlers::delete(req, deps)),
    },
    Route {
        method: Method::GET,
        path: "/smart-home/devices",
        handler: |req, deps| Box::pin(devices::handlers::get_all(req, deps)),
    },
    Route {
        method: Method::POST,
        path: "/smart-home/devices/register",
        handler: |req, deps| Box::pin(devices::handlers::register(req, deps)),
    },
    Route {
        method: Method::GET,
        path: "/smart-home/devices/{id}",
        handler: |req, deps| Box::pin(devices::handlers::get(req, deps)),
    },
    Route {
        method: Method::PATCH,
        path: "/smart-home/devices/{id}",
        handler: |req, deps| Box::pin(devices::handlers::update(req, deps)),
    },
    Route {
        method: Method::DELETE,
        path: "/smart-home/devices/{id}",
        handler: |req, deps| Box::pin(devices::handlers::delete(req, deps)),
    },
    Route {
        method: Method::POST,
        path: "/smart-home/devices/{id}",
        handler: |req, deps| Box::pin(motion::handlers::report(req, deps)),
    },
    Route {
        method: Method::GET,
        path: "/smart-home/notify",
        handler: |req, deps| Box::pin(notifications::handlers::get_all(req, deps)),
    },
    Route {
        method: Method::GET,
        path: "/smart-home/notify/{id}",
        handler: |req, deps| Box::pin(notifications::handlers::get(req, deps)),
    },
    Route {
        method: Method::DELETE,
        path: "/smart-home/notify/{id}",
        handler: |req, deps| Box::pin(notifications::handlers::delete(req, deps)),
    },
];

/// Restore the `{id}` placeholder in a raw request path and extract the
/// parameter, so the router can match exactly against the static table.
pub fn normalize_path(raw: &str) -> (String, Option<String>) {
    let segments: Vec<&str> = raw.split('/').filter(|s| !s.is_empty()).collect();
    match segments.as_slice() {
        ["smart-home"] => ("/smart-home".to_string(), None),
        ["smart-home", seg @ ("register" | "verify-user" | "login" | "devices" | "notify")] => {
            (format!("/smart-home/{}", seg), None)
        }
        ["smart-home", "devices", "register"] => {
            ("/smart-home/devices/register".to_string(), None)
        }
        ["smart-home", "devices", id] => (
            "/smart-home/devices/{id}".to_string(),
            Some((*id).to_string()),
        ),
        ["smart-home", "notify", id] => (
            "/smart-home/notify/{id}".to_string(),
            Some((*id).to_string()),
        ),
        ["smart-home", id] => ("/smart-home/{id}".to_string(), Some((*id).to_string())),
        _ => (raw.to_string(), None),
    }
}

fn route_listing() -> Vec<serde_json::Value> {
    ROUTES
        .iter()
        .map(|r| json!({ "method": r.method.as_str(), "path": r.path }))
        .collect()
}

/// Dispatch one request through the static table.
///
/// No match yields a 404 carrying the route table as a diagnostic. Any
/// handler error is converted into its status response here; nothing
/// crosses this boundary unconverted.
pub async fn dispatch(req: ApiRequest, deps: Arc<ServerDeps>) -> ApiResponse {
    let route = ROUTES
        .iter()
        .find(|r| r.method == req.method && r.path == req.route_path);

    let Some(route) = route else {
        return ApiResponse::new(
            404,
            json!({
                "message": "Not Found",
                "routes": route_listing(),
            }),
        );
    };

    match (route.handler)(req, deps).await {
        Ok(response) => response,
        Err(err) => {
            if err.status_code() >= 500 {
                error!(error = %err, "handler failed");
            }
            ApiResponse::from(&err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::TestDependencies;

    #[test]
    fn normalize_extracts_path_parameters() {
        assert_eq!(normalize_path("/smart-home"), ("/smart-home".to_string(), None));
        assert_eq!(
            normalize_path("/smart-home/devices/register"),
            ("/smart-home/devices/register".to_string(), None)
        );
        assert_eq!(
            normalize_path("/smart-home/devices/d-42"),
            (
                "/smart-home/devices/{id}".to_string(),
                Some("d-42".to_string())
            )
        );
        assert_eq!(
            normalize_path("/smart-home/notify/a-7"),
            (
                "/smart-home/notify/{id}".to_string(),
                Some("a-7".to_string())
            )
        );
        assert_eq!(
            normalize_path("/smart-home/u-1"),
            ("/smart-home/{id}".to_string(), Some("u-1".to_string()))
        );
    }

    #[tokio::test]
    async fn matching_is_exact_on_both_fields() {
        let test = TestDependencies::new();

        // Path exists, verb does not.
        let req = ApiRequest {
            method: Method::GET,
            route_path: "/smart-home/register".to_string(),
            path_id: None,
            body: None,
            auth: None,
        };
        let response = dispatch(req, test.deps.clone()).await;
        assert_eq!(response.status_code, 404);
        assert_eq!(response.message(), Some("Not Found"));

        // Verb exists elsewhere, but not on this path.
        let req = ApiRequest {
            method: Method::POST,
            route_path: "/smart-home/devices".to_string(),
            path_id: None,
            body: None,
            auth: None,
        };
        let response = dispatch(req, test.deps.clone()).await;
        assert_eq!(response.status_code, 404);
    }

    #[tokio::test]
    async fn not_found_carries_route_table() {
        let test = TestDependencies::new();
        let req = ApiRequest {
            method: Method::GET,
            route_path: "/nowhere".to_string(),
            path_id: None,
            body: None,
            auth: None,
        };
        let response = dispatch(req, test.deps.clone()).await;
        let routes = response.body["routes"].as_array().unwrap();
        assert_eq!(routes.len(), ROUTES.len());
    }

    #[tokio::test]
    async fn handler_errors_become_status_responses() {
        let test = TestDependencies::new();
        // Protected route without auth claims.
        let req = ApiRequest {
            method: Method::GET,
            route_path: "/smart-home".to_string(),
            path_id: None,
            body: None,
            auth: None,
        };
        let response = dispatch(req, test.deps.clone()).await;
        assert_eq!(response.status_code, 401);
        assert!(response.message().is_some());
    }
}
