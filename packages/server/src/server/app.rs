//! Application setup and server configuration.

use std::sync::Arc;

use axum::{
    extract::{Extension, Request},
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Method, StatusCode,
    },
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use futures::StreamExt;
use serde_json::json;
use sqlx::PgPool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::common::{ApiRequest, AuthUser};
use crate::config::Config;
use crate::domains::auth::JwtService;
use crate::domains::motion::{handle_motion_signal, MotionSignal};
use crate::kernel::{
    HttpIdentityProvider, HttpMailer, HttpTwinRegistry, NatsTopicPublisher,
    PostgresDocumentStore, ServerDeps,
};
use crate::server::{middleware::jwt_auth_middleware, router};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub deps: Arc<ServerDeps>,
    pub jwt_service: Arc<JwtService>,
}

/// Construct the process-wide dependency container from configuration.
///
/// Clients are built exactly once here and injected everywhere else - no
/// per-invocation construction, no hidden globals.
pub fn build_deps(config: &Config, pool: PgPool, nats: async_nats::Client) -> Arc<ServerDeps> {
    Arc::new(ServerDeps::new(
        Arc::new(PostgresDocumentStore::new(pool)),
        Arc::new(HttpTwinRegistry::new(config.twin_registry_url.clone())),
        Arc::new(NatsTopicPublisher::new(nats)),
        Arc::new(HttpMailer::new(
            config.mail_api_url.clone(),
            config.mail_api_token.clone(),
            config.mail_from.clone(),
        )),
        Arc::new(HttpIdentityProvider::new(config.identity_url.clone())),
        config.twin_group_name.clone(),
        config.motion_topic.clone(),
        config.alert_topic.clone(),
    ))
}

/// Build the Axum application router.
///
/// All API traffic funnels through a single fallback entry that feeds the
/// in-crate request router; axum only contributes transport, middleware
/// and the health endpoint.
pub fn build_app(deps: Arc<ServerDeps>, jwt_service: Arc<JwtService>) -> Router {
    let state = AppState {
        deps,
        jwt_service: jwt_service.clone(),
    };

    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health_handler))
        .fallback(api_entry)
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(middleware::from_fn(move |req, next| {
            jwt_auth_middleware(jwt_service.clone(), req, next)
        }))
        .layer(Extension(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Single entry point: normalize the path, assemble the logical request,
/// and dispatch through the static route table.
async fn api_entry(Extension(state): Extension<AppState>, request: Request) -> Response {
    let (parts, body) = request.into_parts();

    let bytes = match axum::body::to_bytes(body, 1024 * 1024).await {
        Ok(bytes) => bytes,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "message": "Unreadable request body" })),
            )
                .into_response()
        }
    };
    let body = if bytes.is_empty() {
        None
    } else {
        Some(String::from_utf8_lossy(&bytes).into_owned())
    };

    let auth = parts.extensions.get::<AuthUser>().cloned();
    let (route_path, path_id) = router::normalize_path(parts.uri.path());

    let api_request = ApiRequest {
        method: parts.method,
        route_path,
        path_id,
        body,
        auth,
    };

    let response = router::dispatch(api_request, state.deps.clone()).await;
    let status =
        StatusCode::from_u16(response.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(response.body)).into_response()
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Spawn the background task feeding the motion pipeline from the motion
/// topic. Each signal is handled independently; failures are logged with
/// the original payload attached for offline diagnosis.
pub fn spawn_motion_subscriber(client: async_nats::Client, deps: Arc<ServerDeps>) {
    tokio::spawn(async move {
        let topic = deps.motion_topic.clone();
        let mut subscription = match client.subscribe(topic.clone()).await {
            Ok(subscription) => subscription,
            Err(err) => {
                error!(topic, error = %err, "failed to subscribe to motion topic");
                return;
            }
        };
        info!(topic, "motion subscriber started");

        while let Some(message) = subscription.next().await {
            let signal: MotionSignal = match serde_json::from_slice(&message.payload) {
                Ok(signal) => signal,
                Err(err) => {
                    error!(
                        error = %err,
                        payload = %String::from_utf8_lossy(&message.payload),
                        "malformed motion signal"
                    );
                    continue;
                }
            };

            if let Err(err) = handle_motion_signal(&signal, &deps).await {
                error!(
                    error = %err,
                    user_id = %signal.user_id,
                    device_id = %signal.device_id,
                    "motion pipeline failed"
                );
            }
        }
    });
}
