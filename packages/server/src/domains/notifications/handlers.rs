use std::sync::Arc;

use serde_json::{json, Value};

use super::models::{Alert, TABLE};
use crate::common::{ApiError, ApiRequest, ApiResponse};
use crate::kernel::{ScanFilter, ServerDeps};

/// GET /smart-home/notify/{id} - point lookup of one alert.
pub async fn get(req: ApiRequest, deps: Arc<ServerDeps>) -> Result<ApiResponse, ApiError> {
    let auth = req.require_user()?;
    let alert_id = req.require_path_id()?;

    let doc = deps
        .store
        .get(TABLE, &Alert::key_for(alert_id, &auth.sub))
        .await?
        .ok_or_else(|| ApiError::NotFound("Alert not found".to_string()))?;

    Ok(ApiResponse::ok(json!({
        "message": "Notification details",
        "notification": doc,
    })))
}

/// GET /smart-home/notify - all alerts for the caller.
pub async fn get_all(req: ApiRequest, deps: Arc<ServerDeps>) -> Result<ApiResponse, ApiError> {
    let auth = req.require_user()?;

    let filter = ScanFilter::equals("userId", Value::String(auth.sub.clone()));
    let docs = deps.store.scan(TABLE, Some(&filter)).await?;

    Ok(ApiResponse::ok(json!({
        "message": "All notification details",
        "notifications": docs,
    })))
}

/// DELETE /smart-home/notify/{id} - explicit user-initiated delete, the
/// only mutation the append-only alert trail allows.
pub async fn delete(req: ApiRequest, deps: Arc<ServerDeps>) -> Result<ApiResponse, ApiError> {
    let auth = req.require_user()?;
    let alert_id = req.require_path_id()?;

    let key = Alert::key_for(alert_id, &auth.sub);
    if deps.store.get(TABLE, &key).await?.is_none() {
        return Err(ApiError::NotFound("Alert not found".to_string()));
    }
    deps.store.delete(TABLE, &key).await?;

    Ok(ApiResponse::ok(json!({
        "message": "Notification deleted",
        "alertId": alert_id,
    })))
}
