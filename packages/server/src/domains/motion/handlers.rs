use std::collections::BTreeMap;
use std::sync::Arc;

use bytes::Bytes;
use serde_json::json;

use super::models::{Command, MotionReportPayload, MotionSignal};
use crate::common::{ApiError, ApiRequest, ApiResponse};
use crate::kernel::ServerDeps;

/// POST /smart-home/devices/{id} - accept a raw motion reading and hand
/// it to the pipeline via the motion topic (internal trigger endpoint).
pub async fn report(req: ApiRequest, deps: Arc<ServerDeps>) -> Result<ApiResponse, ApiError> {
    let auth = req.require_user()?;
    let device_id = req.require_path_id()?;
    let payload: MotionReportPayload = req.json_body()?;

    let signal = MotionSignal {
        user_id: auth.sub.clone(),
        device_id: device_id.to_string(),
        command: Command::from_motion(payload.motion_detected),
    };
    let body = serde_json::to_vec(&signal).map_err(anyhow::Error::from)?;
    deps.topic
        .publish(&deps.motion_topic, Bytes::from(body), &BTreeMap::new())
        .await?;

    Ok(ApiResponse::created(json!({
        "message": "Motion is detected, action is queued",
        "command": signal.command,
    })))
}
