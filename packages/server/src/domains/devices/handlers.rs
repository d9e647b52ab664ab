use std::sync::Arc;

use serde_json::{json, to_value, Value};
use tracing::debug;
use uuid::Uuid;

use super::models::{Device, DeviceStatus, DeviceUpdate, RegisterDevicePayload, TABLE};
use super::twin::{ensure_thing, retract_thing};
use crate::common::{ApiError, ApiRequest, ApiResponse};
use crate::kernel::{ScanFilter, ServerDeps, TwinAttributes};

/// POST /smart-home/devices/register - provision twin entries for the
/// light and motion sensor, then persist the device record.
///
/// Either twin identifier already present in the group is a conflict; a
/// twin newly created before the conflict was discovered is retracted so
/// the failed registration leaves nothing behind.
pub async fn register(req: ApiRequest, deps: Arc<ServerDeps>) -> Result<ApiResponse, ApiError> {
    let auth = req.require_user()?;
    let payload: RegisterDevicePayload = req.json_body()?;

    let light_existed =
        ensure_thing(deps.registry.as_ref(), &deps.twin_group, &payload.light_id).await?;
    let motion_existed = ensure_thing(
        deps.registry.as_ref(),
        &deps.twin_group,
        &payload.motion_sensor_id,
    )
    .await?;

    if light_existed || motion_existed {
        if !light_existed {
            retract_thing(deps.registry.as_ref(), &deps.twin_group, &payload.light_id).await?;
        }
        if !motion_existed {
            retract_thing(
                deps.registry.as_ref(),
                &deps.twin_group,
                &payload.motion_sensor_id,
            )
            .await?;
        }
        return Err(ApiError::Conflict(
            "Device identifiers already registered".to_string(),
        ));
    }

    let device = Device {
        device_id: Uuid::new_v4().to_string(),
        user_id: auth.sub.clone(),
        light_id: payload.light_id,
        light_name: payload.light_name,
        motion_sensor_id: payload.motion_sensor_id,
        motion_sensor_name: payload.motion_sensor_name,
        room_id: payload.room_id,
        room_name: payload.room_name,
        is_registered: true,
        is_motion_detected: false,
        is_light_on: false,
        device_status: DeviceStatus::Active,
    };
    let doc = to_value(&device).map_err(anyhow::Error::from)?;
    deps.store.put(TABLE, &device.key(), doc).await?;

    Ok(ApiResponse::created(json!({
        "message": "Device is created successfully",
        "deviceId": device.device_id,
    })))
}

/// GET /smart-home/devices/{id} - point lookup.
pub async fn get(req: ApiRequest, deps: Arc<ServerDeps>) -> Result<ApiResponse, ApiError> {
    let auth = req.require_user()?;
    let device_id = req.require_path_id()?;

    let doc = deps
        .store
        .get(TABLE, &Device::key_for(device_id, &auth.sub))
        .await?
        .ok_or_else(|| ApiError::NotFound("Device not found".to_string()))?;

    Ok(ApiResponse::ok(json!({
        "message": "Device details",
        "device": doc,
    })))
}

/// GET /smart-home/devices - full scan filtered by the caller's user id.
/// No pagination; acceptable at this fleet size.
pub async fn get_all(req: ApiRequest, deps: Arc<ServerDeps>) -> Result<ApiResponse, ApiError> {
    let auth = req.require_user()?;

    let filter = ScanFilter::equals("userId", Value::String(auth.sub.clone()));
    let docs = deps.store.scan(TABLE, Some(&filter)).await?;

    Ok(ApiResponse::ok(json!({
        "message": "All device details",
        "devices": docs,
    })))
}

/// PATCH /smart-home/devices/{id} - typed merge-write after an existence
/// check.
pub async fn update(req: ApiRequest, deps: Arc<ServerDeps>) -> Result<ApiResponse, ApiError> {
    let auth = req.require_user()?;
    let device_id = req.require_path_id()?;
    let update: DeviceUpdate = req.json_body()?;

    let key = Device::key_for(device_id, &auth.sub);
    if deps.store.get(TABLE, &key).await?.is_none() {
        return Err(ApiError::NotFound("Device not found".to_string()));
    }

    let updated = deps.store.update(TABLE, &key, update.into_attrs()).await?;

    Ok(ApiResponse::ok(json!({
        "message": "Device updated successfully",
        "device": updated,
    })))
}

/// DELETE /smart-home/devices/{id} - remove the record, then retract the
/// twin identifiers from the group attributes.
///
/// Record deletion comes first; a crash between the two steps leaves a
/// stale twin reference, which is harmless but surfaces as cleanup debt.
pub async fn delete(req: ApiRequest, deps: Arc<ServerDeps>) -> Result<ApiResponse, ApiError> {
    let auth = req.require_user()?;
    let device_id = req.require_path_id()?;

    let key = Device::key_for(device_id, &auth.sub);
    let doc = deps
        .store
        .get(TABLE, &key)
        .await?
        .ok_or_else(|| ApiError::NotFound("Device not found".to_string()))?;
    let device: Device = serde_json::from_value(doc).map_err(anyhow::Error::from)?;

    deps.store.delete(TABLE, &key).await?;

    let mut retract = TwinAttributes::new();
    retract.insert("lightId".to_string(), device.light_id.clone());
    retract.insert("motionSensorId".to_string(), device.motion_sensor_id.clone());
    // Stale group attributes after a crash here are harmless (never used
    // to resolve users) but show up as cleanup debt in monitoring.
    debug!(device_id, "retracting twin identifiers from group attributes");
    deps.registry
        .update_group_attrs(&deps.twin_group, &retract, false)
        .await?;

    Ok(ApiResponse::ok(json!({
        "message": "Device deleted",
        "deviceId": device_id,
    })))
}
