//! Motion -> decision -> action pipeline.
//!
//! Takes a raw motion signal, resolves user and device context, decides
//! whether to alert, and applies the actuation to both the twin registry
//! and the persisted device record. The two stores are independently
//! consistent; there is no transaction across them.

use anyhow::anyhow;
use serde_json::Value;
use tracing::{debug, error, info};

use super::models::MotionSignal;
use crate::common::ApiError;
use crate::domains::devices::models::{self as device_models, Device};
use crate::domains::notifications::dispatcher;
use crate::domains::users::models::{self as user_models, User};
use crate::kernel::ServerDeps;

/// Handle one motion signal end to end.
///
/// Sequencing: twin update, then record update, then (conditionally) the
/// notification. A twin failure skips the record write so failure
/// attribution stays clean; a dispatcher failure is logged and never
/// rolls back the actuation already performed. Returns the updated
/// device-record snapshot.
pub async fn handle_motion_signal(
    signal: &MotionSignal,
    deps: &ServerDeps,
) -> Result<Value, ApiError> {
    // RESOLVING: both records must exist or nothing is written.
    let user_doc = deps
        .store
        .get(user_models::TABLE, &User::key_for(&signal.user_id))
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
    let user: User = serde_json::from_value(user_doc).map_err(anyhow::Error::from)?;

    let device_doc = deps
        .store
        .get(
            device_models::TABLE,
            &Device::key_for(&signal.device_id, &signal.user_id),
        )
        .await?
        .ok_or_else(|| ApiError::NotFound("Device not found".to_string()))?;
    let device: Device = serde_json::from_value(device_doc).map_err(anyhow::Error::from)?;

    // DECIDING: actuation always runs; the alert only when the user is
    // away and motion was newly detected.
    let notify = !user.is_home && signal.command == super::models::Command::On;
    debug!(
        user_id = %user.id,
        device_id = %device.device_id,
        command = ?signal.command,
        notify,
        "motion signal resolved"
    );

    // ACTING - twin update. Re-resolve live twin names from the group
    // listing rather than trusting the stored ids blindly; a registered
    // device without a twin entry is a bug, not a normal state.
    let members = deps.registry.list_group_members(&deps.twin_group).await?;
    let light_twin = members
        .iter()
        .find(|m| **m == device.light_id)
        .ok_or_else(|| {
            ApiError::Upstream(anyhow!("twin entry missing for light {}", device.light_id))
        })?;
    let motion_twin = members
        .iter()
        .find(|m| **m == device.motion_sensor_id)
        .ok_or_else(|| {
            ApiError::Upstream(anyhow!(
                "twin entry missing for motion sensor {}",
                device.motion_sensor_id
            ))
        })?;

    // Light and motion twins are kept in lockstep.
    let twin_attrs = signal.command.twin_attrs();
    deps.registry.update_thing_attrs(light_twin, &twin_attrs).await?;
    deps.registry.update_thing_attrs(motion_twin, &twin_attrs).await?;

    // ACTING - record update, same boolean pair as a merge-write.
    let updated = deps
        .store
        .update(
            device_models::TABLE,
            &device.key(),
            signal.command.record_attrs(),
        )
        .await?;

    // ACTING - notify. Independent, non-transactional side effect.
    if notify {
        match dispatcher::dispatch(&user, &device, deps).await {
            Ok(alert) => info!(alert_id = %alert.alert_id, "alert dispatched"),
            Err(err) => {
                error!(user_id = %user.id, error = %err, "notification dispatch failed")
            }
        }
    }

    Ok(updated)
}
