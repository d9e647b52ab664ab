//! Notification fan-out: compose, deliver, and durably log an alert.

use anyhow::Result;
use bytes::Bytes;
use chrono::Utc;
use serde_json::to_value;
use std::collections::BTreeMap;
use tracing::warn;
use uuid::Uuid;

use super::models::{Alert, TABLE};
use crate::domains::devices::models::Device;
use crate::domains::users::models::User;
use crate::kernel::ServerDeps;

pub const ALERT_SUBJECT: &str = "Motion Detection Alert";

/// Fixed alert template naming the user and the device's room.
pub fn compose_message(user: &User, device: &Device) -> String {
    format!(
        "Dear {}\n\n\
         Motion has been detected in your home while you're away. \
         Please take immediate action to ensure the security of your residence.\n\
         Room-Location: \"{}\".",
        user.user_name, device.room_name
    )
}

/// Dispatch one motion-while-away notification.
///
/// All three sub-steps (direct send, fan-out publish, audit write) are
/// attempted unconditionally; an earlier failure never blocks a later
/// sub-step and nothing is rolled back. Only a failed audit write makes
/// the dispatch itself fail.
pub async fn dispatch(user: &User, device: &Device, deps: &ServerDeps) -> Result<Alert> {
    let message = compose_message(user, device);

    // Direct delivery is best-effort.
    if let Err(error) = deps
        .mailer
        .send(&user.email, ALERT_SUBJECT, &message)
        .await
    {
        warn!(user_id = %user.id, error = %error, "direct alert delivery failed");
    }

    let mut attributes = BTreeMap::new();
    attributes.insert("userId".to_string(), user.id.clone());
    attributes.insert("email".to_string(), user.email.clone());

    let published_data = match deps
        .topic
        .publish(
            &deps.alert_topic,
            Bytes::from(message.clone()),
            &attributes,
        )
        .await
    {
        Ok(receipt) => serde_json::to_string(&receipt)?,
        Err(error) => {
            warn!(user_id = %user.id, error = %error, "alert fan-out publish failed");
            serde_json::json!({ "error": error.to_string() }).to_string()
        }
    };

    let alert = Alert {
        alert_id: Uuid::new_v4().to_string(),
        user_id: user.id.clone(),
        device_id: device.device_id.clone(),
        date: Utc::now(),
        message,
        published_data,
    };
    deps.store
        .put(TABLE, &alert.key(), to_value(&alert)?)
        .await?;

    Ok(alert)
}
