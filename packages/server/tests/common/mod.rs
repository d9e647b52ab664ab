// Shared fixtures for integration tests.
#![allow(dead_code)]

use axum::http::Method;
use serde_json::Value;

use smarthome_core::common::{ApiRequest, AuthUser};
use smarthome_core::domains::devices::models::{Device, DeviceStatus};
use smarthome_core::domains::users::models::User;
use smarthome_core::server::router::normalize_path;

/// Verified claims for a regular user.
pub fn auth(sub: &str) -> AuthUser {
    AuthUser {
        sub: sub.to_string(),
        email: Some(format!("{}@example.com", sub)),
        groups: vec![],
    }
}

/// Verified claims carrying the Admin group.
pub fn admin(sub: &str) -> AuthUser {
    AuthUser {
        groups: vec!["Admin".to_string()],
        ..auth(sub)
    }
}

/// Build a logical request the way the entry point does: normalize the
/// raw path and extract the `{id}` parameter.
pub fn request(
    method: Method,
    raw_path: &str,
    body: Option<Value>,
    auth: Option<AuthUser>,
) -> ApiRequest {
    let (route_path, path_id) = normalize_path(raw_path);
    ApiRequest {
        method,
        route_path,
        path_id,
        body: body.map(|b| b.to_string()),
        auth,
    }
}

pub fn sample_user(id: &str, is_home: bool) -> User {
    User {
        id: id.to_string(),
        email: format!("{}@example.com", id),
        user_name: format!("user-{}", id),
        phone: "+15550100".to_string(),
        is_home,
        is_admin: false,
    }
}

pub fn sample_device(device_id: &str, user_id: &str, light_id: &str, motion_id: &str) -> Device {
    Device {
        device_id: device_id.to_string(),
        user_id: user_id.to_string(),
        light_id: light_id.to_string(),
        light_name: "Ceiling light".to_string(),
        motion_sensor_id: motion_id.to_string(),
        motion_sensor_name: "Corner sensor".to_string(),
        room_id: "r1".to_string(),
        room_name: "Living room".to_string(),
        is_registered: true,
        is_motion_detected: false,
        is_light_on: false,
        device_status: DeviceStatus::Active,
    }
}
