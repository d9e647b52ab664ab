use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::kernel::DocKey;

pub const TABLE: &str = "devices";

/// Operational state of a device pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceStatus {
    #[serde(rename = "ACTIVE")]
    Active,
    #[serde(rename = "INACTIVE")]
    Inactive,
}

/// Device record pairing a light actuator and a motion sensor to a room.
///
/// Composite key (deviceId, userId) - a device belongs to exactly one
/// user. `light_id` and `motion_sensor_id` name the twin entries in the
/// external registry; they are globally unique across registrations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub device_id: String,
    pub user_id: String,
    pub light_id: String,
    pub light_name: String,
    pub motion_sensor_id: String,
    pub motion_sensor_name: String,
    pub room_id: String,
    pub room_name: String,
    pub is_registered: bool,
    pub is_motion_detected: bool,
    pub is_light_on: bool,
    pub device_status: DeviceStatus,
}

impl Device {
    pub fn key(&self) -> DocKey {
        Self::key_for(&self.device_id, &self.user_id)
    }

    pub fn key_for(device_id: &str, user_id: &str) -> DocKey {
        DocKey::composite(device_id, user_id)
    }
}

/// Device registration payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterDevicePayload {
    pub light_id: String,
    pub light_name: String,
    pub motion_sensor_id: String,
    pub motion_sensor_name: String,
    pub room_id: String,
    pub room_name: String,
}

/// Legal mutable fields of a device record. The twin identifiers and the
/// owning user are immutable after registration; unknown keys are
/// rejected instead of silently merged.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DeviceUpdate {
    pub light_name: Option<String>,
    pub motion_sensor_name: Option<String>,
    pub room_id: Option<String>,
    pub room_name: Option<String>,
    pub is_motion_detected: Option<bool>,
    pub is_light_on: Option<bool>,
    pub device_status: Option<DeviceStatus>,
}

impl DeviceUpdate {
    /// Attribute map for the store's merge-write. Boolean and string
    /// attribute typing is preserved.
    pub fn into_attrs(self) -> Map<String, Value> {
        let mut attrs = Map::new();
        if let Some(light_name) = self.light_name {
            attrs.insert("lightName".to_string(), Value::String(light_name));
        }
        if let Some(motion_sensor_name) = self.motion_sensor_name {
            attrs.insert(
                "motionSensorName".to_string(),
                Value::String(motion_sensor_name),
            );
        }
        if let Some(room_id) = self.room_id {
            attrs.insert("roomId".to_string(), Value::String(room_id));
        }
        if let Some(room_name) = self.room_name {
            attrs.insert("roomName".to_string(), Value::String(room_name));
        }
        if let Some(is_motion_detected) = self.is_motion_detected {
            attrs.insert(
                "isMotionDetected".to_string(),
                Value::Bool(is_motion_detected),
            );
        }
        if let Some(is_light_on) = self.is_light_on {
            attrs.insert("isLightOn".to_string(), Value::Bool(is_light_on));
        }
        if let Some(device_status) = self.device_status {
            let status = serde_json::to_value(device_status)
                .expect("device status serializes to a string");
            attrs.insert("deviceStatus".to_string(), status);
        }
        attrs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn device() -> Device {
        Device {
            device_id: "d1".to_string(),
            user_id: "u1".to_string(),
            light_id: "L1".to_string(),
            light_name: "Ceiling".to_string(),
            motion_sensor_id: "M1".to_string(),
            motion_sensor_name: "Corner".to_string(),
            room_id: "r1".to_string(),
            room_name: "Hall".to_string(),
            is_registered: true,
            is_motion_detected: false,
            is_light_on: false,
            device_status: DeviceStatus::Active,
        }
    }

    #[test]
    fn device_wire_format() {
        let doc = serde_json::to_value(device()).unwrap();
        assert_eq!(doc["deviceId"], json!("d1"));
        assert_eq!(doc["motionSensorId"], json!("M1"));
        assert_eq!(doc["deviceStatus"], json!("ACTIVE"));
        assert_eq!(doc["isLightOn"], json!(false));
    }

    #[test]
    fn update_rejects_immutable_fields() {
        let result: Result<DeviceUpdate, _> =
            serde_json::from_value(json!({"lightId": "L2"}));
        assert!(result.is_err());

        let result: Result<DeviceUpdate, _> =
            serde_json::from_value(json!({"userId": "other"}));
        assert!(result.is_err());
    }

    #[test]
    fn update_attrs_preserve_types() {
        let update: DeviceUpdate = serde_json::from_value(json!({
            "roomName": "Kitchen",
            "isLightOn": true,
            "deviceStatus": "INACTIVE",
        }))
        .unwrap();
        let attrs = update.into_attrs();
        assert_eq!(attrs["roomName"], json!("Kitchen"));
        assert_eq!(attrs["isLightOn"], json!(true));
        assert_eq!(attrs["deviceStatus"], json!("INACTIVE"));
    }
}
