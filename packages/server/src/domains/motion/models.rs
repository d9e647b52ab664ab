use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::kernel::TwinAttributes;

/// Actuation command derived from a raw motion reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    #[serde(rename = "ON")]
    On,
    #[serde(rename = "OFF")]
    Off,
}

impl Command {
    pub fn from_motion(motion_detected: bool) -> Self {
        if motion_detected {
            Command::On
        } else {
            Command::Off
        }
    }

    fn flags(self) -> bool {
        matches!(self, Command::On)
    }

    /// Attribute set applied to both twins. Idempotent: re-applying the
    /// same command yields the same state.
    pub fn twin_attrs(self) -> TwinAttributes {
        let flag = self.flags().to_string();
        let mut attrs = TwinAttributes::new();
        attrs.insert("isLightOn".to_string(), flag.clone());
        attrs.insert("isMotionDetected".to_string(), flag);
        attrs.insert("deviceStatus".to_string(), "ACTIVE".to_string());
        attrs
    }

    /// The same boolean pair as a merge-write for the device record.
    pub fn record_attrs(self) -> Map<String, Value> {
        let flag = self.flags();
        let mut attrs = Map::new();
        attrs.insert("isLightOn".to_string(), Value::Bool(flag));
        attrs.insert("isMotionDetected".to_string(), Value::Bool(flag));
        attrs
    }
}

/// One motion event, as published on the motion topic.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MotionSignal {
    pub user_id: String,
    pub device_id: String,
    pub command: Command,
}

/// Body of the motion trigger endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MotionReportPayload {
    pub motion_detected: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn command_wire_names() {
        assert_eq!(serde_json::to_value(Command::On).unwrap(), json!("ON"));
        assert_eq!(serde_json::to_value(Command::Off).unwrap(), json!("OFF"));
    }

    #[test]
    fn on_command_attribute_sets() {
        let twin = Command::On.twin_attrs();
        assert_eq!(twin.get("isLightOn").unwrap(), "true");
        assert_eq!(twin.get("isMotionDetected").unwrap(), "true");
        assert_eq!(twin.get("deviceStatus").unwrap(), "ACTIVE");

        let record = Command::On.record_attrs();
        assert_eq!(record["isLightOn"], json!(true));
        assert_eq!(record["isMotionDetected"], json!(true));
    }

    #[test]
    fn off_command_keeps_device_active() {
        let twin = Command::Off.twin_attrs();
        assert_eq!(twin.get("isLightOn").unwrap(), "false");
        assert_eq!(twin.get("deviceStatus").unwrap(), "ACTIVE");
    }

    #[test]
    fn signal_roundtrip() {
        let signal = MotionSignal {
            user_id: "u1".to_string(),
            device_id: "d1".to_string(),
            command: Command::On,
        };
        let wire = serde_json::to_value(&signal).unwrap();
        assert_eq!(wire, json!({"userId": "u1", "deviceId": "d1", "command": "ON"}));
    }
}
