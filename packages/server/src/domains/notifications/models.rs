use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::kernel::DocKey;

pub const TABLE: &str = "notifications";

/// Append-only audit record of one dispatched notification.
///
/// `message` is the serialized content actually sent; `published_data`
/// the serialized delivery receipt (or error payload) from the fan-out
/// publish. Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub alert_id: String,
    pub user_id: String,
    pub device_id: String,
    #[serde(rename = "Date")]
    pub date: DateTime<Utc>,
    pub message: String,
    pub published_data: String,
}

impl Alert {
    pub fn key(&self) -> DocKey {
        Self::key_for(&self.alert_id, &self.user_id)
    }

    pub fn key_for(alert_id: &str, user_id: &str) -> DocKey {
        DocKey::composite(alert_id, user_id)
    }
}
