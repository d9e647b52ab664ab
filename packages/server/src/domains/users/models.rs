use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::kernel::DocKey;

pub const TABLE: &str = "users";

/// User record, keyed by the identity-provider subject id.
///
/// `is_home` is the sole field the motion pipeline reads; it is mutated
/// only by explicit user updates, never by the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub user_name: String,
    pub phone: String,
    pub is_home: bool,
    pub is_admin: bool,
}

impl User {
    pub fn key(&self) -> DocKey {
        Self::key_for(&self.id)
    }

    pub fn key_for(id: &str) -> DocKey {
        DocKey::partition(id)
    }
}

/// Sign-up request payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserPayload {
    pub user_name: String,
    pub email: String,
    pub password: String,
    pub mobile_number: String,
}

/// Verification / password-reset payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyUserPayload {
    pub email: String,
    pub otp: String,
    #[serde(default)]
    pub is_forget_password: bool,
    pub password: Option<String>,
}

/// Login payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginPayload {
    pub email: String,
    pub password: String,
}

/// Legal mutable fields of a user record. Unknown keys are rejected
/// instead of silently merged.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UserUpdate {
    pub user_name: Option<String>,
    pub phone: Option<String>,
    pub is_home: Option<bool>,
}

impl UserUpdate {
    /// Attribute map for the store's merge-write, only set fields included.
    pub fn into_attrs(self) -> Map<String, Value> {
        let mut attrs = Map::new();
        if let Some(user_name) = self.user_name {
            attrs.insert("userName".to_string(), Value::String(user_name));
        }
        if let Some(phone) = self.phone {
            attrs.insert("phone".to_string(), Value::String(phone));
        }
        if let Some(is_home) = self.is_home {
            attrs.insert("isHome".to_string(), Value::Bool(is_home));
        }
        attrs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn user_serializes_with_camel_case_wire_names() {
        let user = User {
            id: "u1".to_string(),
            email: "a@b.c".to_string(),
            user_name: "Ada".to_string(),
            phone: "+1555".to_string(),
            is_home: true,
            is_admin: false,
        };
        let doc = serde_json::to_value(&user).unwrap();
        assert_eq!(doc["userName"], json!("Ada"));
        assert_eq!(doc["isHome"], json!(true));
    }

    #[test]
    fn update_rejects_unknown_keys() {
        let result: Result<UserUpdate, _> =
            serde_json::from_value(json!({"isHome": false, "isAdmin": true}));
        assert!(result.is_err());
    }

    #[test]
    fn update_attrs_carry_only_set_fields() {
        let update: UserUpdate = serde_json::from_value(json!({"isHome": false})).unwrap();
        let attrs = update.into_attrs();
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs["isHome"], json!(false));
    }
}
