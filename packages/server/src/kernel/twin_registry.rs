//! Device-twin registry clients for production and testing.
//!
//! The real registry is an external HTTP service holding named things with
//! free-form string attributes and group membership. The test registry
//! mirrors its semantics in memory and records attribute updates so tests
//! can assert on twin state.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::sync::RwLock;

use super::traits::{BaseTwinRegistry, TwinAttributes};

/// HTTP client for the twin registry collaborator.
pub struct HttpTwinRegistry {
    http: reqwest::Client,
    base_url: String,
}

impl HttpTwinRegistry {
    pub fn new(base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[derive(Deserialize)]
struct GroupMembers {
    things: Vec<String>,
}

#[async_trait]
impl BaseTwinRegistry for HttpTwinRegistry {
    async fn list_group_members(&self, group: &str) -> Result<Vec<String>> {
        let members: GroupMembers = self
            .http
            .get(format!("{}/groups/{}/things", self.base_url, group))
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .with_context(|| format!("failed to list things in group {}", group))?
            .json()
            .await
            .context("invalid group membership response")?;
        Ok(members.things)
    }

    async fn create_thing(&self, name: &str, attributes: &TwinAttributes) -> Result<()> {
        self.http
            .post(format!("{}/things", self.base_url))
            .json(&json!({ "name": name, "attributes": attributes }))
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .with_context(|| format!("failed to create thing {}", name))?;
        Ok(())
    }

    async fn add_to_group(&self, group: &str, name: &str) -> Result<()> {
        self.http
            .put(format!("{}/groups/{}/things/{}", self.base_url, group, name))
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .with_context(|| format!("failed to add {} to group {}", name, group))?;
        Ok(())
    }

    async fn remove_from_group(&self, group: &str, name: &str) -> Result<()> {
        self.http
            .delete(format!("{}/groups/{}/things/{}", self.base_url, group, name))
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .with_context(|| format!("failed to remove {} from group {}", name, group))?;
        Ok(())
    }

    async fn delete_thing(&self, name: &str) -> Result<()> {
        self.http
            .delete(format!("{}/things/{}", self.base_url, name))
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .with_context(|| format!("failed to delete thing {}", name))?;
        Ok(())
    }

    async fn update_thing_attrs(&self, name: &str, attributes: &TwinAttributes) -> Result<()> {
        self.http
            .patch(format!("{}/things/{}/attributes", self.base_url, name))
            .json(&json!({ "attributes": attributes }))
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .with_context(|| format!("failed to update attributes of thing {}", name))?;
        Ok(())
    }

    async fn update_group_attrs(
        &self,
        group: &str,
        attributes: &TwinAttributes,
        merge: bool,
    ) -> Result<()> {
        self.http
            .patch(format!("{}/groups/{}/attributes", self.base_url, group))
            .json(&json!({ "attributes": attributes, "merge": merge }))
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .with_context(|| format!("failed to update attributes of group {}", group))?;
        Ok(())
    }
}

/// One recorded thing-attribute update.
#[derive(Debug, Clone)]
pub struct ThingUpdate {
    pub name: String,
    pub attributes: TwinAttributes,
}

#[derive(Default)]
struct RegistryState {
    things: HashMap<String, TwinAttributes>,
    groups: HashMap<String, Vec<String>>,
    group_attrs: HashMap<String, TwinAttributes>,
    thing_updates: Vec<ThingUpdate>,
}

/// In-memory twin registry that tracks calls for testing.
#[derive(Default)]
pub struct TestTwinRegistry {
    state: RwLock<RegistryState>,
}

impl TestTwinRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a thing that is already a member of a group.
    pub fn with_thing(self, group: &str, name: &str) -> Self {
        {
            let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
            state.things.insert(name.to_string(), TwinAttributes::new());
            state
                .groups
                .entry(group.to_string())
                .or_default()
                .push(name.to_string());
        }
        self
    }

    /// Seed group-level attributes.
    pub fn with_group_attrs(self, group: &str, attrs: TwinAttributes) -> Self {
        self.state
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .group_attrs
            .insert(group.to_string(), attrs);
        self
    }

    pub fn thing_exists(&self, name: &str) -> bool {
        self.state
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .things
            .contains_key(name)
    }

    pub fn thing_attrs(&self, name: &str) -> Option<TwinAttributes> {
        self.state
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .things
            .get(name)
            .cloned()
    }

    pub fn group_members(&self, group: &str) -> Vec<String> {
        self.state
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .groups
            .get(group)
            .cloned()
            .unwrap_or_default()
    }

    pub fn group_attrs(&self, group: &str) -> TwinAttributes {
        self.state
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .group_attrs
            .get(group)
            .cloned()
            .unwrap_or_default()
    }

    /// All thing-attribute updates, in call order.
    pub fn thing_updates(&self) -> Vec<ThingUpdate> {
        self.state
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .thing_updates
            .clone()
    }
}

#[async_trait]
impl BaseTwinRegistry for TestTwinRegistry {
    async fn list_group_members(&self, group: &str) -> Result<Vec<String>> {
        Ok(self.group_members(group))
    }

    async fn create_thing(&self, name: &str, attributes: &TwinAttributes) -> Result<()> {
        self.state
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .things
            .insert(name.to_string(), attributes.clone());
        Ok(())
    }

    async fn add_to_group(&self, group: &str, name: &str) -> Result<()> {
        self.state
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .groups
            .entry(group.to_string())
            .or_default()
            .push(name.to_string());
        Ok(())
    }

    async fn remove_from_group(&self, group: &str, name: &str) -> Result<()> {
        if let Some(members) = self
            .state
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .groups
            .get_mut(group)
        {
            members.retain(|m| m != name);
        }
        Ok(())
    }

    async fn delete_thing(&self, name: &str) -> Result<()> {
        self.state
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .things
            .remove(name);
        Ok(())
    }

    async fn update_thing_attrs(&self, name: &str, attributes: &TwinAttributes) -> Result<()> {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        // Last-write-wins overwrite of the attribute set.
        state
            .things
            .insert(name.to_string(), attributes.clone());
        state.thing_updates.push(ThingUpdate {
            name: name.to_string(),
            attributes: attributes.clone(),
        });
        Ok(())
    }

    async fn update_group_attrs(
        &self,
        group: &str,
        attributes: &TwinAttributes,
        merge: bool,
    ) -> Result<()> {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        let attrs = state.group_attrs.entry(group.to_string()).or_default();
        if merge {
            attrs.extend(attributes.clone());
        } else {
            // merge = false retracts the named keys.
            for key in attributes.keys() {
                attrs.remove(key);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_and_list_group_members() {
        let registry = TestTwinRegistry::new();
        registry.create_thing("L1", &TwinAttributes::new()).await.unwrap();
        registry.add_to_group("home", "L1").await.unwrap();

        assert!(registry.thing_exists("L1"));
        assert_eq!(
            registry.list_group_members("home").await.unwrap(),
            vec!["L1".to_string()]
        );
    }

    #[tokio::test]
    async fn group_attrs_retract_on_merge_false() {
        let mut seeded = TwinAttributes::new();
        seeded.insert("lightId".to_string(), "L1".to_string());
        seeded.insert("motionSensorId".to_string(), "M1".to_string());
        seeded.insert("other".to_string(), "keep".to_string());
        let registry = TestTwinRegistry::new().with_group_attrs("home", seeded);

        let mut retract = TwinAttributes::new();
        retract.insert("lightId".to_string(), "L1".to_string());
        retract.insert("motionSensorId".to_string(), "M1".to_string());
        registry
            .update_group_attrs("home", &retract, false)
            .await
            .unwrap();

        let remaining = registry.group_attrs("home");
        assert!(!remaining.contains_key("lightId"));
        assert!(!remaining.contains_key("motionSensorId"));
        assert_eq!(remaining.get("other"), Some(&"keep".to_string()));
    }

    #[tokio::test]
    async fn thing_updates_are_recorded_in_order() {
        let registry = TestTwinRegistry::new().with_thing("home", "L1");

        let mut attrs = TwinAttributes::new();
        attrs.insert("isLightOn".to_string(), "true".to_string());
        registry.update_thing_attrs("L1", &attrs).await.unwrap();

        let updates = registry.thing_updates();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].name, "L1");
        assert_eq!(registry.thing_attrs("L1").unwrap(), attrs);
    }
}
