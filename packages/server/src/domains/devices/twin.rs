//! Idempotent twin provisioning for device registration.

use anyhow::Result;

use crate::kernel::{BaseTwinRegistry, TwinAttributes};

/// Default attribute set for a freshly created twin entry.
pub fn default_twin_attrs() -> TwinAttributes {
    let mut attrs = TwinAttributes::new();
    attrs.insert("isLightOn".to_string(), "false".to_string());
    attrs.insert("isMotionDetected".to_string(), "false".to_string());
    attrs.insert("deviceStatus".to_string(), "ACTIVE".to_string());
    attrs
}

/// Check-then-create a twin entry under the device group.
///
/// Returns `true` when `name` was already a group member ("already
/// existed") - registration treats that as a conflict. Otherwise creates
/// the twin with default attributes, adds it to the group, and returns
/// `false` ("newly created").
pub async fn ensure_thing(
    registry: &dyn BaseTwinRegistry,
    group: &str,
    name: &str,
) -> Result<bool> {
    let members = registry.list_group_members(group).await?;
    if members.iter().any(|member| member == name) {
        return Ok(true);
    }

    registry.create_thing(name, &default_twin_attrs()).await?;
    registry.add_to_group(group, name).await?;
    Ok(false)
}

/// Undo a `ensure_thing` that newly created its twin, so a half-failed
/// registration leaves no orphan entry behind.
pub async fn retract_thing(
    registry: &dyn BaseTwinRegistry,
    group: &str,
    name: &str,
) -> Result<()> {
    registry.remove_from_group(group, name).await?;
    registry.delete_thing(name).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::TestTwinRegistry;

    #[tokio::test]
    async fn ensure_thing_creates_then_reports_existing() {
        let registry = TestTwinRegistry::new();

        let existed = ensure_thing(&registry, "home", "L1").await.unwrap();
        assert!(!existed);
        assert!(registry.thing_exists("L1"));
        assert_eq!(registry.group_members("home"), vec!["L1".to_string()]);
        assert_eq!(
            registry.thing_attrs("L1").unwrap(),
            default_twin_attrs()
        );

        // Second call is the idempotency gate.
        let existed = ensure_thing(&registry, "home", "L1").await.unwrap();
        assert!(existed);
        assert_eq!(registry.group_members("home").len(), 1);
    }

    #[tokio::test]
    async fn retract_thing_removes_membership_and_entry() {
        let registry = TestTwinRegistry::new();
        ensure_thing(&registry, "home", "L1").await.unwrap();

        retract_thing(&registry, "home", "L1").await.unwrap();
        assert!(!registry.thing_exists("L1"));
        assert!(registry.group_members("home").is_empty());
    }
}
