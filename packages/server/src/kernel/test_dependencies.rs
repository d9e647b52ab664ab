// TestDependencies - mock implementations for testing
//
// Assembles a ServerDeps backed entirely by the recording mocks, with
// handles kept on each mock so tests can inspect calls and state.

use std::sync::Arc;

use serde_json::to_value;

use super::document_store::MemoryDocumentStore;
use super::identity::TestIdentityProvider;
use super::mailer::TestMailer;
use super::topic::TestTopic;
use super::twin_registry::TestTwinRegistry;
use super::ServerDeps;
use crate::common::errors::ApiError;
use crate::domains::devices::models::{self as device_models, Device};
use crate::domains::users::models::{self as user_models, User};
use crate::kernel::traits::BaseDocumentStore;

pub const TEST_TWIN_GROUP: &str = "test-things";
pub const TEST_MOTION_TOPIC: &str = "test.motion";
pub const TEST_ALERT_TOPIC: &str = "test.alerts";

/// Fully mocked dependency set for tests.
pub struct TestDependencies {
    pub store: Arc<MemoryDocumentStore>,
    pub registry: Arc<TestTwinRegistry>,
    pub topic: Arc<TestTopic>,
    pub mailer: Arc<TestMailer>,
    pub identity: Arc<TestIdentityProvider>,
    pub deps: Arc<ServerDeps>,
}

impl TestDependencies {
    pub fn new() -> Self {
        Self::with_registry(TestTwinRegistry::new())
    }

    /// Build around a pre-seeded twin registry.
    pub fn with_registry(registry: TestTwinRegistry) -> Self {
        let store = Arc::new(MemoryDocumentStore::new());
        let registry = Arc::new(registry);
        let topic = Arc::new(TestTopic::new());
        let mailer = Arc::new(TestMailer::new());
        let identity = Arc::new(TestIdentityProvider::new());

        let deps = Arc::new(ServerDeps::new(
            store.clone(),
            registry.clone(),
            topic.clone(),
            mailer.clone(),
            identity.clone(),
            TEST_TWIN_GROUP.to_string(),
            TEST_MOTION_TOPIC.to_string(),
            TEST_ALERT_TOPIC.to_string(),
        ));

        Self {
            store,
            registry,
            topic,
            mailer,
            identity,
            deps,
        }
    }

    /// Seed a user record directly into the store.
    pub async fn seed_user(&self, user: &User) -> Result<(), ApiError> {
        let doc = to_value(user).map_err(anyhow::Error::from)?;
        self.store
            .put(user_models::TABLE, &user.key(), doc)
            .await?;
        Ok(())
    }

    /// Seed a device record directly into the store.
    pub async fn seed_device(&self, device: &Device) -> Result<(), ApiError> {
        let doc = to_value(device).map_err(anyhow::Error::from)?;
        self.store
            .put(device_models::TABLE, &device.key(), doc)
            .await?;
        Ok(())
    }
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}
