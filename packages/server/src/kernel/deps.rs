//! Server dependencies for handlers (using traits for testability)
//!
//! Central dependency container constructed once at process start and
//! passed by reference into every handler and into the motion pipeline.
//! No module-scope client singletons anywhere.

use std::sync::Arc;

use super::traits::{
    BaseDocumentStore, BaseIdentityProvider, BaseMailer, BaseTopicPublisher, BaseTwinRegistry,
};

/// Server dependencies accessible to handlers (using traits for testability)
#[derive(Clone)]
pub struct ServerDeps {
    pub store: Arc<dyn BaseDocumentStore>,
    pub registry: Arc<dyn BaseTwinRegistry>,
    pub topic: Arc<dyn BaseTopicPublisher>,
    pub mailer: Arc<dyn BaseMailer>,
    pub identity: Arc<dyn BaseIdentityProvider>,
    /// Fixed group all device twins belong to.
    pub twin_group: String,
    /// Subject the motion pipeline is fed from.
    pub motion_topic: String,
    /// Fan-out subject for dispatched alerts.
    pub alert_topic: String,
}

impl ServerDeps {
    pub fn new(
        store: Arc<dyn BaseDocumentStore>,
        registry: Arc<dyn BaseTwinRegistry>,
        topic: Arc<dyn BaseTopicPublisher>,
        mailer: Arc<dyn BaseMailer>,
        identity: Arc<dyn BaseIdentityProvider>,
        twin_group: String,
        motion_topic: String,
        alert_topic: String,
    ) -> Self {
        Self {
            store,
            registry,
            topic,
            mailer,
            identity,
            twin_group,
            motion_topic,
            alert_topic,
        }
    }
}
