pub mod deps;
pub mod document_store;
pub mod identity;
pub mod mailer;
pub mod test_dependencies;
pub mod topic;
pub mod traits;
pub mod twin_registry;

pub use deps::ServerDeps;
pub use document_store::{MemoryDocumentStore, PostgresDocumentStore};
pub use identity::{HttpIdentityProvider, TestIdentityProvider};
pub use mailer::{HttpMailer, TestMailer};
pub use test_dependencies::TestDependencies;
pub use topic::{NatsTopicPublisher, TestTopic};
pub use traits::{
    BaseDocumentStore, BaseIdentityProvider, BaseMailer, BaseTopicPublisher, BaseTwinRegistry,
    DocKey, PublishReceipt, ScanFilter, TwinAttributes,
};
pub use twin_registry::{HttpTwinRegistry, TestTwinRegistry};
