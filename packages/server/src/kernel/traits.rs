// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic. Domain code
// (device lifecycle, motion pipeline, notification dispatch) uses these
// traits and never constructs a concrete client itself.
//
// Naming convention: Base* for trait names (e.g., BaseDocumentStore)

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

// =============================================================================
// Document Store Trait (Infrastructure)
// =============================================================================

/// Partition/sort key pair addressing one document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocKey {
    pub partition: String,
    pub sort: Option<String>,
}

impl DocKey {
    /// Key with a partition component only.
    pub fn partition(partition: impl Into<String>) -> Self {
        Self {
            partition: partition.into(),
            sort: None,
        }
    }

    /// Composite partition + sort key.
    pub fn composite(partition: impl Into<String>, sort: impl Into<String>) -> Self {
        Self {
            partition: partition.into(),
            sort: Some(sort.into()),
        }
    }
}

/// Equality filter applied during an unindexed full-table scan.
#[derive(Debug, Clone)]
pub struct ScanFilter {
    pub field: String,
    pub equals: Value,
}

impl ScanFilter {
    pub fn equals(field: impl Into<String>, value: Value) -> Self {
        Self {
            field: field.into(),
            equals: value,
        }
    }
}

/// Generic read/write/scan/update primitives against a document store.
///
/// Returns plain JSON documents; typed domain records convert at the
/// domain boundary. `update` is a merge-write of only the given attributes
/// and returns the updated document, erroring when the document is absent.
#[async_trait]
pub trait BaseDocumentStore: Send + Sync {
    async fn get(&self, table: &str, key: &DocKey) -> Result<Option<Value>>;

    async fn put(&self, table: &str, key: &DocKey, doc: Value) -> Result<()>;

    async fn scan(&self, table: &str, filter: Option<&ScanFilter>) -> Result<Vec<Value>>;

    async fn update(&self, table: &str, key: &DocKey, attrs: Map<String, Value>)
        -> Result<Value>;

    async fn delete(&self, table: &str, key: &DocKey) -> Result<()>;
}

// =============================================================================
// Device-Twin Registry Trait (Infrastructure)
// =============================================================================

/// String-valued twin attributes, as the registry stores them.
pub type TwinAttributes = BTreeMap<String, String>;

/// Operations against the external device-twin registry.
///
/// Things are addressed by name and grouped under named groups. Attribute
/// updates are last-write-wins; there is no concurrency token. With
/// `merge = false`, `update_group_attrs` removes the named keys from the
/// group-level payload instead of merging them.
#[async_trait]
pub trait BaseTwinRegistry: Send + Sync {
    async fn list_group_members(&self, group: &str) -> Result<Vec<String>>;

    async fn create_thing(&self, name: &str, attributes: &TwinAttributes) -> Result<()>;

    async fn add_to_group(&self, group: &str, name: &str) -> Result<()>;

    async fn remove_from_group(&self, group: &str, name: &str) -> Result<()>;

    async fn delete_thing(&self, name: &str) -> Result<()>;

    async fn update_thing_attrs(&self, name: &str, attributes: &TwinAttributes) -> Result<()>;

    async fn update_group_attrs(
        &self,
        group: &str,
        attributes: &TwinAttributes,
        merge: bool,
    ) -> Result<()>;
}

// =============================================================================
// Fan-out Topic Trait (Infrastructure)
// =============================================================================

/// Receipt for one published message, persisted into the alert trail.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct PublishReceipt {
    pub message_id: String,
    pub subject: String,
}

/// Publish operations on the pub/sub fan-out topic.
#[async_trait]
pub trait BaseTopicPublisher: Send + Sync {
    /// Publish a message with string attributes to a subject.
    async fn publish(
        &self,
        subject: &str,
        payload: Bytes,
        attributes: &BTreeMap<String, String>,
    ) -> Result<PublishReceipt>;
}

// =============================================================================
// Direct Message Channel Trait (Infrastructure)
// =============================================================================

/// Direct, best-effort delivery to a single recipient (email).
#[async_trait]
pub trait BaseMailer: Send + Sync {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<()>;
}

// =============================================================================
// Identity Provider Trait (Infrastructure)
// =============================================================================

/// Sign-up/sign-in calls exposed by the external identity provider.
///
/// Authorization itself (token verification) happens at the HTTP entry
/// point; these calls only cover account lifecycle.
#[async_trait]
pub trait BaseIdentityProvider: Send + Sync {
    /// Register a new account, returning the stable subject id.
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        attributes: &BTreeMap<String, String>,
    ) -> Result<String>;

    /// Confirm a pending sign-up with the emailed code.
    async fn confirm_sign_up(&self, email: &str, code: &str) -> Result<()>;

    /// Authenticate, returning the provider's session payload verbatim.
    async fn initiate_auth(&self, email: &str, password: &str) -> Result<Value>;

    /// Complete a password reset with the emailed code.
    async fn confirm_forgot_password(
        &self,
        email: &str,
        code: &str,
        new_password: &str,
    ) -> Result<()>;
}
