//! Fan-out topic abstraction for production and testing.
//!
//! Provides a trait-based publisher that allows swapping between a real
//! NATS connection and a recording test mock.

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::BTreeMap;
use std::sync::RwLock;
use uuid::Uuid;

use super::traits::{BaseTopicPublisher, PublishReceipt};

/// A published message, as recorded by the test publisher.
#[derive(Debug, Clone)]
pub struct PublishedMessage {
    pub subject: String,
    pub payload: Bytes,
    pub attributes: BTreeMap<String, String>,
}

/// Real NATS-backed topic publisher.
pub struct NatsTopicPublisher {
    client: async_nats::Client,
}

impl NatsTopicPublisher {
    pub fn new(client: async_nats::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl BaseTopicPublisher for NatsTopicPublisher {
    async fn publish(
        &self,
        subject: &str,
        payload: Bytes,
        attributes: &BTreeMap<String, String>,
    ) -> Result<PublishReceipt> {
        let mut headers = async_nats::HeaderMap::new();
        for (key, value) in attributes {
            headers.insert(key.as_str(), value.as_str());
        }
        self.client
            .publish_with_headers(subject.to_string(), headers, payload)
            .await?;

        // NATS core has no broker-side receipt; a generated message id
        // stands in as the audit reference.
        Ok(PublishReceipt {
            message_id: Uuid::new_v4().to_string(),
            subject: subject.to_string(),
        })
    }
}

/// Mock topic publisher that tracks published messages for testing.
#[derive(Default)]
pub struct TestTopic {
    published: RwLock<Vec<PublishedMessage>>,
}

impl TestTopic {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all published messages.
    pub fn published_messages(&self) -> Vec<PublishedMessage> {
        self.published
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Get published messages for a specific subject.
    pub fn messages_for_subject(&self, subject: &str) -> Vec<PublishedMessage> {
        self.published
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|m| m.subject == subject)
            .cloned()
            .collect()
    }

    /// Get the count of messages published to a specific subject.
    pub fn publish_count_for(&self, subject: &str) -> usize {
        self.messages_for_subject(subject).len()
    }

    /// Check if any message was published to a subject.
    pub fn was_published_to(&self, subject: &str) -> bool {
        self.publish_count_for(subject) > 0
    }

    /// Deserialize a published message payload as JSON.
    pub fn deserialize_message<T: serde::de::DeserializeOwned>(
        &self,
        msg: &PublishedMessage,
    ) -> std::result::Result<T, serde_json::Error> {
        serde_json::from_slice(&msg.payload)
    }
}

#[async_trait]
impl BaseTopicPublisher for TestTopic {
    async fn publish(
        &self,
        subject: &str,
        payload: Bytes,
        attributes: &BTreeMap<String, String>,
    ) -> Result<PublishReceipt> {
        self.published
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(PublishedMessage {
                subject: subject.to_string(),
                payload,
                attributes: attributes.clone(),
            });
        Ok(PublishReceipt {
            message_id: Uuid::new_v4().to_string(),
            subject: subject.to_string(),
        })
    }
}
