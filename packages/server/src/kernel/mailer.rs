//! Direct message channel (email) for production and testing.
//!
//! Transport-level delivery is an external collaborator; this client only
//! hands the composed message to the mail API.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use super::traits::BaseMailer;

/// HTTP mail-API client.
pub struct HttpMailer {
    http: reqwest::Client,
    api_url: String,
    api_token: String,
    from: String,
}

impl HttpMailer {
    pub fn new(api_url: String, api_token: String, from: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url,
            api_token,
            from,
        }
    }
}

#[async_trait]
impl BaseMailer for HttpMailer {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<()> {
        self.http
            .post(&self.api_url)
            .bearer_auth(&self.api_token)
            .json(&json!({
                "from": self.from,
                "to": recipient,
                "subject": subject,
                "text": body,
            }))
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .with_context(|| format!("failed to send mail to {}", recipient))?;
        Ok(())
    }
}

/// A sent message, as recorded by the test mailer.
#[derive(Debug, Clone)]
pub struct SentMail {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

/// Mock mailer that records sends and can be made to fail.
#[derive(Default)]
pub struct TestMailer {
    sent: RwLock<Vec<SentMail>>,
    fail: AtomicBool,
}

impl TestMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent sends fail (for partial-delivery tests).
    pub fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }

    pub fn sent_mails(&self) -> Vec<SentMail> {
        self.sent.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.read().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[async_trait]
impl BaseMailer for TestMailer {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            anyhow::bail!("mail channel unavailable");
        }
        self.sent
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(SentMail {
                recipient: recipient.to_string(),
                subject: subject.to_string(),
                body: body.to_string(),
            });
        Ok(())
    }
}
