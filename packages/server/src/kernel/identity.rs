//! Identity provider clients for production and testing.
//!
//! Covers account lifecycle only (sign-up, confirmation, sign-in, password
//! reset). Token verification happens at the HTTP entry point, not here.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;
use uuid::Uuid;

use super::traits::BaseIdentityProvider;

/// HTTP client for the identity provider collaborator.
pub struct HttpIdentityProvider {
    http: reqwest::Client,
    base_url: String,
}

impl HttpIdentityProvider {
    pub fn new(base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[derive(Deserialize)]
struct SignUpResponse {
    sub: String,
}

#[async_trait]
impl BaseIdentityProvider for HttpIdentityProvider {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        attributes: &BTreeMap<String, String>,
    ) -> Result<String> {
        let response: SignUpResponse = self
            .http
            .post(format!("{}/signup", self.base_url))
            .json(&json!({
                "email": email,
                "password": password,
                "attributes": attributes,
            }))
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .context("identity sign-up failed")?
            .json()
            .await
            .context("invalid sign-up response")?;
        Ok(response.sub)
    }

    async fn confirm_sign_up(&self, email: &str, code: &str) -> Result<()> {
        self.http
            .post(format!("{}/confirm-signup", self.base_url))
            .json(&json!({ "email": email, "code": code }))
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .context("sign-up confirmation failed")?;
        Ok(())
    }

    async fn initiate_auth(&self, email: &str, password: &str) -> Result<Value> {
        self.http
            .post(format!("{}/auth", self.base_url))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .context("authentication failed")?
            .json()
            .await
            .context("invalid auth response")
    }

    async fn confirm_forgot_password(
        &self,
        email: &str,
        code: &str,
        new_password: &str,
    ) -> Result<()> {
        self.http
            .post(format!("{}/confirm-forgot-password", self.base_url))
            .json(&json!({ "email": email, "code": code, "password": new_password }))
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .context("password reset confirmation failed")?;
        Ok(())
    }
}

/// Mock identity provider with a fixed valid confirmation code.
pub struct TestIdentityProvider {
    accounts: RwLock<HashMap<String, String>>,
    valid_code: String,
}

impl Default for TestIdentityProvider {
    fn default() -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
            valid_code: "123456".to_string(),
        }
    }
}

impl TestIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subject id registered for an email, if any.
    pub fn subject_for(&self, email: &str) -> Option<String> {
        self.accounts
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(email)
            .cloned()
    }

    pub fn valid_code(&self) -> &str {
        &self.valid_code
    }
}

#[async_trait]
impl BaseIdentityProvider for TestIdentityProvider {
    async fn sign_up(
        &self,
        email: &str,
        _password: &str,
        _attributes: &BTreeMap<String, String>,
    ) -> Result<String> {
        let sub = Uuid::new_v4().to_string();
        self.accounts
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(email.to_string(), sub.clone());
        Ok(sub)
    }

    async fn confirm_sign_up(&self, _email: &str, code: &str) -> Result<()> {
        if code != self.valid_code {
            bail!("invalid confirmation code");
        }
        Ok(())
    }

    async fn initiate_auth(&self, email: &str, _password: &str) -> Result<Value> {
        match self.subject_for(email) {
            Some(sub) => Ok(json!({
                "accessToken": format!("test-token-{}", sub),
                "sub": sub,
            })),
            None => bail!("unknown account"),
        }
    }

    async fn confirm_forgot_password(
        &self,
        _email: &str,
        code: &str,
        _new_password: &str,
    ) -> Result<()> {
        if code != self.valid_code {
            bail!("invalid confirmation code");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sign_up_then_auth() {
        let identity = TestIdentityProvider::new();
        let sub = identity
            .sign_up("a@b.c", "pw", &BTreeMap::new())
            .await
            .unwrap();

        let session = identity.initiate_auth("a@b.c", "pw").await.unwrap();
        assert_eq!(session["sub"], json!(sub));
        assert!(identity.initiate_auth("x@y.z", "pw").await.is_err());
    }

    #[tokio::test]
    async fn confirmation_code_is_checked() {
        let identity = TestIdentityProvider::new();
        assert!(identity.confirm_sign_up("a@b.c", "123456").await.is_ok());
        assert!(identity.confirm_sign_up("a@b.c", "000000").await.is_err());
    }
}
