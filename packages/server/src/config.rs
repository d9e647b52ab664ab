use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub nats_url: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub twin_registry_url: String,
    pub twin_group_name: String,
    pub identity_url: String,
    pub mail_api_url: String,
    pub mail_api_token: String,
    pub mail_from: String,
    pub motion_topic: String,
    pub alert_topic: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            nats_url: env::var("NATS_URL").unwrap_or_else(|_| "nats://localhost:4222".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            jwt_issuer: env::var("JWT_ISSUER")
                .unwrap_or_else(|_| "smart-home-guard".to_string()),
            twin_registry_url: env::var("TWIN_REGISTRY_URL")
                .context("TWIN_REGISTRY_URL must be set")?,
            twin_group_name: env::var("TWIN_GROUP_NAME")
                .unwrap_or_else(|_| "smart-home-things".to_string()),
            identity_url: env::var("IDENTITY_URL").context("IDENTITY_URL must be set")?,
            mail_api_url: env::var("MAIL_API_URL").context("MAIL_API_URL must be set")?,
            mail_api_token: env::var("MAIL_API_TOKEN").context("MAIL_API_TOKEN must be set")?,
            mail_from: env::var("MAIL_FROM")
                .unwrap_or_else(|_| "no-reply@smarthomeguard.com".to_string()),
            motion_topic: env::var("MOTION_TOPIC")
                .unwrap_or_else(|_| "home.user.light.control".to_string()),
            alert_topic: env::var("ALERT_TOPIC")
                .unwrap_or_else(|_| "home.user.alerts".to_string()),
        })
    }
}
