use anyhow::Result;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT Claims - the verified claim set the router works from
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,         // Identity-provider subject id
    pub email: Option<String>,
    #[serde(default)]
    pub groups: Vec<String>, // Group memberships ("Admin" gates admin ops)
    pub exp: i64,            // Expiration timestamp
    pub iat: i64,            // Issued at timestamp
    pub iss: String,         // Issuer
    pub jti: String,         // JWT ID (unique token identifier)
}

/// JWT Service - creates and verifies bearer tokens
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
}

impl JwtService {
    /// Create new JWT service with secret and issuer
    pub fn new(secret: &str, issuer: String) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
        }
    }

    /// Create a new token for a subject
    ///
    /// Token expires after 24 hours
    pub fn create_token(
        &self,
        sub: &str,
        email: Option<String>,
        groups: Vec<String>,
    ) -> Result<String> {
        let now = chrono::Utc::now();
        let exp = now + chrono::Duration::hours(24);

        let claims = Claims {
            sub: sub.to_string(),
            email,
            groups,
            exp: exp.timestamp(),
            iat: now.timestamp(),
            iss: self.issuer.clone(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(Into::into)
    }

    /// Verify and decode a token
    ///
    /// Returns claims if the token is valid and not expired
    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.issuer]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_and_verify_token() {
        let service = JwtService::new("test_secret_key", "test_issuer".to_string());

        let token = service
            .create_token("sub-1", Some("a@b.c".to_string()), vec!["Admin".to_string()])
            .unwrap();

        let claims = service.verify_token(&token).unwrap();
        assert_eq!(claims.sub, "sub-1");
        assert_eq!(claims.email.as_deref(), Some("a@b.c"));
        assert_eq!(claims.groups, vec!["Admin".to_string()]);
        assert_eq!(claims.iss, "test_issuer");
    }

    #[test]
    fn invalid_token_rejected() {
        let service = JwtService::new("test_secret_key", "test_issuer".to_string());
        assert!(service.verify_token("invalid_token").is_err());
    }

    #[test]
    fn wrong_secret_rejected() {
        let service1 = JwtService::new("secret1", "test_issuer".to_string());
        let service2 = JwtService::new("secret2", "test_issuer".to_string());

        let token = service1.create_token("sub-1", None, vec![]).unwrap();
        assert!(service2.verify_token(&token).is_err());
    }
}
