//! JWT access token creation.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use uuid::Uuid;

use notify_core::config::AuthConfig;
use notify_core::error::AppError;

use super::claims::Claims;

/// Creates signed access tokens.
#[derive(Clone)]
pub struct JwtEncoder {
    /// HMAC secret key for signing.
    encoding_key: EncodingKey,
    /// Access token TTL in minutes.
    access_ttl_minutes: i64,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder")
            .field("access_ttl_minutes", &self.access_ttl_minutes)
            .finish()
    }
}

impl JwtEncoder {
    /// Creates a new encoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            access_ttl_minutes: config.jwt_access_ttl_minutes as i64,
        }
    }

    /// Issue an access token for `email`.
    pub fn encode_access_token(
        &self,
        email: &str,
        name: Option<&str>,
    ) -> Result<(String, DateTime<Utc>), AppError> {
        self.encode_with_ttl(email, name, Duration::minutes(self.access_ttl_minutes))
    }

    /// Issue a token with an explicit lifetime. A negative `ttl` yields an
    /// already-expired token.
    pub fn encode_with_ttl(
        &self,
        email: &str,
        name: Option<&str>,
        ttl: Duration,
    ) -> Result<(String, DateTime<Utc>), AppError> {
        let now = Utc::now();
        let exp = now + ttl;

        let claims = Claims {
            sub: email.to_string(),
            name: name.map(str::to_string),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode access token: {e}")))?;

        Ok((token, exp))
    }
}
