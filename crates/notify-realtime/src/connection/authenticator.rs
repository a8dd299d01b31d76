//! Handshake authentication.
//!
//! The bearer credential arrives either in the connection auth payload
//! (the `token` query parameter) or in an `Authorization: Bearer` header.

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use notify_auth::jwt::JwtDecoder;
use notify_core::error::AppError;

/// Why a handshake was refused.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HandshakeError {
    /// No credential was supplied.
    #[error("Authentication required")]
    MissingCredential,
    /// The credential could not be validated.
    #[error("Invalid or expired credential: {0}")]
    InvalidCredential(String),
}

impl From<HandshakeError> for AppError {
    fn from(err: HandshakeError) -> Self {
        AppError::authentication(err.to_string())
    }
}

/// Identity established by a successful handshake.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// User identity.
    pub email: String,
    /// Display name, when the credential carries one.
    pub name: Option<String>,
}

/// Pick the credential out of the auth payload or the header. Either may
/// carry a `Bearer ` prefix.
pub fn extract_bearer(auth_token: Option<&str>, authorization: Option<&str>) -> Option<String> {
    auth_token
        .into_iter()
        .chain(authorization)
        .map(|raw| {
            let raw = raw.trim();
            match raw.split_once(' ') {
                Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim(),
                _ if raw.eq_ignore_ascii_case("bearer") => "",
                _ => raw,
            }
        })
        .find(|t| !t.is_empty())
        .map(str::to_string)
}

/// Authenticates WebSocket connections using JWT tokens.
#[derive(Debug, Clone)]
pub struct WsAuthenticator {
    decoder: Arc<JwtDecoder>,
}

impl WsAuthenticator {
    /// Creates a new WebSocket authenticator.
    pub fn new(decoder: Arc<JwtDecoder>) -> Self {
        Self { decoder }
    }

    /// Validate the handshake credential.
    pub fn authenticate(&self, token: Option<&str>) -> Result<AuthenticatedUser, HandshakeError> {
        let token = token.ok_or(HandshakeError::MissingCredential)?;
        let claims = self
            .decoder
            .decode_access_token(token)
            .map_err(|e| HandshakeError::InvalidCredential(e.message))?;

        debug!(user = %claims.email(), expires_at = %claims.expires_at(), "Handshake authenticated");

        Ok(AuthenticatedUser {
            email: claims.email().to_string(),
            name: claims.name,
        })
    }
}

#[cfg(test)]
mod tests {
    use notify_auth::jwt::JwtEncoder;
    use notify_core::config::AuthConfig;

    use super::*;

    #[test]
    fn test_extract_prefers_auth_payload() {
        assert_eq!(
            extract_bearer(Some("abc"), Some("Bearer xyz")).as_deref(),
            Some("abc")
        );
        assert_eq!(extract_bearer(None, Some("Bearer xyz")).as_deref(), Some("xyz"));
        assert_eq!(extract_bearer(Some("  "), Some("Bearer ")), None);
        assert_eq!(extract_bearer(None, None), None);
    }

    #[test]
    fn test_missing_and_invalid_are_distinct() {
        let config = AuthConfig::default();
        let auth = WsAuthenticator::new(Arc::new(JwtDecoder::new(&config)));

        assert_eq!(
            auth.authenticate(None).unwrap_err(),
            HandshakeError::MissingCredential
        );
        assert!(matches!(
            auth.authenticate(Some("garbage")).unwrap_err(),
            HandshakeError::InvalidCredential(_)
        ));

        let (token, _) = JwtEncoder::new(&config)
            .encode_access_token("r@example.com", Some("R"))
            .unwrap();
        let user = auth.authenticate(Some(&token)).unwrap();
        assert_eq!(user.email, "r@example.com");
    }
}
