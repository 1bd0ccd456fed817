//! Client-side JWT inspection.
//!
//! The signature is not verified here: the backend checks it on every
//! request. This module only reads the expiry claim so the client can drop
//! sessions that are certain to be rejected.

use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Deserialize;
use tracing::debug;

use crate::auth::Credential;
use crate::clock::Clock;

/// Claims the client reads from a credential. Everything is optional; a
/// missing `exp` makes the credential invalid.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CredentialClaims {
    /// Subject (usually the user email)
    #[serde(default)]
    pub sub: Option<String>,
    /// Issued at (Unix timestamp)
    #[serde(default)]
    pub iat: Option<u64>,
    /// Expiration time (Unix timestamp)
    #[serde(default)]
    pub exp: Option<u64>,
}

impl CredentialClaims {
    /// Expiry in Unix milliseconds.
    pub fn expiry_millis(&self) -> Option<u64> {
        self.exp.map(|exp| exp.saturating_mul(1000))
    }
}

/// Decode the payload of `credential` without verifying its signature.
pub fn decode_claims(credential: &Credential) -> Result<CredentialClaims, JwtError> {
    let token = credential.as_str();

    // Rejects anything without a well-formed header segment.
    jsonwebtoken::decode_header(token).map_err(JwtError::Header)?;

    let mut segments = token.split('.');
    let (Some(_), Some(payload), Some(_), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(JwtError::Malformed);
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(JwtError::Payload)?;

    serde_json::from_slice(&bytes).map_err(JwtError::Claims)
}

/// Expiry of `credential` in Unix milliseconds, if it can be read.
pub fn expiry_millis(credential: &Credential) -> Option<u64> {
    decode_claims(credential)
        .ok()
        .and_then(|claims| claims.expiry_millis())
}

/// True iff the credential carries an expiry strictly after `now_millis`.
pub fn is_valid_at(credential: &Credential, now_millis: u64) -> bool {
    match decode_claims(credential) {
        Ok(claims) => match claims.expiry_millis() {
            Some(expiry) => expiry > now_millis,
            None => {
                debug!("Credential has no expiry claim");
                false
            }
        },
        Err(e) => {
            debug!(error = %e, "Credential could not be decoded");
            false
        }
    }
}

/// True if the credential is still valid but expires within `threshold`.
/// A credential without an expiry claim never needs a refresh.
pub fn needs_refresh_at(credential: &Credential, now_millis: u64, threshold: Duration) -> bool {
    match expiry_millis(credential) {
        Some(expiry) => {
            expiry > now_millis && expiry - now_millis < threshold.as_millis() as u64
        }
        None => false,
    }
}

/// Expiry checks against an injectable clock.
#[derive(Clone)]
pub struct SessionValidator {
    clock: Arc<dyn Clock>,
}

impl SessionValidator {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    pub fn is_valid(&self, credential: &Credential) -> bool {
        is_valid_at(credential, self.clock.now_millis())
    }

    pub fn needs_refresh(&self, credential: &Credential, threshold: Duration) -> bool {
        needs_refresh_at(credential, self.clock.now_millis(), threshold)
    }
}

/// Errors that can occur while decoding a credential.
#[derive(Debug)]
pub enum JwtError {
    /// Header segment missing or not a JWT header
    Header(jsonwebtoken::errors::Error),
    /// Token is not three dot-separated segments
    Malformed,
    /// Payload segment is not base64url
    Payload(base64::DecodeError),
    /// Payload is not a JSON claims object
    Claims(serde_json::Error),
}

impl std::fmt::Display for JwtError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JwtError::Header(e) => write!(f, "Invalid token header: {}", e),
            JwtError::Malformed => write!(f, "Malformed token"),
            JwtError::Payload(e) => write!(f, "Invalid token payload encoding: {}", e),
            JwtError::Claims(e) => write!(f, "Invalid token claims: {}", e),
        }
    }
}

impl std::error::Error for JwtError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use jsonwebtoken::{EncodingKey, Header};
    use serde_json::json;

    const NOW_SECS: u64 = 1_700_000_000;

    fn token(claims: serde_json::Value) -> Credential {
        let key = EncodingKey::from_secret(b"backend-secret");
        Credential::new(jsonwebtoken::encode(&Header::default(), &claims, &key).unwrap())
    }

    #[test]
    fn test_future_expiry_is_valid() {
        let credential = token(json!({"sub": "a@b.com", "exp": NOW_SECS + 60}));
        assert!(is_valid_at(&credential, NOW_SECS * 1000));

        let claims = decode_claims(&credential).unwrap();
        assert_eq!(claims.sub.as_deref(), Some("a@b.com"));
    }

    #[test]
    fn test_past_or_equal_expiry_is_invalid() {
        let expired = token(json!({"exp": NOW_SECS - 1}));
        assert!(!is_valid_at(&expired, NOW_SECS * 1000));

        let exact = token(json!({"exp": NOW_SECS}));
        assert!(!is_valid_at(&exact, NOW_SECS * 1000));
        assert!(is_valid_at(&exact, NOW_SECS * 1000 - 1));
    }

    #[test]
    fn test_missing_expiry_fails_closed() {
        let credential = token(json!({"sub": "a@b.com"}));
        assert!(!is_valid_at(&credential, 0));
        assert!(!needs_refresh_at(&credential, 0, Duration::from_secs(300)));
    }

    #[test]
    fn test_malformed_tokens_are_invalid() {
        for raw in [
            "",
            "invalid-token",
            "a.b",
            "a.b.c.d",
            "eyJhbGciOiJIUzI1NiJ9.!!!.sig",
            "eyJhbGciOiJIUzI1NiJ9.bm90IGpzb24.sig",
        ] {
            assert!(
                !is_valid_at(&Credential::new(raw), 0),
                "{:?} should be invalid",
                raw
            );
        }
    }

    #[test]
    fn test_non_integer_expiry_is_invalid() {
        let credential = token(json!({"exp": "tomorrow"}));
        assert!(matches!(
            decode_claims(&credential),
            Err(JwtError::Claims(_))
        ));
        assert!(!is_valid_at(&credential, 0));
    }

    #[test]
    fn test_signature_is_not_checked() {
        let credential = token(json!({"exp": NOW_SECS + 60}));
        let mut parts: Vec<&str> = credential.as_str().split('.').collect();
        parts[2] = "forged";
        let tampered = Credential::new(parts.join("."));
        assert!(is_valid_at(&tampered, NOW_SECS * 1000));
    }

    #[test]
    fn test_needs_refresh_window() {
        let credential = token(json!({"exp": NOW_SECS + 120}));
        let now = NOW_SECS * 1000;
        assert!(needs_refresh_at(&credential, now, Duration::from_secs(300)));
        assert!(!needs_refresh_at(&credential, now, Duration::from_secs(60)));
    }

    #[test]
    fn test_expired_credential_never_needs_refresh() {
        let credential = token(json!({"exp": NOW_SECS - 3600}));
        let now = NOW_SECS * 1000;
        assert!(!is_valid_at(&credential, now));
        assert!(!needs_refresh_at(&credential, now, Duration::from_secs(300)));

        let exact = token(json!({"exp": NOW_SECS}));
        assert!(!needs_refresh_at(&exact, now, Duration::from_secs(300)));
    }

    #[test]
    fn test_validator_uses_clock() {
        let clock = Arc::new(ManualClock::new(NOW_SECS * 1000));
        let validator = SessionValidator::new(clock.clone());
        let credential = token(json!({"exp": NOW_SECS + 10}));

        assert!(validator.is_valid(&credential));
        clock.advance(Duration::from_secs(10));
        assert!(!validator.is_valid(&credential));
    }
}
