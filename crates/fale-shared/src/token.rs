//! Inspection of the backend's JWT access tokens.
//!
//! The client never verifies signatures; it only reads the payload to learn
//! who the token belongs to and when it stops being accepted.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;

/// Claims the client cares about. Anything else in the payload is ignored.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct TokenClaims {
    /// Expiry as seconds since the Unix epoch.
    #[serde(default)]
    pub exp: Option<i64>,
    #[serde(default)]
    pub sub: Option<Subject>,
}

/// The backend puts the user id in `sub`, as a number or a string
/// depending on the issuing endpoint.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Subject {
    Id(i64),
    Name(String),
}

impl std::fmt::Display for Subject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Subject::Id(id) => write!(f, "{id}"),
            Subject::Name(name) => write!(f, "{name}"),
        }
    }
}

impl TokenClaims {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|exp| Utc.timestamp_opt(exp, 0).single())
    }

    pub fn user_id(&self) -> Option<String> {
        self.sub.as_ref().map(ToString::to_string)
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token is not a three-part JWT")]
    InvalidFormat,

    #[error("Base64 decode error")]
    Base64Decode,

    #[error("Token payload is not valid JSON claims")]
    InvalidClaims,
}

/// Decode the payload segment of `token`.
pub fn decode_claims(token: &str) -> Result<TokenClaims, TokenError> {
    let mut parts = token.trim().split('.');
    let payload = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(_), Some(payload), Some(_), None) if !payload.is_empty() => payload,
        _ => return Err(TokenError::InvalidFormat),
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|_| TokenError::Base64Decode)?;

    serde_json::from_slice(&bytes).map_err(|_| TokenError::InvalidClaims)
}

/// Fail-closed expiry check against the current time.
///
/// Absent, malformed or `exp`-less tokens count as expired, as does a
/// token whose expiry is exactly now.
pub fn is_token_expired(token: Option<&str>) -> bool {
    is_token_expired_at(token, Utc::now())
}

pub fn is_token_expired_at(token: Option<&str>, now: DateTime<Utc>) -> bool {
    let Some(token) = token else {
        return true;
    };
    match decode_claims(token).ok().and_then(|c| c.expires_at()) {
        Some(expires_at) => expires_at <= now,
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn mint(payload: &str) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(payload.as_bytes());
        format!("{header}.{body}.signature")
    }

    #[test]
    fn test_absent_and_malformed_are_expired() {
        assert!(is_token_expired(None));
        assert!(is_token_expired(Some("")));
        assert!(is_token_expired(Some("not-a-jwt")));
        assert!(is_token_expired(Some("a.!!!.c")));
        assert!(is_token_expired(Some(&mint(r#""just a string""#))));
    }

    #[test]
    fn test_missing_exp_is_expired() {
        assert!(is_token_expired(Some(&mint(r#"{"sub": 1}"#))));
    }

    #[test]
    fn test_expiry_boundary() {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let token = mint(r#"{"exp": 1700000000, "sub": 3}"#);

        assert!(is_token_expired_at(Some(&token), now));
        assert!(is_token_expired_at(Some(&token), now + Duration::seconds(1)));
        assert!(!is_token_expired_at(Some(&token), now - Duration::seconds(1)));
    }

    #[test]
    fn test_future_token_is_fresh() {
        let exp = (Utc::now() + Duration::hours(1)).timestamp();
        let token = mint(&format!(r#"{{"exp": {exp}, "sub": "42"}}"#));
        assert!(!is_token_expired(Some(&token)));
    }

    #[test]
    fn test_subject_forms() {
        let claims = decode_claims(&mint(r#"{"exp": 1, "sub": 17}"#)).unwrap();
        assert_eq!(claims.user_id().as_deref(), Some("17"));

        let claims = decode_claims(&mint(r#"{"exp": 1, "sub": "17"}"#)).unwrap();
        assert_eq!(claims.user_id().as_deref(), Some("17"));
    }

    #[test]
    fn test_padded_payload_accepted() {
        let header = URL_SAFE_NO_PAD.encode(b"{}");
        let body = base64::engine::general_purpose::URL_SAFE.encode(br#"{"exp": 5}"#);
        let claims = decode_claims(&format!("{header}.{body}.sig")).unwrap();
        assert_eq!(claims.exp, Some(5));
    }
}
