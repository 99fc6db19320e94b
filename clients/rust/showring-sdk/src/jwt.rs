//! JWT inspection
//!
//! Reads the `exp` claim without verifying the signature. The server is the
//! authority on validity; the client only needs to know when to stop sending
//! a token.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

/// Clock drift tolerated between client and server when reading `exp`.
pub const DEFAULT_CLOCK_SKEW_SECS: i64 = 60;

#[derive(Deserialize)]
struct ExpClaim {
    exp: i64,
}

/// Expiry time of `token`, if it is a JWT with a numeric `exp` claim.
pub fn expiry(token: &str) -> Option<DateTime<Utc>> {
    let mut parts = token.split('.');
    let (_header, payload, _signature) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }

    // tolerate padded segments from lenient encoders
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    let claim: ExpClaim = serde_json::from_slice(&bytes).ok()?;
    DateTime::from_timestamp(claim.exp, 0)
}

/// True when `token` expired more than `skew` ago, or cannot be read.
pub fn is_expired(token: &str, skew: Duration) -> bool {
    is_expired_at(token, skew, Utc::now())
}

pub fn is_expired_at(token: &str, skew: Duration, now: DateTime<Utc>) -> bool {
    match expiry(token) {
        Some(exp) => exp <= now - skew,
        None => true,
    }
}

#[cfg(test)]
pub(crate) fn encode_test_token(exp: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":"u1","exp":{}}}"#, exp));
    format!("{}.{}.signature", header, payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skew() -> Duration {
        Duration::seconds(DEFAULT_CLOCK_SKEW_SECS)
    }

    #[test]
    fn test_fresh_token_is_not_expired() {
        let token = encode_test_token((Utc::now() + Duration::hours(1)).timestamp());
        assert!(!is_expired(&token, skew()));
    }

    #[test]
    fn test_recently_expired_token_is_tolerated_within_skew() {
        let now = Utc::now();
        let token = encode_test_token((now - Duration::seconds(30)).timestamp());
        assert!(!is_expired_at(&token, skew(), now));
        assert!(is_expired_at(&token, Duration::zero(), now));

        let stale = encode_test_token((now - Duration::seconds(90)).timestamp());
        assert!(is_expired_at(&stale, skew(), now));
    }

    #[test]
    fn test_skew_boundary_is_expired() {
        let now = DateTime::from_timestamp(1_900_000_000, 0).unwrap();
        let token = encode_test_token(1_900_000_000 - DEFAULT_CLOCK_SKEW_SECS);
        assert!(is_expired_at(&token, skew(), now));
        let token = encode_test_token(1_900_000_001 - DEFAULT_CLOCK_SKEW_SECS);
        assert!(!is_expired_at(&token, skew(), now));
    }

    #[test]
    fn test_unreadable_tokens_are_expired() {
        assert!(is_expired("", skew()));
        assert!(is_expired("opaque-token", skew()));
        assert!(is_expired("a.!!!.c", skew()));
        assert!(is_expired("a.b.c.d", skew()));
    }

    #[test]
    fn test_expiry_reads_exp_claim() {
        let token = encode_test_token(1_900_000_000);
        assert_eq!(expiry(&token).unwrap().timestamp(), 1_900_000_000);
    }
}
