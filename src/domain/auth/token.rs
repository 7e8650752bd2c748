//! Credential token verification for logged-in turns.
//!
//! Tokens have the layout `subject.timestamp.signature` where the signature is
//! the lowercase hex HMAC-SHA256 of `subject@#$%timestamp`.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

use crate::domain::foundation::UserId;

type HmacSha256 = Hmac<Sha256>;

/// Separator mixed into the signed message between subject and timestamp.
const SIGNING_SEPARATOR: &str = "@#$%";

/// Default maximum token age (1 hour).
pub const DEFAULT_MAX_AGE_SECS: i64 = 3600;

/// Default tolerance for tokens stamped slightly in the future (1 minute).
pub const DEFAULT_CLOCK_SKEW_SECS: i64 = 60;

/// Reasons a credential token is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("Token missing")]
    Missing,

    #[error("Token malformed: {0}")]
    Malformed(&'static str),

    #[error("Token expired or not yet valid")]
    Expired,

    #[error("Token signature mismatch")]
    SignatureMismatch,

    #[error("Token subject does not match user")]
    IdentityMismatch,
}

impl TokenError {
    /// Stable name for logs and response metadata.
    pub fn reason(&self) -> &'static str {
        match self {
            TokenError::Missing => "missing",
            TokenError::Malformed(_) => "malformed",
            TokenError::Expired => "expired",
            TokenError::SignatureMismatch => "signature_mismatch",
            TokenError::IdentityMismatch => "identity_mismatch",
        }
    }
}

/// Verifies and issues HMAC-signed credential tokens.
pub struct TokenVerifier {
    secret: SecretString,
    max_age_secs: i64,
    clock_skew_secs: i64,
}

impl TokenVerifier {
    pub fn new(secret: impl Into<String>, max_age_secs: i64, clock_skew_secs: i64) -> Self {
        Self {
            secret: SecretString::new(secret.into()),
            max_age_secs,
            clock_skew_secs,
        }
    }

    /// Verifies `token` for `user` at unix time `now`.
    ///
    /// # Verification Steps
    ///
    /// 1. Token present
    /// 2. Exactly three `.`-separated fields
    /// 3. Timestamp is a non-negative integer
    /// 4. Age within `[-clock_skew, max_age]`
    /// 5. Signature matches (constant-time)
    /// 6. Subject equals the request user id
    pub fn verify(&self, token: Option<&str>, user: &UserId, now: i64) -> Result<(), TokenError> {
        let token = token.map(str::trim).filter(|t| !t.is_empty()).ok_or(TokenError::Missing)?;

        let parts: Vec<&str> = token.split('.').collect();
        let [subject, timestamp_str, provided] = parts.as_slice() else {
            return Err(TokenError::Malformed("expected three fields"));
        };

        if timestamp_str.is_empty() || !timestamp_str.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TokenError::Malformed("timestamp is not a non-negative integer"));
        }
        let timestamp: i64 = timestamp_str
            .parse()
            .map_err(|_| TokenError::Malformed("timestamp out of range"))?;

        let age = now - timestamp;
        if age > self.max_age_secs || age < -self.clock_skew_secs {
            return Err(TokenError::Expired);
        }

        let expected = self.compute_signature(subject, &timestamp.to_string())?;
        if !constant_time_compare(expected.as_bytes(), provided.as_bytes()) {
            return Err(TokenError::SignatureMismatch);
        }

        if *subject != user.as_str() {
            return Err(TokenError::IdentityMismatch);
        }

        Ok(())
    }

    /// Issues a token for `subject` stamped with `timestamp`.
    pub fn generate(&self, subject: &str, timestamp: i64) -> Result<String, TokenError> {
        let timestamp = timestamp.to_string();
        let signature = self.compute_signature(subject, &timestamp)?;
        Ok(format!("{}.{}.{}", subject, timestamp, signature))
    }

    fn compute_signature(&self, subject: &str, timestamp: &str) -> Result<String, TokenError> {
        let mut mac = HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .map_err(|_| TokenError::SignatureMismatch)?;
        mac.update(subject.as_bytes());
        mac.update(SIGNING_SEPARATOR.as_bytes());
        mac.update(timestamp.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }
}

fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "ChatAI_Secret_Key_2025";
    const NOW: i64 = 1_708_123_456;

    fn verifier() -> TokenVerifier {
        TokenVerifier::new(SECRET, DEFAULT_MAX_AGE_SECS, DEFAULT_CLOCK_SKEW_SECS)
    }

    fn user(id: &str) -> UserId {
        UserId::new(id).unwrap()
    }

    // ══════════════════════════════════════════════════════════════
    // Generation
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn generated_token_has_three_fields_and_hex_signature() {
        let token = verifier().generate("user123", NOW).unwrap();
        let parts: Vec<&str> = token.split('.').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "user123");
        assert_eq!(parts[1], NOW.to_string());
        assert_eq!(parts[2].len(), 64);
        assert!(parts[2].chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn signature_covers_separator_message() {
        let mut mac = HmacSha256::new_from_slice(SECRET.as_bytes()).unwrap();
        mac.update(format!("user123@#$%{}", NOW).as_bytes());
        let expected = hex::encode(mac.finalize().into_bytes());

        let token = verifier().generate("user123", NOW).unwrap();
        assert!(token.ends_with(&expected));
    }

    // ══════════════════════════════════════════════════════════════
    // Verification
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn fresh_token_verifies() {
        let v = verifier();
        let token = v.generate("user123", NOW).unwrap();
        assert_eq!(v.verify(Some(&token), &user("user123"), NOW + 10), Ok(()));
    }

    #[test]
    fn missing_token_is_rejected() {
        let v = verifier();
        assert_eq!(v.verify(None, &user("u"), NOW), Err(TokenError::Missing));
        assert_eq!(v.verify(Some("  "), &user("u"), NOW), Err(TokenError::Missing));
    }

    #[test]
    fn wrong_field_count_is_malformed() {
        let v = verifier();
        let result = v.verify(Some("a.b"), &user("a"), NOW);
        assert!(matches!(result, Err(TokenError::Malformed(_))));
        let result = v.verify(Some("a.1.b.c"), &user("a"), NOW);
        assert!(matches!(result, Err(TokenError::Malformed(_))));
    }

    #[test]
    fn negative_or_non_numeric_timestamp_is_malformed() {
        let v = verifier();
        for token in ["u.-5.abc", "u.12x.abc", "u..abc"] {
            let result = v.verify(Some(token), &user("u"), NOW);
            assert!(matches!(result, Err(TokenError::Malformed(_))), "{}", token);
        }
    }

    #[test]
    fn expired_and_future_tokens_are_rejected() {
        let v = verifier();
        let token = v.generate("u", NOW).unwrap();
        assert_eq!(
            v.verify(Some(&token), &user("u"), NOW + DEFAULT_MAX_AGE_SECS + 1),
            Err(TokenError::Expired)
        );
        assert_eq!(
            v.verify(Some(&token), &user("u"), NOW - DEFAULT_CLOCK_SKEW_SECS - 1),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let v = verifier();
        let token = v.generate("u", NOW).unwrap();
        assert!(v.verify(Some(&token), &user("u"), NOW + DEFAULT_MAX_AGE_SECS).is_ok());
        assert!(v.verify(Some(&token), &user("u"), NOW - DEFAULT_CLOCK_SKEW_SECS).is_ok());
    }

    #[test]
    fn tampered_signature_is_rejected() {
        let v = verifier();
        let token = v.generate("u", NOW).unwrap();
        let mut tampered = token.clone();
        let last = tampered.pop().unwrap();
        tampered.push(if last == '0' { '1' } else { '0' });
        assert_eq!(
            v.verify(Some(&tampered), &user("u"), NOW),
            Err(TokenError::SignatureMismatch)
        );
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let other = TokenVerifier::new("other", DEFAULT_MAX_AGE_SECS, DEFAULT_CLOCK_SKEW_SECS);
        let token = other.generate("u", NOW).unwrap();
        assert_eq!(
            verifier().verify(Some(&token), &user("u"), NOW),
            Err(TokenError::SignatureMismatch)
        );
    }

    #[test]
    fn valid_token_for_other_user_is_identity_mismatch() {
        let v = verifier();
        let token = v.generate("alice", NOW).unwrap();
        assert_eq!(
            v.verify(Some(&token), &user("bob"), NOW),
            Err(TokenError::IdentityMismatch)
        );
    }

    #[test]
    fn reasons_are_stable() {
        assert_eq!(TokenError::Malformed("x").reason(), "malformed");
        assert_eq!(TokenError::SignatureMismatch.reason(), "signature_mismatch");
    }
}
