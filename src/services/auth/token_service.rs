use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;
use uuid::Uuid;

use crate::config::ConfigError;

/// HS256 needs at least as many key bytes as the digest output.
pub const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, Error)]
pub enum TokenError {
    /// Bad signature, malformed structure, or missing/empty required claims.
    #[error("invalid token")]
    InvalidToken,
    #[error("expired token")]
    ExpiredToken,
    #[error("failed to sign token")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

#[derive(Debug, Serialize, Deserialize)]
struct SessionClaims {
    sub: String,
    iat: i64,
    exp: i64,
    jti: String,
}

/// A freshly issued token plus the metadata the login response exposes.
#[derive(Clone, Debug)]
pub struct IssuedToken {
    pub token: String,
    pub subject: String,
    pub issued_at: i64,
    pub expires_at: i64,
}

/// Issues and verifies HS256-signed session tokens.
///
/// Stateless: validity is fully determined by the signature and the `exp`
/// claim at verification time. Key material is not printable via Debug.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_seconds: u64,
    // Same value as `ttl_seconds`, range-checked once for unix-seconds arithmetic.
    ttl: i64,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl_seconds", &self.ttl_seconds)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(secret: &str, ttl_seconds: u64) -> Result<Self, ConfigError> {
        if secret.is_empty() {
            return Err(ConfigError::Missing("JWT_SECRET"));
        }
        if secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::TooShort {
                key: "JWT_SECRET",
                min_len: MIN_SECRET_LEN,
            });
        }
        let ttl = i64::try_from(ttl_seconds)
            .ok()
            .filter(|ttl| *ttl > 0)
            .ok_or(ConfigError::Invalid("ACCESS_TOKEN_TTL_SECONDS"))?;

        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is compared against an explicit clock in `verify_at`.
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        // `iat` and `jti` presence is enforced by deserialising `SessionClaims`.
        validation.set_required_spec_claims(&["sub", "exp"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl_seconds,
            ttl,
        })
    }

    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }

    /// Issue a token for `subject` valid from now for the configured TTL.
    pub fn issue(&self, subject: &str) -> Result<IssuedToken, TokenError> {
        self.issue_at(subject, chrono::Utc::now().timestamp())
    }

    /// Issue a token as if the current time (unix seconds) were `now`.
    pub fn issue_at(&self, subject: &str, now: i64) -> Result<IssuedToken, TokenError> {
        let exp = now.saturating_add(self.ttl);

        let claims = SessionClaims {
            sub: subject.to_string(),
            iat: now,
            exp,
            jti: Uuid::new_v4().to_string(),
        };

        let mut header = Header::new(Algorithm::HS256);
        header.typ = Some("JWT".to_string());

        let token = jsonwebtoken::encode(&header, &claims, &self.encoding_key).map_err(|e| {
            error!(error = %e, "failed to sign session token");
            TokenError::Signing(e)
        })?;

        Ok(IssuedToken {
            token,
            subject: claims.sub,
            issued_at: now,
            expires_at: exp,
        })
    }

    /// Verify `token` against the wall clock and return its subject.
    pub fn verify(&self, token: &str) -> Result<String, TokenError> {
        self.verify_at(token, chrono::Utc::now().timestamp())
    }

    /// Verify `token` as if the current time (unix seconds) were `now`.
    ///
    /// Expiry is exact: the token is valid while `now <= exp`.
    pub fn verify_at(&self, token: &str, now: i64) -> Result<String, TokenError> {
        let data = jsonwebtoken::decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|_| TokenError::InvalidToken)?;
        let claims = data.claims;

        if claims.sub.is_empty() {
            return Err(TokenError::InvalidToken);
        }
        if now > claims.exp {
            return Err(TokenError::ExpiredToken);
        }

        Ok(claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn service(ttl: u64) -> TokenService {
        TokenService::new(SECRET, ttl).unwrap()
    }

    #[test]
    fn rejects_missing_or_short_secret() {
        assert_eq!(
            TokenService::new("", 60).unwrap_err(),
            ConfigError::Missing("JWT_SECRET")
        );
        assert_eq!(
            TokenService::new("too-short", 60).unwrap_err(),
            ConfigError::TooShort {
                key: "JWT_SECRET",
                min_len: MIN_SECRET_LEN
            }
        );
    }

    #[test]
    fn issued_token_verifies_to_same_subject() {
        let tokens = service(3600);
        let issued = tokens.issue("admin").unwrap();

        assert_eq!(issued.subject, "admin");
        assert_eq!(issued.expires_at - issued.issued_at, 3600);
        assert_eq!(tokens.verify(&issued.token).unwrap(), "admin");
    }

    #[test]
    fn subject_is_returned_verbatim() {
        let tokens = service(60);
        let issued = tokens.issue_at("  Mixed Case ", 1_000).unwrap();
        assert_eq!(tokens.verify_at(&issued.token, 1_000).unwrap(), "  Mixed Case ");
    }

    #[test]
    fn expiry_boundary_is_exact() {
        let tokens = service(60);
        let issued = tokens.issue_at("alice", 1_000).unwrap();

        assert_eq!(tokens.verify_at(&issued.token, 1_059).unwrap(), "alice");
        assert_eq!(tokens.verify_at(&issued.token, 1_060).unwrap(), "alice");
        assert!(matches!(
            tokens.verify_at(&issued.token, 1_061),
            Err(TokenError::ExpiredToken)
        ));
    }

    #[test]
    fn same_subject_same_instant_yields_distinct_tokens() {
        let tokens = service(60);
        let a = tokens.issue_at("alice", 1_000).unwrap();
        let b = tokens.issue_at("alice", 1_000).unwrap();
        assert_ne!(a.token, b.token);
    }

    #[test]
    fn tampering_any_signature_byte_is_invalid() {
        let tokens = service(60);
        let issued = tokens.issue_at("alice", 1_000).unwrap();
        let (signing_input, signature) = issued.token.rsplit_once('.').unwrap();
        let sig_bytes = URL_SAFE_NO_PAD.decode(signature).unwrap();

        for i in 0..sig_bytes.len() {
            let mut tampered = sig_bytes.clone();
            tampered[i] ^= 0x01;
            let token = format!("{}.{}", signing_input, URL_SAFE_NO_PAD.encode(&tampered));

            assert!(
                matches!(tokens.verify_at(&token, 1_000), Err(TokenError::InvalidToken)),
                "byte {i} tampered but token still accepted"
            );
        }
    }

    #[test]
    fn token_from_other_secret_is_invalid() {
        let other = TokenService::new("ffffffffffffffffffffffffffffffff", 60).unwrap();
        let issued = other.issue_at("alice", 1_000).unwrap();
        assert!(matches!(
            service(60).verify_at(&issued.token, 1_000),
            Err(TokenError::InvalidToken)
        ));
    }

    #[test]
    fn malformed_tokens_are_invalid() {
        let tokens = service(60);
        for token in ["", "not-a-jwt", "a.b.c", "invalid-jwt-token"] {
            assert!(matches!(
                tokens.verify_at(token, 1_000),
                Err(TokenError::InvalidToken)
            ));
        }
    }

    fn sign(claims: &serde_json::Value) -> String {
        let key = EncodingKey::from_secret(SECRET.as_bytes());
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &key).unwrap()
    }

    fn full_claims() -> serde_json::Value {
        serde_json::json!({"sub": "alice", "iat": 1_000, "exp": 2_000, "jti": "x"})
    }

    #[test]
    fn hand_signed_full_claim_set_verifies() {
        assert_eq!(service(60).verify_at(&sign(&full_claims()), 1_000).unwrap(), "alice");
    }

    #[test]
    fn missing_any_required_claim_is_invalid() {
        let tokens = service(60);

        for claim in ["sub", "iat", "exp", "jti"] {
            let mut claims = full_claims();
            claims.as_object_mut().unwrap().remove(claim);

            assert!(
                matches!(tokens.verify_at(&sign(&claims), 1_000), Err(TokenError::InvalidToken)),
                "token without `{claim}` was accepted"
            );
        }
    }

    #[test]
    fn empty_subject_is_invalid() {
        let mut claims = full_claims();
        claims["sub"] = serde_json::json!("");
        assert!(matches!(
            service(60).verify_at(&sign(&claims), 1_000),
            Err(TokenError::InvalidToken)
        ));
    }

    #[test]
    fn rejects_zero_or_out_of_range_ttl() {
        let invalid = ConfigError::Invalid("ACCESS_TOKEN_TTL_SECONDS");
        assert_eq!(TokenService::new(SECRET, 0).unwrap_err(), invalid);
        assert_eq!(TokenService::new(SECRET, u64::MAX).unwrap_err(), invalid);
        assert_eq!(
            TokenService::new(SECRET, i64::MAX as u64 + 1).unwrap_err(),
            invalid
        );
    }

    #[test]
    fn largest_ttl_saturates_instead_of_wrapping() {
        let tokens = service(i64::MAX as u64);
        let issued = tokens.issue_at("alice", 1_000).unwrap();

        assert_eq!(issued.expires_at, i64::MAX);
        assert_eq!(tokens.verify_at(&issued.token, 1_000).unwrap(), "alice");
    }

    #[test]
    fn debug_does_not_print_key_material() {
        let printed = format!("{:?}", service(60));
        assert!(!printed.contains(SECRET));
    }
}
