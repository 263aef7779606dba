use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error, warn};

use crate::repos::error::RepoError;
use crate::services::auth::credentials::CredentialStore;
use crate::services::auth::token_service::{IssuedToken, TokenError, TokenService};

#[derive(Debug, Error)]
pub enum LoginError {
    /// Unknown identifier or wrong secret. Callers must not tell them apart.
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("credential store failure")]
    Store(#[from] RepoError),
    #[error("password hashing failure")]
    Hash(String),
    #[error(transparent)]
    Token(#[from] TokenError),
}

/// Verifies submitted credentials and issues a session token on success.
#[derive(Clone)]
pub struct LoginService {
    credentials: Arc<dyn CredentialStore>,
    tokens: Arc<TokenService>,
    // Verified against when the identifier is unknown so both paths cost one bcrypt run.
    dummy_hash: String,
}

impl std::fmt::Debug for LoginService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginService").finish_non_exhaustive()
    }
}

impl LoginService {
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        tokens: Arc<TokenService>,
        hash_cost: u32,
    ) -> Result<Self, LoginError> {
        let dummy_hash =
            bcrypt::hash("dummy-password", hash_cost).map_err(|e| LoginError::Hash(e.to_string()))?;

        Ok(Self {
            credentials,
            tokens,
            dummy_hash,
        })
    }

    pub async fn login(&self, identifier: &str, secret: &str) -> Result<IssuedToken, LoginError> {
        let principal = self
            .credentials
            .find_by_identifier(identifier)
            .await
            .map_err(|e| {
                error!(error = ?e, "credential lookup failed during login");
                e
            })?;

        let (hash, known) = match &principal {
            Some(p) => (p.secret_hash.clone(), true),
            None => (self.dummy_hash.clone(), false),
        };

        let matches = verify_secret(secret.to_string(), hash).await?;

        if !known {
            debug!(username = %identifier, "login rejected: unknown principal");
            return Err(LoginError::InvalidCredentials);
        }
        if !matches {
            warn!(username = %identifier, "login rejected: bad credentials");
            return Err(LoginError::InvalidCredentials);
        }

        let issued = self.tokens.issue(identifier)?;
        debug!(
            username = %identifier,
            issued_at = issued.issued_at,
            expires_at = issued.expires_at,
            "issued session token"
        );

        Ok(issued)
    }

    pub fn token_ttl_seconds(&self) -> u64 {
        self.tokens.ttl_seconds()
    }
}

// bcrypt is deliberately slow; keep it off the async workers.
async fn verify_secret(secret: String, hash: String) -> Result<bool, LoginError> {
    let result = tokio::task::spawn_blocking(move || bcrypt::verify(secret, &hash))
        .await
        .map_err(|e| LoginError::Hash(e.to_string()))?;

    match result {
        Ok(matches) => Ok(matches),
        // A stored hash bcrypt cannot parse never authenticates anyone.
        Err(e) => {
            warn!(error = %e, "stored password hash could not be verified");
            Ok(false)
        }
    }
}
