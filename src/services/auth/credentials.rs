use std::{fmt, future::Future, pin::Pin};

use crate::repos::error::RepoResult;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A named capability attached to exactly one role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permission {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    pub name: String,
    pub permissions: Vec<Permission>,
}

/// An identity that can log in, as seen by the auth pipeline.
///
/// `secret_hash` is a bcrypt hash. It is deliberately left out of `Debug`.
#[derive(Clone)]
pub struct Principal {
    pub identifier: String,
    pub secret_hash: String,
    pub role: Role,
}

impl fmt::Debug for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Principal")
            .field("identifier", &self.identifier)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

/// Read-only lookup of principals by their unique identifier.
///
/// Returns `Ok(None)` for unknown identifiers; `Err` only for backend failures.
/// Implementations must be safe to call concurrently.
pub trait CredentialStore: Send + Sync {
    fn find_by_identifier<'a>(
        &'a self,
        identifier: &'a str,
    ) -> BoxFuture<'a, RepoResult<Option<Principal>>>;
}
