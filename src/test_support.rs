//! Shared fixtures for in-crate tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::config::{RolePathRule, parse_role_path_rules};
use crate::repos::error::{RepoError, RepoResult};
use crate::services::auth::credentials::{
    BoxFuture, CredentialStore, Permission, Principal, Role,
};
use crate::services::auth::login::LoginService;
use crate::services::auth::policy::AccessPolicy;
use crate::services::auth::token_service::TokenService;
use crate::state::AppState;

pub const TEST_SECRET: &str = "test-secret-test-secret-test-secret!";

/// Builds a principal whose secret is bcrypt-hashed at the minimum cost.
pub fn principal(identifier: &str, password: &str, role: &str, permissions: &[&str]) -> Principal {
    Principal {
        identifier: identifier.to_string(),
        secret_hash: bcrypt::hash(password, 4).unwrap(),
        role: Role {
            name: role.to_string(),
            permissions: permissions
                .iter()
                .map(|p| Permission {
                    name: p.to_string(),
                })
                .collect(),
        },
    }
}

/// In-memory credential store that counts lookups.
#[derive(Default)]
pub struct RecordingStore {
    principals: HashMap<String, Principal>,
    fail: bool,
    calls: AtomicUsize,
}

impl RecordingStore {
    pub fn with(principals: impl IntoIterator<Item = Principal>) -> Self {
        Self {
            principals: principals
                .into_iter()
                .map(|p| (p.identifier.clone(), p))
                .collect(),
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl CredentialStore for RecordingStore {
    fn find_by_identifier<'a>(
        &'a self,
        identifier: &'a str,
    ) -> BoxFuture<'a, RepoResult<Option<Principal>>> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(RepoError::Db(sqlx::Error::PoolTimedOut));
            }
            Ok(self.principals.get(identifier).cloned())
        })
    }
}

pub fn default_policy() -> AccessPolicy {
    let public = crate::config::DEFAULT_PUBLIC_PATH_PREFIXES
        .iter()
        .map(|s| s.to_string())
        .collect();
    let rules: Vec<RolePathRule> =
        parse_role_path_rules(crate::config::DEFAULT_ROLE_PATH_RULES).unwrap();
    AccessPolicy::new(public, &rules)
}

/// State wired like production, backed by `store`.
pub fn state_with(store: Arc<RecordingStore>) -> AppState {
    let tokens = Arc::new(TokenService::new(TEST_SECRET, 600).unwrap());
    let login = Arc::new(LoginService::new(store.clone(), tokens.clone(), 4).unwrap());
    AppState::new(store, tokens, login, Arc::new(default_policy()))
}

/// The admin / user fixture used by the end-to-end tests.
pub fn admin_and_user_store() -> Arc<RecordingStore> {
    Arc::new(RecordingStore::with([
        principal("admin", "admin123", "ADMIN", &["READ_USERS", "WRITE_USERS"]),
        principal("user", "user123", "USER", &["READ_TICKETS"]),
    ]))
}
