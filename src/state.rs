/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - credentials: CredentialStore, tokens: TokenService, login: LoginService, policy: AccessPolicy
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 * - 読み取り専用。リクエスト単位の状態 (AuthCtx) はここに置かない
 */
use std::sync::Arc;

use crate::services::auth::{AccessPolicy, CredentialStore, LoginService, TokenService};

#[derive(Clone)]
pub struct AppState {
    pub credentials: Arc<dyn CredentialStore>,
    pub tokens: Arc<TokenService>,
    pub login: Arc<LoginService>,
    pub policy: Arc<AccessPolicy>,
}

impl AppState {
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        tokens: Arc<TokenService>,
        login: Arc<LoginService>,
        policy: Arc<AccessPolicy>,
    ) -> Self {
        Self {
            credentials,
            tokens,
            login,
            policy,
        }
    }
}
