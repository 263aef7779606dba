/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - /auth, /me, /admin を束ねる
 * - 認証/認可は app.rs でトップの Router に一度だけ掛ける (ここでは掛けない)
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use crate::api::v1::handlers::{admin::get_principal, auth::login, me::me};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/me", get(me))
        .route("/admin/principals/{username}", get(get_principal))
}
