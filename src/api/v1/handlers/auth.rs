/*
 * Responsibility
 * - POST /auth/login
 * - JSON 解析 / DTO validation → LoginService → token 発行
 * - ボディ解析失敗も AppError の JSON 形式で返す
 * - 失敗理由 (ユーザー不在 / パスワード不一致) はレスポンスで区別しない
 */
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};

use crate::{
    api::v1::dto::auth::{LoginRequest, LoginResponse},
    error::AppError,
    state::AppState,
};

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AppError> {
    let Json(req) = payload.map_err(|rejection| {
        tracing::debug!(error = %rejection, "login body rejected");
        AppError::bad_request("BAD_REQUEST", "body must be JSON with username and password")
    })?;
    req.validate()
        .map_err(|msg| AppError::bad_request("BAD_REQUEST", msg))?;

    let issued = state.login.login(&req.username, &req.password).await?;

    tracing::info!(username = %issued.subject, "login succeeded");

    Ok(Json(LoginResponse {
        token: issued.token,
        token_type: "Bearer",
        expires_in: state.login.token_ttl_seconds(),
        username: issued.subject,
    }))
}
