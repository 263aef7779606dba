/*
 * Responsibility
 * - /admin 配下 (ROLE_ADMIN 必須。判定は middleware 側の AccessPolicy)
 * - principal の参照 (role と解決済み authority のみ。secret hash は返さない)
 */
use axum::{
    Json,
    extract::{Path, State},
};

use crate::{
    api::v1::{dto::principals::PrincipalResponse, extractors::AuthCtxExtractor},
    error::AppError,
    services::auth::authority,
    state::AppState,
};

pub async fn get_principal(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    Path(username): Path<String>,
) -> Result<Json<PrincipalResponse>, AppError> {
    let principal = state
        .credentials
        .find_by_identifier(&username)
        .await?
        .ok_or(AppError::not_found("principal"))?;

    tracing::debug!(admin = %ctx.identifier, username = %username, "principal lookup");

    let authorities = authority::resolve_role(&principal.role);

    Ok(Json(PrincipalResponse {
        username: principal.identifier,
        role: principal.role.name,
        authorities,
    }))
}
