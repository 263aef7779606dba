/*
 * Responsibility
 * - GET /me
 * - リクエストに紐づいた AuthCtx をそのまま返す (store へのアクセスなし)
 */
use axum::Json;

use crate::api::v1::{dto::principals::MeResponse, extractors::AuthCtxExtractor};

pub async fn me(AuthCtxExtractor(ctx): AuthCtxExtractor) -> Json<MeResponse> {
    Json(MeResponse {
        username: ctx.identifier,
        authorities: ctx.authorities,
    })
}
