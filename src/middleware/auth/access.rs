//! Request interceptor: bearer token → AuthCtx in request extensions.
//!
//! Runs once per request, before the access policy and any handler.
//! It never rejects a request by itself: a missing, malformed, invalid or
//! expired token, or a token whose principal no longer exists, just leaves
//! the request anonymous. The access policy turns that into 401 where needed.

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::{self, Next},
    response::Response,
};

use crate::api::v1::extractors::AuthCtx;
use crate::services::auth::authority;
use crate::state::AppState;

pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // axum 0.8 の from_fn は State extractor を受け取れないため、`from_fn_with_state` で明示的に state を渡す
    router.layer(middleware::from_fn_with_state(state, access_middleware))
}

async fn access_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let auth = authenticate(&state, req.uri().path(), req.headers()).await;

    match auth {
        // middleware → extractor への受け渡し
        Some(ctx) => {
            req.extensions_mut().insert(ctx);
        }
        None => {
            req.extensions_mut().remove::<AuthCtx>();
        }
    }

    next.run(req).await
}

/// `Authorization: Bearer <token>` → `<token>`; anything else is `None`.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

/// Recover the caller's identity for `path`, if any.
pub async fn authenticate(state: &AppState, path: &str, headers: &HeaderMap) -> Option<AuthCtx> {
    if state.policy.is_public(path) {
        tracing::debug!(path, "public path, skipping token inspection");
        return None;
    }

    let Some(token) = bearer_token(headers) else {
        tracing::debug!(path, "no bearer token, continuing anonymously");
        return None;
    };

    let subject = match state.tokens.verify(token) {
        Ok(subject) => subject,
        Err(err) => {
            tracing::warn!(error = %err, path, "token verification failed");
            return None;
        }
    };

    let principal = match state.credentials.find_by_identifier(&subject).await {
        Ok(Some(principal)) => principal,
        Ok(None) => {
            tracing::warn!(username = %subject, "token refers to unknown principal");
            return None;
        }
        Err(err) => {
            tracing::warn!(error = ?err, username = %subject, "credential lookup failed");
            return None;
        }
    };

    let authorities = authority::resolve_role(&principal.role);

    Some(AuthCtx::new(principal.identifier, authorities))
}
