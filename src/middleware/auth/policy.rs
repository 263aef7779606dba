//! Access decision point: applies `AccessPolicy` to the AuthCtx the
//! interceptor published. Denials carry no detail about which check failed.

use axum::{
    Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::{IntoResponse, Response},
};

use crate::api::v1::extractors::AuthCtx;
use crate::error::AppError;
use crate::services::auth::policy::Decision;
use crate::state::AppState;

pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    router.layer(middleware::from_fn_with_state(state, policy_middleware))
}

async fn policy_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let decision = state
        .policy
        .decide(req.uri().path(), req.extensions().get::<AuthCtx>());

    match decision {
        Decision::Allow => next.run(req).await,
        Decision::Unauthenticated => {
            tracing::debug!(path = %req.uri().path(), "denied: unauthenticated");
            AppError::Unauthorized.into_response()
        }
        Decision::Forbidden => {
            tracing::debug!(path = %req.uri().path(), "denied: insufficient authority");
            AppError::Forbidden.into_response()
        }
    }
}
