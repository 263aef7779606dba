pub mod access;
pub mod policy;

use axum::Router;

use crate::state::AppState;

/// Install the auth pipeline on the whole router, exactly once.
///
/// The interceptor is added last so it wraps (and runs before) the access
/// policy, which in turn runs before any handler.
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    let router = policy::apply(router, state.clone());
    access::apply(router, state)
}
