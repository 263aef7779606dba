//! Browser access to the ticketing API.
//!
//! Tokens travel in the Authorization header, never in cookies, so no
//! credentials mode. Outside production any origin may call; in production
//! only `CORS_ALLOWED_ORIGINS` (exact match, empty list = none).

use std::time::Duration;

use axum::Router;
use axum::http::{HeaderName, HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::config::Config;
use crate::middleware::http::REQUEST_ID_HEADER;

const PREFLIGHT_MAX_AGE: Duration = Duration::from_secs(600);

pub fn apply(router: Router, config: &Config) -> Router {
    router.layer(layer(config))
}

fn layer(config: &Config) -> CorsLayer {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    let origins = if config.app_env.is_production() {
        let allowed: Vec<HeaderValue> = config
            .cors_allowed_origins
            .iter()
            .filter_map(|origin| HeaderValue::from_str(origin).ok())
            .collect();
        AllowOrigin::predicate(move |origin: &HeaderValue, _| allowed.contains(origin))
    } else {
        AllowOrigin::from(Any)
    };

    // Only the verbs the routes answer, plus preflight.
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            request_id.clone(),
        ])
        .expose_headers([request_id])
        .max_age(PREFLIGHT_MAX_AGE)
}
