/*
 * Responsibility
 * - Config読み込み → 依存生成 → Router 組み立て
 * - Middleware の適用 (auth interceptor/policy, HTTP, CORS)
 * - axum::serve() で起動
 */
use std::{panic, process, sync::Arc};

use anyhow::{Context, Result};
use axum::{Router, routing::get};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::api::v1::handlers::health::health;
use crate::config::Config;
use crate::middleware;
use crate::repos::user_repo::PgCredentialStore;
use crate::services::auth::{AccessPolicy, LoginService, TokenService};
use crate::state::AppState;

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,ticketing_api=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // Always surface panics via tracing; stderr may be hidden by the launcher.
        tracing::error!(?info, "panic");

        // Development: crash the whole process so we notice immediately.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;

    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting API in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config).await?;

    let app = build_router(state);
    let app = middleware::http::apply(app, &config);
    let app = middleware::cors::apply(app, &config);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn build_state(config: &Config) -> Result<AppState> {
    // A weak or missing signing secret is fatal here, before anything is served.
    let tokens = Arc::new(TokenService::new(
        &config.jwt_secret,
        config.access_token_ttl_seconds,
    )?);

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .context("failed to connect to database")?;
    let credentials = Arc::new(PgCredentialStore::new(pool));

    let login = Arc::new(
        LoginService::new(credentials.clone(), tokens.clone(), config.password_hash_cost)
            .context("failed to initialise login service")?,
    );

    let policy = Arc::new(AccessPolicy::new(
        config.public_path_prefixes.clone(),
        &config.role_path_rules,
    ));

    Ok(AppState::new(credentials, tokens, login, policy))
}

/// Routes plus the auth pipeline. HTTP-level layers are applied by `run`.
pub fn build_router(state: AppState) -> Router {
    let router = Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api::v1::routes());

    middleware::auth::apply(router, state.clone()).with_state(state)
}
