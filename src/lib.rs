pub(crate) mod api;
pub(crate) mod core;
pub(crate) mod db;
pub(crate) mod repositories;
pub(crate) mod schemas;
pub(crate) mod services;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use crate::core::{config::Settings, state::AppState, telemetry};
use crate::repositories::store::PgStore;
use crate::services::attempt_manager::AttemptManager;
use crate::services::authorization::AuthorizationGuard;
use crate::services::exam_registry::ExamRegistry;
use crate::services::store::SystemClock;

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::load()?;
    telemetry::init_tracing(&settings)?;
    core::metrics::init(&settings)?;

    let db_pool = db::init_pool(&settings).await?;
    db::run_migrations(&db_pool).await?;

    let store = Arc::new(PgStore::new(db_pool.clone()));
    let clock = Arc::new(SystemClock);
    let guard = AuthorizationGuard::new(store.clone());
    let registry = ExamRegistry::new(store.clone(), store.clone(), guard.clone(), clock.clone());
    let attempts = AttemptManager::new(
        store.clone(),
        store,
        guard,
        clock,
        settings.exam().max_answer_chars,
    );

    let state = AppState::new(settings, db_pool, registry, attempts);
    let app = api::router::router(state.clone());
    let listener = tokio::net::TcpListener::bind(state.settings().server_addr()).await?;

    tracing::info!(
        host = %state.settings().server_host(),
        port = state.settings().server_port(),
        environment = %state.settings().runtime().environment.as_str(),
        "Exam lifecycle API listening"
    );

    axum::serve(listener, app).with_graceful_shutdown(core::shutdown::shutdown_signal()).await?;
    state.db().close().await;
    tracing::info!("Database pool closed");

    Ok(())
}
