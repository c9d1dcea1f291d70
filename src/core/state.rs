use std::sync::Arc;

use sqlx::PgPool;

use crate::core::config::Settings;
use crate::services::attempt_manager::AttemptManager;
use crate::services::exam_registry::ExamRegistry;

#[derive(Clone)]
pub(crate) struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    settings: Settings,
    db: PgPool,
    registry: ExamRegistry,
    attempts: AttemptManager,
}

impl AppState {
    pub(crate) fn new(
        settings: Settings,
        db: PgPool,
        registry: ExamRegistry,
        attempts: AttemptManager,
    ) -> Self {
        Self { inner: Arc::new(InnerState { settings, db, registry, attempts }) }
    }

    pub(crate) fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    pub(crate) fn db(&self) -> &PgPool {
        &self.inner.db
    }

    pub(crate) fn registry(&self) -> &ExamRegistry {
        &self.inner.registry
    }

    pub(crate) fn attempts(&self) -> &AttemptManager {
        &self.inner.attempts
    }
}
