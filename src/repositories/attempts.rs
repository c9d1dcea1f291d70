use sqlx::PgPool;

use crate::db::models::Attempt;
use crate::db::types::AttemptStatus;

pub(crate) const COLUMNS: &str = "\
    id, exam_id, student_id, status, answers, score, created_at, ended_at, updated_at";

pub(crate) struct CreateAttempt<'a> {
    pub(crate) id: &'a str,
    pub(crate) exam_id: &'a str,
    pub(crate) student_id: &'a str,
    pub(crate) created_at: time::PrimitiveDateTime,
}

/// Returns `None` when the student already has an attempt for the exam.
pub(crate) async fn create(
    pool: &PgPool,
    attempt: CreateAttempt<'_>,
) -> Result<Option<Attempt>, sqlx::Error> {
    sqlx::query_as::<_, Attempt>(&format!(
        "INSERT INTO attempts (id, exam_id, student_id, status, answers, created_at, updated_at)
        VALUES ($1,$2,$3,$4,'{{}}'::jsonb,$5,$5)
        ON CONFLICT (exam_id, student_id) DO NOTHING
        RETURNING {COLUMNS}"
    ))
    .bind(attempt.id)
    .bind(attempt.exam_id)
    .bind(attempt.student_id)
    .bind(AttemptStatus::InProgress)
    .bind(attempt.created_at)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Attempt>, sqlx::Error> {
    sqlx::query_as::<_, Attempt>(&format!("SELECT {COLUMNS} FROM attempts WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn list_by_exam(pool: &PgPool, exam_id: &str) -> Result<Vec<Attempt>, sqlx::Error> {
    sqlx::query_as::<_, Attempt>(&format!(
        "SELECT {COLUMNS} FROM attempts WHERE exam_id = $1 ORDER BY created_at"
    ))
    .bind(exam_id)
    .fetch_all(pool)
    .await
}

/// Merges one answer into the ledger while the attempt is still in progress.
pub(crate) async fn upsert_answer(
    pool: &PgPool,
    id: &str,
    question_id: &str,
    value: &str,
    now: time::PrimitiveDateTime,
) -> Result<Option<Attempt>, sqlx::Error> {
    sqlx::query_as::<_, Attempt>(&format!(
        "UPDATE attempts
        SET answers = answers || jsonb_build_object($2::text, $3::text), updated_at = $4
        WHERE id = $1 AND status = $5
        RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(question_id)
    .bind(value)
    .bind(now)
    .bind(AttemptStatus::InProgress)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn lock_by_id(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
) -> Result<Option<Attempt>, sqlx::Error> {
    sqlx::query_as::<_, Attempt>(&format!("SELECT {COLUMNS} FROM attempts WHERE id = $1 FOR UPDATE"))
        .bind(id)
        .fetch_optional(executor)
        .await
}

/// Ends the attempt with its score. The first `ended_at` survives repeated calls.
pub(crate) async fn finish(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
    score: i64,
    now: time::PrimitiveDateTime,
) -> Result<Option<Attempt>, sqlx::Error> {
    sqlx::query_as::<_, Attempt>(&format!(
        "UPDATE attempts
        SET status = $2, ended_at = COALESCE(ended_at, $3), score = $4, updated_at = $3
        WHERE id = $1
        RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(AttemptStatus::Ended)
    .bind(now)
    .bind(score)
    .fetch_optional(executor)
    .await
}
