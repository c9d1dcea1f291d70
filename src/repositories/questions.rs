use sqlx::types::Json;
use sqlx::PgPool;

use crate::db::models::Question;
use crate::db::types::QuestionType;

pub(crate) const COLUMNS: &str = "\
    id, exam_id, seq, question_type, prompt, options, correct_answer, points, created_at";

pub(crate) struct CreateQuestion<'a> {
    pub(crate) id: &'a str,
    pub(crate) exam_id: &'a str,
    pub(crate) question_type: QuestionType,
    pub(crate) prompt: &'a str,
    pub(crate) options: &'a [String],
    pub(crate) correct_answer: &'a str,
    pub(crate) points: i32,
    pub(crate) created_at: time::PrimitiveDateTime,
}

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    question: CreateQuestion<'_>,
) -> Result<Question, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!(
        "INSERT INTO questions (
            id, exam_id, question_type, prompt, options, correct_answer, points, created_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8)
        RETURNING {COLUMNS}"
    ))
    .bind(question.id)
    .bind(question.exam_id)
    .bind(question.question_type)
    .bind(question.prompt)
    .bind(Json(question.options))
    .bind(question.correct_answer)
    .bind(question.points)
    .bind(question.created_at)
    .fetch_one(executor)
    .await
}

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Question>, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!("SELECT {COLUMNS} FROM questions WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn list_by_exam(
    pool: &PgPool,
    exam_id: &str,
) -> Result<Vec<Question>, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!(
        "SELECT {COLUMNS} FROM questions WHERE exam_id = $1 ORDER BY seq"
    ))
    .bind(exam_id)
    .fetch_all(pool)
    .await
}

/// Clears the exam reference and returns the detached question's points.
pub(crate) async fn detach(
    executor: impl sqlx::PgExecutor<'_>,
    exam_id: &str,
    id: &str,
) -> Result<Option<i32>, sqlx::Error> {
    sqlx::query_scalar(
        "UPDATE questions SET exam_id = NULL WHERE id = $1 AND exam_id = $2 RETURNING points",
    )
    .bind(id)
    .bind(exam_id)
    .fetch_optional(executor)
    .await
}
