use sqlx::PgPool;

use crate::db::models::Exam;

pub(crate) const COLUMNS: &str = "\
    id, course_id, instructor_id, title, duration_minutes, start_date, \
    total_points, published, created_at, updated_at";

pub(crate) struct CreateExam<'a> {
    pub(crate) id: &'a str,
    pub(crate) course_id: &'a str,
    pub(crate) instructor_id: &'a str,
    pub(crate) title: &'a str,
    pub(crate) duration_minutes: i32,
    pub(crate) start_date: time::PrimitiveDateTime,
    pub(crate) published: bool,
    pub(crate) created_at: time::PrimitiveDateTime,
    pub(crate) updated_at: time::PrimitiveDateTime,
}

/// Returns `None` when the course already has an exam.
pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    exam: CreateExam<'_>,
) -> Result<Option<Exam>, sqlx::Error> {
    sqlx::query_as::<_, Exam>(&format!(
        "INSERT INTO exams (
            id, course_id, instructor_id, title, duration_minutes, start_date,
            total_points, published, created_at, updated_at
        ) VALUES ($1,$2,$3,$4,$5,$6,0,$7,$8,$9)
        ON CONFLICT (course_id) DO NOTHING
        RETURNING {COLUMNS}"
    ))
    .bind(exam.id)
    .bind(exam.course_id)
    .bind(exam.instructor_id)
    .bind(exam.title)
    .bind(exam.duration_minutes)
    .bind(exam.start_date)
    .bind(exam.published)
    .bind(exam.created_at)
    .bind(exam.updated_at)
    .fetch_optional(executor)
    .await
}

pub(crate) async fn find_by_id(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
) -> Result<Option<Exam>, sqlx::Error> {
    sqlx::query_as::<_, Exam>(&format!("SELECT {COLUMNS} FROM exams WHERE id = $1"))
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub(crate) async fn lock_by_id(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
) -> Result<Option<Exam>, sqlx::Error> {
    sqlx::query_as::<_, Exam>(&format!("SELECT {COLUMNS} FROM exams WHERE id = $1 FOR UPDATE"))
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub(crate) async fn find_by_course(
    pool: &PgPool,
    course_id: &str,
) -> Result<Option<Exam>, sqlx::Error> {
    sqlx::query_as::<_, Exam>(&format!("SELECT {COLUMNS} FROM exams WHERE course_id = $1"))
        .bind(course_id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn list_by_course_and_instructor(
    pool: &PgPool,
    course_id: &str,
    instructor_id: &str,
) -> Result<Vec<Exam>, sqlx::Error> {
    sqlx::query_as::<_, Exam>(&format!(
        "SELECT {COLUMNS} FROM exams \
         WHERE course_id = $1 AND instructor_id = $2 \
         ORDER BY created_at DESC"
    ))
    .bind(course_id)
    .bind(instructor_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn set_published(
    pool: &PgPool,
    id: &str,
    published: bool,
    now: time::PrimitiveDateTime,
) -> Result<Option<Exam>, sqlx::Error> {
    sqlx::query_as::<_, Exam>(&format!(
        "UPDATE exams SET published = $2, updated_at = $3 WHERE id = $1 RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(published)
    .bind(now)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn adjust_total_points(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
    delta: i64,
    now: time::PrimitiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE exams SET total_points = total_points + $2, updated_at = $3 WHERE id = $1")
        .bind(id)
        .bind(delta)
        .bind(now)
        .execute(executor)
        .await?;
    Ok(())
}

pub(crate) async fn delete(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM exams WHERE id = $1").bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}
