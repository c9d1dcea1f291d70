use sqlx::PgPool;

pub(crate) async fn find_instructor(
    pool: &PgPool,
    course_id: &str,
) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar("SELECT instructor_id FROM courses WHERE id = $1")
        .bind(course_id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn is_enrolled(
    pool: &PgPool,
    user_id: &str,
    course_id: &str,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM enrollments WHERE course_id = $1 AND user_id = $2)",
    )
    .bind(course_id)
    .bind(user_id)
    .fetch_one(pool)
    .await
}
