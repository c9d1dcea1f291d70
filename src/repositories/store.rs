use async_trait::async_trait;
use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::{Attempt, Exam, Question};
use crate::repositories::{attempts, courses, exams, questions};
use crate::services::answer_ledger::AnswerLedger;
use crate::services::store::{
    AttemptStore, CourseDirectory, EnrollmentOracle, ExamStore, NewAttempt, NewExam,
    NewQuestion, StoreResult,
};

/// Postgres-backed implementation of every storage seam the services consume.
#[derive(Clone)]
pub(crate) struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ExamStore for PgStore {
    async fn insert_exam(&self, exam: NewExam<'_>) -> StoreResult<Option<Exam>> {
        let created = exams::create(
            &self.pool,
            exams::CreateExam {
                id: exam.id,
                course_id: exam.course_id,
                instructor_id: exam.instructor_id,
                title: exam.title,
                duration_minutes: exam.duration_minutes,
                start_date: exam.start_date,
                published: exam.published,
                created_at: exam.now,
                updated_at: exam.now,
            },
        )
        .await?;
        Ok(created)
    }

    async fn find_exam(&self, exam_id: &str) -> StoreResult<Option<Exam>> {
        Ok(exams::find_by_id(&self.pool, exam_id).await?)
    }

    async fn find_exam_by_course(&self, course_id: &str) -> StoreResult<Option<Exam>> {
        Ok(exams::find_by_course(&self.pool, course_id).await?)
    }

    async fn list_exams_for_instructor(
        &self,
        course_id: &str,
        instructor_id: &str,
    ) -> StoreResult<Vec<Exam>> {
        Ok(exams::list_by_course_and_instructor(&self.pool, course_id, instructor_id).await?)
    }

    async fn delete_exam(&self, exam_id: &str) -> StoreResult<bool> {
        Ok(exams::delete(&self.pool, exam_id).await?)
    }

    async fn set_published(
        &self,
        exam_id: &str,
        published: bool,
        now: PrimitiveDateTime,
    ) -> StoreResult<Option<Exam>> {
        Ok(exams::set_published(&self.pool, exam_id, published, now).await?)
    }

    async fn append_question(
        &self,
        exam_id: &str,
        question: NewQuestion<'_>,
    ) -> StoreResult<Option<Question>> {
        let mut tx = self.pool.begin().await?;

        if exams::lock_by_id(&mut *tx, exam_id).await?.is_none() {
            return Ok(None);
        }

        let created = questions::create(
            &mut *tx,
            questions::CreateQuestion {
                id: question.id,
                exam_id,
                question_type: question.question_type,
                prompt: question.prompt,
                options: question.options,
                correct_answer: question.correct_answer,
                points: question.points,
                created_at: question.now,
            },
        )
        .await?;
        exams::adjust_total_points(&mut *tx, exam_id, i64::from(created.points), question.now)
            .await?;

        tx.commit().await?;
        Ok(Some(created))
    }

    async fn detach_question(
        &self,
        exam_id: &str,
        question_id: &str,
        now: PrimitiveDateTime,
    ) -> StoreResult<bool> {
        let mut tx = self.pool.begin().await?;

        let Some(points) = questions::detach(&mut *tx, exam_id, question_id).await? else {
            return Ok(false);
        };
        exams::adjust_total_points(&mut *tx, exam_id, -i64::from(points), now).await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn find_question(&self, question_id: &str) -> StoreResult<Option<Question>> {
        Ok(questions::find_by_id(&self.pool, question_id).await?)
    }

    async fn list_questions(&self, exam_id: &str) -> StoreResult<Vec<Question>> {
        Ok(questions::list_by_exam(&self.pool, exam_id).await?)
    }
}

#[async_trait]
impl AttemptStore for PgStore {
    async fn insert_attempt(&self, attempt: NewAttempt<'_>) -> StoreResult<Option<Attempt>> {
        let created = attempts::create(
            &self.pool,
            attempts::CreateAttempt {
                id: attempt.id,
                exam_id: attempt.exam_id,
                student_id: attempt.student_id,
                created_at: attempt.now,
            },
        )
        .await?;
        Ok(created)
    }

    async fn find_attempt(&self, attempt_id: &str) -> StoreResult<Option<Attempt>> {
        Ok(attempts::find_by_id(&self.pool, attempt_id).await?)
    }

    async fn upsert_answer(
        &self,
        attempt_id: &str,
        question_id: &str,
        value: &str,
        now: PrimitiveDateTime,
    ) -> StoreResult<Option<Attempt>> {
        Ok(attempts::upsert_answer(&self.pool, attempt_id, question_id, value, now).await?)
    }

    async fn finish(
        &self,
        attempt_id: &str,
        score: &(dyn for<'a> Fn(&'a AnswerLedger) -> i64 + Send + Sync),
        now: PrimitiveDateTime,
    ) -> StoreResult<Option<Attempt>> {
        let mut tx = self.pool.begin().await?;

        let Some(attempt) = attempts::lock_by_id(&mut *tx, attempt_id).await? else {
            return Ok(None);
        };
        let finished =
            attempts::finish(&mut *tx, attempt_id, score(&attempt.answers.0), now).await?;

        tx.commit().await?;
        Ok(finished)
    }

    async fn list_attempts_by_exam(&self, exam_id: &str) -> StoreResult<Vec<Attempt>> {
        Ok(attempts::list_by_exam(&self.pool, exam_id).await?)
    }
}

#[async_trait]
impl CourseDirectory for PgStore {
    async fn course_instructor(&self, course_id: &str) -> StoreResult<Option<String>> {
        Ok(courses::find_instructor(&self.pool, course_id).await?)
    }
}

#[async_trait]
impl EnrollmentOracle for PgStore {
    async fn is_enrolled(&self, user_id: &str, course_id: &str) -> StoreResult<bool> {
        Ok(courses::is_enrolled(&self.pool, user_id, course_id).await?)
    }
}
