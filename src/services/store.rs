//! Storage and collaborator seams consumed by the exam services.
//!
//! The Postgres implementation lives in `repositories::store`; tests use the in-memory
//! implementation from `test_support`. Operations that must be atomic (uniqueness,
//! conditional answer upsert, ending with its score) are single calls here so that each
//! backend can enforce them inside one statement or one critical section.

use async_trait::async_trait;
use thiserror::Error;
use time::PrimitiveDateTime;

use crate::db::models::{Attempt, Exam, Question};
use crate::db::types::QuestionType;
use crate::services::answer_ledger::AnswerLedger;

#[derive(Debug, Error)]
pub(crate) enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[cfg(test)]
    #[error("storage unavailable")]
    Unavailable,
}

pub(crate) type StoreResult<T> = Result<T, StoreError>;

pub(crate) struct NewExam<'a> {
    pub(crate) id: &'a str,
    pub(crate) course_id: &'a str,
    pub(crate) instructor_id: &'a str,
    pub(crate) title: &'a str,
    pub(crate) duration_minutes: i32,
    pub(crate) start_date: PrimitiveDateTime,
    pub(crate) published: bool,
    pub(crate) now: PrimitiveDateTime,
}

pub(crate) struct NewQuestion<'a> {
    pub(crate) id: &'a str,
    pub(crate) question_type: QuestionType,
    pub(crate) prompt: &'a str,
    pub(crate) options: &'a [String],
    pub(crate) correct_answer: &'a str,
    pub(crate) points: i32,
    pub(crate) now: PrimitiveDateTime,
}

pub(crate) struct NewAttempt<'a> {
    pub(crate) id: &'a str,
    pub(crate) exam_id: &'a str,
    pub(crate) student_id: &'a str,
    pub(crate) now: PrimitiveDateTime,
}

#[async_trait]
pub(crate) trait ExamStore: Send + Sync {
    /// Returns `None` when the course already has an exam.
    async fn insert_exam(&self, exam: NewExam<'_>) -> StoreResult<Option<Exam>>;

    async fn find_exam(&self, exam_id: &str) -> StoreResult<Option<Exam>>;

    async fn find_exam_by_course(&self, course_id: &str) -> StoreResult<Option<Exam>>;

    async fn list_exams_for_instructor(
        &self,
        course_id: &str,
        instructor_id: &str,
    ) -> StoreResult<Vec<Exam>>;

    /// Returns `false` when nothing was deleted. Attached questions become detached.
    async fn delete_exam(&self, exam_id: &str) -> StoreResult<bool>;

    async fn set_published(
        &self,
        exam_id: &str,
        published: bool,
        now: PrimitiveDateTime,
    ) -> StoreResult<Option<Exam>>;

    /// Appends to the tail of the exam's question list and adds the question's points to
    /// the exam total. Returns `None` when the exam no longer exists.
    async fn append_question(
        &self,
        exam_id: &str,
        question: NewQuestion<'_>,
    ) -> StoreResult<Option<Question>>;

    /// Clears list membership only; the question record is kept.
    async fn detach_question(
        &self,
        exam_id: &str,
        question_id: &str,
        now: PrimitiveDateTime,
    ) -> StoreResult<bool>;

    async fn find_question(&self, question_id: &str) -> StoreResult<Option<Question>>;

    /// Questions currently attached to the exam, in append order.
    async fn list_questions(&self, exam_id: &str) -> StoreResult<Vec<Question>>;
}

#[async_trait]
pub(crate) trait AttemptStore: Send + Sync {
    /// Returns `None` when the student already has an attempt for the exam.
    async fn insert_attempt(&self, attempt: NewAttempt<'_>) -> StoreResult<Option<Attempt>>;

    async fn find_attempt(&self, attempt_id: &str) -> StoreResult<Option<Attempt>>;

    /// Sets `answers[question_id] = value` if the attempt is still in progress.
    /// Returns `None` when the attempt is missing or already ended.
    async fn upsert_answer(
        &self,
        attempt_id: &str,
        question_id: &str,
        value: &str,
        now: PrimitiveDateTime,
    ) -> StoreResult<Option<Attempt>>;

    /// Moves the attempt to ended and stores the score computed from its final answers, all
    /// in one write. Repeated calls keep the first `ended_at` and rescore.
    async fn finish(
        &self,
        attempt_id: &str,
        score: &(dyn for<'a> Fn(&'a AnswerLedger) -> i64 + Send + Sync),
        now: PrimitiveDateTime,
    ) -> StoreResult<Option<Attempt>>;

    async fn list_attempts_by_exam(&self, exam_id: &str) -> StoreResult<Vec<Attempt>>;
}

/// Course lookup owned by the course subsystem.
#[async_trait]
pub(crate) trait CourseDirectory: Send + Sync {
    async fn course_instructor(&self, course_id: &str) -> StoreResult<Option<String>>;
}

/// Answers "is user U enrolled in course C?".
#[async_trait]
pub(crate) trait EnrollmentOracle: Send + Sync {
    async fn is_enrolled(&self, user_id: &str, course_id: &str) -> StoreResult<bool>;
}

pub(crate) trait Clock: Send + Sync {
    fn now(&self) -> PrimitiveDateTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> PrimitiveDateTime {
        crate::core::time::primitive_now_utc()
    }
}
