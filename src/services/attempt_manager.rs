use std::sync::Arc;

use time::PrimitiveDateTime;
use uuid::Uuid;

use crate::db::models::{Attempt, Exam, Question};
use crate::db::types::AttemptStatus;
use crate::services::answer_ledger::AnswerLedger;
use crate::services::authorization::AuthorizationGuard;
use crate::services::errors::{ExamError, ExamResult};
use crate::services::exam_window::{EffectiveStatus, ExamWindow, WindowState};
use crate::services::scoring;
use crate::services::store::{AttemptStore, Clock, ExamStore, NewAttempt};

/// Attempt together with its status as of the read.
#[derive(Debug)]
pub(crate) struct AttemptView {
    pub(crate) attempt: Attempt,
    pub(crate) effective_status: EffectiveStatus,
    /// Present only while the attempt is effectively in progress.
    pub(crate) remaining_ms: Option<i64>,
}

#[derive(Debug)]
pub(crate) struct AttemptDetail {
    pub(crate) view: AttemptView,
    pub(crate) exam: Exam,
    pub(crate) questions: Vec<Question>,
}

#[derive(Debug)]
pub(crate) struct RemainingDuration {
    pub(crate) exam_id: String,
    pub(crate) remaining_ms: i64,
    pub(crate) deadline: PrimitiveDateTime,
}

#[derive(Clone)]
pub(crate) struct AttemptManager {
    exams: Arc<dyn ExamStore>,
    attempts: Arc<dyn AttemptStore>,
    guard: AuthorizationGuard,
    clock: Arc<dyn Clock>,
    max_answer_chars: usize,
}

impl AttemptManager {
    pub(crate) fn new(
        exams: Arc<dyn ExamStore>,
        attempts: Arc<dyn AttemptStore>,
        guard: AuthorizationGuard,
        clock: Arc<dyn Clock>,
        max_answer_chars: usize,
    ) -> Self {
        Self { exams, attempts, guard, clock, max_answer_chars }
    }

    pub(crate) async fn start(&self, student_id: &str, exam_id: &str) -> ExamResult<AttemptView> {
        let exam = self.exam(exam_id).await?;
        self.guard.require_enrolled(student_id, &exam.course_id).await?;

        let now = self.clock.now();
        let attempt_id = Uuid::new_v4().to_string();
        let attempt = self
            .attempts
            .insert_attempt(NewAttempt { id: &attempt_id, exam_id: &exam.id, student_id, now })
            .await?
            .ok_or(ExamError::AlreadyAttempted)?;

        metrics::counter!(crate::core::metrics::ATTEMPTS_STARTED).increment(1);
        tracing::info!(
            student_id = %student_id,
            exam_id = %exam.id,
            attempt_id = %attempt.id,
            action = "attempt_start",
            "Attempt started"
        );

        Ok(view(attempt, &ExamWindow::for_exam(&exam), now))
    }

    pub(crate) async fn submit_answer(
        &self,
        student_id: &str,
        attempt_id: &str,
        question_id: &str,
        value: &str,
    ) -> ExamResult<AttemptView> {
        let attempt = self.attempt(attempt_id).await?;
        self.exams
            .find_question(question_id)
            .await?
            .filter(|question| question.exam_id.as_deref() == Some(attempt.exam_id.as_str()))
            .ok_or(ExamError::NotFound("Question"))?;

        AuthorizationGuard::require_attempt_owner(student_id, &attempt)?;
        if attempt.status == AttemptStatus::Ended {
            return Err(ExamError::Ended);
        }

        let exam = self.exam(&attempt.exam_id).await?;
        let window = ExamWindow::for_exam(&exam);
        let now = self.clock.now();
        match window.state_at(now) {
            WindowState::Closed => {
                let finalized = self.finalize(&attempt.id, &exam, now).await?;
                metrics::counter!(crate::core::metrics::ATTEMPTS_ENDED, "reason" => "expired")
                    .increment(1);
                tracing::info!(
                    student_id = %student_id,
                    attempt_id = %finalized.id,
                    score = finalized.score,
                    action = "attempt_expire",
                    "Expired attempt finalized on late answer"
                );
                return Err(ExamError::Expired);
            }
            WindowState::NotStarted => return Err(ExamError::NotStarted),
            WindowState::Live => {}
        }

        if value.chars().count() > self.max_answer_chars {
            return Err(ExamError::Invalid(format!(
                "answer must be at most {} characters",
                self.max_answer_chars
            )));
        }

        let updated = self
            .attempts
            .upsert_answer(&attempt.id, question_id, value, now)
            .await?
            .ok_or(ExamError::Ended)?;

        metrics::counter!(crate::core::metrics::ANSWERS_SUBMITTED).increment(1);
        tracing::debug!(attempt_id = %updated.id, question_id = %question_id, "Answer saved");

        Ok(view(updated, &window, now))
    }

    /// Ends the attempt and stores its score. Calling it again rescores against the current
    /// question set and keeps the original end time.
    pub(crate) async fn end(&self, student_id: &str, attempt_id: &str) -> ExamResult<AttemptView> {
        let attempt = self.attempt(attempt_id).await?;
        AuthorizationGuard::require_attempt_owner(student_id, &attempt)?;

        let exam = self.exam(&attempt.exam_id).await?;
        let now = self.clock.now();
        let finalized = self.finalize(&attempt.id, &exam, now).await?;

        if attempt.status == AttemptStatus::InProgress {
            metrics::counter!(crate::core::metrics::ATTEMPTS_ENDED, "reason" => "submitted")
                .increment(1);
            tracing::info!(
                student_id = %student_id,
                exam_id = %exam.id,
                attempt_id = %finalized.id,
                score = finalized.score,
                action = "attempt_end",
                "Attempt ended"
            );
        }

        Ok(view(finalized, &ExamWindow::for_exam(&exam), now))
    }

    pub(crate) async fn remaining_duration(
        &self,
        student_id: &str,
        exam_id: &str,
    ) -> ExamResult<RemainingDuration> {
        let exam = self.exam(exam_id).await?;
        self.guard.require_enrolled(student_id, &exam.course_id).await?;

        let window = ExamWindow::for_exam(&exam);
        let now = self.clock.now();
        match window.state_at(now) {
            WindowState::NotStarted => Err(ExamError::NotStarted),
            WindowState::Closed => Err(ExamError::Expired),
            WindowState::Live => Ok(RemainingDuration {
                exam_id: exam.id,
                remaining_ms: window.remaining_ms(now),
                deadline: window.deadline(),
            }),
        }
    }

    pub(crate) async fn get_attempt(
        &self,
        student_id: &str,
        attempt_id: &str,
    ) -> ExamResult<AttemptDetail> {
        let attempt = self.attempt(attempt_id).await?;
        AuthorizationGuard::require_attempt_owner(student_id, &attempt)?;

        let exam = self.exam(&attempt.exam_id).await?;
        let questions = self.exams.list_questions(&exam.id).await?;
        let view = view(attempt, &ExamWindow::for_exam(&exam), self.clock.now());

        Ok(AttemptDetail { view, exam, questions })
    }

    pub(crate) async fn list_attempts(
        &self,
        instructor_id: &str,
        exam_id: &str,
    ) -> ExamResult<Vec<AttemptView>> {
        let exam = self.exam(exam_id).await?;
        AuthorizationGuard::require_exam_owner(instructor_id, &exam)?;

        let window = ExamWindow::for_exam(&exam);
        let now = self.clock.now();
        let attempts = self.attempts.list_attempts_by_exam(&exam.id).await?;
        Ok(attempts.into_iter().map(|attempt| view(attempt, &window, now)).collect())
    }

    async fn finalize(
        &self,
        attempt_id: &str,
        exam: &Exam,
        now: PrimitiveDateTime,
    ) -> ExamResult<Attempt> {
        let questions = self.exams.list_questions(&exam.id).await?;
        let score = |answers: &AnswerLedger| scoring::compute(answers, &questions);
        self.attempts
            .finish(attempt_id, &score, now)
            .await?
            .ok_or(ExamError::NotFound("Attempt"))
    }

    async fn exam(&self, exam_id: &str) -> ExamResult<Exam> {
        self.exams.find_exam(exam_id).await?.ok_or(ExamError::NotFound("Exam"))
    }

    async fn attempt(&self, attempt_id: &str) -> ExamResult<Attempt> {
        self.attempts.find_attempt(attempt_id).await?.ok_or(ExamError::NotFound("Attempt"))
    }
}

fn view(attempt: Attempt, window: &ExamWindow, now: PrimitiveDateTime) -> AttemptView {
    let effective_status = window.effective_status(attempt.status, now);
    let remaining_ms =
        (effective_status == EffectiveStatus::InProgress).then(|| window.remaining_ms(now));
    AttemptView { attempt, effective_status, remaining_ms }
}
