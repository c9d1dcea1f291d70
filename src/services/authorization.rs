use std::sync::Arc;

use crate::db::models::{Attempt, Exam};
use crate::services::errors::{ExamError, ExamResult};
use crate::services::store::{EnrollmentOracle, StoreResult};

/// Side-effect-free access predicates shared by the registry and the attempt manager.
#[derive(Clone)]
pub(crate) struct AuthorizationGuard {
    enrollments: Arc<dyn EnrollmentOracle>,
}

impl AuthorizationGuard {
    pub(crate) fn new(enrollments: Arc<dyn EnrollmentOracle>) -> Self {
        Self { enrollments }
    }

    pub(crate) fn is_course_owner(user_id: &str, course_instructor_id: &str) -> bool {
        user_id == course_instructor_id
    }

    pub(crate) fn is_attempt_owner(user_id: &str, attempt: &Attempt) -> bool {
        attempt.student_id == user_id
    }

    pub(crate) async fn is_enrolled(&self, user_id: &str, course_id: &str) -> StoreResult<bool> {
        self.enrollments.is_enrolled(user_id, course_id).await
    }

    pub(crate) fn require_exam_owner(user_id: &str, exam: &Exam) -> ExamResult<()> {
        if Self::is_course_owner(user_id, &exam.instructor_id) {
            Ok(())
        } else {
            Err(ExamError::Forbidden("Only the exam's instructor can manage it"))
        }
    }

    pub(crate) fn require_attempt_owner(user_id: &str, attempt: &Attempt) -> ExamResult<()> {
        if Self::is_attempt_owner(user_id, attempt) {
            Ok(())
        } else {
            Err(ExamError::Forbidden("Access denied"))
        }
    }

    pub(crate) async fn require_enrolled(&self, user_id: &str, course_id: &str) -> ExamResult<()> {
        if self.is_enrolled(user_id, course_id).await? {
            Ok(())
        } else {
            Err(ExamError::NotEnrolled)
        }
    }
}
