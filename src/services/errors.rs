use thiserror::Error;

use crate::services::store::StoreError;

#[derive(Debug, Error)]
pub(crate) enum ExamError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Forbidden(&'static str),
    #[error("You are not enrolled in this course")]
    NotEnrolled,
    #[error("An exam already exists for this course")]
    AlreadyExists,
    #[error("You have already attempted this exam")]
    AlreadyAttempted,
    #[error("Exam has ended")]
    Expired,
    #[error("Exam has not started yet")]
    NotStarted,
    #[error("Attempt has already been ended")]
    Ended,
    #[error("{0}")]
    Invalid(String),
    #[error(transparent)]
    Storage(#[from] StoreError),
}

pub(crate) type ExamResult<T> = Result<T, ExamError>;
