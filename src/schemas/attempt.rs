use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::Exam;
use crate::schemas::exam::{question_to_public, PublicQuestionResponse};
use crate::services::answer_ledger::AnswerLedger;
use crate::services::attempt_manager::{AttemptDetail, AttemptView};
use crate::services::exam_window::{EffectiveStatus, ExamWindow};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AnswerSubmit {
    #[serde(alias = "question_id")]
    #[validate(length(min = 1, message = "questionId must not be empty"))]
    pub(crate) question_id: String,
    pub(crate) answer: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AttemptResponse {
    pub(crate) id: String,
    pub(crate) exam_id: String,
    pub(crate) student_id: String,
    pub(crate) status: EffectiveStatus,
    pub(crate) answers: AnswerLedger,
    pub(crate) score: Option<i64>,
    pub(crate) created_at: String,
    pub(crate) ended_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) remaining_ms: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ExamSummary {
    pub(crate) id: String,
    pub(crate) course_id: String,
    pub(crate) title: String,
    pub(crate) duration_minutes: i32,
    pub(crate) start_date: String,
    pub(crate) end_date: String,
    pub(crate) total_points: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AttemptDetailResponse {
    pub(crate) attempt: AttemptResponse,
    pub(crate) exam: ExamSummary,
    pub(crate) questions: Vec<PublicQuestionResponse>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RemainingDurationResponse {
    pub(crate) exam_id: String,
    pub(crate) remaining_ms: i64,
    pub(crate) end_date: String,
}

pub(crate) fn attempt_to_response(view: AttemptView) -> AttemptResponse {
    let AttemptView { attempt, effective_status, remaining_ms } = view;
    AttemptResponse {
        id: attempt.id,
        exam_id: attempt.exam_id,
        student_id: attempt.student_id,
        status: effective_status,
        answers: attempt.answers.0,
        score: attempt.score,
        created_at: format_primitive(attempt.created_at),
        ended_at: attempt.ended_at.map(format_primitive),
        remaining_ms,
    }
}

pub(crate) fn exam_to_summary(exam: Exam) -> ExamSummary {
    let window = ExamWindow::for_exam(&exam);
    ExamSummary {
        id: exam.id,
        course_id: exam.course_id,
        title: exam.title,
        duration_minutes: exam.duration_minutes,
        start_date: format_primitive(window.start()),
        end_date: format_primitive(window.deadline()),
        total_points: exam.total_points,
    }
}

pub(crate) fn attempt_detail_to_response(detail: AttemptDetail) -> AttemptDetailResponse {
    let AttemptDetail { view, exam, questions } = detail;
    AttemptDetailResponse {
        attempt: attempt_to_response(view),
        exam: exam_to_summary(exam),
        questions: questions.into_iter().map(question_to_public).collect(),
    }
}
