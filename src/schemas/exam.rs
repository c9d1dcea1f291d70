use serde::de::Error as _;
use serde::{Deserialize, Serialize};
use time::{
    format_description::well_known::Rfc3339, macros::format_description, OffsetDateTime,
    PrimitiveDateTime,
};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::{Exam, Question};
use crate::db::types::QuestionType;
use crate::services::exam_window::{ExamWindow, WindowState};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ExamCreate {
    #[serde(alias = "course_id")]
    #[validate(length(min = 1, message = "courseId must not be empty"))]
    pub(crate) course_id: String,
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub(crate) title: String,
    #[serde(alias = "duration_minutes", alias = "duration")]
    #[validate(range(min = 1, max = 1440, message = "durationMinutes must be 1-1440"))]
    pub(crate) duration_minutes: i32,
    #[serde(alias = "start_date", deserialize_with = "deserialize_rfc3339")]
    pub(crate) start_date: OffsetDateTime,
    #[serde(default)]
    pub(crate) published: bool,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QuestionCreate {
    #[serde(rename = "type", alias = "questionType", alias = "question_type")]
    pub(crate) question_type: QuestionType,
    #[validate(length(min = 1, max = 5000, message = "prompt must be 1-5000 characters"))]
    pub(crate) prompt: String,
    #[serde(default)]
    #[validate(length(max = 20, message = "at most 20 options are allowed"))]
    pub(crate) options: Vec<String>,
    #[serde(alias = "correct_answer")]
    #[validate(length(min = 1, max = 5000, message = "correctAnswer must be 1-5000 characters"))]
    pub(crate) correct_answer: String,
    #[validate(range(min = 0, max = 10000, message = "points must be 0-10000"))]
    pub(crate) points: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct PublishUpdate {
    pub(crate) published: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QuestionResponse {
    pub(crate) id: String,
    pub(crate) exam_id: Option<String>,
    #[serde(rename = "type")]
    pub(crate) question_type: QuestionType,
    pub(crate) prompt: String,
    pub(crate) options: Vec<String>,
    pub(crate) correct_answer: String,
    pub(crate) points: i32,
    pub(crate) created_at: String,
}

/// Question as shown to students: no correct answer.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PublicQuestionResponse {
    pub(crate) id: String,
    #[serde(rename = "type")]
    pub(crate) question_type: QuestionType,
    pub(crate) prompt: String,
    pub(crate) options: Vec<String>,
    pub(crate) points: i32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ExamResponse {
    pub(crate) id: String,
    pub(crate) course_id: String,
    pub(crate) instructor_id: String,
    pub(crate) title: String,
    pub(crate) duration_minutes: i32,
    pub(crate) start_date: String,
    pub(crate) end_date: String,
    pub(crate) total_points: i64,
    pub(crate) published: bool,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) questions: Option<Vec<QuestionResponse>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StudentExamResponse {
    pub(crate) id: String,
    pub(crate) course_id: String,
    pub(crate) title: String,
    pub(crate) duration_minutes: i32,
    pub(crate) start_date: String,
    pub(crate) end_date: String,
    pub(crate) total_points: i64,
    pub(crate) window_state: WindowState,
    pub(crate) questions: Vec<PublicQuestionResponse>,
}

pub(crate) fn question_to_response(question: Question) -> QuestionResponse {
    QuestionResponse {
        id: question.id,
        exam_id: question.exam_id,
        question_type: question.question_type,
        prompt: question.prompt,
        options: question.options.0,
        correct_answer: question.correct_answer,
        points: question.points,
        created_at: format_primitive(question.created_at),
    }
}

pub(crate) fn question_to_public(question: Question) -> PublicQuestionResponse {
    PublicQuestionResponse {
        id: question.id,
        question_type: question.question_type,
        prompt: question.prompt,
        options: question.options.0,
        points: question.points,
    }
}

pub(crate) fn exam_to_response(exam: Exam, questions: Option<Vec<Question>>) -> ExamResponse {
    let window = ExamWindow::for_exam(&exam);
    ExamResponse {
        id: exam.id,
        course_id: exam.course_id,
        instructor_id: exam.instructor_id,
        title: exam.title,
        duration_minutes: exam.duration_minutes,
        start_date: format_primitive(exam.start_date),
        end_date: format_primitive(window.deadline()),
        total_points: exam.total_points,
        published: exam.published,
        created_at: format_primitive(exam.created_at),
        updated_at: format_primitive(exam.updated_at),
        questions: questions
            .map(|questions| questions.into_iter().map(question_to_response).collect()),
    }
}

pub(crate) fn exam_to_student_response(
    exam: Exam,
    window_state: WindowState,
    questions: Vec<Question>,
) -> StudentExamResponse {
    let window = ExamWindow::for_exam(&exam);
    StudentExamResponse {
        id: exam.id,
        course_id: exam.course_id,
        title: exam.title,
        duration_minutes: exam.duration_minutes,
        start_date: format_primitive(window.start()),
        end_date: format_primitive(window.deadline()),
        total_points: exam.total_points,
        window_state,
        questions: questions.into_iter().map(question_to_public).collect(),
    }
}

fn deserialize_rfc3339<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_start_date(&raw).ok_or_else(|| D::Error::custom(format!("invalid datetime: {raw}")))
}

/// Accepts RFC 3339; a value without offset is read as UTC.
fn parse_start_date(raw: &str) -> Option<OffsetDateTime> {
    if let Ok(value) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(value);
    }

    PrimitiveDateTime::parse(
        raw,
        &format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    )
    .ok()
    .map(PrimitiveDateTime::assume_utc)
}
