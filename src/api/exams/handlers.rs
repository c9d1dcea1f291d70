use axum::extract::{Path, State};
use axum::http::StatusCode;

use crate::api::errors::ApiError;
use crate::api::guards::{CurrentInstructor, CurrentStudent};
use crate::api::response::ApiResponse;
use crate::api::validation::ValidatedJson;
use crate::core::state::AppState;
use crate::core::time::to_primitive_utc;
use crate::schemas::attempt::{attempt_to_response, AttemptResponse};
use crate::schemas::exam::{
    exam_to_response, exam_to_student_response, question_to_response, ExamCreate, ExamResponse,
    PublishUpdate, QuestionCreate, QuestionResponse, StudentExamResponse,
};
use crate::services::exam_registry::{ExamDraft, QuestionDraft};

pub(super) async fn create_exam(
    State(state): State<AppState>,
    CurrentInstructor(user): CurrentInstructor,
    ValidatedJson(payload): ValidatedJson<ExamCreate>,
) -> Result<ApiResponse<ExamResponse>, ApiError> {
    let exam = state
        .registry()
        .create_exam(
            &user.user_id,
            ExamDraft {
                course_id: payload.course_id,
                title: payload.title,
                duration_minutes: payload.duration_minutes,
                start_date: to_primitive_utc(payload.start_date),
                published: payload.published,
            },
        )
        .await?;

    Ok(ApiResponse::created("Exam created", exam_to_response(exam, Some(Vec::new()))))
}

pub(super) async fn remove_exam(
    State(state): State<AppState>,
    CurrentInstructor(user): CurrentInstructor,
    Path(exam_id): Path<String>,
) -> Result<ApiResponse<()>, ApiError> {
    state.registry().remove_exam(&user.user_id, &exam_id).await?;
    Ok(ApiResponse::message(StatusCode::OK, "Exam removed"))
}

pub(super) async fn list_course_exams(
    State(state): State<AppState>,
    CurrentInstructor(user): CurrentInstructor,
    Path(course_id): Path<String>,
) -> Result<ApiResponse<Vec<ExamResponse>>, ApiError> {
    let exams = state.registry().list_by_course(&user.user_id, &course_id).await?;
    let exams = exams
        .into_iter()
        .map(|listed| exam_to_response(listed.exam, Some(listed.questions)))
        .collect();
    Ok(ApiResponse::ok("Exams retrieved", exams))
}

pub(super) async fn add_question(
    State(state): State<AppState>,
    CurrentInstructor(user): CurrentInstructor,
    Path(exam_id): Path<String>,
    ValidatedJson(payload): ValidatedJson<QuestionCreate>,
) -> Result<ApiResponse<QuestionResponse>, ApiError> {
    let question = state
        .registry()
        .add_question(
            &user.user_id,
            &exam_id,
            QuestionDraft {
                question_type: payload.question_type,
                prompt: payload.prompt,
                options: payload.options,
                correct_answer: payload.correct_answer,
                points: payload.points,
            },
        )
        .await?;

    Ok(ApiResponse::created("Question added", question_to_response(question)))
}

pub(super) async fn remove_question(
    State(state): State<AppState>,
    CurrentInstructor(user): CurrentInstructor,
    Path((exam_id, question_id)): Path<(String, String)>,
) -> Result<ApiResponse<()>, ApiError> {
    state.registry().remove_question(&user.user_id, &exam_id, &question_id).await?;
    Ok(ApiResponse::message(StatusCode::OK, "Question removed"))
}

pub(super) async fn set_published(
    State(state): State<AppState>,
    CurrentInstructor(user): CurrentInstructor,
    Path(exam_id): Path<String>,
    ValidatedJson(payload): ValidatedJson<PublishUpdate>,
) -> Result<ApiResponse<ExamResponse>, ApiError> {
    let exam = state.registry().set_published(&user.user_id, &exam_id, payload.published).await?;
    Ok(ApiResponse::ok("Exam updated", exam_to_response(exam, None)))
}

pub(super) async fn available_exam(
    State(state): State<AppState>,
    CurrentStudent(user): CurrentStudent,
    Path(course_id): Path<String>,
) -> Result<ApiResponse<StudentExamResponse>, ApiError> {
    let available = state.registry().available_for_student(&user.user_id, &course_id).await?;
    Ok(ApiResponse::ok(
        "Exam retrieved",
        exam_to_student_response(available.exam, available.window_state, available.questions),
    ))
}

pub(super) async fn list_exam_attempts(
    State(state): State<AppState>,
    CurrentInstructor(user): CurrentInstructor,
    Path(exam_id): Path<String>,
) -> Result<ApiResponse<Vec<AttemptResponse>>, ApiError> {
    let attempts = state.attempts().list_attempts(&user.user_id, &exam_id).await?;
    Ok(ApiResponse::ok(
        "Attempts retrieved",
        attempts.into_iter().map(attempt_to_response).collect(),
    ))
}
