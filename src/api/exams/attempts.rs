use axum::extract::{Path, State};

use crate::api::errors::ApiError;
use crate::api::guards::CurrentStudent;
use crate::api::response::ApiResponse;
use crate::api::validation::ValidatedJson;
use crate::core::state::AppState;
use crate::core::time::format_primitive;
use crate::schemas::attempt::{
    attempt_detail_to_response, attempt_to_response, AnswerSubmit, AttemptDetailResponse,
    AttemptResponse, RemainingDurationResponse,
};

pub(super) async fn start_attempt(
    State(state): State<AppState>,
    CurrentStudent(user): CurrentStudent,
    Path(exam_id): Path<String>,
) -> Result<ApiResponse<AttemptResponse>, ApiError> {
    let attempt = state.attempts().start(&user.user_id, &exam_id).await?;
    Ok(ApiResponse::created("Attempt started", attempt_to_response(attempt)))
}

pub(super) async fn submit_answer(
    State(state): State<AppState>,
    CurrentStudent(user): CurrentStudent,
    Path(attempt_id): Path<String>,
    ValidatedJson(payload): ValidatedJson<AnswerSubmit>,
) -> Result<ApiResponse<AttemptResponse>, ApiError> {
    let attempt = state
        .attempts()
        .submit_answer(&user.user_id, &attempt_id, &payload.question_id, &payload.answer)
        .await?;
    Ok(ApiResponse::ok("Answer saved", attempt_to_response(attempt)))
}

pub(super) async fn end_attempt(
    State(state): State<AppState>,
    CurrentStudent(user): CurrentStudent,
    Path(attempt_id): Path<String>,
) -> Result<ApiResponse<AttemptResponse>, ApiError> {
    let attempt = state.attempts().end(&user.user_id, &attempt_id).await?;
    Ok(ApiResponse::ok("Attempt ended", attempt_to_response(attempt)))
}

pub(super) async fn get_attempt(
    State(state): State<AppState>,
    CurrentStudent(user): CurrentStudent,
    Path(attempt_id): Path<String>,
) -> Result<ApiResponse<AttemptDetailResponse>, ApiError> {
    let detail = state.attempts().get_attempt(&user.user_id, &attempt_id).await?;
    Ok(ApiResponse::ok("Attempt retrieved", attempt_detail_to_response(detail)))
}

pub(super) async fn remaining_duration(
    State(state): State<AppState>,
    CurrentStudent(user): CurrentStudent,
    Path(exam_id): Path<String>,
) -> Result<ApiResponse<RemainingDurationResponse>, ApiError> {
    let remaining = state.attempts().remaining_duration(&user.user_id, &exam_id).await?;
    Ok(ApiResponse::ok(
        "Remaining duration retrieved",
        RemainingDurationResponse {
            exam_id: remaining.exam_id,
            remaining_ms: remaining.remaining_ms,
            end_date: format_primitive(remaining.deadline),
        },
    ))
}
