mod attempts;
mod handlers;

use axum::{routing::delete, routing::get, routing::post, Router};

use crate::core::state::AppState;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::create_exam))
        .route("/course/:course_id", get(handlers::list_course_exams))
        .route("/course/:course_id/available", get(handlers::available_exam))
        .route("/attempt/:attempt_id", get(attempts::get_attempt))
        .route("/attempt/:attempt_id/answer", post(attempts::submit_answer))
        .route("/attempt/:attempt_id/end", post(attempts::end_attempt))
        .route("/:exam_id", delete(handlers::remove_exam))
        .route("/:exam_id/publish", post(handlers::set_published))
        .route("/:exam_id/questions", post(handlers::add_question))
        .route("/:exam_id/questions/:question_id", delete(handlers::remove_question))
        .route("/:exam_id/duration", get(attempts::remaining_duration))
        .route("/:exam_id/attempt", post(attempts::start_attempt))
        .route("/:exam_id/attempts", get(handlers::list_exam_attempts))
}
