use std::collections::BTreeSet;
use std::sync::Arc;

use time::PrimitiveDateTime;
use uuid::Uuid;

use crate::db::models::{Exam, Question};
use crate::db::types::QuestionType;
use crate::services::authorization::AuthorizationGuard;
use crate::services::errors::{ExamError, ExamResult};
use crate::services::exam_window::{ExamWindow, WindowState};
use crate::services::store::{Clock, CourseDirectory, ExamStore, NewExam, NewQuestion};

const MAX_TITLE_CHARS: usize = 200;
const MAX_PROMPT_CHARS: usize = 5000;
const MAX_DURATION_MINUTES: i32 = 1440;

pub(crate) struct ExamDraft {
    pub(crate) course_id: String,
    pub(crate) title: String,
    pub(crate) duration_minutes: i32,
    pub(crate) start_date: PrimitiveDateTime,
    pub(crate) published: bool,
}

pub(crate) struct QuestionDraft {
    pub(crate) question_type: QuestionType,
    pub(crate) prompt: String,
    pub(crate) options: Vec<String>,
    pub(crate) correct_answer: String,
    pub(crate) points: i32,
}

/// Instructor view of an exam with its attached questions.
#[derive(Debug)]
pub(crate) struct ExamWithQuestions {
    pub(crate) exam: Exam,
    pub(crate) questions: Vec<Question>,
}

/// Student view of the course exam. `questions` is empty unless the window is live.
#[derive(Debug)]
pub(crate) struct StudentExam {
    pub(crate) exam: Exam,
    pub(crate) window_state: WindowState,
    pub(crate) questions: Vec<Question>,
}

#[derive(Clone)]
pub(crate) struct ExamRegistry {
    exams: Arc<dyn ExamStore>,
    courses: Arc<dyn CourseDirectory>,
    guard: AuthorizationGuard,
    clock: Arc<dyn Clock>,
}

impl ExamRegistry {
    pub(crate) fn new(
        exams: Arc<dyn ExamStore>,
        courses: Arc<dyn CourseDirectory>,
        guard: AuthorizationGuard,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { exams, courses, guard, clock }
    }

    pub(crate) async fn create_exam(
        &self,
        instructor_id: &str,
        draft: ExamDraft,
    ) -> ExamResult<Exam> {
        validate_exam_draft(&draft)?;

        let course_instructor = self
            .courses
            .course_instructor(&draft.course_id)
            .await?
            .ok_or(ExamError::NotFound("Course"))?;
        if !AuthorizationGuard::is_course_owner(instructor_id, &course_instructor) {
            return Err(ExamError::Forbidden("Only the course instructor can create its exam"));
        }

        let exam_id = Uuid::new_v4().to_string();
        let exam = self
            .exams
            .insert_exam(NewExam {
                id: &exam_id,
                course_id: &draft.course_id,
                instructor_id,
                title: draft.title.trim(),
                duration_minutes: draft.duration_minutes,
                start_date: draft.start_date,
                published: draft.published,
                now: self.clock.now(),
            })
            .await?
            .ok_or(ExamError::AlreadyExists)?;

        tracing::info!(
            user_id = %instructor_id,
            course_id = %exam.course_id,
            exam_id = %exam.id,
            action = "exam_create",
            "Exam created"
        );

        Ok(exam)
    }

    pub(crate) async fn add_question(
        &self,
        instructor_id: &str,
        exam_id: &str,
        draft: QuestionDraft,
    ) -> ExamResult<Question> {
        let exam = self.owned_exam(instructor_id, exam_id).await?;
        let options = normalize_options(&draft)?;

        let question_id = Uuid::new_v4().to_string();
        let question = self
            .exams
            .append_question(
                &exam.id,
                NewQuestion {
                    id: &question_id,
                    question_type: draft.question_type,
                    prompt: &draft.prompt,
                    options: &options,
                    correct_answer: &draft.correct_answer,
                    points: draft.points,
                    now: self.clock.now(),
                },
            )
            .await?
            .ok_or(ExamError::NotFound("Exam"))?;

        tracing::info!(
            user_id = %instructor_id,
            exam_id = %exam.id,
            question_id = %question.id,
            points = question.points,
            action = "question_add",
            "Question added"
        );

        Ok(question)
    }

    pub(crate) async fn remove_question(
        &self,
        instructor_id: &str,
        exam_id: &str,
        question_id: &str,
    ) -> ExamResult<()> {
        let exam = self.owned_exam(instructor_id, exam_id).await?;

        if !self.exams.detach_question(&exam.id, question_id, self.clock.now()).await? {
            return Err(ExamError::NotFound("Question"));
        }

        tracing::info!(
            user_id = %instructor_id,
            exam_id = %exam.id,
            question_id = %question_id,
            action = "question_remove",
            "Question detached"
        );

        Ok(())
    }

    pub(crate) async fn remove_exam(&self, instructor_id: &str, exam_id: &str) -> ExamResult<()> {
        let exam = self.owned_exam(instructor_id, exam_id).await?;

        if !self.exams.delete_exam(&exam.id).await? {
            return Err(ExamError::NotFound("Exam"));
        }

        tracing::info!(
            user_id = %instructor_id,
            course_id = %exam.course_id,
            exam_id = %exam.id,
            action = "exam_remove",
            "Exam removed"
        );

        Ok(())
    }

    pub(crate) async fn set_published(
        &self,
        instructor_id: &str,
        exam_id: &str,
        published: bool,
    ) -> ExamResult<Exam> {
        let exam = self.owned_exam(instructor_id, exam_id).await?;

        let updated = self
            .exams
            .set_published(&exam.id, published, self.clock.now())
            .await?
            .ok_or(ExamError::NotFound("Exam"))?;

        tracing::info!(
            user_id = %instructor_id,
            exam_id = %updated.id,
            published,
            action = "exam_publish",
            "Exam publication changed"
        );

        Ok(updated)
    }

    pub(crate) async fn list_by_course(
        &self,
        caller_id: &str,
        course_id: &str,
    ) -> ExamResult<Vec<ExamWithQuestions>> {
        let exams = self.exams.list_exams_for_instructor(course_id, caller_id).await?;

        let mut listed = Vec::with_capacity(exams.len());
        for exam in exams {
            let questions = self.exams.list_questions(&exam.id).await?;
            listed.push(ExamWithQuestions { exam, questions });
        }
        Ok(listed)
    }

    pub(crate) async fn available_for_student(
        &self,
        student_id: &str,
        course_id: &str,
    ) -> ExamResult<StudentExam> {
        self.guard.require_enrolled(student_id, course_id).await?;

        let exam =
            self.exams.find_exam_by_course(course_id).await?.ok_or(ExamError::NotFound("Exam"))?;

        let window_state = ExamWindow::for_exam(&exam).state_at(self.clock.now());
        let questions = match window_state {
            WindowState::Closed => return Err(ExamError::NotFound("Exam")),
            WindowState::NotStarted => Vec::new(),
            WindowState::Live => self.exams.list_questions(&exam.id).await?,
        };

        Ok(StudentExam { exam, window_state, questions })
    }

    async fn owned_exam(&self, instructor_id: &str, exam_id: &str) -> ExamResult<Exam> {
        let exam = self.exams.find_exam(exam_id).await?.ok_or(ExamError::NotFound("Exam"))?;
        AuthorizationGuard::require_exam_owner(instructor_id, &exam)?;
        Ok(exam)
    }
}

fn validate_exam_draft(draft: &ExamDraft) -> ExamResult<()> {
    let title = draft.title.trim();
    if title.is_empty() || title.chars().count() > MAX_TITLE_CHARS {
        return Err(ExamError::Invalid(format!(
            "title must be 1-{MAX_TITLE_CHARS} characters"
        )));
    }
    if !(1..=MAX_DURATION_MINUTES).contains(&draft.duration_minutes) {
        return Err(ExamError::Invalid(format!(
            "durationMinutes must be 1-{MAX_DURATION_MINUTES}"
        )));
    }
    Ok(())
}

/// Checks type-specific question rules and returns the option list to store.
fn normalize_options(draft: &QuestionDraft) -> ExamResult<Vec<String>> {
    if draft.prompt.trim().is_empty() || draft.prompt.chars().count() > MAX_PROMPT_CHARS {
        return Err(ExamError::Invalid(format!(
            "prompt must be 1-{MAX_PROMPT_CHARS} characters"
        )));
    }
    if draft.correct_answer.is_empty() {
        return Err(ExamError::Invalid("correctAnswer must not be empty".to_string()));
    }
    if draft.points < 0 {
        return Err(ExamError::Invalid("points must not be negative".to_string()));
    }

    let options = match draft.question_type {
        QuestionType::MultipleChoice => {
            if draft.options.len() < 2 {
                return Err(ExamError::Invalid(
                    "multiple choice questions need at least two options".to_string(),
                ));
            }
            check_options(&draft.options)?;
            draft.options.clone()
        }
        QuestionType::TrueFalse if draft.options.is_empty() => {
            vec!["true".to_string(), "false".to_string()]
        }
        QuestionType::TrueFalse => {
            if draft.options.len() != 2 {
                return Err(ExamError::Invalid(
                    "true/false questions take exactly two options".to_string(),
                ));
            }
            check_options(&draft.options)?;
            draft.options.clone()
        }
        QuestionType::ShortAnswer | QuestionType::Essay => {
            if !draft.options.is_empty() {
                return Err(ExamError::Invalid(
                    "short answer and essay questions take no options".to_string(),
                ));
            }
            return Ok(Vec::new());
        }
    };

    if !options.contains(&draft.correct_answer) {
        return Err(ExamError::Invalid("correctAnswer must be one of the options".to_string()));
    }

    Ok(options)
}

fn check_options(options: &[String]) -> ExamResult<()> {
    if options.iter().any(|option| option.trim().is_empty()) {
        return Err(ExamError::Invalid("options must not be empty".to_string()));
    }
    let distinct: BTreeSet<&str> = options.iter().map(String::as_str).collect();
    if distinct.len() != options.len() {
        return Err(ExamError::Invalid("options must be distinct".to_string()));
    }
    Ok(())
}
