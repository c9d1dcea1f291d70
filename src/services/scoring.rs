use crate::db::models::Question;
use crate::services::answer_ledger::AnswerLedger;

/// Total score of `answers` against the given question set.
///
/// A question contributes its points only when its answer is present and equal to the
/// correct answer byte for byte. Every question type is scored the same way.
pub(crate) fn compute(answers: &AnswerLedger, questions: &[Question]) -> i64 {
    questions
        .iter()
        .filter(|question| answers.get(&question.id) == Some(question.correct_answer.as_str()))
        .fold(0i64, |total, question| total.saturating_add(i64::from(question.points.max(0))))
}
