use serde::Serialize;
use time::{Duration, PrimitiveDateTime};

use crate::db::models::Exam;
use crate::db::types::AttemptStatus;

/// Where the current instant falls relative to `[start, start + duration)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum WindowState {
    NotStarted,
    Live,
    Closed,
}

/// Attempt status as seen by readers: an in-progress attempt past its deadline reads as
/// expired even though storage still says in-progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum EffectiveStatus {
    InProgress,
    Expired,
    Ended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ExamWindow {
    start: PrimitiveDateTime,
    deadline: PrimitiveDateTime,
}

impl ExamWindow {
    pub(crate) fn new(start: PrimitiveDateTime, duration_minutes: i32) -> Self {
        let deadline = start
            .checked_add(Duration::minutes(i64::from(duration_minutes.max(0))))
            .unwrap_or(PrimitiveDateTime::MAX);
        Self { start, deadline }
    }

    pub(crate) fn for_exam(exam: &Exam) -> Self {
        Self::new(exam.start_date, exam.duration_minutes)
    }

    pub(crate) fn start(&self) -> PrimitiveDateTime {
        self.start
    }

    pub(crate) fn deadline(&self) -> PrimitiveDateTime {
        self.deadline
    }

    pub(crate) fn state_at(&self, now: PrimitiveDateTime) -> WindowState {
        if now < self.start {
            WindowState::NotStarted
        } else if now >= self.deadline {
            WindowState::Closed
        } else {
            WindowState::Live
        }
    }

    /// Milliseconds left until the deadline, zero once it has passed.
    pub(crate) fn remaining_ms(&self, now: PrimitiveDateTime) -> i64 {
        let remaining = (self.deadline - now).whole_milliseconds();
        i64::try_from(remaining.max(0)).unwrap_or(i64::MAX)
    }

    pub(crate) fn effective_status(
        &self,
        status: AttemptStatus,
        now: PrimitiveDateTime,
    ) -> EffectiveStatus {
        match status {
            AttemptStatus::Ended => EffectiveStatus::Ended,
            AttemptStatus::InProgress if now >= self.deadline => EffectiveStatus::Expired,
            AttemptStatus::InProgress => EffectiveStatus::InProgress,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    const START: PrimitiveDateTime = datetime!(2025-03-01 09:00:00);

    #[test]
    fn deadline_adds_duration_in_minutes() {
        let window = ExamWindow::new(START, 30);
        assert_eq!(window.deadline(), datetime!(2025-03-01 09:30:00));
    }

    #[test]
    fn state_follows_half_open_interval() {
        let window = ExamWindow::new(START, 30);
        assert_eq!(window.state_at(START - Duration::seconds(1)), WindowState::NotStarted);
        assert_eq!(window.state_at(START), WindowState::Live);
        assert_eq!(window.state_at(START + Duration::minutes(10)), WindowState::Live);
        assert_eq!(window.state_at(START + Duration::minutes(30)), WindowState::Closed);
        assert_eq!(window.state_at(START + Duration::minutes(31)), WindowState::Closed);
    }

    #[test]
    fn remaining_is_measured_to_the_deadline() {
        let window = ExamWindow::new(START, 30);
        assert_eq!(window.remaining_ms(START + Duration::minutes(10)), 20 * 60 * 1000);
        assert_eq!(window.remaining_ms(START + Duration::minutes(45)), 0);
    }

    #[test]
    fn effective_status_derives_expiry() {
        let window = ExamWindow::new(START, 30);
        let late = START + Duration::minutes(30);
        assert_eq!(
            window.effective_status(AttemptStatus::InProgress, START),
            EffectiveStatus::InProgress
        );
        assert_eq!(
            window.effective_status(AttemptStatus::InProgress, late),
            EffectiveStatus::Expired
        );
        assert_eq!(window.effective_status(AttemptStatus::Ended, START), EffectiveStatus::Ended);
    }

    #[test]
    fn oversized_duration_does_not_overflow() {
        let window = ExamWindow::new(datetime!(9999-12-31 23:00:00), i32::MAX);
        assert_eq!(window.deadline(), PrimitiveDateTime::MAX);
    }
}
