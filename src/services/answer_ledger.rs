use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Answers of one attempt keyed by question id.
///
/// Each question holds at most one value and a new submission replaces the previous one;
/// no history is kept. Stored as a JSON object inside the attempt row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub(crate) struct AnswerLedger(BTreeMap<String, String>);

impl AnswerLedger {
    /// Inserts or replaces the answer for `question_id`, returning the replaced value.
    /// Postgres performs the same merge in SQL; the in-memory store uses this one.
    #[cfg(test)]
    pub(crate) fn upsert(
        &mut self,
        question_id: impl Into<String>,
        value: impl Into<String>,
    ) -> Option<String> {
        self.0.insert(question_id.into(), value.into())
    }

    pub(crate) fn get(&self, question_id: &str) -> Option<&str> {
        self.0.get(question_id).map(String::as_str)
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.0.len()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(question, answer)| (question.as_str(), answer.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for AnswerLedger {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(key, value)| (key.into(), value.into())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_replaces_previous_value() {
        let mut ledger = AnswerLedger::default();
        assert_eq!(ledger.upsert("q1", "A"), None);
        assert_eq!(ledger.upsert("q1", "B"), Some("A".to_string()));
        assert_eq!(ledger.get("q1"), Some("B"));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn distinct_questions_do_not_interfere() {
        let mut ledger = AnswerLedger::default();
        ledger.upsert("q1", "A");
        ledger.upsert("q2", "B");
        let collected: Vec<_> = ledger.iter().collect();
        assert_eq!(collected, vec![("q1", "A"), ("q2", "B")]);
    }

    #[test]
    fn serializes_as_plain_object() {
        let ledger: AnswerLedger = [("q2", "true"), ("q1", "A")].into_iter().collect();
        let json = serde_json::to_value(&ledger).expect("serialize");
        assert_eq!(json, serde_json::json!({"q1": "A", "q2": "true"}));

        let back: AnswerLedger = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, ledger);
    }
}
