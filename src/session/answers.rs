// src/session/answers.rs
use std::collections::{BTreeSet, HashMap};

use crate::models::{CodingQuestion, Evaluation, McqAnswer, McqQuestion, SubjectiveAnswer};

/// Coding answers are edited in a single buffer that belongs to the current
/// question and is flushed into `saved` before focus moves away.
#[derive(Debug, Clone, Default)]
pub struct CodingStore {
    saved: HashMap<String, String>,
    buffer: String,
}

impl CodingStore {
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn set_buffer(&mut self, text: String) {
        self.buffer = text;
    }

    pub fn saved(&self, question_id: &str) -> Option<&str> {
        self.saved.get(question_id).map(String::as_str)
    }

    pub fn flush(&mut self, question: &CodingQuestion) {
        self.saved.insert(question.id.clone(), self.buffer.clone());
    }

    /// Replaces the buffer with the saved answer, or the starter code if none.
    pub fn load(&mut self, question: &CodingQuestion) {
        self.buffer = self
            .saved
            .get(&question.id)
            .cloned()
            .unwrap_or_else(|| question.starter_code.clone());
    }

    /// Attempted iff the text is non-blank and differs from the starter code after trimming.
    pub fn is_attempted(text: &str, question: &CodingQuestion) -> bool {
        let trimmed = text.trim();
        !trimmed.is_empty() && trimmed != question.starter_code.trim()
    }
}

#[derive(Debug, Clone, Default)]
pub struct McqStore {
    answers: HashMap<String, McqAnswer>,
}

impl McqStore {
    pub fn get(&self, question_id: &str) -> Option<&McqAnswer> {
        self.answers.get(question_id)
    }

    /// Replaces any prior selection.
    pub fn select(&mut self, question: &McqQuestion, option: &str) {
        self.answers
            .insert(question.id.clone(), McqAnswer::Single(option.to_string()));
    }

    /// Inserts the option if absent, removes it if present.
    pub fn toggle(&mut self, question: &McqQuestion, option: &str) {
        let entry = self
            .answers
            .entry(question.id.clone())
            .or_insert_with(|| McqAnswer::Multiple(BTreeSet::new()));

        if let McqAnswer::Single(previous) = entry {
            let previous = std::mem::take(previous);
            *entry = McqAnswer::Multiple(
                Some(previous).into_iter().filter(|p| !p.is_empty()).collect(),
            );
        }

        if let McqAnswer::Multiple(selected) = entry {
            if !selected.remove(option) {
                selected.insert(option.to_string());
            }
        }
    }

    /// Removes the answer entirely.
    pub fn clear(&mut self, question_id: &str) -> bool {
        self.answers.remove(question_id).is_some()
    }
}

#[derive(Debug, Clone, Default)]
pub struct SubjectiveStore {
    answers: HashMap<String, SubjectiveAnswer>,
}

impl SubjectiveStore {
    pub fn get(&self, question_id: &str) -> Option<&SubjectiveAnswer> {
        self.answers.get(question_id)
    }

    /// Stores the text. A new text drops any evaluation of the previous one
    /// unless a fresh evaluation comes with it.
    pub fn record(&mut self, question_id: &str, text: String, evaluation: Option<Evaluation>) {
        let answer = self
            .answers
            .entry(question_id.to_string())
            .or_insert_with(|| SubjectiveAnswer {
                question_id: question_id.to_string(),
                text: String::new(),
                evaluation: None,
            });

        if answer.text != text {
            answer.evaluation = None;
        }
        answer.text = text;
        if evaluation.is_some() {
            answer.evaluation = evaluation;
        }
    }

    /// Attaches an evaluation if the stored text still matches the evaluated text.
    pub fn attach_evaluation(&mut self, question_id: &str, text: &str, evaluation: Evaluation) -> bool {
        match self.answers.get_mut(question_id) {
            Some(answer) if answer.text == text => {
                answer.evaluation = Some(evaluation);
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn multi_question() -> McqQuestion {
        McqQuestion {
            id: "mcq-3".into(),
            title: "Web Development".into(),
            prompt: "Which of the following are frontend technologies?".into(),
            options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
            multiple_selection: true,
            difficulty: "MEDIUM".into(),
        }
    }

    #[test]
    fn toggle_twice_restores_previous_selection() {
        let question = multi_question();
        let mut store = McqStore::default();
        store.toggle(&question, "A");
        let before = store.get("mcq-3").cloned();

        store.toggle(&question, "C");
        store.toggle(&question, "C");

        assert_eq!(store.get("mcq-3").cloned(), before);
    }

    #[test]
    fn toggling_off_last_option_leaves_empty_answer() {
        let question = multi_question();
        let mut store = McqStore::default();
        store.toggle(&question, "B");
        store.toggle(&question, "B");

        assert_eq!(store.get("mcq-3"), Some(&McqAnswer::Multiple(BTreeSet::new())));
        assert!(!store.get("mcq-3").is_some_and(McqAnswer::is_attempted));
        assert!(store.clear("mcq-3"));
        assert!(store.get("mcq-3").is_none());
        assert!(!store.clear("mcq-3"));
    }

    #[test]
    fn coding_load_prefers_saved_answer() {
        let question = CodingQuestion {
            id: "coding-1".into(),
            title: "Two Sum".into(),
            prompt: "p".into(),
            starter_code: "fn two_sum() {}".into(),
            domain: "General".into(),
            difficulty: "EASY".into(),
        };
        let mut store = CodingStore::default();
        store.load(&question);
        assert_eq!(store.buffer(), "fn two_sum() {}");

        store.set_buffer("fn two_sum() { todo() }".into());
        store.flush(&question);
        store.set_buffer(String::new());
        store.load(&question);
        assert_eq!(store.buffer(), "fn two_sum() { todo() }");
    }

    #[test]
    fn coding_attempt_ignores_whitespace_around_starter_code() {
        let question = CodingQuestion {
            id: "c".into(),
            title: "t".into(),
            prompt: "p".into(),
            starter_code: "def solve():\n    pass".into(),
            domain: "Python".into(),
            difficulty: "EASY".into(),
        };
        assert!(!CodingStore::is_attempted("  def solve():\n    pass\n\n", &question));
        assert!(!CodingStore::is_attempted("   ", &question));
        assert!(CodingStore::is_attempted("def solve():\n    return 1", &question));
    }

    #[test]
    fn new_subjective_text_drops_stale_evaluation() {
        let mut store = SubjectiveStore::default();
        store.record("s1", "first".into(), None);
        assert!(store.attach_evaluation(
            "s1",
            "first",
            Evaluation { similarity: 0.5, correct: false, bot_response: None }
        ));
        store.record("s1", "second".into(), None);
        assert!(store.get("s1").unwrap().evaluation.is_none());
        assert!(!store.attach_evaluation(
            "s1",
            "first",
            Evaluation { similarity: 0.9, correct: true, bot_response: None }
        ));
    }
}
