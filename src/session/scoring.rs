// src/session/scoring.rs
use crate::models::SubjectiveAnswer;

/// Mean similarity of the evaluated answers as a rounded percentage.
/// Unevaluated answers are left out; with none evaluated the score is 0.
pub fn subjective_score<'a>(answers: impl IntoIterator<Item = &'a SubjectiveAnswer>) -> u32 {
    let similarities: Vec<f64> = answers
        .into_iter()
        .filter_map(|a| a.evaluation.as_ref().map(|e| e.similarity))
        .collect();

    if similarities.is_empty() {
        return 0;
    }

    let mean = similarities.iter().sum::<f64>() / similarities.len() as f64;
    (mean * 100.0).round() as u32
}

/// Number of subjective answers the evaluator judged correct.
pub fn correct_answers<'a>(answers: impl IntoIterator<Item = &'a SubjectiveAnswer>) -> usize {
    answers
        .into_iter()
        .filter(|a| a.evaluation.as_ref().is_some_and(|e| e.correct))
        .count()
}

/// Mean of the section scores that are present and non-zero.
pub fn overall_score(scores: &[Option<u32>]) -> u32 {
    let present: Vec<u32> = scores.iter().flatten().copied().filter(|s| *s > 0).collect();
    if present.is_empty() {
        return 0;
    }
    (present.iter().sum::<u32>() as f64 / present.len() as f64).round() as u32
}

pub fn feedback_summary(coding_answered: bool, mcq_answered: bool, subjective_answered: bool) -> String {
    let mut sections = Vec::new();
    if coding_answered {
        sections.push("Coding: Demonstrated problem-solving abilities");
    }
    if mcq_answered {
        sections.push("MCQ: Good technical knowledge");
    }
    if subjective_answered {
        sections.push("Subjective: Clear communication and understanding");
    }
    if sections.is_empty() {
        return "No answers were recorded.".to_string();
    }
    format!("{}.", sections.join(". "))
}

/// Formats seconds as `MM:SS`.
pub fn format_time(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Evaluation;

    fn answer(id: &str, similarity: Option<f64>, correct: bool) -> SubjectiveAnswer {
        SubjectiveAnswer {
            question_id: id.to_string(),
            text: "some answer".to_string(),
            evaluation: similarity.map(|similarity| Evaluation {
                similarity,
                correct,
                bot_response: None,
            }),
        }
    }

    #[test]
    fn subjective_score_is_zero_without_evaluations() {
        let answers = vec![answer("s1", None, false), answer("s2", None, false)];
        assert_eq!(subjective_score(&answers), 0);
        assert_eq!(subjective_score(std::iter::empty()), 0);
    }

    #[test]
    fn subjective_score_averages_only_evaluated_answers() {
        let answers = vec![
            answer("s1", Some(0.8), true),
            answer("s2", Some(0.6), true),
            answer("s3", None, false),
            answer("s4", None, false),
        ];
        assert_eq!(subjective_score(&answers), 70);
        assert_eq!(correct_answers(&answers), 2);
    }

    #[test]
    fn overall_score_skips_missing_and_zero_sections() {
        assert_eq!(overall_score(&[None, None, Some(70)]), 70);
        assert_eq!(overall_score(&[Some(80), Some(0), Some(61)]), 71);
        assert_eq!(overall_score(&[None, Some(0)]), 0);
    }

    #[test]
    fn feedback_summary_lists_answered_sections() {
        assert_eq!(
            feedback_summary(true, false, true),
            "Coding: Demonstrated problem-solving abilities. Subjective: Clear communication and understanding."
        );
        assert_eq!(feedback_summary(false, false, false), "No answers were recorded.");
    }

    #[test]
    fn formats_remaining_time() {
        assert_eq!(format_time(45 * 60), "45:00");
        assert_eq!(format_time(61), "01:01");
        assert_eq!(format_time(0), "00:00");
    }
}
