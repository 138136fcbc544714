// src/models.rs
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Candidate identity captured by the landing form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateInfo {
    pub name: String,
    pub email: String,
    pub domain: String,
    /// Years of experience.
    pub experience: u32,
}

impl CandidateInfo {
    pub fn experience_level(&self) -> ExperienceLevel {
        ExperienceLevel::from_years(self.experience)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExperienceLevel {
    Fresher,
    Junior,
    MidLevel,
    Senior,
}

impl ExperienceLevel {
    pub const ALL: [ExperienceLevel; 4] = [
        ExperienceLevel::Fresher,
        ExperienceLevel::Junior,
        ExperienceLevel::MidLevel,
        ExperienceLevel::Senior,
    ];

    pub fn from_years(years: u32) -> Self {
        match years {
            0..=1 => ExperienceLevel::Fresher,
            2..=3 => ExperienceLevel::Junior,
            4..=6 => ExperienceLevel::MidLevel,
            _ => ExperienceLevel::Senior,
        }
    }

    /// Longer label used on the landing page, e.g. `Junior (1-3 years)`.
    pub fn description(&self) -> &'static str {
        match self {
            ExperienceLevel::Fresher => "Fresher (0-1 years)",
            ExperienceLevel::Junior => "Junior (1-3 years)",
            ExperienceLevel::MidLevel => "Mid-level (3-6 years)",
            ExperienceLevel::Senior => "Senior (6+ years)",
        }
    }
}

impl fmt::Display for ExperienceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExperienceLevel::Fresher => write!(f, "Fresher"),
            ExperienceLevel::Junior => write!(f, "Junior"),
            ExperienceLevel::MidLevel => write!(f, "Mid-level"),
            ExperienceLevel::Senior => write!(f, "Senior"),
        }
    }
}

/// One of the three question categories of an interview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Coding,
    Mcq,
    #[serde(alias = "qa")]
    Subjective,
}

impl Section {
    pub const ALL: [Section; 3] = [Section::Coding, Section::Mcq, Section::Subjective];
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Section::Coding => write!(f, "coding"),
            Section::Mcq => write!(f, "mcq"),
            Section::Subjective => write!(f, "subjective"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Prev,
    Next,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodingQuestion {
    pub id: String,
    pub title: String,
    pub prompt: String,
    #[serde(default)]
    pub starter_code: String,
    pub domain: String,
    pub difficulty: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McqQuestion {
    pub id: String,
    pub title: String,
    pub prompt: String,
    pub options: Vec<String>,
    #[serde(default)]
    pub multiple_selection: bool,
    pub difficulty: String,
}

impl McqQuestion {
    pub fn has_option(&self, option: &str) -> bool {
        self.options.iter().any(|o| o == option)
    }
}

/// The expected answer never reaches this side; evaluation happens upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectiveQuestion {
    pub id: String,
    pub title: String,
    pub prompt: String,
    pub domain: String,
    pub difficulty: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Question {
    Coding(CodingQuestion),
    Mcq(McqQuestion),
    Subjective(SubjectiveQuestion),
}

/// Questions for one session, grouped by section in display order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionSet {
    #[serde(default)]
    pub coding: Vec<CodingQuestion>,
    #[serde(default)]
    pub mcq: Vec<McqQuestion>,
    #[serde(default)]
    pub subjective: Vec<SubjectiveQuestion>,
}

impl QuestionSet {
    pub fn count(&self, section: Section) -> usize {
        match section {
            Section::Coding => self.coding.len(),
            Section::Mcq => self.mcq.len(),
            Section::Subjective => self.subjective.len(),
        }
    }

    pub fn total(&self) -> usize {
        self.coding.len() + self.mcq.len() + self.subjective.len()
    }

    /// First non-empty section in coding, mcq, subjective priority.
    pub fn first_section(&self) -> Option<Section> {
        Section::ALL.into_iter().find(|s| self.count(*s) > 0)
    }

    pub fn question(&self, section: Section, index: usize) -> Option<Question> {
        match section {
            Section::Coding => self.coding.get(index).cloned().map(Question::Coding),
            Section::Mcq => self.mcq.get(index).cloned().map(Question::Mcq),
            Section::Subjective => self.subjective.get(index).cloned().map(Question::Subjective),
        }
    }
}

/// Answer to an MCQ question. A cleared question has no entry at all, which
/// is distinct from `Multiple` with an empty set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum McqAnswer {
    Single(String),
    Multiple(BTreeSet<String>),
}

impl McqAnswer {
    pub fn is_attempted(&self) -> bool {
        match self {
            McqAnswer::Single(option) => !option.trim().is_empty(),
            McqAnswer::Multiple(options) => !options.is_empty(),
        }
    }

    pub fn selected(&self) -> Vec<String> {
        match self {
            McqAnswer::Single(option) => vec![option.clone()],
            McqAnswer::Multiple(options) => options.iter().cloned().collect(),
        }
    }
}

/// Result of the upstream evaluator for one subjective answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    /// Similarity to the expected answer, in `[0, 1]`.
    pub similarity: f64,
    pub correct: bool,
    #[serde(default)]
    pub bot_response: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectiveAnswer {
    pub question_id: String,
    pub text: String,
    #[serde(default)]
    pub evaluation: Option<Evaluation>,
}

impl SubjectiveAnswer {
    pub fn is_attempted(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

/// A stored answer, tagged by section, as it appears in the submission payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "section", rename_all = "lowercase")]
pub enum Answer {
    Coding { question_id: String, code: String },
    Mcq { question_id: String, selected: Vec<String> },
    Subjective(SubjectiveAnswer),
}

/// Request sent to the subjective evaluator for one typed answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationRequest {
    pub question_text: String,
    pub user_answer: String,
    pub session_id: String,
    pub domain: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResponse {
    pub bot_response: String,
    #[serde(default)]
    pub similarity: Option<f64>,
    #[serde(default)]
    pub correct: Option<bool>,
}

impl EvaluationResponse {
    /// Only a response carrying a similarity counts as an evaluation.
    pub fn into_evaluation(self) -> Option<Evaluation> {
        let similarity = self.similarity?;
        Some(Evaluation {
            similarity: similarity.clamp(0.0, 1.0),
            correct: self.correct.unwrap_or(false),
            bot_response: Some(self.bot_response),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmitTrigger {
    Manual,
    Timer,
}

impl fmt::Display for SubmitTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitTrigger::Manual => write!(f, "manual"),
            SubmitTrigger::Timer => write!(f, "timer"),
        }
    }
}

/// Final payload handed to the submission sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRecord {
    pub resume_id: String,
    pub candidate_name: String,
    pub candidate_email: String,
    pub domain: String,
    pub experience_level: String,
    pub total_questions: usize,
    pub coding_questions: usize,
    pub mcq_questions: usize,
    pub subjective_questions: usize,
    pub correct_answers: usize,
    pub score_percentage: u32,
    /// `None` means the section is graded upstream.
    pub coding_score: Option<u32>,
    pub mcq_score: Option<u32>,
    pub subjective_score: u32,
    pub feedback_summary: String,
    /// Minutes spent, rounded.
    pub interview_duration: u32,
    pub completed_on_time: bool,
    pub status: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub answers: Vec<Answer>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionAck {
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

/// What the thank-you view shows once the interview is over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewSummary {
    pub candidate_name: String,
    pub domain: String,
    pub experience_level: String,
    pub coding_questions: usize,
    pub mcq_questions: usize,
    pub subjective_questions: usize,
    pub total_questions: usize,
    pub interview_duration: String,
}

impl Default for InterviewSummary {
    fn default() -> Self {
        Self {
            candidate_name: "Candidate".to_string(),
            domain: "Unknown".to_string(),
            experience_level: "Unknown".to_string(),
            coding_questions: 0,
            mcq_questions: 0,
            subjective_questions: 0,
            total_questions: 0,
            interview_duration: "0 minutes".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn experience_levels_follow_year_bands() {
        assert_eq!(ExperienceLevel::from_years(0), ExperienceLevel::Fresher);
        assert_eq!(ExperienceLevel::from_years(1), ExperienceLevel::Fresher);
        assert_eq!(ExperienceLevel::from_years(3), ExperienceLevel::Junior);
        assert_eq!(ExperienceLevel::from_years(6).to_string(), "Mid-level");
        assert_eq!(ExperienceLevel::from_years(7), ExperienceLevel::Senior);
    }

    #[test]
    fn section_accepts_qa_alias() {
        let section: Section = serde_json::from_str("\"qa\"").unwrap();
        assert_eq!(section, Section::Subjective);
        assert_eq!(serde_json::to_string(&Section::Mcq).unwrap(), "\"mcq\"");
    }

    #[test]
    fn first_section_falls_through_empty_sections() {
        let set = QuestionSet {
            subjective: vec![SubjectiveQuestion {
                id: "s1".into(),
                title: "t".into(),
                prompt: "p".into(),
                domain: "d".into(),
                difficulty: "EASY".into(),
            }],
            ..Default::default()
        };
        assert_eq!(set.first_section(), Some(Section::Subjective));
        assert_eq!(QuestionSet::default().first_section(), None);
    }

    #[test]
    fn evaluation_requires_similarity() {
        let unevaluated = EvaluationResponse {
            bot_response: "Error processing your response.".into(),
            similarity: None,
            correct: None,
        };
        assert!(unevaluated.into_evaluation().is_none());

        let evaluated = EvaluationResponse {
            bot_response: "ok".into(),
            similarity: Some(1.4),
            correct: Some(true),
        };
        let evaluation = evaluated.into_evaluation().unwrap();
        assert_eq!(evaluation.similarity, 1.0);
        assert!(evaluation.correct);
    }
}
