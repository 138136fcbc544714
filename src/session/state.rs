// src/session/state.rs
use chrono::{DateTime, Duration, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::answers::{CodingStore, McqStore, SubjectiveStore};
use super::scoring;
use crate::errors::{InterviewError, Result};
use crate::flow::ThankYouView;
use crate::models::{
    Answer, CandidateInfo, CodingQuestion, Direction, Evaluation, InterviewSummary, McqAnswer,
    McqQuestion, Question, QuestionSet, Section, SubjectiveAnswer, SubjectiveQuestion,
    SubmissionRecord, SubmitTrigger,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionStatus {
    NotStarted,
    InProgress,
    Submitted,
}

/// Delivery of the submission record to the sink. Only meaningful once submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "lowercase")]
pub enum Delivery {
    Pending,
    Delivered,
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not running: never started, already submitted, or already at zero.
    Idle,
    Running(u32),
    /// Reached zero on this tick. Reported once per session.
    Expired,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cursors {
    pub coding: usize,
    pub mcq: usize,
    pub subjective: usize,
}

impl Cursors {
    fn get(&self, section: Section) -> usize {
        match section {
            Section::Coding => self.coding,
            Section::Mcq => self.mcq,
            Section::Subjective => self.subjective,
        }
    }

    fn get_mut(&mut self, section: Section) -> &mut usize {
        match section {
            Section::Coding => &mut self.coding,
            Section::Mcq => &mut self.mcq,
            Section::Subjective => &mut self.subjective,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionProgress {
    pub section: Section,
    pub attempted: usize,
    pub total: usize,
}

/// Pre-submit confirmation summary.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSummary {
    pub sections: Vec<SectionProgress>,
    pub attempted: usize,
    pub total: usize,
    pub remaining_secs: u32,
    pub time_remaining: String,
}

/// Read-only view of a session for clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub session_id: String,
    pub status: SessionStatus,
    pub candidate: Option<CandidateInfo>,
    pub active_section: Section,
    pub cursors: Cursors,
    pub question_counts: [usize; 3],
    pub current_question: Option<Question>,
    pub coding_buffer: String,
    pub mcq_answer: Option<McqAnswer>,
    pub subjective_answer: Option<SubjectiveAnswer>,
    pub remaining_secs: u32,
    pub time_remaining: String,
    pub deadline: Option<DateTime<Utc>>,
    pub delivery: Option<Delivery>,
}

/// `RES_<unix-millis>_<9 random alphanumerics>`
pub fn generate_session_id() -> String {
    let random = Uuid::new_v4().simple().to_string();
    format!("RES_{}_{}", Utc::now().timestamp_millis(), &random[..9])
}

/// The timed question-answering state machine for one candidate.
///
/// `NotStarted -> InProgress -> Submitted`. Every mutation is synchronous; the
/// async controller serialises access to it.
#[derive(Debug, Clone)]
pub struct SessionState {
    id: String,
    status: SessionStatus,
    candidate: Option<CandidateInfo>,
    questions: QuestionSet,
    active: Section,
    cursors: Cursors,
    coding: CodingStore,
    mcq: McqStore,
    subjective: SubjectiveStore,
    duration_secs: u32,
    remaining_secs: u32,
    started_at: Option<DateTime<Utc>>,
    deadline: Option<DateTime<Utc>>,
    submission: Option<SubmissionRecord>,
    summary: Option<InterviewSummary>,
    /// Copy of the summary for the thank-you view, read once.
    handoff: Option<InterviewSummary>,
    submitted_at: Option<DateTime<Utc>>,
    delivery: Option<Delivery>,
}

impl SessionState {
    pub fn new(id: impl Into<String>, duration_secs: u32) -> Self {
        Self {
            id: id.into(),
            status: SessionStatus::NotStarted,
            candidate: None,
            questions: QuestionSet::default(),
            active: Section::Coding,
            cursors: Cursors::default(),
            coding: CodingStore::default(),
            mcq: McqStore::default(),
            subjective: SubjectiveStore::default(),
            duration_secs,
            remaining_secs: duration_secs,
            started_at: None,
            deadline: None,
            submission: None,
            summary: None,
            handoff: None,
            submitted_at: None,
            delivery: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn active_section(&self) -> Section {
        self.active
    }

    pub fn candidate(&self) -> Option<&CandidateInfo> {
        self.candidate.as_ref()
    }

    pub fn questions(&self) -> &QuestionSet {
        &self.questions
    }

    pub fn cursor(&self, section: Section) -> usize {
        self.cursors.get(section)
    }

    pub fn coding_buffer(&self) -> &str {
        self.coding.buffer()
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn delivery(&self) -> Option<&Delivery> {
        self.delivery.as_ref()
    }

    pub fn submission(&self) -> Option<&SubmissionRecord> {
        self.submission.as_ref()
    }

    pub fn summary(&self) -> Option<&InterviewSummary> {
        self.summary.as_ref()
    }

    pub fn start(&mut self, candidate: CandidateInfo, questions: QuestionSet, now: DateTime<Utc>) -> Result<()> {
        if self.status != SessionStatus::NotStarted {
            return Err(InterviewError::InvalidState(format!(
                "session {} has already been started",
                self.id
            )));
        }
        let Some(first) = questions.first_section() else {
            return Err(InterviewError::InvalidState(
                "cannot start a session without questions".to_string(),
            ));
        };

        self.active = first;
        self.cursors = Cursors::default();
        self.coding = CodingStore::default();
        self.mcq = McqStore::default();
        self.subjective = SubjectiveStore::default();
        if let Some(question) = questions.coding.first() {
            self.coding.load(question);
        }

        self.remaining_secs = self.duration_secs;
        self.started_at = Some(now);
        self.deadline = Some(now + Duration::seconds(i64::from(self.duration_secs)));

        info!(
            "🎬 Session {} started for {} ({} coding, {} mcq, {} subjective)",
            self.id,
            candidate.name,
            questions.coding.len(),
            questions.mcq.len(),
            questions.subjective.len()
        );

        self.candidate = Some(candidate);
        self.questions = questions;
        self.status = SessionStatus::InProgress;
        Ok(())
    }

    fn ensure_open(&self) -> Result<()> {
        match self.status {
            SessionStatus::NotStarted => Err(InterviewError::InvalidState(
                "session has not been started".to_string(),
            )),
            SessionStatus::InProgress => Ok(()),
            SessionStatus::Submitted => Err(InterviewError::SessionClosed),
        }
    }

    fn current_coding(&self) -> Option<&CodingQuestion> {
        self.questions.coding.get(self.cursors.coding)
    }

    fn current_mcq(&self) -> Result<&McqQuestion> {
        self.questions
            .mcq
            .get(self.cursors.mcq)
            .ok_or(InterviewError::EmptySection(Section::Mcq))
    }

    pub fn current_question(&self, section: Section) -> Option<Question> {
        self.questions.question(section, self.cursors.get(section))
    }

    pub fn subjective_question(&self, question_id: &str) -> Option<&SubjectiveQuestion> {
        self.questions.subjective.iter().find(|q| q.id == question_id)
    }

    /// Persists the coding buffer into the answer store. MCQ and subjective
    /// answers are written in place, so there is nothing else to flush.
    fn flush_coding(&mut self) {
        if let Some(question) = self.questions.coding.get(self.cursors.coding) {
            self.coding.flush(question);
        }
    }

    /// Returns `false` without changing anything when the target section is empty.
    pub fn select_section(&mut self, section: Section) -> Result<bool> {
        self.ensure_open()?;
        if self.questions.count(section) == 0 {
            debug!("Ignoring switch to empty section {}", section);
            return Ok(false);
        }
        if self.active == Section::Coding {
            self.flush_coding();
        }
        self.active = section;
        Ok(true)
    }

    pub fn set_coding_answer(&mut self, text: String) -> Result<()> {
        self.ensure_open()?;
        if self.questions.coding.is_empty() {
            return Err(InterviewError::EmptySection(Section::Coding));
        }
        self.coding.set_buffer(text);
        Ok(())
    }

    fn move_cursor(&mut self, section: Section, direction: Direction) -> usize {
        let last = self.questions.count(section).saturating_sub(1);
        let cursor = self.cursors.get_mut(section);
        *cursor = match direction {
            Direction::Prev => cursor.saturating_sub(1),
            Direction::Next => (*cursor + 1).min(last),
        };
        *cursor
    }

    /// Flushes the buffer, moves the cursor by one (clamped), then loads the
    /// saved answer or the starter code of the new current question.
    pub fn navigate_coding(&mut self, direction: Direction) -> Result<usize> {
        self.ensure_open()?;
        if self.questions.coding.is_empty() {
            return Err(InterviewError::EmptySection(Section::Coding));
        }
        self.flush_coding();
        let index = self.move_cursor(Section::Coding, direction);
        if let Some(question) = self.questions.coding.get(index) {
            self.coding.load(question);
        }
        Ok(index)
    }

    pub fn navigate_mcq(&mut self, direction: Direction) -> Result<usize> {
        self.ensure_open()?;
        if self.questions.mcq.is_empty() {
            return Err(InterviewError::EmptySection(Section::Mcq));
        }
        Ok(self.move_cursor(Section::Mcq, direction))
    }

    pub fn navigate_subjective(&mut self, direction: Direction) -> Result<usize> {
        self.ensure_open()?;
        if self.questions.subjective.is_empty() {
            return Err(InterviewError::EmptySection(Section::Subjective));
        }
        Ok(self.move_cursor(Section::Subjective, direction))
    }

    /// Jumps to `index` within the active section.
    pub fn go_to_question(&mut self, index: usize) -> Result<usize> {
        self.ensure_open()?;
        let section = self.active;
        if index >= self.questions.count(section) {
            return Err(InterviewError::InvalidState(format!(
                "question {} is out of range for section {}",
                index, section
            )));
        }
        if section == Section::Coding {
            self.flush_coding();
            self.cursors.coding = index;
            if let Some(question) = self.questions.coding.get(index) {
                self.coding.load(question);
            }
        } else {
            *self.cursors.get_mut(section) = index;
        }
        Ok(index)
    }

    fn checked_option<'a>(question: &'a McqQuestion, option: &str, multiple: bool) -> Result<&'a McqQuestion> {
        if question.multiple_selection != multiple {
            return Err(InterviewError::SelectionMode {
                question_id: question.id.clone(),
                expected: if question.multiple_selection { "multiple" } else { "single" },
            });
        }
        if !question.has_option(option) {
            return Err(InterviewError::UnknownOption {
                question_id: question.id.clone(),
                option: option.to_string(),
            });
        }
        Ok(question)
    }

    pub fn select_mcq_option(&mut self, option: &str) -> Result<()> {
        self.ensure_open()?;
        let question = Self::checked_option(self.current_mcq()?, option, false)?.clone();
        self.mcq.select(&question, option);
        Ok(())
    }

    pub fn toggle_mcq_option(&mut self, option: &str) -> Result<()> {
        self.ensure_open()?;
        let question = Self::checked_option(self.current_mcq()?, option, true)?.clone();
        self.mcq.toggle(&question, option);
        Ok(())
    }

    /// Removes the current MCQ answer. Returns whether there was one.
    pub fn clear_mcq_answer(&mut self) -> Result<bool> {
        self.ensure_open()?;
        let question_id = self.current_mcq()?.id.clone();
        Ok(self.mcq.clear(&question_id))
    }

    pub fn mcq_answer(&self, question_id: &str) -> Option<&McqAnswer> {
        self.mcq.get(question_id)
    }

    pub fn subjective_answer(&self, question_id: &str) -> Option<&SubjectiveAnswer> {
        self.subjective.get(question_id)
    }

    pub fn record_subjective_answer(
        &mut self,
        question_id: &str,
        text: String,
        evaluation: Option<Evaluation>,
    ) -> Result<()> {
        self.ensure_open()?;
        if self.subjective_question(question_id).is_none() {
            return Err(InterviewError::UnknownQuestion(question_id.to_string()));
        }
        self.subjective.record(question_id, text, evaluation);
        Ok(())
    }

    /// Attaches an evaluation to the answer it was computed for. A stale
    /// evaluation (the text has changed since) is dropped.
    pub fn attach_evaluation(&mut self, question_id: &str, text: &str, evaluation: Evaluation) -> Result<bool> {
        self.ensure_open()?;
        Ok(self.subjective.attach_evaluation(question_id, text, evaluation))
    }

    fn coding_text<'a>(&'a self, index: usize, question: &CodingQuestion) -> Option<&'a str> {
        if index == self.cursors.coding {
            Some(self.coding.buffer())
        } else {
            self.coding.saved(&question.id)
        }
    }

    pub fn attempted_count(&self, section: Section) -> usize {
        match section {
            Section::Coding => self
                .questions
                .coding
                .iter()
                .enumerate()
                .filter(|(i, q)| {
                    self.coding_text(*i, q)
                        .is_some_and(|text| CodingStore::is_attempted(text, q))
                })
                .count(),
            Section::Mcq => self
                .questions
                .mcq
                .iter()
                .filter(|q| self.mcq.get(&q.id).is_some_and(McqAnswer::is_attempted))
                .count(),
            Section::Subjective => self
                .questions
                .subjective
                .iter()
                .filter(|q| self.subjective.get(&q.id).is_some_and(SubjectiveAnswer::is_attempted))
                .count(),
        }
    }

    pub fn progress(&self) -> ProgressSummary {
        let sections: Vec<SectionProgress> = Section::ALL
            .into_iter()
            .map(|section| SectionProgress {
                section,
                attempted: self.attempted_count(section),
                total: self.questions.count(section),
            })
            .collect();

        ProgressSummary {
            attempted: sections.iter().map(|s| s.attempted).sum(),
            total: self.questions.total(),
            sections,
            remaining_secs: self.remaining_secs,
            time_remaining: scoring::format_time(self.remaining_secs),
        }
    }

    /// One second of countdown.
    pub fn tick(&mut self) -> TickOutcome {
        if self.status != SessionStatus::InProgress || self.remaining_secs == 0 {
            return TickOutcome::Idle;
        }
        self.remaining_secs -= 1;
        if self.remaining_secs == 0 {
            TickOutcome::Expired
        } else {
            TickOutcome::Running(self.remaining_secs)
        }
    }

    fn subjective_in_order(&self) -> Vec<&SubjectiveAnswer> {
        self.questions
            .subjective
            .iter()
            .filter_map(|q| self.subjective.get(&q.id))
            .collect()
    }

    fn collect_answers(&self) -> Vec<Answer> {
        let coding = self.questions.coding.iter().filter_map(|q| {
            self.coding
                .saved(&q.id)
                .filter(|code| CodingStore::is_attempted(code, q))
                .map(|code| Answer::Coding {
                    question_id: q.id.clone(),
                    code: code.to_string(),
                })
        });
        let mcq = self.questions.mcq.iter().filter_map(|q| {
            self.mcq
                .get(&q.id)
                .filter(|a| a.is_attempted())
                .map(|a| Answer::Mcq {
                    question_id: q.id.clone(),
                    selected: a.selected(),
                })
        });
        let subjective = self
            .subjective_in_order()
            .into_iter()
            .filter(|a| a.is_attempted())
            .cloned()
            .map(Answer::Subjective);

        coding.chain(mcq).chain(subjective).collect()
    }

    /// Terminal transition. Flushes edits, assembles the record and marks the
    /// session submitted. Fails with `AlreadySubmitted` on every later call.
    pub fn begin_submission(&mut self, trigger: SubmitTrigger) -> Result<SubmissionRecord> {
        match self.status {
            SessionStatus::NotStarted => {
                return Err(InterviewError::InvalidState(
                    "session has not been started".to_string(),
                ));
            }
            SessionStatus::Submitted => return Err(InterviewError::AlreadySubmitted),
            SessionStatus::InProgress => {}
        }
        let Some(candidate) = self.candidate.clone() else {
            return Err(InterviewError::InvalidState(
                "candidate information is missing".to_string(),
            ));
        };

        self.flush_coding();

        let subjective = self.subjective_in_order();
        let subjective_score = scoring::subjective_score(subjective.iter().copied());
        let correct_answers = scoring::correct_answers(subjective.iter().copied());
        // Coding and MCQ are graded upstream from the raw answers.
        let coding_score = None;
        let mcq_score = None;

        let coding_attempted = self.attempted_count(Section::Coding);
        let mcq_attempted = self.attempted_count(Section::Mcq);
        let subjective_attempted = self.attempted_count(Section::Subjective);

        let elapsed = self.duration_secs.saturating_sub(self.remaining_secs);
        let interview_duration = (f64::from(elapsed) / 60.0).round() as u32;
        let experience_level = candidate.experience_level().to_string();

        let record = SubmissionRecord {
            resume_id: self.id.clone(),
            candidate_name: candidate.name.clone(),
            candidate_email: candidate.email.clone(),
            domain: candidate.domain.clone(),
            experience_level: experience_level.clone(),
            total_questions: self.questions.total(),
            coding_questions: self.questions.coding.len(),
            mcq_questions: self.questions.mcq.len(),
            subjective_questions: self.questions.subjective.len(),
            correct_answers,
            score_percentage: scoring::overall_score(&[coding_score, mcq_score, Some(subjective_score)]),
            coding_score,
            mcq_score,
            subjective_score,
            feedback_summary: scoring::feedback_summary(
                coding_attempted > 0,
                mcq_attempted > 0,
                subjective_attempted > 0,
            ),
            interview_duration,
            completed_on_time: self.remaining_secs > 0,
            status: "COMPLETED".to_string(),
            notes: match trigger {
                SubmitTrigger::Timer => Some("Auto-submitted when the time limit was reached".to_string()),
                SubmitTrigger::Manual => None,
            },
            answers: self.collect_answers(),
        };

        self.summary = Some(InterviewSummary {
            candidate_name: candidate.name,
            domain: candidate.domain,
            experience_level,
            coding_questions: coding_attempted,
            mcq_questions: mcq_attempted,
            subjective_questions: subjective_attempted,
            total_questions: record.total_questions,
            interview_duration: format!("{} minutes", interview_duration),
        });
        self.handoff = self.summary.clone();
        self.submitted_at = Some(Utc::now());
        self.status = SessionStatus::Submitted;
        self.delivery = Some(Delivery::Pending);
        self.submission = Some(record.clone());

        info!(
            "📨 Session {} submitted ({}) with subjective score {}",
            self.id, trigger, subjective_score
        );
        Ok(record)
    }

    /// Hands back the stored record for another delivery attempt, only after a failure.
    pub fn begin_resend(&mut self) -> Result<SubmissionRecord> {
        match (&self.delivery, &self.submission) {
            (Some(Delivery::Failed(_)), Some(record)) => {
                let record = record.clone();
                self.delivery = Some(Delivery::Pending);
                Ok(record)
            }
            _ => Err(InterviewError::NothingToResend),
        }
    }

    pub fn submitted_at(&self) -> Option<DateTime<Utc>> {
        self.submitted_at
    }

    /// Hands the summary to the thank-you view. Later calls get the placeholder.
    pub fn take_thank_you(&mut self) -> ThankYouView {
        ThankYouView::take(&mut self.handoff)
    }

    pub fn mark_delivered(&mut self) {
        self.delivery = Some(Delivery::Delivered);
    }

    pub fn mark_failed(&mut self, message: impl Into<String>) {
        self.delivery = Some(Delivery::Failed(message.into()));
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let current_mcq = self.questions.mcq.get(self.cursors.mcq);
        let current_subjective = self.questions.subjective.get(self.cursors.subjective);

        SessionSnapshot {
            session_id: self.id.clone(),
            status: self.status,
            candidate: self.candidate.clone(),
            active_section: self.active,
            cursors: self.cursors,
            question_counts: Section::ALL.map(|s| self.questions.count(s)),
            current_question: self.current_question(self.active),
            coding_buffer: self.coding.buffer().to_string(),
            mcq_answer: current_mcq.and_then(|q| self.mcq.get(&q.id).cloned()),
            subjective_answer: current_subjective.and_then(|q| self.subjective.get(&q.id).cloned()),
            remaining_secs: self.remaining_secs,
            time_remaining: scoring::format_time(self.remaining_secs),
            deadline: self.deadline,
            delivery: self.delivery.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CodingQuestion, McqQuestion, SubjectiveQuestion};

    fn candidate() -> CandidateInfo {
        CandidateInfo {
            name: "Asha Rao".into(),
            email: "asha@example.com".into(),
            domain: "Java Development".into(),
            experience: 2,
        }
    }

    fn coding(id: &str, starter: &str) -> CodingQuestion {
        CodingQuestion {
            id: id.into(),
            title: format!("Problem {id}"),
            prompt: "Solve it".into(),
            starter_code: starter.into(),
            domain: "Java Development".into(),
            difficulty: "EASY".into(),
        }
    }

    fn mcq(id: &str, multiple: bool) -> McqQuestion {
        McqQuestion {
            id: id.into(),
            title: format!("Question {id}"),
            prompt: "Pick".into(),
            options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
            multiple_selection: multiple,
            difficulty: "EASY".into(),
        }
    }

    fn subjective(id: &str) -> SubjectiveQuestion {
        SubjectiveQuestion {
            id: id.into(),
            title: format!("Prompt {id}"),
            prompt: "Explain".into(),
            domain: "Java Development".into(),
            difficulty: "MEDIUM".into(),
        }
    }

    fn question_set() -> QuestionSet {
        QuestionSet {
            coding: vec![coding("c1", "class A {}"), coding("c2", "class B {}")],
            mcq: vec![mcq("m1", false), mcq("m2", true), mcq("m3", false)],
            subjective: vec![subjective("s1"), subjective("s2"), subjective("s3"), subjective("s4")],
        }
    }

    fn started(set: QuestionSet) -> SessionState {
        let mut state = SessionState::new("RES_test", 45 * 60);
        state.start(candidate(), set, Utc::now()).unwrap();
        state
    }

    #[test]
    fn session_ids_have_expected_shape() {
        let id = generate_session_id();
        let parts: Vec<&str> = id.split('_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "RES");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), 9);
    }

    #[test]
    fn start_prefills_starter_code_and_rejects_restart() {
        let mut state = started(question_set());
        assert_eq!(state.status(), SessionStatus::InProgress);
        assert_eq!(state.active_section(), Section::Coding);
        assert_eq!(state.coding_buffer(), "class A {}");
        assert_eq!(state.remaining_secs(), 45 * 60);

        let err = state.start(candidate(), question_set(), Utc::now()).unwrap_err();
        assert!(matches!(err, InterviewError::InvalidState(_)));
    }

    #[test]
    fn start_falls_through_to_first_non_empty_section() {
        let set = QuestionSet {
            coding: vec![],
            mcq: vec![mcq("m1", false)],
            subjective: vec![subjective("s1")],
        };
        let state = started(set);
        assert_eq!(state.active_section(), Section::Mcq);
        assert_eq!(state.coding_buffer(), "");
    }

    #[test]
    fn mutations_before_start_are_rejected() {
        let mut state = SessionState::new("RES_x", 60);
        assert!(matches!(
            state.navigate_mcq(Direction::Next),
            Err(InterviewError::InvalidState(_))
        ));
        assert_eq!(state.tick(), TickOutcome::Idle);
    }

    #[test]
    fn navigation_loads_saved_answer_or_starter_code() {
        let mut state = started(question_set());
        state.set_coding_answer("class A { int x; }".into()).unwrap();

        assert_eq!(state.navigate_coding(Direction::Next).unwrap(), 1);
        assert_eq!(state.coding_buffer(), "class B {}");

        state.set_coding_answer("class B { int y; }".into()).unwrap();
        assert_eq!(state.navigate_coding(Direction::Next).unwrap(), 1);
        assert_eq!(state.coding_buffer(), "class B { int y; }");

        assert_eq!(state.navigate_coding(Direction::Prev).unwrap(), 0);
        assert_eq!(state.coding_buffer(), "class A { int x; }");
        assert_eq!(state.navigate_coding(Direction::Prev).unwrap(), 0);
        assert_eq!(state.coding_buffer(), "class A { int x; }");
    }

    #[test]
    fn switching_sections_flushes_coding_buffer() {
        let mut state = started(question_set());
        state.set_coding_answer("class A { void run() {} }".into()).unwrap();
        assert!(state.select_section(Section::Mcq).unwrap());
        assert_eq!(state.active_section(), Section::Mcq);

        state.select_section(Section::Coding).unwrap();
        state.navigate_coding(Direction::Next).unwrap();
        state.navigate_coding(Direction::Prev).unwrap();
        assert_eq!(state.coding_buffer(), "class A { void run() {} }");
    }

    #[test]
    fn switching_to_empty_section_is_a_no_op() {
        let set = QuestionSet {
            coding: vec![coding("c1", "")],
            mcq: vec![mcq("m1", false)],
            subjective: vec![],
        };
        let mut state = started(set);
        assert!(!state.select_section(Section::Subjective).unwrap());
        assert_eq!(state.active_section(), Section::Coding);
    }

    #[test]
    fn coding_attempts_ignore_reverted_edits() {
        let mut state = started(question_set());
        state.set_coding_answer("class A { changed }".into()).unwrap();
        assert_eq!(state.attempted_count(Section::Coding), 1);

        state.set_coding_answer("  class A {}  \n".into()).unwrap();
        assert_eq!(state.attempted_count(Section::Coding), 0);

        state.navigate_coding(Direction::Next).unwrap();
        assert_eq!(state.attempted_count(Section::Coding), 0);
    }

    #[test]
    fn multi_select_answer_counts_once_and_clears() {
        let mut state = started(question_set());
        state.select_section(Section::Mcq).unwrap();
        state.navigate_mcq(Direction::Next).unwrap();

        state.toggle_mcq_option("A").unwrap();
        state.toggle_mcq_option("C").unwrap();
        assert_eq!(state.attempted_count(Section::Mcq), 1);
        assert_eq!(
            state.mcq_answer("m2").unwrap().selected(),
            vec!["A".to_string(), "C".to_string()]
        );

        assert!(state.clear_mcq_answer().unwrap());
        assert_eq!(state.attempted_count(Section::Mcq), 0);
        assert!(state.mcq_answer("m2").is_none());
    }

    #[test]
    fn single_select_replaces_prior_choice() {
        let mut state = started(question_set());
        state.select_mcq_option("A").unwrap();
        state.select_mcq_option("B").unwrap();
        assert_eq!(state.mcq_answer("m1"), Some(&McqAnswer::Single("B".into())));

        assert!(matches!(
            state.toggle_mcq_option("A"),
            Err(InterviewError::SelectionMode { .. })
        ));
        assert!(matches!(
            state.select_mcq_option("Z"),
            Err(InterviewError::UnknownOption { .. })
        ));
    }

    #[test]
    fn cursors_are_clamped_per_section() {
        let mut state = started(question_set());
        for _ in 0..10 {
            state.navigate_mcq(Direction::Next).unwrap();
        }
        assert_eq!(state.cursor(Section::Mcq), 2);
        assert_eq!(state.navigate_subjective(Direction::Prev).unwrap(), 0);
        assert_eq!(state.cursor(Section::Coding), 0);
    }

    #[test]
    fn go_to_question_respects_section_bounds() {
        let mut state = started(question_set());
        state.set_coding_answer("class A { edited }".into()).unwrap();
        assert_eq!(state.go_to_question(1).unwrap(), 1);
        assert_eq!(state.coding_buffer(), "class B {}");
        assert!(state.go_to_question(2).is_err());

        state.go_to_question(0).unwrap();
        assert_eq!(state.coding_buffer(), "class A { edited }");
    }

    #[test]
    fn subjective_answers_must_target_known_questions() {
        let mut state = started(question_set());
        state.record_subjective_answer("s1", "Because".into(), None).unwrap();
        state.record_subjective_answer("s2", "   ".into(), None).unwrap();
        assert_eq!(state.attempted_count(Section::Subjective), 1);

        assert!(matches!(
            state.record_subjective_answer("nope", "x".into(), None),
            Err(InterviewError::UnknownQuestion(_))
        ));
    }

    #[test]
    fn countdown_expires_exactly_once() {
        let mut state = SessionState::new("RES_t", 3);
        state.start(candidate(), question_set(), Utc::now()).unwrap();
        assert_eq!(state.tick(), TickOutcome::Running(2));
        assert_eq!(state.tick(), TickOutcome::Running(1));
        assert_eq!(state.tick(), TickOutcome::Expired);
        assert_eq!(state.tick(), TickOutcome::Idle);
        assert_eq!(state.remaining_secs(), 0);
    }

    #[test]
    fn submission_is_terminal_and_idempotent() {
        let mut state = started(question_set());
        state.begin_submission(SubmitTrigger::Manual).unwrap();
        assert_eq!(state.status(), SessionStatus::Submitted);
        assert_eq!(state.delivery(), Some(&Delivery::Pending));

        assert!(matches!(
            state.begin_submission(SubmitTrigger::Timer),
            Err(InterviewError::AlreadySubmitted)
        ));
        assert!(matches!(
            state.set_coding_answer("late".into()),
            Err(InterviewError::SessionClosed)
        ));
        assert_eq!(state.tick(), TickOutcome::Idle);
    }

    #[test]
    fn subjective_score_uses_evaluated_answers_only() {
        let mut state = started(question_set());
        let evaluated = |similarity| Evaluation { similarity, correct: similarity >= 0.6, bot_response: None };
        state.record_subjective_answer("s1", "one".into(), Some(evaluated(0.8))).unwrap();
        state.record_subjective_answer("s2", "two".into(), Some(evaluated(0.6))).unwrap();
        state.record_subjective_answer("s3", "three".into(), None).unwrap();

        let record = state.begin_submission(SubmitTrigger::Manual).unwrap();
        assert_eq!(record.subjective_score, 70);
        assert_eq!(record.score_percentage, 70);
        assert_eq!(record.correct_answers, 2);
        assert_eq!(record.coding_score, None);
        assert_eq!(record.total_questions, 9);
    }

    #[test]
    fn submission_without_evaluations_scores_zero() {
        let mut state = started(question_set());
        state.record_subjective_answer("s1", "one".into(), None).unwrap();
        let record = state.begin_submission(SubmitTrigger::Manual).unwrap();
        assert_eq!(record.subjective_score, 0);
        assert_eq!(record.score_percentage, 0);
    }

    #[test]
    fn submission_flushes_coding_buffer_and_builds_summary() {
        let mut state = SessionState::new("RES_s", 45 * 60);
        state.start(candidate(), question_set(), Utc::now()).unwrap();
        for _ in 0..(10 * 60) {
            state.tick();
        }
        state.set_coding_answer("class A { solved }".into()).unwrap();

        let record = state.begin_submission(SubmitTrigger::Timer).unwrap();
        assert_eq!(record.interview_duration, 10);
        assert!(record.completed_on_time);
        assert!(record.notes.is_some());
        assert!(record.answers.contains(&Answer::Coding {
            question_id: "c1".into(),
            code: "class A { solved }".into(),
        }));

        let summary = state.summary().unwrap();
        assert_eq!(summary.coding_questions, 1);
        assert_eq!(summary.experience_level, "Junior");
        assert_eq!(summary.interview_duration, "10 minutes");
    }

    #[test]
    fn resend_only_after_failed_delivery() {
        let mut state = started(question_set());
        state.begin_submission(SubmitTrigger::Manual).unwrap();
        assert!(matches!(state.begin_resend(), Err(InterviewError::NothingToResend)));

        state.mark_failed("connection refused");
        let record = state.begin_resend().unwrap();
        assert_eq!(record.resume_id, "RES_test");
        assert_eq!(state.delivery(), Some(&Delivery::Pending));

        state.mark_delivered();
        assert!(state.begin_resend().is_err());
    }

    #[test]
    fn thank_you_summary_is_handed_over_once() {
        let mut state = started(question_set());
        assert!(!state.take_thank_you().from_session);
        assert!(state.submitted_at().is_none());

        state.begin_submission(SubmitTrigger::Manual).unwrap();
        assert!(state.submitted_at().is_some());

        let view = state.take_thank_you();
        assert!(view.from_session);
        assert_eq!(view.summary.candidate_name, "Asha Rao");
        assert_eq!(view.summary.experience_level, "Junior");

        let again = state.take_thank_you();
        assert!(!again.from_session);
        assert_eq!(again.summary.candidate_name, "Candidate");
        assert!(state.summary().is_some());
    }
}
