// src/session/controller.rs
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::Serialize;
use std::ops::ControlFlow;
use std::sync::{Arc, PoisonError};
use tokio::sync::{Mutex, broadcast};

use super::state::{Delivery, ProgressSummary, SessionSnapshot, SessionState, SessionStatus, TickOutcome, generate_session_id};
use super::timer::Countdown;
use crate::clients::fallback::FallbackQuestions;
use crate::clients::{QuestionProvider, SubjectiveEvaluator, SubmissionSink};
use crate::config::SessionSettings;
use crate::errors::{InterviewError, Result};
use crate::flow::{StartContext, ThankYouView};
use crate::models::{
    CandidateInfo, Direction, EvaluationRequest, InterviewSummary, QuestionSet, Section, SubjectiveAnswer,
    SubmissionAck, SubmissionRecord, SubmitTrigger,
};

/// External systems a session talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub questions: Arc<dyn QuestionProvider>,
    pub evaluator: Arc<dyn SubjectiveEvaluator>,
    pub sink: Arc<dyn SubmissionSink>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum SessionEvent {
    Started { session_id: String, remaining_secs: u32 },
    Tick { session_id: String, remaining_secs: u32 },
    SectionChanged { session_id: String, section: Section },
    Submitted { session_id: String, trigger: SubmitTrigger },
    Delivered { session_id: String },
    DeliveryFailed { session_id: String, message: String },
}

impl SessionEvent {
    pub fn session_id(&self) -> &str {
        match self {
            SessionEvent::Started { session_id, .. }
            | SessionEvent::Tick { session_id, .. }
            | SessionEvent::SectionChanged { session_id, .. }
            | SessionEvent::Submitted { session_id, .. }
            | SessionEvent::Delivered { session_id }
            | SessionEvent::DeliveryFailed { session_id, .. } => session_id,
        }
    }
}

/// Result of a delivered submission, handed on to the thank-you view.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionOutcome {
    pub record: SubmissionRecord,
    pub summary: InterviewSummary,
    pub ack: SubmissionAck,
}

struct Inner {
    id: String,
    state: Mutex<SessionState>,
    collaborators: Collaborators,
    settings: SessionSettings,
    countdown: std::sync::Mutex<Option<Countdown>>,
    events: broadcast::Sender<SessionEvent>,
}

/// Drives one interview session: serialises every operation on the state
/// machine, owns the countdown, and talks to the collaborators.
///
/// Cloning is cheap and every clone controls the same session.
#[derive(Clone)]
pub struct SessionController {
    inner: Arc<Inner>,
}

impl SessionController {
    pub fn new(collaborators: Collaborators, settings: SessionSettings) -> Self {
        Self::with_id(generate_session_id(), collaborators, settings)
    }

    pub fn with_id(id: impl Into<String>, collaborators: Collaborators, settings: SessionSettings) -> Self {
        let id = id.into();
        let (events, _) = broadcast::channel(256);
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(SessionState::new(id.clone(), settings.duration_secs())),
                id,
                collaborators,
                settings,
                countdown: std::sync::Mutex::new(None),
                events,
            }),
        }
    }

    pub fn id(&self) -> &str {
        &self.inner.id
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine.
        let _ = self.inner.events.send(event);
    }

    async fn with_state<T>(&self, f: impl FnOnce(&mut SessionState) -> T) -> T {
        let mut state = self.inner.state.lock().await;
        f(&mut state)
    }

    pub async fn status(&self) -> SessionStatus {
        self.with_state(|s| s.status()).await
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.with_state(|s| s.snapshot()).await
    }

    /// Fetches questions for the candidate (falling back to the built-in set)
    /// and starts the session and its countdown.
    pub async fn start(&self, context: StartContext) -> Result<SessionSnapshot> {
        if self.status().await != SessionStatus::NotStarted {
            return Err(InterviewError::InvalidState(format!(
                "session {} has already been started",
                self.id()
            )));
        }
        let candidate = context.into_candidate();
        let questions = self.load_questions(&candidate).await;
        self.start_with_questions(candidate, questions).await
    }

    pub async fn start_with_questions(&self, candidate: CandidateInfo, questions: QuestionSet) -> Result<SessionSnapshot> {
        let snapshot = self
            .with_state(|s| {
                s.start(candidate, questions, Utc::now())?;
                Ok::<_, InterviewError>(s.snapshot())
            })
            .await?;

        self.spawn_countdown();
        self.emit(SessionEvent::Started {
            session_id: self.id().to_string(),
            remaining_secs: snapshot.remaining_secs,
        });
        Ok(snapshot)
    }

    async fn load_questions(&self, candidate: &CandidateInfo) -> QuestionSet {
        let fetched = self
            .inner
            .collaborators
            .questions
            .fetch_question_set(&candidate.domain, candidate.experience)
            .await;

        let mut set = match fetched {
            Ok(set) if !set.coding.is_empty() || !set.mcq.is_empty() => set,
            Ok(_) => {
                warn!("⚠️  Question bank returned an empty set for {}; using built-in questions", candidate.domain);
                FallbackQuestions::question_set(&candidate.domain)
            }
            Err(e) => {
                warn!("⚠️  Could not load questions for {}: {}; using built-in questions", candidate.domain, e);
                FallbackQuestions::question_set(&candidate.domain)
            }
        };

        let target = self.inner.settings.subjective_question_target;
        if set.subjective.len() < target {
            let missing = target - set.subjective.len();
            let extra: Vec<_> = FallbackQuestions::subjective_questions(&candidate.domain)
                .into_iter()
                .filter(|q| !set.subjective.iter().any(|existing| existing.id == q.id))
                .take(missing)
                .collect();
            set.subjective.extend(extra);
        }

        set
    }

    fn spawn_countdown(&self) {
        let weak = Arc::downgrade(&self.inner);
        let countdown = Countdown::spawn(self.inner.settings.tick_period(), move || {
            let weak = weak.clone();
            async move {
                match weak.upgrade() {
                    Some(inner) => SessionController { inner }.on_tick().await,
                    None => ControlFlow::Break(()),
                }
            }
        });

        let mut slot = self.inner.countdown.lock().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(countdown);
    }

    fn stop_countdown(&self) {
        let countdown = self
            .inner
            .countdown
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(mut countdown) = countdown {
            countdown.stop();
        }
    }

    async fn on_tick(&self) -> ControlFlow<()> {
        let outcome = self.with_state(|s| s.tick()).await;
        match outcome {
            TickOutcome::Idle => ControlFlow::Break(()),
            TickOutcome::Running(remaining_secs) => {
                self.emit(SessionEvent::Tick {
                    session_id: self.id().to_string(),
                    remaining_secs,
                });
                ControlFlow::Continue(())
            }
            TickOutcome::Expired => {
                self.emit(SessionEvent::Tick {
                    session_id: self.id().to_string(),
                    remaining_secs: 0,
                });
                info!("⏰ Time is up for session {}", self.id());
                match self.submit_with(SubmitTrigger::Timer).await {
                    Ok(_) => {}
                    Err(InterviewError::AlreadySubmitted) => debug!("Session {} was already submitted", self.id()),
                    Err(e) => warn!("⚠️  Automatic submission of {} failed: {}", self.id(), e),
                }
                ControlFlow::Break(())
            }
        }
    }

    /// Stops the countdown. Used when the session view goes away.
    pub fn dispose(&self) {
        self.stop_countdown();
        debug!("Session {} disposed", self.id());
    }

    pub async fn select_section(&self, section: Section) -> Result<bool> {
        let changed = self.with_state(|s| s.select_section(section)).await?;
        if changed {
            self.emit(SessionEvent::SectionChanged {
                session_id: self.id().to_string(),
                section,
            });
        }
        Ok(changed)
    }

    pub async fn set_coding_answer(&self, text: String) -> Result<()> {
        self.with_state(|s| s.set_coding_answer(text)).await
    }

    /// Returns the new cursor and the buffer loaded for it.
    pub async fn navigate_coding(&self, direction: Direction) -> Result<(usize, String)> {
        self.with_state(|s| {
            let index = s.navigate_coding(direction)?;
            Ok((index, s.coding_buffer().to_string()))
        })
        .await
    }

    pub async fn select_mcq_option(&self, option: &str) -> Result<()> {
        self.with_state(|s| s.select_mcq_option(option)).await
    }

    pub async fn toggle_mcq_option(&self, option: &str) -> Result<()> {
        self.with_state(|s| s.toggle_mcq_option(option)).await
    }

    pub async fn clear_mcq_answer(&self) -> Result<bool> {
        self.with_state(|s| s.clear_mcq_answer()).await
    }

    pub async fn navigate_mcq(&self, direction: Direction) -> Result<usize> {
        self.with_state(|s| s.navigate_mcq(direction)).await
    }

    pub async fn navigate_subjective(&self, direction: Direction) -> Result<usize> {
        self.with_state(|s| s.navigate_subjective(direction)).await
    }

    pub async fn go_to_question(&self, index: usize) -> Result<usize> {
        self.with_state(|s| s.go_to_question(index)).await
    }

    /// Stores an answer with whatever evaluation is already known for it.
    pub async fn record_subjective_answer(
        &self,
        question_id: &str,
        text: String,
        evaluation: Option<crate::models::Evaluation>,
    ) -> Result<()> {
        self.with_state(|s| s.record_subjective_answer(question_id, text, evaluation))
            .await
    }

    /// Stores the answer, then asks the evaluator about it. An evaluator
    /// failure leaves the answer stored but unevaluated.
    pub async fn answer_subjective(&self, question_id: &str, text: String) -> Result<SubjectiveAnswer> {
        let request = self
            .with_state(|s| {
                s.record_subjective_answer(question_id, text.clone(), None)?;
                let question = s
                    .subjective_question(question_id)
                    .ok_or_else(|| InterviewError::UnknownQuestion(question_id.to_string()))?;
                Ok::<_, InterviewError>(EvaluationRequest {
                    question_text: question.prompt.clone(),
                    user_answer: text.clone(),
                    session_id: s.id().to_string(),
                    domain: s.candidate().map(|c| c.domain.clone()).unwrap_or_default(),
                })
            })
            .await?;

        if text.trim().is_empty() {
            return self.stored_subjective(question_id).await;
        }

        let response = self
            .inner
            .collaborators
            .evaluator
            .evaluate(&request)
            .await
            .map_err(|e| {
                warn!("⚠️  Evaluation for {} in {} failed: {}", question_id, self.id(), e);
                InterviewError::Evaluation { source: Box::new(e) }
            })?;

        match response.into_evaluation() {
            Some(evaluation) => {
                let attached = self
                    .with_state(|s| s.attach_evaluation(question_id, &text, evaluation))
                    .await;
                match attached {
                    Ok(true) => {}
                    Ok(false) => debug!("Dropping stale evaluation for {}", question_id),
                    Err(e) => debug!("Evaluation for {} arrived too late: {}", question_id, e),
                }
            }
            None => warn!("⚠️  Evaluator returned no similarity for {}", question_id),
        }

        self.stored_subjective(question_id).await
    }

    async fn stored_subjective(&self, question_id: &str) -> Result<SubjectiveAnswer> {
        self.with_state(|s| s.subjective_answer(question_id).cloned())
            .await
            .ok_or_else(|| InterviewError::UnknownQuestion(question_id.to_string()))
    }

    pub async fn attempted_count(&self, section: Section) -> usize {
        self.with_state(|s| s.attempted_count(section)).await
    }

    pub async fn progress(&self) -> ProgressSummary {
        self.with_state(|s| s.progress()).await
    }

    /// The thank-you view for this session. Only the first call after a
    /// submission carries the real summary.
    pub async fn thank_you(&self) -> ThankYouView {
        self.with_state(|s| s.take_thank_you()).await
    }

    /// When the session went terminal, if it has.
    pub async fn submitted_at(&self) -> Option<DateTime<Utc>> {
        self.with_state(|s| s.submitted_at()).await
    }

    /// True while a delivery attempt is in flight.
    pub async fn is_delivering(&self) -> bool {
        self.with_state(|s| matches!(s.delivery(), Some(Delivery::Pending))).await
    }

    pub async fn submit(&self) -> Result<SubmissionOutcome> {
        self.submit_with(SubmitTrigger::Manual).await
    }

    /// Terminal transition first, then delivery. The session stays submitted
    /// when delivery fails; `resend` retries it.
    async fn submit_with(&self, trigger: SubmitTrigger) -> Result<SubmissionOutcome> {
        let record = self.with_state(|s| s.begin_submission(trigger)).await?;
        self.stop_countdown();
        self.emit(SessionEvent::Submitted {
            session_id: self.id().to_string(),
            trigger,
        });
        self.deliver(record).await
    }

    pub async fn resend(&self) -> Result<SubmissionOutcome> {
        let record = self.with_state(|s| s.begin_resend()).await?;
        info!("🔁 Resending submission for {}", self.id());
        self.deliver(record).await
    }

    async fn deliver(&self, record: SubmissionRecord) -> Result<SubmissionOutcome> {
        let outcome = self.inner.collaborators.sink.submit_interview(&record).await;

        let mut state = self.inner.state.lock().await;
        let failure = match outcome {
            Ok(ack) if ack.success => {
                state.mark_delivered();
                let summary = state.summary().cloned().unwrap_or_default();
                drop(state);

                info!("✅ Submission for {} delivered", self.id());
                self.emit(SessionEvent::Delivered {
                    session_id: self.id().to_string(),
                });
                return Ok(SubmissionOutcome { record, summary, ack });
            }
            Ok(ack) => {
                let message = if ack.message.is_empty() {
                    "Submission failed".to_string()
                } else {
                    ack.message
                };
                InterviewError::SubmissionRejected(message)
            }
            Err(e) => InterviewError::Submission { source: Box::new(e) },
        };

        state.mark_failed(failure.to_string());
        drop(state);

        warn!("❌ Submission for {} not delivered: {}", self.id(), failure);
        self.emit(SessionEvent::DeliveryFailed {
            session_id: self.id().to_string(),
            message: failure.to_string(),
        });
        Err(failure)
    }
}

impl std::fmt::Debug for SessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController").field("id", &self.inner.id).finish()
    }
}
