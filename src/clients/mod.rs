// src/clients/mod.rs

use async_trait::async_trait;

use crate::errors::Result;
use crate::models::{EvaluationRequest, EvaluationResponse, QuestionSet, SubmissionAck, SubmissionRecord};

pub mod backend;
pub mod fallback;
pub mod persisting;

/// Source of interview questions.
#[async_trait]
pub trait QuestionProvider: Send + Sync {
    /// Domains a candidate may choose on the landing form.
    async fn available_domains(&self) -> Result<Vec<String>>;

    /// Coding and MCQ questions for a domain and experience. Subjective
    /// questions may be absent; the controller tops them up.
    async fn fetch_question_set(&self, domain: &str, experience_years: u32) -> Result<QuestionSet>;
}

/// Scores one subjective answer against the expected answer it keeps to itself.
#[async_trait]
pub trait SubjectiveEvaluator: Send + Sync {
    async fn evaluate(&self, request: &EvaluationRequest) -> Result<EvaluationResponse>;
}

/// Grading and persistence of a finished interview. Called once per
/// submission, plus once per explicit resend after a failure.
#[async_trait]
pub trait SubmissionSink: Send + Sync {
    async fn submit_interview(&self, record: &SubmissionRecord) -> Result<SubmissionAck>;
}
