// src/clients/persisting.rs

use async_trait::async_trait;
use log::{error, info};
use sqlx::SqlitePool;
use std::sync::Arc;

use crate::clients::SubmissionSink;
use crate::database;
use crate::errors::Result;
use crate::models::{SubmissionAck, SubmissionRecord};

/// Forwards to an inner sink and records every attempt locally, delivered or not.
pub struct PersistingSink<S> {
    inner: S,
    pool: Option<Arc<SqlitePool>>,
}

impl<S> PersistingSink<S> {
    pub fn new(inner: S, pool: Option<Arc<SqlitePool>>) -> Self {
        Self { inner, pool }
    }
}

#[async_trait]
impl<S: SubmissionSink> SubmissionSink for PersistingSink<S> {
    async fn submit_interview(&self, record: &SubmissionRecord) -> Result<SubmissionAck> {
        let outcome = self.inner.submit_interview(record).await;

        let Some(pool) = self.pool.as_ref() else {
            return outcome;
        };

        let (delivered, message) = match &outcome {
            Ok(ack) if ack.success => (true, None),
            Ok(ack) => (false, Some(ack.message.clone())),
            Err(e) => (false, Some(e.to_string())),
        };

        match database::save_submission(pool, record, delivered, message.as_deref()).await {
            Ok(()) => info!("💾 Recorded submission attempt for {}", record.resume_id),
            Err(e) => error!("Failed to record submission {}: {}", record.resume_id, e),
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::InterviewError;

    struct Refusing;

    #[async_trait]
    impl SubmissionSink for Refusing {
        async fn submit_interview(&self, _record: &SubmissionRecord) -> Result<SubmissionAck> {
            Err(InterviewError::ApiError {
                status: 503,
                body: "unavailable".to_string(),
            })
        }
    }

    fn record() -> SubmissionRecord {
        SubmissionRecord {
            resume_id: "RES_9".to_string(),
            candidate_name: "Lee".to_string(),
            candidate_email: "lee@example.com".to_string(),
            domain: "Python Development".to_string(),
            experience_level: "Fresher".to_string(),
            total_questions: 0,
            coding_questions: 0,
            mcq_questions: 0,
            subjective_questions: 0,
            correct_answers: 0,
            score_percentage: 0,
            coding_score: None,
            mcq_score: None,
            subjective_score: 0,
            feedback_summary: String::new(),
            interview_duration: 0,
            completed_on_time: true,
            status: "COMPLETED".to_string(),
            notes: None,
            answers: vec![],
        }
    }

    #[tokio::test]
    async fn failed_attempts_are_recorded_and_returned() {
        let pool = Arc::new(database::init_memory_db().await.unwrap());
        let sink = PersistingSink::new(Refusing, Some(pool.clone()));

        let outcome = sink.submit_interview(&record()).await;
        assert!(matches!(outcome, Err(InterviewError::ApiError { status: 503, .. })));

        let history = database::get_all_submissions(&pool).await.unwrap();
        assert_eq!(history.len(), 1);
        assert!(!history[0].delivered);
        assert!(history[0].error_message.as_deref().unwrap().contains("503"));
    }
}
