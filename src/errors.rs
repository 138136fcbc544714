// src/errors.rs
use thiserror::Error;

use crate::models::Section;

#[derive(Error, Debug)]
pub enum InterviewError {
    #[error("Invalid session state: {0}")]
    InvalidState(String),

    #[error("Interview has already been submitted")]
    AlreadySubmitted,

    #[error("Session is closed; answers can no longer be changed")]
    SessionClosed,

    #[error("Question '{0}' is not part of this session")]
    UnknownQuestion(String),

    #[error("Option '{option}' does not belong to question '{question_id}'")]
    UnknownOption { question_id: String, option: String },

    #[error("Question '{question_id}' expects {expected} selection")]
    SelectionMode {
        question_id: String,
        expected: &'static str,
    },

    #[error("Section '{0}' has no questions")]
    EmptySection(Section),

    #[error("There is no failed submission to resend")]
    NothingToResend,

    #[error("Invalid candidate details: {0}")]
    InvalidCandidate(String),

    #[error("Failed to read file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse TOML config: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API request failed with status {status}: {body}")]
    ApiError { status: u16, body: String },

    #[error("Unexpected response structure: {0}")]
    UnexpectedResponse(String),

    #[error("Submission was rejected: {0}")]
    SubmissionRejected(String),

    #[error("Answer evaluation failed: {source}")]
    Evaluation {
        #[source]
        source: Box<InterviewError>,
    },

    #[error("Submission delivery failed: {source}")]
    Submission {
        #[source]
        source: Box<InterviewError>,
    },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl InterviewError {
    /// True for failures caused by an external collaborator rather than the caller.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            InterviewError::Request(_)
                | InterviewError::ApiError { .. }
                | InterviewError::UnexpectedResponse(_)
                | InterviewError::SubmissionRejected(_)
                | InterviewError::Evaluation { .. }
                | InterviewError::Submission { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, InterviewError>;
