// src/clients/backend.rs

use async_trait::async_trait;
use log::{debug, info};
use reqwest::{Client, Response};
use serde::Deserialize;
use std::time::Instant;

use crate::clients::{QuestionProvider, SubjectiveEvaluator, SubmissionSink};
use crate::config::BackendConfig;
use crate::errors::{InterviewError, Result};
use crate::models::{
    CodingQuestion, EvaluationRequest, EvaluationResponse, McqQuestion, QuestionSet, SubjectiveQuestion,
    SubmissionAck, SubmissionRecord,
};

/// HTTP client for the interview backend (question bank, chat evaluation,
/// result submission).
#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    config: BackendConfig,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCodingQuestion {
    id: serde_json::Value,
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    starter_code: Option<String>,
    #[serde(default)]
    domain: String,
    #[serde(default)]
    difficulty: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMcqQuestion {
    id: serde_json::Value,
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    options: serde_json::Value,
    #[serde(default)]
    multiple_selection: bool,
    #[serde(default)]
    difficulty: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSubjectiveQuestion {
    id: serde_json::Value,
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    domain: String,
    #[serde(default)]
    difficulty: String,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RawQuestionSet {
    #[serde(default)]
    coding_questions: Vec<RawCodingQuestion>,
    #[serde(default)]
    mcq_questions: Vec<RawMcqQuestion>,
    #[serde(default)]
    subjective_questions: Vec<RawSubjectiveQuestion>,
}

/// Ids come back as numbers or strings depending on the backend entity.
fn id_string(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    }
}

/// Options are stored as one string: a JSON array, or a comma-separated list.
pub fn parse_options(raw: &str) -> Vec<String> {
    match serde_json::from_str::<Vec<String>>(raw) {
        Ok(options) => options,
        Err(_) => raw
            .split(',')
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect(),
    }
}

fn options_from_value(value: serde_json::Value) -> Vec<String> {
    match value {
        serde_json::Value::String(raw) => parse_options(&raw),
        serde_json::Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                serde_json::Value::String(s) => Some(s),
                serde_json::Value::Null => None,
                other => Some(other.to_string()),
            })
            .collect(),
        _ => Vec::new(),
    }
}

impl From<RawQuestionSet> for QuestionSet {
    fn from(raw: RawQuestionSet) -> Self {
        QuestionSet {
            coding: raw
                .coding_questions
                .into_iter()
                .map(|q| CodingQuestion {
                    id: id_string(q.id),
                    title: q.title,
                    prompt: q.description,
                    starter_code: q.starter_code.unwrap_or_default(),
                    domain: q.domain,
                    difficulty: q.difficulty,
                })
                .collect(),
            mcq: raw
                .mcq_questions
                .into_iter()
                .map(|q| McqQuestion {
                    id: id_string(q.id),
                    title: q.title,
                    prompt: q.description,
                    options: options_from_value(q.options),
                    multiple_selection: q.multiple_selection,
                    difficulty: q.difficulty,
                })
                .collect(),
            subjective: raw
                .subjective_questions
                .into_iter()
                .map(|q| SubjectiveQuestion {
                    id: id_string(q.id),
                    title: q.title,
                    prompt: q.description,
                    domain: q.domain,
                    difficulty: q.difficulty,
                })
                .collect(),
        }
    }
}

impl BackendClient {
    pub fn new(client: Client, config: BackendConfig) -> Self {
        Self { client, config }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.api_base.trim_end_matches('/'), path)
    }

    async fn check(resp: Response) -> Result<Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp
            .text()
            .await
            .unwrap_or_else(|_| "Could not read error body".to_string());
        Err(InterviewError::ApiError {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl QuestionProvider for BackendClient {
    async fn available_domains(&self) -> Result<Vec<String>> {
        let url = self.url("questions/domains");
        debug!("📡 Fetching domains from {}", url);
        let resp = Self::check(self.client.get(&url).send().await?).await?;
        Ok(resp.json().await?)
    }

    async fn fetch_question_set(&self, domain: &str, experience_years: u32) -> Result<QuestionSet> {
        let url = self.url("questions/complete-set");
        info!("📡 Fetching question set for {} ({} years)", domain, experience_years);

        let start = Instant::now();
        let resp = self
            .client
            .get(&url)
            .query(&[
                ("domain", domain.to_string()),
                ("experienceYears", experience_years.to_string()),
            ])
            .send()
            .await?;
        let resp = Self::check(resp).await?;
        let raw: RawQuestionSet = resp.json().await?;
        let set = QuestionSet::from(raw);

        info!(
            "📥 Received {} questions in {}ms",
            set.total(),
            start.elapsed().as_millis()
        );
        Ok(set)
    }
}

#[async_trait]
impl SubjectiveEvaluator for BackendClient {
    async fn evaluate(&self, request: &EvaluationRequest) -> Result<EvaluationResponse> {
        let url = self.url("chat/respond");
        // The backend still calls the session id `resumeId`.
        let body = serde_json::json!({
            "questionText": request.question_text,
            "userAnswer": request.user_answer,
            "resumeId": request.session_id,
            "domain": request.domain,
            "questionType": "SUBJECTIVE",
        });

        let start = Instant::now();
        let resp = Self::check(self.client.post(&url).json(&body).send().await?).await?;
        let response: EvaluationResponse = resp.json().await?;
        debug!(
            "📥 Evaluation for session {} took {}ms (similarity {:?})",
            request.session_id,
            start.elapsed().as_millis(),
            response.similarity
        );
        Ok(response)
    }
}

#[async_trait]
impl SubmissionSink for BackendClient {
    async fn submit_interview(&self, record: &SubmissionRecord) -> Result<SubmissionAck> {
        let url = self.url("chat/submitInterview");
        info!("📡 Submitting interview {} to {}", record.resume_id, url);

        let resp = Self::check(self.client.post(&url).json(record).send().await?).await?;
        let value: serde_json::Value = resp.json().await?;
        let success = value
            .get("success")
            .and_then(|s| s.as_bool())
            .ok_or_else(|| InterviewError::UnexpectedResponse(value.to_string()))?;
        let message = value
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or_default()
            .to_string();

        Ok(SubmissionAck { success, message })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_json_and_comma_separated_options() {
        assert_eq!(parse_options(r#"["Java", "HTML", "CSS"]"#), vec!["Java", "HTML", "CSS"]);
        assert_eq!(parse_options("INSERT, SELECT ,UPDATE,"), vec!["INSERT", "SELECT", "UPDATE"]);
    }

    #[test]
    fn converts_backend_question_set() {
        let raw: RawQuestionSet = serde_json::from_value(json!({
            "codingQuestions": [{
                "id": 7,
                "title": "Reverse",
                "description": "Reverse a string",
                "domain": "Java Development",
                "difficulty": "EASY"
            }],
            "mcqQuestions": [{
                "id": "m-1",
                "title": "Web",
                "description": "Frontend?",
                "options": "[\"Angular\", \"React\"]",
                "multipleSelection": true,
                "difficulty": "MEDIUM"
            }]
        }))
        .unwrap();

        let set = QuestionSet::from(raw);
        assert_eq!(set.coding[0].id, "7");
        assert_eq!(set.coding[0].starter_code, "");
        assert_eq!(set.mcq[0].options, vec!["Angular", "React"]);
        assert!(set.mcq[0].multiple_selection);
        assert!(set.subjective.is_empty());
    }

    #[test]
    fn urls_join_without_double_slash() {
        let client = BackendClient::new(
            Client::new(),
            BackendConfig {
                api_base: "http://localhost:8080/api/".to_string(),
            },
        );
        assert_eq!(client.url("chat/respond"), "http://localhost:8080/api/chat/respond");
    }
}
