// src/flow.rs
//! Hand-off between the landing form, the session and the thank-you view.
//! Context travels as explicit values instead of shared page storage.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::errors::{InterviewError, Result};
use crate::models::{CandidateInfo, InterviewSummary};

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

/// Raw landing form input.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LandingForm {
    pub name: String,
    pub email: String,
    pub domain: String,
    pub experience: i64,
    #[serde(default)]
    pub agreed: bool,
}

/// Everything a session needs to start. Only produced from a valid form.
#[derive(Debug, Clone, PartialEq)]
pub struct StartContext {
    candidate: CandidateInfo,
}

impl StartContext {
    pub fn candidate(&self) -> &CandidateInfo {
        &self.candidate
    }

    pub fn into_candidate(self) -> CandidateInfo {
        self.candidate
    }
}

impl LandingForm {
    pub fn validate(self) -> Result<StartContext> {
        let name = self.name.trim();
        if name.chars().count() < 2 {
            return Err(InterviewError::InvalidCandidate(
                "name must be at least 2 characters".to_string(),
            ));
        }
        let email = self.email.trim();
        if !EMAIL.is_match(email) {
            return Err(InterviewError::InvalidCandidate(format!(
                "'{}' is not a valid email address",
                email
            )));
        }
        let domain = self.domain.trim();
        if domain.is_empty() {
            return Err(InterviewError::InvalidCandidate("domain is required".to_string()));
        }
        let experience = u32::try_from(self.experience).map_err(|_| {
            InterviewError::InvalidCandidate("experience must be zero or more years".to_string())
        })?;
        if !self.agreed {
            return Err(InterviewError::InvalidCandidate(
                "the interview terms must be accepted".to_string(),
            ));
        }

        Ok(StartContext {
            candidate: CandidateInfo {
                name: name.to_string(),
                email: email.to_string(),
                domain: domain.to_string(),
                experience,
            },
        })
    }
}

/// What the thank-you page renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThankYouView {
    pub summary: InterviewSummary,
    /// False when no summary was handed over and placeholders are shown.
    pub from_session: bool,
}

impl ThankYouView {
    /// Reads the summary once; the slot is empty afterwards.
    pub fn take(slot: &mut Option<InterviewSummary>) -> Self {
        match slot.take() {
            Some(summary) => ThankYouView {
                summary,
                from_session: true,
            },
            None => ThankYouView {
                summary: InterviewSummary::default(),
                from_session: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> LandingForm {
        LandingForm {
            name: "  Asha Rao ".to_string(),
            email: "asha@example.com".to_string(),
            domain: "Java Development".to_string(),
            experience: 3,
            agreed: true,
        }
    }

    #[test]
    fn valid_form_yields_trimmed_candidate() {
        let context = form().validate().unwrap();
        assert_eq!(context.candidate().name, "Asha Rao");
        assert_eq!(context.candidate().experience, 3);
    }

    #[test]
    fn form_requires_agreement_and_sane_fields() {
        let cases = [
            LandingForm { agreed: false, ..form() },
            LandingForm { name: "A".to_string(), ..form() },
            LandingForm { email: "asha@example".to_string(), ..form() },
            LandingForm { domain: " ".to_string(), ..form() },
            LandingForm { experience: -1, ..form() },
        ];
        for case in cases {
            assert!(matches!(case.validate(), Err(InterviewError::InvalidCandidate(_))));
        }
    }

    #[test]
    fn thank_you_reads_summary_once() {
        let mut slot = Some(InterviewSummary {
            candidate_name: "Asha Rao".to_string(),
            total_questions: 8,
            ..InterviewSummary::default()
        });

        let first = ThankYouView::take(&mut slot);
        assert!(first.from_session);
        assert_eq!(first.summary.candidate_name, "Asha Rao");
        assert!(slot.is_none());

        let second = ThankYouView::take(&mut slot);
        assert!(!second.from_session);
        assert_eq!(second.summary.candidate_name, "Candidate");
    }

    #[test]
    fn thank_you_serializes_camel_case() {
        let view = ThankYouView::take(&mut Some(InterviewSummary::default()));
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["fromSession"], true);
        assert_eq!(json["summary"]["candidateName"], "Candidate");
        assert!(json.get("from_session").is_none());
    }
}
