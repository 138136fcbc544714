// src/api/handlers/domains.rs
use actix_web::{HttpResponse, Result, web};
use log::warn;
use serde::Serialize;

use crate::api::AppState;
use crate::clients::fallback::FallbackQuestions;
use crate::models::ExperienceLevel;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainsResponse {
    pub domains: Vec<String>,
    /// True when the backend was unreachable and the built-in list is shown.
    pub fallback: bool,
    /// Labels for the landing form's experience picker.
    pub experience_levels: Vec<&'static str>,
}

pub async fn list_domains(state: web::Data<AppState>) -> Result<HttpResponse> {
    let (domains, fallback) = match state.collaborators.questions.available_domains().await {
        Ok(domains) if !domains.is_empty() => (domains, false),
        Ok(_) => (FallbackQuestions::domains(), true),
        Err(e) => {
            warn!("⚠️  Could not load domains: {}", e);
            (FallbackQuestions::domains(), true)
        }
    };
    Ok(HttpResponse::Ok().json(DomainsResponse {
        domains,
        fallback,
        experience_levels: ExperienceLevel::ALL.iter().map(ExperienceLevel::description).collect(),
    }))
}
