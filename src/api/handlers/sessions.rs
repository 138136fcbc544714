// src/api/handlers/sessions.rs
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, Result, web};
use futures::future::join_all;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::api::AppState;
use crate::errors::InterviewError;
use crate::flow::{LandingForm, ThankYouView};
use crate::models::{Direction, Section, SubmissionAck, SubmissionRecord};
use crate::session::{SessionController, SessionSnapshot, SubmissionOutcome};

#[derive(Deserialize)]
pub struct SectionRequest {
    pub section: Section,
}

#[derive(Deserialize)]
pub struct CodingRequest {
    pub code: String,
}

#[derive(Deserialize)]
pub struct NavigateRequest {
    pub direction: Direction,
}

#[derive(Deserialize)]
pub struct OptionRequest {
    pub option: String,
}

#[derive(Deserialize)]
pub struct GotoRequest {
    pub index: usize,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectiveRequest {
    pub question_id: String,
    pub text: String,
    /// Skip the evaluator and only store the text.
    #[serde(default)]
    pub skip_evaluation: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionResponse {
    pub changed: bool,
    pub session: SessionSnapshot,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub record: SubmissionRecord,
    pub ack: SubmissionAck,
    pub thank_you: ThankYouView,
}

impl SubmitResponse {
    /// Consumes the session's thank-you hand-off.
    async fn new(session: &SessionController, outcome: SubmissionOutcome) -> Self {
        Self {
            record: outcome.record,
            ack: outcome.ack,
            thank_you: session.thank_you().await,
        }
    }
}

fn status_for(error: &InterviewError) -> StatusCode {
    match error {
        InterviewError::InvalidCandidate(_)
        | InterviewError::UnknownQuestion(_)
        | InterviewError::UnknownOption { .. }
        | InterviewError::SelectionMode { .. }
        | InterviewError::EmptySection(_)
        | InterviewError::JsonParse(_) => StatusCode::BAD_REQUEST,
        InterviewError::InvalidState(_)
        | InterviewError::AlreadySubmitted
        | InterviewError::SessionClosed
        | InterviewError::NothingToResend => StatusCode::CONFLICT,
        e if e.is_upstream() => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(error: &InterviewError) -> HttpResponse {
    HttpResponse::build(status_for(error)).json(json!({
        "error": error.to_string()
    }))
}

fn not_found(id: &str) -> HttpResponse {
    HttpResponse::NotFound().json(json!({
        "error": format!("Session '{}' not found", id)
    }))
}

/// Runs `op` on the session and answers with its snapshot afterwards.
async fn with_session<T, F, Fut>(state: &AppState, id: &str, op: F) -> Result<HttpResponse>
where
    F: FnOnce(SessionController) -> Fut,
    Fut: Future<Output = crate::errors::Result<T>>,
{
    let Some(session) = state.session(id).await else {
        return Ok(not_found(id));
    };
    match op(session.clone()).await {
        Ok(_) => Ok(HttpResponse::Ok().json(session.snapshot().await)),
        Err(e) => Ok(error_response(&e)),
    }
}

pub async fn create_session(state: web::Data<AppState>, form: web::Json<LandingForm>) -> Result<HttpResponse> {
    let context = match form.into_inner().validate() {
        Ok(context) => context,
        Err(e) => return Ok(error_response(&e)),
    };

    let session = state.open_session().await;
    info!(
        "🎬 Starting session {} for {} ({})",
        session.id(),
        context.candidate().name,
        context.candidate().domain
    );

    match session.start(context).await {
        Ok(snapshot) => Ok(HttpResponse::Created().json(snapshot)),
        Err(e) => {
            state.close_session(session.id()).await;
            Ok(error_response(&e))
        }
    }
}

pub async fn list_sessions(state: web::Data<AppState>) -> Result<HttpResponse> {
    state.evict_finished().await;
    let sessions = state.all_sessions().await;
    let mut snapshots = join_all(sessions.iter().map(|s| s.snapshot())).await;
    snapshots.sort_by(|a, b| a.session_id.cmp(&b.session_id));
    Ok(HttpResponse::Ok().json(json!({ "sessions": snapshots })))
}

pub async fn get_session(state: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse> {
    let id = path.into_inner();
    match state.session(&id).await {
        Some(session) => Ok(HttpResponse::Ok().json(session.snapshot().await)),
        None => Ok(not_found(&id)),
    }
}

pub async fn delete_session(state: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse> {
    let id = path.into_inner();
    match state.close_session(&id).await {
        Some(_) => Ok(HttpResponse::NoContent().finish()),
        None => Ok(not_found(&id)),
    }
}

pub async fn select_section(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<SectionRequest>,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    let Some(session) = state.session(&id).await else {
        return Ok(not_found(&id));
    };
    match session.select_section(body.section).await {
        Ok(changed) => Ok(HttpResponse::Ok().json(SectionResponse {
            changed,
            session: session.snapshot().await,
        })),
        Err(e) => Ok(error_response(&e)),
    }
}

pub async fn save_coding(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<CodingRequest>,
) -> Result<HttpResponse> {
    let code = body.into_inner().code;
    with_session(&state, &path, |s| async move { s.set_coding_answer(code).await }).await
}

pub async fn navigate_coding(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<NavigateRequest>,
) -> Result<HttpResponse> {
    let direction = body.direction;
    with_session(&state, &path, |s| async move { s.navigate_coding(direction).await }).await
}

pub async fn select_mcq(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<OptionRequest>,
) -> Result<HttpResponse> {
    let option = body.into_inner().option;
    with_session(&state, &path, |s| async move { s.select_mcq_option(&option).await }).await
}

pub async fn toggle_mcq(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<OptionRequest>,
) -> Result<HttpResponse> {
    let option = body.into_inner().option;
    with_session(&state, &path, |s| async move { s.toggle_mcq_option(&option).await }).await
}

pub async fn clear_mcq(state: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse> {
    with_session(&state, &path, |s| async move { s.clear_mcq_answer().await }).await
}

pub async fn navigate_mcq(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<NavigateRequest>,
) -> Result<HttpResponse> {
    let direction = body.direction;
    with_session(&state, &path, |s| async move { s.navigate_mcq(direction).await }).await
}

pub async fn navigate_subjective(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<NavigateRequest>,
) -> Result<HttpResponse> {
    let direction = body.direction;
    with_session(&state, &path, |s| async move { s.navigate_subjective(direction).await }).await
}

pub async fn go_to_question(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<GotoRequest>,
) -> Result<HttpResponse> {
    let index = body.index;
    with_session(&state, &path, |s| async move { s.go_to_question(index).await }).await
}

/// Stores the answer and, unless skipped, evaluates it. An evaluator failure
/// answers 502 but the text stays recorded.
pub async fn answer_subjective(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<SubjectiveRequest>,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    let Some(session) = state.session(&id).await else {
        return Ok(not_found(&id));
    };

    let request = body.into_inner();
    if request.skip_evaluation {
        return match session
            .record_subjective_answer(&request.question_id, request.text, None)
            .await
        {
            Ok(()) => Ok(HttpResponse::Ok().json(session.snapshot().await)),
            Err(e) => Ok(error_response(&e)),
        };
    }

    match session.answer_subjective(&request.question_id, request.text).await {
        Ok(answer) => Ok(HttpResponse::Ok().json(answer)),
        Err(e) => Ok(error_response(&e)),
    }
}

pub async fn get_progress(state: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse> {
    let id = path.into_inner();
    match state.session(&id).await {
        Some(session) => Ok(HttpResponse::Ok().json(session.progress().await)),
        None => Ok(not_found(&id)),
    }
}

pub async fn submit_session(state: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse> {
    let id = path.into_inner();
    let Some(session) = state.session(&id).await else {
        return Ok(not_found(&id));
    };
    match session.submit().await {
        Ok(outcome) => Ok(HttpResponse::Ok().json(SubmitResponse::new(&session, outcome).await)),
        Err(e) => {
            warn!("Submit of {} failed: {}", id, e);
            Ok(error_response(&e))
        }
    }
}

pub async fn resend_submission(state: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse> {
    let id = path.into_inner();
    let Some(session) = state.session(&id).await else {
        return Ok(not_found(&id));
    };
    match session.resend().await {
        Ok(outcome) => Ok(HttpResponse::Ok().json(SubmitResponse::new(&session, outcome).await)),
        Err(e) => Ok(error_response(&e)),
    }
}

/// Thank-you page data. The real summary is served once; later reads get the placeholder.
pub async fn get_thank_you(state: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse> {
    let id = path.into_inner();
    match state.session(&id).await {
        Some(session) => Ok(HttpResponse::Ok().json(session.thank_you().await)),
        None => Ok(not_found(&id)),
    }
}
