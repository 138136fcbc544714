// src/api/handlers/history.rs
use actix_web::{HttpResponse, Result, web};
use log::error;
use serde::Serialize;

use crate::api::AppState;
use crate::database::{self, HistoryEntry};

#[derive(Serialize)]
pub struct HistoryResponse {
    pub results: Vec<HistoryEntry>,
}

pub async fn get_history(state: web::Data<AppState>) -> Result<HttpResponse> {
    match state.db_pool.as_ref() {
        Some(pool) => match database::get_all_submissions(pool).await {
            Ok(results) => Ok(HttpResponse::Ok().json(HistoryResponse { results })),
            Err(e) => {
                error!("Database error: {}", e);
                Ok(HttpResponse::InternalServerError().json(serde_json::json!({
                    "error": "Failed to fetch history"
                })))
            }
        },
        None => Ok(HttpResponse::ServiceUnavailable().json(serde_json::json!({
            "error": "Database not initialized"
        }))),
    }
}
