// src/api/routes.rs
use super::handlers;
use actix_web::web;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .route("/health", web::get().to(handlers::health_check))
            .route("/domains", web::get().to(handlers::list_domains))
            .route("/history", web::get().to(handlers::get_history))
            .route("/ws", web::get().to(handlers::ws_handler))
            .service(
                web::scope("/sessions")
                    .route("", web::post().to(handlers::create_session))
                    .route("", web::get().to(handlers::list_sessions))
                    .route("/{id}", web::get().to(handlers::get_session))
                    .route("/{id}", web::delete().to(handlers::delete_session))
                    .route("/{id}/section", web::post().to(handlers::select_section))
                    .route("/{id}/coding", web::put().to(handlers::save_coding))
                    .route("/{id}/coding/navigate", web::post().to(handlers::navigate_coding))
                    .route("/{id}/mcq", web::delete().to(handlers::clear_mcq))
                    .route("/{id}/mcq/select", web::post().to(handlers::select_mcq))
                    .route("/{id}/mcq/toggle", web::post().to(handlers::toggle_mcq))
                    .route("/{id}/mcq/navigate", web::post().to(handlers::navigate_mcq))
                    .route("/{id}/subjective/navigate", web::post().to(handlers::navigate_subjective))
                    .route("/{id}/subjective/answer", web::post().to(handlers::answer_subjective))
                    .route("/{id}/goto", web::post().to(handlers::go_to_question))
                    .route("/{id}/progress", web::get().to(handlers::get_progress))
                    .route("/{id}/submit", web::post().to(handlers::submit_session))
                    .route("/{id}/resend", web::post().to(handlers::resend_submission))
                    .route("/{id}/thank-you", web::get().to(handlers::get_thank_you)),
            ),
    );
}
