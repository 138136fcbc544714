// src/api/handlers/mod.rs
mod domains;
mod health;
mod history;
mod sessions;
pub mod ws;

pub use domains::list_domains;
pub use health::health_check;
pub use history::get_history;
pub use sessions::{
    answer_subjective, clear_mcq, create_session, delete_session, get_progress, get_session, get_thank_you,
    go_to_question, list_sessions, navigate_coding, navigate_mcq, navigate_subjective, resend_submission,
    save_coding, select_mcq, select_section, submit_session, toggle_mcq,
};
pub use ws::{WsBroker, ws_handler};
