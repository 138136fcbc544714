// src/session/mod.rs
pub mod answers;
pub mod controller;
pub mod scoring;
pub mod state;
pub mod timer;

pub use controller::{Collaborators, SessionController, SessionEvent, SubmissionOutcome};
pub use state::{Delivery, ProgressSummary, SessionSnapshot, SessionState, SessionStatus, TickOutcome};
