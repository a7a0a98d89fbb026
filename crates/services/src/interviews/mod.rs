mod service;
mod view;

// Public API of the interview subsystem.
pub use crate::error::InterviewServiceError;
pub use service::{InterviewService, InterviewSettings};
pub use view::{InterviewListItem, InterviewOrder, PREVIEW_QUESTIONS, sort_sessions};
