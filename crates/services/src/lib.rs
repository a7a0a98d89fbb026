#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod interviews;
pub mod question_service;

pub use interview_core::Clock;

pub use app_services::AppServices;
pub use error::{AppServicesError, InterviewServiceError, QuestionServiceError};
pub use interviews::{InterviewListItem, InterviewOrder, InterviewService, InterviewSettings};
pub use question_service::{CategoryGroup, QuestionBankService};
