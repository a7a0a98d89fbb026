mod feedback;
mod ids;
mod interviewee;
mod question;
mod session;

pub use ids::{FeedbackId, IntervieweeId, ParseIdError, QuestionId, SessionId};

pub use feedback::{Feedback, FeedbackDraft, FeedbackError};
pub use interviewee::{Interviewee, IntervieweeError};
pub use question::{Category, Question, QuestionError, QuestionText};
pub use session::{
    CompletionPolicy, Session, SessionError, SessionQuestion, SessionStep, default_title,
};
