#![forbid(unsafe_code)]

pub mod assignment;
pub mod model;
pub mod selection;
pub mod time;

pub use selection::{QuestionSelector, SelectionPlan, SelectionPolicy, select_session_questions};
pub use time::Clock;
