use clap::{Args, Parser, Subcommand};

use interview_core::model::{Category, QuestionId, SessionId};

use crate::db::DEFAULT_DB_URL;

#[derive(Debug, Parser)]
#[command(
    name = "interview",
    version,
    about = "Interview question bank and mock interview tracker"
)]
pub struct Cli {
    /// SQLite database URL or path
    #[arg(long = "db", env = "INTERVIEW_DB_URL", default_value = DEFAULT_DB_URL, global = true)]
    pub db_url: String,

    /// Seed for question selection and pairing (random when omitted)
    #[arg(long, env = "INTERVIEW_SEED", global = true)]
    pub seed: Option<u64>,

    /// Optional TOML file with [selection] and [completion] tables
    #[arg(long, env = "INTERVIEW_CONFIG", default_value = "interview.toml", global = true)]
    pub config: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage the question bank
    #[command(subcommand)]
    Question(QuestionCommand),

    /// Run interviews
    #[command(subcommand)]
    Interview(InterviewCommand),
}

#[derive(Debug, Subcommand)]
pub enum QuestionCommand {
    /// Add questions; without TEXT, one question per line is read from stdin
    Add {
        /// Category key or label, e.g. `react` or `HTML/CSS`
        #[arg(short, long)]
        category: Category,

        text: Vec<String>,
    },

    /// List bank questions
    List {
        #[arg(short, long)]
        category: Option<Category>,

        /// Group by category
        #[arg(long, conflicts_with = "category")]
        grouped: bool,
    },

    /// Mark a bank question as completed
    Check { id: QuestionId },

    /// Mark a bank question as not completed
    Uncheck { id: QuestionId },

    /// Remove a question from the bank
    Delete { id: QuestionId },

    /// Fill an empty bank with starter questions
    Sample,
}

#[derive(Debug, Subcommand)]
pub enum InterviewCommand {
    /// Select questions and create a new interview
    Start {
        #[arg(short, long)]
        title: Option<String>,
    },

    /// List interviews, newest first
    List {
        #[arg(long)]
        oldest: bool,
    },

    /// Show questions, assignments, and feedback
    Show { id: SessionId },

    /// Accept the selected questions and start collecting interviewees
    Interviewees { id: SessionId },

    /// Add an interviewee
    AddInterviewee { id: SessionId, name: String },

    /// Assign interviewees to questions and start the interview
    Prepare {
        id: SessionId,

        /// Replace the collected interviewees with these names
        #[arg(short, long = "name")]
        names: Vec<String>,
    },

    /// Record feedback on a question
    Feedback(FeedbackArgs),

    /// Mark an interview question as answered
    Check { id: SessionId, question: QuestionId },

    /// Finish the interview and mark its questions completed in the bank
    Complete { id: SessionId },

    /// Delete an interview
    Delete { id: SessionId },
}

#[derive(Debug, Args)]
pub struct FeedbackArgs {
    pub id: SessionId,
    pub question: QuestionId,

    #[arg(short, long)]
    pub author: String,

    pub content: String,
}
