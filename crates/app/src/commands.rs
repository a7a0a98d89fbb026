use std::io::Read;

use interview_core::model::{FeedbackDraft, Interviewee, IntervieweeId, Question, Session};
use services::{AppServices, InterviewListItem, InterviewOrder};

use crate::cli::{Command, FeedbackArgs, InterviewCommand, QuestionCommand};

type CommandResult = Result<(), Box<dyn std::error::Error>>;

pub async fn execute(services: &AppServices, command: Command) -> CommandResult {
    match command {
        Command::Question(cmd) => question(services, cmd).await,
        Command::Interview(cmd) => interview(services, cmd).await,
    }
}

async fn question(services: &AppServices, command: QuestionCommand) -> CommandResult {
    let bank = services.questions();
    match command {
        QuestionCommand::Add { category, text } => {
            let added = if text.is_empty() {
                let mut block = String::new();
                std::io::stdin().read_to_string(&mut block)?;
                bank.add_questions(category, &block).await?
            } else {
                vec![bank.add_question(category, text.join(" ")).await?]
            };
            for q in &added {
                println!("{}", question_line(q));
            }
        }
        QuestionCommand::List { category, grouped } => {
            if grouped {
                for group in bank.grouped_questions().await? {
                    println!("{} ({})", group.category, group.questions.len());
                    for q in &group.questions {
                        println!("  {}", question_line(q));
                    }
                }
            } else {
                for q in bank.list_questions(category).await? {
                    println!("{}", question_line(&q));
                }
            }
        }
        QuestionCommand::Check { id } => bank.set_question_completed(id, true).await?,
        QuestionCommand::Uncheck { id } => bank.set_question_completed(id, false).await?,
        QuestionCommand::Delete { id } => bank.delete_question(id).await?,
        QuestionCommand::Sample => {
            let added = services.seed_sample_questions().await?;
            println!("added {added} sample questions");
        }
    }
    Ok(())
}

async fn interview(services: &AppServices, command: InterviewCommand) -> CommandResult {
    let interviews = services.interviews();
    match command {
        InterviewCommand::Start { title } => {
            let session = interviews.create_interview(title).await?;
            print_session(&session);
        }
        InterviewCommand::List { oldest } => {
            let order = if oldest {
                InterviewOrder::Oldest
            } else {
                InterviewOrder::Latest
            };
            for item in interviews.list_interviews(order).await? {
                println!("{}", list_line(&item));
            }
        }
        InterviewCommand::Show { id } => {
            print_session(&interviews.get_interview(id).await?);
        }
        InterviewCommand::Interviewees { id } => {
            let session = interviews.begin_collecting_interviewees(id).await?;
            println!("{} is now {}", session.id(), session.step());
        }
        InterviewCommand::AddInterviewee { id, name } => {
            let who = interviews.add_interviewee(id, &name).await?;
            println!("{}  {}", who.id(), who.name());
        }
        InterviewCommand::Prepare { id, names } => {
            let session = if names.is_empty() {
                interviews.prepare_interview(id).await?
            } else {
                let pool = names
                    .into_iter()
                    .map(|name| Interviewee::new(IntervieweeId::generate(), name))
                    .collect::<Result<Vec<_>, _>>()?;
                interviews.assign_interviewees(id, pool).await?
            };
            print_session(&session);
        }
        InterviewCommand::Feedback(FeedbackArgs {
            id,
            question,
            author,
            content,
        }) => {
            let feedback = interviews
                .add_feedback(id, question, FeedbackDraft::new(author, content))
                .await?;
            println!("{}  {}", feedback.id(), feedback.timestamp().to_rfc3339());
        }
        InterviewCommand::Check { id, question } => {
            let session = interviews.mark_question_complete(id, question).await?;
            println!("{} question(s) remaining", session.remaining_questions());
        }
        InterviewCommand::Complete { id } => {
            let session = interviews.complete_interview(id).await?;
            println!("{} finished", session.id());
        }
        InterviewCommand::Delete { id } => interviews.delete_interview(id).await?,
    }
    Ok(())
}

fn checkbox(done: bool) -> &'static str {
    if done { "[x]" } else { "[ ]" }
}

fn question_line(q: &Question) -> String {
    format!(
        "{} {}  {}  {}",
        checkbox(q.is_completed()),
        q.id(),
        q.category(),
        q.text()
    )
}

fn list_line(item: &InterviewListItem) -> String {
    let status = if item.is_finished() {
        "finished".to_owned()
    } else {
        item.step.to_string()
    };
    format!(
        "{}  {}  {}  [{status}]  {}",
        item.id,
        item.created_at.format("%Y-%m-%d %H:%M"),
        item.title,
        item.preview_line()
    )
}

fn print_session(session: &Session) {
    let status = match session.finished_at() {
        Some(at) => format!("finished {}", at.format("%Y-%m-%d %H:%M")),
        None => session.step().to_string(),
    };
    println!("{}  {}  [{status}]", session.id(), session.title());

    for who in session.interviewees() {
        println!("  interviewee {}  {}", who.id(), who.name());
    }
    for q in session.questions() {
        println!(
            "  {} {}  {}  {}",
            checkbox(q.is_completed()),
            q.id(),
            q.category(),
            q.text()
        );
        let names: Vec<&str> = q
            .assigned_interviewees()
            .iter()
            .filter_map(|id| session.interviewee(*id).map(Interviewee::name))
            .collect();
        if !names.is_empty() {
            println!("      assigned: {}", names.join(", "));
        }
        for fb in q.feedbacks() {
            println!("      {}: {}", fb.author(), fb.content());
        }
    }
}
