use std::collections::HashSet;
use std::sync::Arc;

use interview_core::model::{Category, FeedbackDraft, Interviewee, IntervieweeId, SessionStep};
use interview_core::time::fixed_now;
use services::{Clock, InterviewOrder, InterviewService, InterviewSettings, QuestionBankService};
use storage::repository::{InMemoryRepository, QuestionRepository};

const TECHNICAL: [Category; 5] = [
    Category::Cs,
    Category::HtmlCss,
    Category::JavaScript,
    Category::TypeScript,
    Category::React,
];

#[tokio::test]
async fn interview_flow_selects_assigns_and_completes() {
    let repo = InMemoryRepository::new();
    let clock = Clock::fixed(fixed_now());
    let bank = QuestionBankService::new(clock, Arc::new(repo.clone()));
    let interviews = InterviewService::with_seed(
        clock,
        InterviewSettings::default(),
        Arc::new(repo.clone()),
        Arc::new(repo.clone()),
        42,
    );

    bank.add_question(Category::Basic, "Tell us about yourself.")
        .await
        .unwrap();
    for n in 0..7 {
        let category = TECHNICAL[n % TECHNICAL.len()];
        bank.add_question(category, format!("{category} question {n}"))
            .await
            .unwrap();
    }

    let session = interviews
        .create_interview(Some("Mock interview".into()))
        .await
        .unwrap();
    assert_eq!(session.questions().len(), 6);
    let basic: Vec<_> = session
        .questions()
        .iter()
        .filter(|q| q.category().is_basic())
        .collect();
    assert_eq!(basic.len(), 1);
    let distinct: HashSet<_> = session.questions().iter().map(|q| q.id()).collect();
    assert_eq!(distinct.len(), 6);

    let pool: Vec<Interviewee> = ["A", "B", "C"]
        .iter()
        .map(|name| Interviewee::new(IntervieweeId::generate(), *name).unwrap())
        .collect();
    let everyone: HashSet<_> = pool.iter().map(Interviewee::id).collect();
    let session = interviews
        .assign_interviewees(session.id(), pool)
        .await
        .unwrap();
    assert_eq!(session.step(), SessionStep::InProgress);

    for q in session.questions() {
        let assigned: HashSet<_> = q.assigned_interviewees().iter().copied().collect();
        if q.category().is_basic() {
            assert_eq!(assigned, everyone);
        } else {
            assert_eq!(q.assigned_interviewees().len(), 2);
            assert_eq!(assigned.len(), 2);
            assert!(assigned.is_subset(&everyone));
        }
    }
    let counts: Vec<usize> = session.assignment_counts().iter().map(|(_, n)| *n).collect();
    let spread = counts.iter().max().unwrap() - counts.iter().min().unwrap();
    assert!(spread <= 1, "unbalanced counts: {counts:?}");

    for q in session.questions() {
        interviews
            .add_feedback(
                session.id(),
                q.id(),
                FeedbackDraft::new("Panel", format!("Notes on {}", q.text())),
            )
            .await
            .unwrap();
        interviews
            .mark_question_complete(session.id(), q.id())
            .await
            .unwrap();
    }
    let done = interviews.complete_interview(session.id()).await.unwrap();
    assert!(done.is_finished());
    assert!(done.questions().iter().all(|q| q.feedbacks().len() == 1));

    let selected: HashSet<_> = done.questions().iter().map(|q| q.id()).collect();
    for q in repo.load_questions().await.unwrap() {
        assert_eq!(q.is_completed(), selected.contains(&q.id()));
    }

    let listed = interviews
        .list_interviews(InterviewOrder::Latest)
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].title, "Mock interview");
    assert_eq!(listed[0].more, 3);
    assert!(listed[0].is_finished());

    // The two unselected technical questions are all that is left for a new round.
    let next = interviews.create_interview(None).await.unwrap();
    assert_eq!(next.questions().len(), 2);
    assert!(next.questions().iter().all(|q| !selected.contains(&q.id())));
}

#[tokio::test]
async fn interviewees_collected_step_by_step_are_prepared() {
    let repo = InMemoryRepository::new();
    let clock = Clock::fixed(fixed_now());
    let bank = QuestionBankService::new(clock, Arc::new(repo.clone()));
    let interviews = InterviewService::with_seed(
        clock,
        InterviewSettings::default(),
        Arc::new(repo.clone()),
        Arc::new(repo.clone()),
        5,
    );
    bank.add_questions(Category::React, "What is state?\nWhat is a ref?\nWhat is context?")
        .await
        .unwrap();

    let session = interviews.create_interview(None).await.unwrap();
    assert_eq!(session.title(), "Interview 2023-11-14 22:13");
    interviews
        .begin_collecting_interviewees(session.id())
        .await
        .unwrap();
    for name in ["Dee", "Eli", "Fay", "Gus"] {
        interviews.add_interviewee(session.id(), name).await.unwrap();
    }

    let prepared = interviews.prepare_interview(session.id()).await.unwrap();
    assert_eq!(prepared.interviewees().len(), 4);
    assert!(
        prepared
            .questions()
            .iter()
            .all(|q| q.assigned_interviewees().len() == 2)
    );
    let counts: Vec<usize> = prepared
        .assignment_counts()
        .iter()
        .map(|(_, n)| *n)
        .collect();
    assert_eq!(counts.iter().sum::<usize>(), 6);
    assert!(counts.iter().max().unwrap() - counts.iter().min().unwrap() <= 1);
}
