use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};

use crate::model::{Question, SessionError};

/// Technical questions per session unless configured otherwise.
pub const DEFAULT_TECHNICAL_QUOTA: usize = 5;

/// Knobs for question selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionPolicy {
    /// Maximum number of technical questions per session.
    pub technical_quota: usize,
    /// Fill a missing basic slot with one extra technical question.
    pub backfill_basic: bool,
    /// Fail unless a full session (quota + 1 questions) can be selected.
    pub require_full: bool,
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self {
            technical_quota: DEFAULT_TECHNICAL_QUOTA,
            backfill_basic: false,
            require_full: false,
        }
    }
}

impl SelectionPolicy {
    /// Number of questions in a full session.
    #[must_use]
    pub fn full_size(&self) -> usize {
        self.technical_quota + 1
    }
}

/// Selection result for a new session.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionPlan {
    /// Technical questions first, basic (or backfill) question last.
    pub questions: Vec<Question>,
    pub basic_selected: bool,
    pub technical_selected: usize,
    pub backfilled: bool,
}

impl SelectionPlan {
    #[must_use]
    pub fn total(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_full(&self, policy: &SelectionPolicy) -> bool {
        self.total() >= policy.full_size()
    }
}

/// Builds the question list for a new session from a bank snapshot.
pub struct QuestionSelector {
    policy: SelectionPolicy,
}

impl QuestionSelector {
    #[must_use]
    pub fn new(policy: SelectionPolicy) -> Self {
        Self { policy }
    }

    /// Select questions from the bank.
    ///
    /// - Completed questions are skipped.
    /// - One basic question is chosen uniformly at random, if any exist.
    /// - Up to `technical_quota` technical questions are taken from a random permutation.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InsufficientQuestions` when nothing can be selected,
    /// or when `require_full` is set and the result would be short.
    pub fn select<R: Rng + ?Sized>(
        &self,
        bank: &[Question],
        rng: &mut R,
    ) -> Result<SelectionPlan, SessionError> {
        let (basic, mut technical): (Vec<&Question>, Vec<&Question>) = bank
            .iter()
            .filter(|q| !q.is_completed())
            .partition(|q| q.category().is_basic());

        let chosen_basic = basic.choose(rng).copied();

        technical.shuffle(rng);
        let mut take = self.policy.technical_quota.min(technical.len());
        let backfilled =
            chosen_basic.is_none() && self.policy.backfill_basic && technical.len() > take;
        if backfilled {
            take += 1;
        }

        let mut questions: Vec<Question> = technical.into_iter().take(take).cloned().collect();
        let technical_selected = questions.len() - usize::from(backfilled);
        if let Some(q) = chosen_basic {
            questions.push(q.clone());
        }

        let plan = SelectionPlan {
            questions,
            basic_selected: chosen_basic.is_some(),
            technical_selected,
            backfilled,
        };

        if plan.questions.is_empty() || (self.policy.require_full && !plan.is_full(&self.policy)) {
            return Err(SessionError::InsufficientQuestions);
        }
        Ok(plan)
    }
}

/// Select session questions with the default policy.
///
/// # Errors
///
/// Returns `SessionError::InsufficientQuestions` when no uncompleted question exists.
pub fn select_session_questions<R: Rng + ?Sized>(
    bank: &[Question],
    rng: &mut R,
) -> Result<Vec<Question>, SessionError> {
    QuestionSelector::new(SelectionPolicy::default())
        .select(bank, rng)
        .map(|plan| plan.questions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, QuestionId, QuestionText};
    use crate::time::fixed_now;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    const TECHNICAL: [Category; 5] = [
        Category::Cs,
        Category::HtmlCss,
        Category::JavaScript,
        Category::TypeScript,
        Category::React,
    ];

    fn question(category: Category, n: usize) -> Question {
        Question::new(
            QuestionId::generate(),
            category,
            QuestionText::new(format!("{category} question {n}")).unwrap(),
            fixed_now(),
        )
    }

    fn bank(basic: usize, technical: usize) -> Vec<Question> {
        let mut out: Vec<Question> = (0..basic).map(|n| question(Category::Basic, n)).collect();
        out.extend((0..technical).map(|n| question(TECHNICAL[n % TECHNICAL.len()], n)));
        out
    }

    fn count_basic(questions: &[Question]) -> usize {
        questions.iter().filter(|q| q.category().is_basic()).count()
    }

    #[test]
    fn full_bank_yields_six_with_basic_last() {
        let mut rng = StdRng::seed_from_u64(5);
        let picked = select_session_questions(&bank(1, 7), &mut rng).unwrap();

        assert_eq!(picked.len(), 6);
        assert_eq!(count_basic(&picked), 1);
        assert!(picked[5].category().is_basic());
        assert!(picked[..5].iter().all(|q| q.category().is_technical()));
    }

    #[test]
    fn completed_questions_are_never_selected() {
        let mut questions = bank(2, 8);
        for q in questions.iter_mut().take(6) {
            q.set_completed(true);
        }
        let open: HashSet<_> = questions
            .iter()
            .filter(|q| !q.is_completed())
            .map(Question::id)
            .collect();

        let mut rng = StdRng::seed_from_u64(9);
        let picked = select_session_questions(&questions, &mut rng).unwrap();

        assert_eq!(picked.len(), open.len());
        assert!(picked.iter().all(|q| open.contains(&q.id())));
    }

    #[test]
    fn missing_basic_is_not_substituted_by_default() {
        let mut rng = StdRng::seed_from_u64(1);
        let picked = select_session_questions(&bank(0, 9), &mut rng).unwrap();
        assert_eq!(picked.len(), 5);
        assert_eq!(count_basic(&picked), 0);
    }

    #[test]
    fn backfill_fills_missing_basic_slot() {
        let policy = SelectionPolicy {
            backfill_basic: true,
            ..SelectionPolicy::default()
        };
        let mut rng = StdRng::seed_from_u64(1);
        let plan = QuestionSelector::new(policy).select(&bank(0, 9), &mut rng).unwrap();

        assert_eq!(plan.total(), 6);
        assert!(plan.backfilled);
        assert!(!plan.basic_selected);
        assert_eq!(plan.technical_selected, 5);
        assert_eq!(count_basic(&plan.questions), 0);
    }

    #[test]
    fn backfill_is_skipped_when_basic_exists() {
        let policy = SelectionPolicy {
            backfill_basic: true,
            ..SelectionPolicy::default()
        };
        let mut rng = StdRng::seed_from_u64(1);
        let plan = QuestionSelector::new(policy).select(&bank(1, 9), &mut rng).unwrap();
        assert!(!plan.backfilled);
        assert_eq!(plan.total(), 6);
    }

    #[test]
    fn short_technical_pool_is_not_padded() {
        let mut rng = StdRng::seed_from_u64(2);
        let picked = select_session_questions(&bank(1, 3), &mut rng).unwrap();
        assert_eq!(picked.len(), 4);
        assert_eq!(count_basic(&picked), 1);
    }

    #[test]
    fn empty_or_fully_completed_bank_fails() {
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(
            select_session_questions(&[], &mut rng).unwrap_err(),
            SessionError::InsufficientQuestions
        );

        let mut questions = bank(1, 1);
        for q in &mut questions {
            q.set_completed(true);
        }
        assert_eq!(
            select_session_questions(&questions, &mut rng).unwrap_err(),
            SessionError::InsufficientQuestions
        );
    }

    #[test]
    fn require_full_rejects_short_session() {
        let policy = SelectionPolicy {
            require_full: true,
            ..SelectionPolicy::default()
        };
        let mut rng = StdRng::seed_from_u64(4);
        let selector = QuestionSelector::new(policy);
        assert_eq!(
            selector.select(&bank(1, 4), &mut rng).unwrap_err(),
            SessionError::InsufficientQuestions
        );
        assert_eq!(selector.select(&bank(1, 5), &mut rng).unwrap().total(), 6);
    }

    proptest! {
        #[test]
        fn selection_honors_category_quotas(basic in 0usize..4, technical in 0usize..12, seed in any::<u64>()) {
            prop_assume!(basic + technical > 0);
            let questions = bank(basic, technical);
            let mut rng = StdRng::seed_from_u64(seed);
            let picked = select_session_questions(&questions, &mut rng).unwrap();

            let ids: HashSet<_> = picked.iter().map(Question::id).collect();
            prop_assert_eq!(ids.len(), picked.len());
            prop_assert_eq!(count_basic(&picked), basic.min(1));
            prop_assert_eq!(picked.len() - count_basic(&picked), technical.min(5));
        }
    }
}
