//! Interviewee pairing for technical questions.
//!
//! Each technical question is answered by two interviewees. Pairs are picked
//! greedily: keep a per-interviewee counter and, for every question, take the
//! unordered pair with the smallest summed counter, breaking ties uniformly at
//! random. Because the minimal pair is always drawn from the least-loaded
//! interviewees, the spread between the busiest and the idlest interviewee
//! never exceeds one.

use rand::Rng;
use rand::seq::IndexedRandom;

use crate::model::{Interviewee, IntervieweeId, SessionError, SessionQuestion};

/// Pick an interviewee pair (as indices into the pool) for each of
/// `technical_questions` questions.
///
/// # Errors
///
/// Returns `SessionError::InsufficientInterviewees` when the pool has fewer than
/// two members.
pub fn pair_technical_questions<R: Rng + ?Sized>(
    pool_size: usize,
    technical_questions: usize,
    rng: &mut R,
) -> Result<Vec<(usize, usize)>, SessionError> {
    if pool_size < 2 {
        return Err(SessionError::InsufficientInterviewees { count: pool_size });
    }

    let mut load = vec![0_usize; pool_size];
    let mut pairs = Vec::with_capacity(technical_questions);
    let mut candidates = Vec::new();

    for _ in 0..technical_questions {
        candidates.clear();
        let mut best = usize::MAX;
        for a in 0..pool_size {
            for b in (a + 1)..pool_size {
                let sum = load[a] + load[b];
                if sum < best {
                    best = sum;
                    candidates.clear();
                }
                if sum == best {
                    candidates.push((a, b));
                }
            }
        }

        let Some(&(a, b)) = candidates.choose(rng) else {
            break;
        };
        load[a] += 1;
        load[b] += 1;
        pairs.push((a, b));
    }

    Ok(pairs)
}

/// Count technical-question assignments per interviewee, in pool order.
#[must_use]
pub fn technical_assignment_counts(
    questions: &[SessionQuestion],
    interviewees: &[Interviewee],
) -> Vec<(IntervieweeId, usize)> {
    interviewees
        .iter()
        .map(|who| {
            let count = questions
                .iter()
                .filter(|q| q.category().is_technical())
                .filter(|q| q.assigned_interviewees().contains(&who.id()))
                .count();
            (who.id(), count)
        })
        .collect()
}
