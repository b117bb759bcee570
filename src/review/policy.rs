//! Reviewer selection policy.
//!
//! Pure functions over candidate rosters. The caller supplies the RNG, so
//! production code draws from a process-wide source while tests pass a
//! seeded one. Candidates are expected to already be filtered to active
//! teammates with the author (or outgoing reviewer) excluded.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::database::models::User;

/// Reviewers assigned when a pull request is created.
pub const DEFAULT_REVIEWER_COUNT: usize = 2;

/// Uniform sample without replacement of `min(k, candidates.len())`
/// reviewers. An empty candidate set yields an empty assignment, which is
/// valid: a PR may open with zero reviewers.
pub fn select_initial_reviewers<R: Rng + ?Sized>(
    rng: &mut R,
    candidates: &[User],
    k: usize,
) -> Vec<i64> {
    candidates
        .choose_multiple(rng, k)
        .map(|user| user.id)
        .collect()
}

/// Uniform choice of a single replacement, or `None` when the pool is
/// empty. Callers must not mutate any state on `None`.
pub fn select_replacement<R: Rng + ?Sized>(rng: &mut R, candidates: &[User]) -> Option<i64> {
    candidates.choose(rng).map(|user| user.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn user(id: i64) -> User {
        User {
            id,
            username: format!("user{}", id),
            team_id: 1,
            is_active: true,
        }
    }

    #[test]
    fn initial_selection_caps_at_pool_size() {
        let mut rng = StdRng::seed_from_u64(7);
        let pool = vec![user(1)];
        let picked = select_initial_reviewers(&mut rng, &pool, DEFAULT_REVIEWER_COUNT);
        assert_eq!(picked, vec![1]);
    }

    #[test]
    fn initial_selection_takes_k_distinct_members() {
        let mut rng = StdRng::seed_from_u64(7);
        let pool: Vec<User> = (1..=5).map(user).collect();
        let picked = select_initial_reviewers(&mut rng, &pool, DEFAULT_REVIEWER_COUNT);
        assert_eq!(picked.len(), 2);
        assert_ne!(picked[0], picked[1]);
        for id in &picked {
            assert!((1..=5).contains(id));
        }
    }

    #[test]
    fn initial_selection_of_empty_pool_is_empty() {
        let mut rng = StdRng::seed_from_u64(7);
        let picked = select_initial_reviewers(&mut rng, &[], DEFAULT_REVIEWER_COUNT);
        assert!(picked.is_empty());
    }

    #[test]
    fn replacement_comes_from_the_pool() {
        let mut rng = StdRng::seed_from_u64(42);
        let pool: Vec<User> = (10..13).map(user).collect();
        let picked = select_replacement(&mut rng, &pool).unwrap();
        assert!((10..13).contains(&picked));
    }

    #[test]
    fn replacement_from_empty_pool_is_none() {
        let mut rng = StdRng::seed_from_u64(42);
        assert_eq!(select_replacement(&mut rng, &[]), None);
    }
}
