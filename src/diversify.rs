use rand::Rng;
use std::cmp::Ordering;

use crate::recipe::ScoredCandidate;

/// Chance, per position, that the transposition pass swaps an element with
/// an earlier one.
pub const SWAP_PROBABILITY: f64 = 0.15;

/// Noise is drawn uniformly from `[0, NOISE_CEILING)`, on the same scale as
/// match scores.
const NOISE_CEILING: f64 = 100.0;

/// Reorders ranked candidates by blending score with random jitter, then
/// applies a light random transposition pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Diversifier {
    alpha: f64,
    swap_probability: f64,
}

impl Diversifier {
    /// `alpha` is the noise share of the blended key, clamped to `[0, 1]`.
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha: clamp_unit(alpha),
            swap_probability: SWAP_PROBABILITY,
        }
    }

    pub fn with_swap_probability(mut self, probability: f64) -> Self {
        self.swap_probability = clamp_unit(probability);
        self
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Returns at most `limit` candidates. Not idempotent: repeated calls
    /// with the same input may order the result differently unless `rng`
    /// is seeded identically.
    pub fn diversify<R: Rng + ?Sized>(
        &self,
        candidates: Vec<ScoredCandidate>,
        limit: usize,
        rng: &mut R,
    ) -> Vec<ScoredCandidate> {
        let mut keyed: Vec<(f64, ScoredCandidate)> = candidates
            .into_iter()
            .map(|candidate| {
                let noise = rng.gen_range(0.0..NOISE_CEILING);
                let key = candidate.match_score as f64 * (1.0 - self.alpha) + noise * self.alpha;
                (key, candidate)
            })
            .collect();

        keyed.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));

        if self.swap_probability > 0.0 {
            for i in 0..keyed.len() {
                if rng.gen_bool(self.swap_probability) {
                    let j = rng.gen_range(0..=i);
                    keyed.swap(i, j);
                }
            }
        }

        keyed.truncate(limit);
        keyed.into_iter().map(|(_, candidate)| candidate).collect()
    }
}

/// Diversifies with the default swap probability and a thread-local
/// generator, so concurrent callers never share generator state.
pub fn diversify(candidates: Vec<ScoredCandidate>, alpha: f64, limit: usize) -> Vec<ScoredCandidate> {
    diversify_with_rng(candidates, alpha, limit, &mut rand::thread_rng())
}

pub fn diversify_with_rng<R: Rng + ?Sized>(
    candidates: Vec<ScoredCandidate>,
    alpha: f64,
    limit: usize,
    rng: &mut R,
) -> Vec<ScoredCandidate> {
    Diversifier::new(alpha).diversify(candidates, limit, rng)
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::Recipe;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn candidate(id: &str, match_score: u8) -> ScoredCandidate {
        let recipe = Recipe {
            id: id.to_string(),
            title: format!("菜品{}", id),
            description: String::new(),
            ingredients: Vec::new(),
            steps: Vec::new(),
            cooking_time: String::new(),
            difficulty: Default::default(),
            category: String::new(),
            tags: Vec::new(),
            scores: Default::default(),
        };
        ScoredCandidate::new(recipe, match_score)
    }

    fn pool() -> Vec<ScoredCandidate> {
        vec![
            candidate("a", 72),
            candidate("b", 95),
            candidate("c", 40),
            candidate("d", 95),
            candidate("e", 88),
            candidate("f", 10),
        ]
    }

    fn ids(candidates: &[ScoredCandidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.recipe.id.as_str()).collect()
    }

    #[test]
    fn test_alpha_zero_without_swaps_is_score_order() {
        let mut rng = StdRng::seed_from_u64(7);
        let out = Diversifier::new(0.0)
            .with_swap_probability(0.0)
            .diversify(pool(), 10, &mut rng);
        // ties keep their input order
        assert_eq!(ids(&out), vec!["b", "d", "e", "a", "c", "f"]);
    }

    #[test]
    fn test_output_length_is_min_of_limit_and_len() {
        let mut rng = StdRng::seed_from_u64(1);
        for limit in [0, 1, 3, 6, 20] {
            let out = diversify_with_rng(pool(), 0.35, limit, &mut rng);
            assert_eq!(out.len(), limit.min(6));
        }
        assert!(diversify(Vec::new(), 0.2, 5).is_empty());
    }

    #[test]
    fn test_output_is_subset_without_duplicates() {
        let mut rng = StdRng::seed_from_u64(99);
        let out = diversify_with_rng(pool(), 1.0, 6, &mut rng);
        let unique: HashSet<&str> = ids(&out).into_iter().collect();
        assert_eq!(unique.len(), 6);
    }

    #[test]
    fn test_same_seed_gives_same_order() {
        let first = diversify_with_rng(pool(), 0.4, 6, &mut StdRng::seed_from_u64(2024));
        let second = diversify_with_rng(pool(), 0.4, 6, &mut StdRng::seed_from_u64(2024));
        assert_eq!(ids(&first), ids(&second));
    }

    #[test]
    fn test_low_alpha_keeps_clear_winners_on_top() {
        // With alpha 0.2 the noise adds at most 20 points while the scores
        // below are 60 apart, so the top-2 set is stable before swaps.
        let candidates = vec![
            candidate("low1", 20),
            candidate("high1", 100),
            candidate("low2", 25),
            candidate("high2", 98),
        ];
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let out = Diversifier::new(0.2)
                .with_swap_probability(0.0)
                .diversify(candidates.clone(), 2, &mut rng);
            let top: HashSet<&str> = ids(&out).into_iter().collect();
            assert_eq!(top, HashSet::from(["high1", "high2"]));
        }
    }

    #[test]
    fn test_swap_pass_perturbs_score_order() {
        let candidates: Vec<ScoredCandidate> = (0..20u8)
            .map(|i| candidate(&format!("c{}", i), 100 - i * 4))
            .collect();
        let sorted: Vec<String> = candidates.iter().map(|c| c.recipe.id.clone()).collect();

        let mut perturbed = 0;
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let out = Diversifier::new(0.0).diversify(candidates.clone(), 20, &mut rng);
            let out_ids: Vec<String> = out.iter().map(|c| c.recipe.id.clone()).collect();

            let unique: HashSet<&String> = out_ids.iter().collect();
            assert_eq!(unique.len(), 20);
            assert!(sorted.iter().all(|id| unique.contains(id)));
            if out_ids != sorted {
                perturbed += 1;
            }
        }
        assert!(perturbed > 0, "swap pass never changed the order");
    }

    #[test]
    fn test_certain_swaps_stay_within_prefix() {
        // With two elements and probability 1 the second one is swapped with
        // index 0 or 1, so both orders appear and nothing else does.
        let mut orders = HashSet::new();
        for seed in 0..40 {
            let mut rng = StdRng::seed_from_u64(seed);
            let out = Diversifier::new(0.0)
                .with_swap_probability(1.0)
                .diversify(vec![candidate("a", 90), candidate("b", 50)], 2, &mut rng);
            orders.insert(ids(&out).join(","));
        }
        assert_eq!(orders, HashSet::from(["a,b".to_string(), "b,a".to_string()]));

        let mut rng = StdRng::seed_from_u64(5);
        let single = Diversifier::new(0.0)
            .with_swap_probability(1.0)
            .diversify(vec![candidate("only", 10)], 5, &mut rng);
        assert_eq!(ids(&single), vec!["only"]);
    }

    #[test]
    fn test_alpha_is_clamped() {
        assert_eq!(Diversifier::new(3.0).alpha(), 1.0);
        assert_eq!(Diversifier::new(-1.0).alpha(), 0.0);
        assert_eq!(Diversifier::new(f64::NAN).alpha(), 0.0);
    }
}
